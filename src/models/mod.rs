pub mod decimal;
pub mod order;
pub mod result;
pub mod row;

pub use order::{OrderBatch, PanelSpec};
pub use result::PricingResult;
pub use row::{LedgerRow, LineRecord};
