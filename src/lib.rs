pub mod api;
pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
pub mod service;

pub use config::AppConfig;
pub use error::AppError;
pub use ledger::{connect_ledger, Ledger, LedgerError};
pub use service::{PricingCalculator, PricingRules};
