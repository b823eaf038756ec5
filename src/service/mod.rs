pub mod calculator;
pub mod rules;

pub use calculator::PricingCalculator;
pub use rules::{PricingRules, Settlement};
