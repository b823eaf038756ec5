use bigdecimal::{BigDecimal, Zero};
use serde::Serialize;

use super::{decimal, LineRecord};

/// 计价结果 (每次请求重新计算, 不落库)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingResult {
    pub lines: Vec<LineRecord>,
    #[serde(rename = "total_area", serialize_with = "decimal::as_f64")]
    pub total_billable_area: BigDecimal,
    #[serde(rename = "net", serialize_with = "decimal::as_f64")]
    pub net_amount: BigDecimal,
    #[serde(rename = "vat", serialize_with = "decimal::as_f64")]
    pub tax_amount: BigDecimal,
    #[serde(rename = "total", serialize_with = "decimal::as_f64")]
    pub total_amount: BigDecimal,
}

impl PricingResult {
    pub fn empty() -> Self {
        Self {
            lines: Vec::new(),
            total_billable_area: BigDecimal::zero(),
            net_amount: BigDecimal::zero(),
            tax_amount: BigDecimal::zero(),
            total_amount: BigDecimal::zero(),
        }
    }
}
