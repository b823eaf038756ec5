use bigdecimal::BigDecimal;
use serde::Serialize;

use super::decimal;

/// 台账行: 每一件实物对应一行 (width, height, area, moq_area)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerRow {
    #[serde(serialize_with = "decimal::as_f64")]
    pub width: BigDecimal,
    #[serde(serialize_with = "decimal::as_f64")]
    pub height: BigDecimal,
    /// round(width * height, 2)
    #[serde(serialize_with = "decimal::as_f64")]
    pub area: BigDecimal,
    /// max(area, MOQ)
    #[serde(rename = "moq_area", serialize_with = "decimal::as_f64")]
    pub billable_area: BigDecimal,
}

/// 响应中的明细行, 与台账行同构
pub type LineRecord = LedgerRow;

impl LedgerRow {
    pub const HEADER: [&'static str; 4] = ["width", "height", "area", "moq_area"];

    /// 按列顺序输出的字符串形式 (CSV 等)
    pub fn to_record(&self) -> [String; 4] {
        [
            self.width.to_string(),
            self.height.to_string(),
            self.area.to_string(),
            self.billable_area.to_string(),
        ]
    }
}
