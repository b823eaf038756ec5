use crate::config::PricingConfig;
use crate::models::decimal::{from_f64, round2, to_f64};
use bigdecimal::{BigDecimal, Zero};

/// 计价规则: 单价, 税率, 最小计费面积
///
/// 乘法与累加按 f64 进行, 每一步结果经 `round2` 取整为精确的分位值,
/// 下一步再从该分位值对应的 f64 出发。
#[derive(Debug, Clone, PartialEq)]
pub struct PricingRules {
    pub unit_price: f64,
    pub tax_rate: f64,
    pub moq_area: f64,
}

/// 结算金额
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub net: BigDecimal,
    pub tax: BigDecimal,
    pub total: BigDecimal,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self {
            unit_price: 39.0,
            tax_rate: 0.05,
            moq_area: 1.5,
        }
    }
}

impl TryFrom<&PricingConfig> for PricingRules {
    type Error = String;

    fn try_from(config: &PricingConfig) -> Result<Self, Self::Error> {
        for (name, value) in [
            ("unit_price", config.unit_price),
            ("tax_rate", config.tax_rate),
            ("moq_area", config.moq_area),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be a non-negative number, got {}", name, value));
            }
        }
        if config.tax_rate > 1.0 {
            return Err(format!("tax_rate must not exceed 1, got {}", config.tax_rate));
        }
        Ok(Self {
            unit_price: config.unit_price,
            tax_rate: config.tax_rate,
            moq_area: config.moq_area,
        })
    }
}

impl PricingRules {
    /// area = round(width * height, 2)
    pub fn area(&self, width: f64, height: f64) -> BigDecimal {
        round2(width * height)
    }

    /// 不足最小计费面积按最小面积计
    pub fn billable_area(&self, area: &BigDecimal) -> BigDecimal {
        if to_f64(area) < self.moq_area {
            from_f64(self.moq_area).unwrap_or_else(BigDecimal::zero)
        } else {
            area.clone()
        }
    }

    /// 先取整净额, 再由净额算税, 税与总额各自取整
    pub fn settle(&self, total_billable_area: f64) -> Settlement {
        let net = round2(total_billable_area * self.unit_price);
        let tax = round2(to_f64(&net) * self.tax_rate);
        let total = round2(to_f64(&net) + to_f64(&tax));
        Settlement { net, tax, total }
    }
}
