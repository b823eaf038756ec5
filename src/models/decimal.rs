use bigdecimal::{BigDecimal, Zero};
use serde::Serializer;
use std::str::FromStr;

/// f64 -> BigDecimal, 经由最短十进制表示 (可无损转回同一个 f64)
pub fn from_f64(value: f64) -> Option<BigDecimal> {
    if !value.is_finite() {
        return None;
    }
    BigDecimal::from_str(&value.to_string()).ok()
}

/// 将 f64 按其精确二进制值舍入到 2 位小数 (银行家舍入, 恰为一半时取偶)
///
/// 与 Python `round(x, 2)` 结果一致: 0.5 * 3.05 = 1.52499.. -> 1.52,
/// 2.5 * 0.65 = 1.625 (精确) -> 1.62。返回值为精确的分位十进制。
pub fn round2(value: f64) -> BigDecimal {
    if !value.is_finite() || value == 0.0 {
        return BigDecimal::zero();
    }

    let bits = value.abs().to_bits();
    let raw_exp = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1u64 << 52) - 1);
    // |value| = mantissa * 2^exp
    let (mantissa, exp) = if raw_exp == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), raw_exp - 1075)
    };

    // 指数非负即为整数, 无需舍入
    if exp >= 0 {
        return from_f64(value).unwrap_or_else(BigDecimal::zero);
    }

    // |value| * 100 = scaled / 2^shift, scaled < 2^60
    let scaled = mantissa as u128 * 100;
    let shift = (-exp) as u32;
    let cents: u128 = if shift > 61 {
        0
    } else {
        let quotient = scaled >> shift;
        let remainder = scaled & ((1u128 << shift) - 1);
        let half = 1u128 << (shift - 1);
        if remainder > half || (remainder == half && quotient & 1 == 1) {
            quotient + 1
        } else {
            quotient
        }
    };

    let rounded = BigDecimal::new(cents.into(), 2);
    if value < 0.0 {
        -rounded
    } else {
        rounded
    }
}

/// BigDecimal -> f64, 经由十进制字符串得到最接近的 f64
pub fn to_f64(value: &BigDecimal) -> f64 {
    value.to_string().parse().unwrap_or(0.0)
}

/// 以 JSON number 输出 BigDecimal
pub fn as_f64<S>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(to_f64(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_from_f64_uses_shortest_repr() {
        assert_eq!(from_f64(0.1), Some(dec("0.1")));
        assert_eq!(from_f64(2.675), Some(dec("2.675")));
        assert_eq!(from_f64(f64::NAN), None);
        assert_eq!(from_f64(f64::INFINITY), None);
    }

    #[test]
    fn test_round2_follows_binary_value() {
        // (input, python round(input, 2))
        let cases = [
            (0.5 * 3.05, "1.52"),
            (2.5 * 0.65, "1.62"),
            (2.675, "2.67"),
            (2.5 * 0.05, "0.12"),
            (0.7 * 0.05, "0.03"),
            (0.375, "0.38"),
            (0.125, "0.12"),
            (117.0 * 0.05, "5.85"),
            (117.0 + 5.85, "122.85"),
            (1.2 * 1.3, "1.56"),
            (3.0, "3"),
            (0.001, "0"),
            (-2.675, "-2.67"),
        ];
        for (input, expected) in cases {
            assert_eq!(round2(input), dec(expected), "round2({})", input);
        }
    }

    #[test]
    fn test_round2_degenerate_inputs() {
        assert_eq!(round2(0.0), dec("0"));
        assert_eq!(round2(f64::NAN), dec("0"));
        assert_eq!(round2(1e-300), dec("0"));
        assert_eq!(round2(9007199254740993.0), dec("9007199254740992"));
    }

    #[test]
    fn test_to_f64_is_nearest_double() {
        assert_eq!(to_f64(&dec("5.85")), 5.85);
        assert_eq!(to_f64(&dec("122.85")), 122.85);
        assert_eq!(to_f64(&dec("117.0")), 117.0);
    }

    #[test]
    fn test_as_f64_serializes_number() {
        #[derive(serde::Serialize)]
        struct Wrapper {
            #[serde(serialize_with = "as_f64")]
            amount: BigDecimal,
        }
        let json = serde_json::to_value(Wrapper { amount: dec("122.85") }).unwrap();
        assert_eq!(json, serde_json::json!({ "amount": 122.85 }));
    }
}
