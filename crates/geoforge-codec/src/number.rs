//! Coordinate rounding and JSON number formatting.

use serde_json::{Number, Value};

/// Largest integer magnitude an f64 represents exactly.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// Round to a fixed number of decimals; `None` leaves the value as is
pub fn round_to(value: f64, decimals: Option<u32>) -> f64 {
    match decimals {
        Some(d) if value.is_finite() => {
            let factor = 10f64.powi(d as i32);
            let rounded = (value * factor).round() / factor;
            if rounded.is_finite() {
                rounded
            } else {
                value
            }
        }
        _ => value,
    }
}

fn is_integral(value: f64) -> bool {
    value.is_finite() && value.fract() == 0.0 && value.abs() < MAX_EXACT_INT
}

/// JSON number for a coordinate, integral values without a fraction
pub fn json_number(value: f64) -> Value {
    if is_integral(value) {
        // -0.0 prints as 0
        Value::Number(Number::from(value as i64))
    } else {
        Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.999_999_999_999_9, Some(9)), 1.0);
        assert_eq!(round_to(1.234_567, Some(2)), 1.23);
        assert_eq!(round_to(1.234_567, None), 1.234_567);
        assert!(round_to(f64::NAN, Some(3)).is_nan());
    }

    #[test]
    fn test_json_number() {
        assert_eq!(json_number(1.0).to_string(), "1");
        assert_eq!(json_number(-0.0).to_string(), "0");
        assert_eq!(json_number(2.5).to_string(), "2.5");
        assert_eq!(json_number(f64::NAN), Value::Null);
    }
}
