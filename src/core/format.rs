use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

/// Maximum fraction digits kept when no explicit precision is requested.
pub const DEFAULT_MAX_DECIMALS: u32 = 2;

/// Formats a number with at most `max_decimals` fraction digits, trailing zeros trimmed.
///
/// Rounding happens in decimal space so values such as `0.1 + 0.2` print as `0.3`.
#[must_use]
pub fn format_number(value: f64, max_decimals: u32) -> String {
    if !value.is_finite() {
        return "–".to_owned();
    }
    match Decimal::from_f64(value) {
        Some(decimal) => {
            let rounded = decimal.round_dp(max_decimals).normalize();
            if rounded.is_zero() {
                "0".to_owned()
            } else {
                rounded.to_string()
            }
        }
        None => format!("{value}"),
    }
}

#[must_use]
pub fn format_value(value: f64) -> String {
    format_number(value, DEFAULT_MAX_DECIMALS)
}

#[must_use]
pub fn format_with_unit(value: f64, unit: Option<&str>) -> String {
    match unit {
        Some(unit) if !unit.is_empty() => format!("{} {unit}", format_value(value)),
        _ => format_value(value),
    }
}

#[must_use]
pub fn format_percent(value: f64) -> String {
    format!("{}%", format_value(value))
}

/// Tooltip text for a value shown as a share of its group: `"75% (3 ABC)"`.
#[must_use]
pub fn format_normalized_value(percent: f64, raw: f64, unit: Option<&str>) -> String {
    format!("{} ({})", format_percent(percent), format_with_unit(raw, unit))
}

#[cfg(test)]
mod tests {
    use super::{format_normalized_value, format_number, format_with_unit};

    #[test]
    fn numbers_are_rounded_in_decimal_space() {
        assert_eq!(format_number(0.1 + 0.2, 2), "0.3");
        assert_eq!(format_number(1500.0, 2), "1500");
        assert_eq!(format_number(2.456, 2), "2.46");
        assert_eq!(format_number(-0.001, 2), "0");
        assert_eq!(format_number(f64::NAN, 2), "–");
    }

    #[test]
    fn normalized_values_show_share_and_raw_value() {
        assert_eq!(format_normalized_value(75.0, 3.0, Some("ABC")), "75% (3 ABC)");
        assert_eq!(format_with_unit(3.0, None), "3");
    }
}
