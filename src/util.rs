// Utility helpers for parsing, statistics and display formatting.
//
// The loader leans on the `parse_*` helpers so conversion rules live in one
// place; the summary cards and console tables share the formatters.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};

/// Date layouts accepted for `incident_date`, tried in order.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d-%m-%Y", "%m/%d/%Y"];

/// Parse an integer cell.
///
/// - Trims whitespace.
/// - Accepts a trailing `.0` so integer columns exported as floats still load.
/// - Returns `None` for anything else.
pub fn parse_i64_safe(s: Option<&str>) -> Option<i64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() && v.fract() == 0.0 {
        Some(v as i64)
    } else {
        None
    }
}

/// Parse a floating-point cell, rejecting NaN and infinities.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Median of a list of numbers, `None` for an empty list.
///
/// Takes the `Vec` by value so it can be sorted in place.
pub fn median(mut v: Vec<f64>) -> Option<f64> {
    if v.is_empty() {
        return None;
    }
    v.sort_by(|a, b| a.total_cmp(b));
    let mid = v.len() / 2;
    if v.len() % 2 == 1 {
        Some(v[mid])
    } else {
        Some((v[mid - 1] + v[mid]) / 2.0)
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// Shortest round-trip representation of `n` with thousands separators on the
/// integer part, always keeping a fractional digit (`5795.0` -> `5,795.0`).
///
/// Values too large for a plain decimal rendering are returned unchanged.
pub fn format_grouped_decimal(n: f64) -> String {
    let repr = format!("{:?}", n.abs());
    if repr.contains(['e', 'E']) || !n.is_finite() {
        return format!("{:?}", n);
    }
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), "0"));
    let grouped = match int_part.parse::<i64>() {
        Ok(v) => format_int(v),
        Err(_) => int_part.to_string(),
    };
    let sign = if n.is_sign_negative() && n != 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

pub fn format_percent(n: f64) -> String {
    format!("{:?}%", n)
}

pub fn format_currency(n: f64) -> String {
    format!("US$ {}", format_grouped_decimal(n))
}

pub fn format_currency_int(n: i64) -> String {
    format!("US$ {}", format_int(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_integers_and_integral_floats() {
        assert_eq!(parse_i64_safe(Some(" 42 ")), Some(42));
        assert_eq!(parse_i64_safe(Some("2004.0")), Some(2004));
        assert_eq!(parse_i64_safe(Some("3.5")), None);
        assert_eq!(parse_i64_safe(Some("")), None);
        assert_eq!(parse_i64_safe(None), None);
    }

    #[test]
    fn parses_floats() {
        assert_eq!(parse_f64_safe(Some("1406.91")), Some(1406.91));
        assert_eq!(parse_f64_safe(Some("abc")), None);
        assert_eq!(parse_f64_safe(Some("NaN")), None);
    }

    #[test]
    fn parses_all_date_layouts() {
        let expected = NaiveDate::from_ymd_opt(2015, 1, 25);
        assert_eq!(parse_date_safe(Some("2015-01-25")), expected);
        assert_eq!(parse_date_safe(Some("25-01-2015")), expected);
        assert_eq!(parse_date_safe(Some("01/25/2015")), expected);
        assert_eq!(parse_date_safe(Some("yesterday")), None);
    }

    #[test]
    fn median_of_odd_and_even_lists() {
        assert_eq!(median(vec![3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(vec![4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(Vec::new()), None);
    }

    #[test]
    fn grouped_decimal_keeps_one_fraction_digit() {
        assert_eq!(format_grouped_decimal(5795.0), "5,795.0");
        assert_eq!(format_grouped_decimal(1234567.5), "1,234,567.5");
        assert_eq!(format_grouped_decimal(12.25), "12.25");
        assert_eq!(format_grouped_decimal(-1500.0), "-1,500.0");
    }

    #[test]
    fn card_formatters() {
        assert_eq!(format_percent(40.0), "40.0%");
        assert_eq!(format_percent(24.7), "24.7%");
        assert_eq!(format_currency(58055.0), "US$ 58,055.0");
        assert_eq!(format_currency_int(14894620), "US$ 14,894,620");
    }
}
