//! Parsing of free-form monetary text such as `"Rp 2,5 jt"` or `"2.500.000"`.

use std::sync::OnceLock;

use regex::Regex;

static AMOUNT_PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

fn amount_pattern() -> Result<&'static Regex, MoneyError> {
    AMOUNT_PATTERN
        .get_or_init(|| Regex::new(r"(-?)(\d+(?:[.,]\d+)*)\s*(ribu|rb|k|juta|jt|miliar|m|b)?\b"))
        .as_ref()
        .map_err(|err| MoneyError::Pattern(err.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    #[error("'{0}' does not contain an amount")]
    NoAmount(String),
    #[error("'{0}' is negative")]
    Negative(String),
    #[error("amount pattern failed to compile: {0}")]
    Pattern(String),
}

/// Parses a monetary amount written the way applicants type it.
///
/// `,` is the decimal separator and `.` groups thousands, so `"2.500.000"` and
/// `"2500000"` agree while `"2,5 jt"` is two and a half million. A single dot
/// followed by exactly three digits and no unit is a thousands separator too.
/// Several number/unit groups add up: `"1 jt 250 rb"` is 1,250,000. Blank text is 0.
pub fn parse_amount(raw: &str) -> Result<f64, MoneyError> {
    let text = raw.trim().to_lowercase().replace("rp", "");
    if text.trim().is_empty() {
        return Ok(0.0);
    }

    let mut total = 0.0;
    let mut spans = Vec::new();
    for captures in amount_pattern()?.captures_iter(&text) {
        let sign = captures.get(1).map_or("", |m| m.as_str());
        let unit = captures.get(3).map(|m| m.as_str());
        if sign == "-" {
            return Err(MoneyError::Negative(raw.to_string()));
        }
        let Some(digits) = captures.get(2) else {
            continue;
        };
        let Some(value) = number_value(digits.as_str(), unit.is_some()) else {
            continue;
        };
        spans.push(digits.range());
        total += value * unit_multiplier(unit);
    }

    // every digit must belong to a readable group, so "1e9" is not read as 9
    let stray_digit = text
        .char_indices()
        .filter(|(_, c)| c.is_ascii_digit())
        .any(|(index, _)| !spans.iter().any(|span| span.contains(&index)));
    if spans.is_empty() || stray_digit {
        Err(MoneyError::NoAmount(raw.to_string()))
    } else {
        Ok(total)
    }
}

fn number_value(digits: &str, has_unit: bool) -> Option<f64> {
    if let Some((whole, fraction)) = digits.rsplit_once(',') {
        if whole.contains(',') || fraction.contains('.') {
            return None;
        }
        return format!("{}.{}", whole.replace('.', ""), fraction).parse().ok();
    }

    let dots = digits.matches('.').count();
    let grouped = dots > 1
        || (dots == 1
            && !has_unit
            && digits
                .split_once('.')
                .is_some_and(|(_, fraction)| fraction.len() == 3));
    if grouped {
        digits.replace('.', "").parse().ok()
    } else {
        digits.parse().ok()
    }
}

fn unit_multiplier(unit: Option<&str>) -> f64 {
    match unit {
        Some("k" | "rb" | "ribu") => 1_000.0,
        Some("jt" | "juta") => 1_000_000.0,
        Some("m" | "miliar" | "b") => 1_000_000_000.0,
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_and_grouped_numbers() {
        assert_eq!(parse_amount("2500000"), Ok(2_500_000.0));
        assert_eq!(parse_amount("2.500.000"), Ok(2_500_000.0));
        assert_eq!(parse_amount("Rp 7.500"), Ok(7_500.0));
        assert_eq!(parse_amount("Rp 2.5"), Ok(2.5));
    }

    #[test]
    fn unit_suffixes_scale_the_number() {
        assert_eq!(parse_amount("Rp 2,5 jt"), Ok(2_500_000.0));
        assert_eq!(parse_amount("750rb"), Ok(750_000.0));
        assert_eq!(parse_amount("3 ribu"), Ok(3_000.0));
        assert_eq!(parse_amount("1,2 M"), Ok(1_200_000_000.0));
        assert_eq!(parse_amount("15 JUTA"), Ok(15_000_000.0));
    }

    #[test]
    fn comma_is_the_decimal_separator_after_grouped_thousands() {
        assert_eq!(parse_amount("Rp 1.500.000,00"), Ok(1_500_000.0));
        assert_eq!(parse_amount("10.000.000,50"), Ok(10_000_000.5));
        assert_eq!(parse_amount("2500000,75"), Ok(2_500_000.75));
    }

    #[test]
    fn letters_inside_a_number_are_not_an_amount() {
        assert_eq!(parse_amount("1e9"), Err(MoneyError::NoAmount("1e9".to_string())));
        assert_eq!(
            parse_amount("1,500,000"),
            Err(MoneyError::NoAmount("1,500,000".to_string()))
        );
    }

    #[test]
    fn groups_are_summed() {
        assert_eq!(parse_amount("1 jt 250 rb"), Ok(1_250_000.0));
    }

    #[test]
    fn blank_is_zero_and_text_without_digits_fails() {
        assert_eq!(parse_amount("   "), Ok(0.0));
        assert_eq!(parse_amount(""), Ok(0.0));
        assert_eq!(
            parse_amount("tidak ada"),
            Err(MoneyError::NoAmount("tidak ada".to_string()))
        );
    }

    #[test]
    fn negative_amounts_are_rejected() {
        assert_eq!(
            parse_amount("-500 rb"),
            Err(MoneyError::Negative("-500 rb".to_string()))
        );
    }
}
