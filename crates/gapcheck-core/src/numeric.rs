//! Shared numeric parsing for questionnaire inputs.
//!
//! Answers arrive as free text ("185K", "2.1M", "$1,900", "6.2%"). Every
//! numeric field goes through [`parse_amount`] so the suffix rules live in
//! one place.

/// Parse a number that may carry `K`/`M` suffixes, commas, a leading `$` or a
/// trailing `%`.
///
/// `K` multiplies by 1,000 and `M` by 1,000,000 (case-insensitive). Returns
/// `None` for empty, non-numeric or non-finite input.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let mut s = raw.trim().to_uppercase();
    if s.is_empty() {
        return None;
    }
    if let Some(rest) = s.strip_suffix('%') {
        s = rest.trim_end().to_string();
    }

    let mut multiplier = 1.0;
    if let Some(rest) = s.strip_suffix('K') {
        multiplier = 1_000.0;
        s = rest.to_string();
    } else if let Some(rest) = s.strip_suffix('M') {
        multiplier = 1_000_000.0;
        s = rest.to_string();
    }

    let cleaned: String = s
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    let value: f64 = cleaned.trim().parse().ok()?;
    let value = value * multiplier;
    value.is_finite().then_some(value)
}

/// Parse a percentage. Same rules as [`parse_amount`]; the `%` sign is optional.
pub fn parse_percent(raw: &str) -> Option<f64> {
    parse_amount(raw)
}

/// Parse a non-negative whole number ("12", "12 years" is rejected).
pub fn parse_whole(raw: &str) -> Option<u32> {
    let value = parse_amount(raw)?;
    if value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        return None;
    }
    Some(value as u32)
}

/// `numerator / denominator`, or `None` when the denominator is zero or the
/// result is not finite.
pub fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    let r = numerator / denominator;
    r.is_finite().then_some(r)
}

/// `numerator / denominator × 100` with the same guards as [`ratio`].
pub fn percent_of(numerator: f64, denominator: f64) -> Option<f64> {
    ratio(numerator, denominator).map(|r| r * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_numbers() {
        assert_eq!(parse_amount("42"), Some(42.0));
        assert_eq!(parse_amount(" 6.2 "), Some(6.2));
        assert_eq!(parse_amount("-3"), Some(-3.0));
    }

    #[test]
    fn k_and_m_suffixes() {
        assert_eq!(parse_amount("185K"), Some(185_000.0));
        assert_eq!(parse_amount("185k"), Some(185_000.0));
        assert_eq!(parse_amount("2.1M"), Some(2_100_000.0));
        assert_eq!(parse_amount("1.9K"), Some(1_900.0));
        for x in [0.5, 1.0, 12.0, 250.0] {
            assert_eq!(parse_amount(&format!("{x}K")), Some(x * 1_000.0));
            assert_eq!(parse_amount(&format!("{x}M")), Some(x * 1_000_000.0));
        }
    }

    #[test]
    fn commas_currency_and_percent() {
        assert_eq!(parse_amount("1,000,000"), Some(1_000_000.0));
        assert_eq!(parse_amount("$2,000"), Some(2_000.0));
        assert_eq!(parse_amount("$1.5M"), Some(1_500_000.0));
        assert_eq!(parse_percent("5%"), Some(5.0));
        assert_eq!(parse_percent("12.5 %"), Some(12.5));
    }

    #[test]
    fn non_numeric_is_none() {
        for raw in ["", "   ", "abc", "K", "M", "$", "%", "N/A", "1.2.3", "inf", "NaN"] {
            assert_eq!(parse_amount(raw), None, "expected None for {raw:?}");
        }
    }

    #[test]
    fn whole_numbers() {
        assert_eq!(parse_whole("12"), Some(12));
        assert_eq!(parse_whole("1K"), Some(1000));
        assert_eq!(parse_whole("1.5"), None);
        assert_eq!(parse_whole("-1"), None);
        assert_eq!(parse_whole("twelve"), None);
    }

    #[test]
    fn ratio_guards_zero_denominator() {
        assert_eq!(ratio(1.0, 0.0), None);
        assert_eq!(ratio(0.0, 0.0), None);
        assert_eq!(ratio(1.0, 4.0), Some(0.25));
        assert_eq!(percent_of(5.0, 20.0), Some(25.0));
    }
}
