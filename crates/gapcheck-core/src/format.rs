//! en-US display formatting. Missing values render as an empty string.

/// Group the integer part of `value` with commas after rounding to `decimals`.
pub fn with_commas(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let negative = value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0');
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(f) = frac_part {
        out.push('.');
        out.push_str(f);
    }
    out
}

/// Whole-dollar currency: `$1,234,567`.
pub fn currency(value: Option<f64>) -> String {
    match value {
        Some(v) if v < 0.0 => format!("-${}", with_commas(-v, 0)),
        Some(v) => format!("${}", with_commas(v, 0)),
        None => String::new(),
    }
}

/// Whole number with thousands separators.
pub fn count(value: Option<f64>) -> String {
    value.map(|v| with_commas(v, 0)).unwrap_or_default()
}

/// Percentage with one decimal place: `12.5%`.
pub fn percent(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.1}%")).unwrap_or_default()
}
