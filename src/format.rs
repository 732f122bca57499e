//! Number formatting for text meant for people. Metrics stay unscaled
//! everywhere else; the ×100 for percentages happens only here.

pub fn format_currency(value: f64, symbol: &str) -> String {
    format!("{}{:.2}", symbol, value)
}

pub fn format_percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

pub fn format_roas(roas: f64) -> String {
    format!("{:.2}x", roas)
}

/// Rounds to the nearest integer and groups thousands with commas.
pub fn format_count(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{}", rounded.abs() as u64);

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_each_kind() {
        assert_eq!(format_currency(12.346, "€"), "€12.35");
        assert_eq!(format_percent(0.1234), "12.34%");
        assert_eq!(format_roas(3.0), "3.00x");
    }

    #[test]
    fn groups_thousands() {
        assert_eq!(format_count(0.4), "0");
        assert_eq!(format_count(999.5), "1,000");
        assert_eq!(format_count(1234567.0), "1,234,567");
        assert_eq!(format_count(-2500.0), "-2,500");
    }
}
