use chrono::NaiveDate;

/// Format a float with a currency label and thousands separators: Rs 1,234.56
pub fn money(val: f64, currency: &str) -> String {
    let negative = val < 0.0;
    let abs = val.abs();
    let cents = format!("{:.2}", abs);
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((&cents, "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-{currency} {with_commas}.{dec_part}")
    } else {
        format!("{currency} {with_commas}.{dec_part}")
    }
}

/// Plain two-decimal amount, no label or separators.
pub fn amount(val: f64) -> String {
    format!("{val:.2}")
}

pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// March 5, 2025
pub fn long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Mar 5, 2025
pub fn short_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Last `n` characters of an identifier, uppercased.
pub fn id_tail(id: &str, n: usize) -> String {
    let chars: Vec<char> = id.chars().collect();
    let start = chars.len().saturating_sub(n);
    chars[start..].iter().collect::<String>().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(1234.56, "Rs"), "Rs 1,234.56");
        assert_eq!(money(-500.00, "Rs"), "-Rs 500.00");
        assert_eq!(money(0.0, "Rs"), "Rs 0.00");
        assert_eq!(money(1000000.99, "$"), "$ 1,000,000.99");
        assert_eq!(money(42.10, "Rs"), "Rs 42.10");
    }

    #[test]
    fn test_amount() {
        assert_eq!(amount(250.5), "250.50");
        assert_eq!(amount(100.0), "100.00");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("monthly"), "Monthly");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_dates() {
        let d = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
        assert_eq!(long_date(d), "March 5, 2025");
        assert_eq!(short_date(d), "Mar 5, 2025");
    }

    #[test]
    fn test_id_tail() {
        assert_eq!(id_tail("65f1c2aabbccddeeff001122", 8), "FF001122");
        assert_eq!(id_tail("abc", 6), "ABC");
    }
}
