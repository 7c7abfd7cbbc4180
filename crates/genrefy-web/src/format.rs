use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Abbreviated {
    pub value: String,
    pub suffix: Option<&'static str>,
}

impl fmt::Display for Abbreviated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.suffix.unwrap_or(""))
    }
}

/// Shortens large counts to one decimal with a `K` or `M` suffix.
pub fn abbreviate(number: u64) -> Abbreviated {
    if number >= 1_000_000 {
        Abbreviated {
            value: format!("{:.1}", number as f64 / 1_000_000.0),
            suffix: Some("M"),
        }
    } else if number >= 1_000 {
        Abbreviated {
            value: format!("{:.1}", number as f64 / 1_000.0),
            suffix: Some("K"),
        }
    } else {
        Abbreviated {
            value: group_thousands(number),
            suffix: None,
        }
    }
}

pub fn group_thousands(number: u64) -> String {
    let digits = number.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    grouped
}

/// Extracts a number from display text by dropping every non-digit character.
/// Text without digits, or with more digits than fit in a `u64`, yields `None`.
pub fn parse_digits(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }

    digits.parse().ok()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_abbreviate() {
        assert_eq!(abbreviate(1500).to_string(), "1.5K");
        assert_eq!(abbreviate(2_500_000).to_string(), "2.5M");
        assert_eq!(abbreviate(42).to_string(), "42");
        assert_eq!(abbreviate(999).to_string(), "999");
        assert_eq!(abbreviate(1000).to_string(), "1.0K");
    }

    #[test]
    fn test_abbreviate_parts() {
        let abbreviated = abbreviate(1500);

        assert_eq!(abbreviated.value, "1.5");
        assert_eq!(abbreviated.suffix, Some("K"));
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1500), "1,500");
        assert_eq!(group_thousands(2_500_000), "2,500,000");
    }

    #[test]
    fn test_parse_digits() {
        assert_eq!(parse_digits("1 500 listeners"), Some(1500));
        assert_eq!(parse_digits("2,500,000"), Some(2_500_000));
        assert_eq!(parse_digits("n/a"), None);
        assert_eq!(parse_digits(""), None);
        assert_eq!(parse_digits("99999999999999999999999"), None);
    }
}
