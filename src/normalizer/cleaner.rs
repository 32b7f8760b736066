use super::error::NormalizeError;

// ── Text primitives ───────────────────────────────────────────────────────────

/// Drop every whitespace char, including the NBSP / narrow NBSP the site uses
/// as a thousands separator. "1 250 000" → "1250000"
pub fn strip_spaces(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Leading number, allowing space-grouped thousands.
/// "10 000 км, без пробега по РФ" → 10000 | "249 л.с., налог" → 249
pub fn leading_number(s: &str) -> Option<u64> {
    let head: String = s
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit() || c.is_whitespace())
        .filter(|c| c.is_ascii_digit())
        .collect();
    if head.is_empty() {
        return None;
    }
    head.parse().ok()
}

/// Leading ASCII digits with no separators. "2019 год" → "2019"
pub fn leading_digits(s: &str) -> &str {
    let s = s.trim_start();
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    &s[..end]
}

/// "2.0 л" → 2.0 | "1,6 л" → 1.6
pub fn parse_litres(s: &str) -> Option<f64> {
    let s = s
        .trim()
        .trim_end_matches(|c: char| c == 'л' || c == '.' || c.is_whitespace());
    if s.is_empty() {
        return None;
    }
    s.replace(',', ".").parse().ok()
}

// ── Title ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Title {
    pub brand: String,
    pub model: String,
    pub year: u16,
}

/// "Lada Vesta SW Cross, 2021 год" → Lada / "Vesta SW Cross" / 2021
pub fn parse_title(title: &str) -> Result<Title, NormalizeError> {
    let Some((name, rest)) = title.trim().split_once(", ") else {
        return Err(NormalizeError::name(title, "no \", \" separator"));
    };

    let mut words = name.split_whitespace();
    let Some(brand) = words.next() else {
        return Err(NormalizeError::name(title, "empty name"));
    };
    let model = words.collect::<Vec<_>>().join(" ");

    let digits = leading_digits(rest);
    if digits.len() != 4 {
        return Err(NormalizeError::name(title, "no 4-digit year"));
    }
    let year: u16 = digits
        .parse()
        .map_err(|_| NormalizeError::name(title, "no 4-digit year"))?;

    Ok(Title {
        brand: brand.to_string(),
        model,
        year,
    })
}

// ── Price ─────────────────────────────────────────────────────────────────────

/// "1 250 000 ₽" → 1250000
pub fn parse_price(s: &str) -> Result<u64, NormalizeError> {
    let cleaned = strip_spaces(s);
    let cleaned = cleaned
        .trim_end_matches('₽')
        .trim_end_matches("руб.")
        .trim_end_matches("руб");
    cleaned
        .parse()
        .map_err(|_| NormalizeError::MalformedPrice(s.to_string()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_title_single_word_model() {
        let t = parse_title("Toyota Camry, 2019 год").unwrap();
        assert_eq!(t.brand, "Toyota");
        assert_eq!(t.model, "Camry");
        assert_eq!(t.year, 2019);
    }

    #[test]
    fn test_parse_title_multi_word_model() {
        let t = parse_title("Lada Vesta SW Cross, 2021").unwrap();
        assert_eq!(t.brand, "Lada");
        assert_eq!(t.model, "Vesta SW Cross");
        assert_eq!(t.year, 2021);
    }

    #[test]
    fn test_parse_title_brand_only() {
        let t = parse_title("Haval, 2023 год").unwrap();
        assert_eq!(t.brand, "Haval");
        assert_eq!(t.model, "");
    }

    #[test]
    fn test_parse_title_rejects() {
        for bad in ["Toyota Camry 2019 год", ", 2019", "Toyota Camry, год", "Toyota, 19"] {
            let err = parse_title(bad).unwrap_err();
            assert_eq!(err.kind(), "malformed_name", "{bad}");
        }
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("1 250 000").unwrap(), 1_250_000);
        assert_eq!(parse_price("1\u{a0}250\u{a0}000\u{a0}₽").unwrap(), 1_250_000);
        assert_eq!(parse_price("980 000 руб.").unwrap(), 980_000);
        assert!(matches!(
            parse_price("договорная"),
            Err(NormalizeError::MalformedPrice(_))
        ));
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("10 000 км, без пробега по РФ"), Some(10_000));
        assert_eq!(leading_number("249 л.с., налог"), Some(249));
        assert_eq!(leading_number("км"), None);
    }

    #[test]
    fn test_parse_litres() {
        assert_eq!(parse_litres("2.0 л"), Some(2.0));
        assert_eq!(parse_litres("1,6 л."), Some(1.6));
        assert_eq!(parse_litres(" л"), None);
    }
}
