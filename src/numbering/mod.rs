//! # Page Number Formatting
//!
//! Turns the running page count into the label printed on the page and
//! returned by page citations. Format tokens follow the usual number
//! conversion conventions: `1`, `01`, `001`… for zero-padded decimals,
//! `i`/`I` for roman numerals, `a`/`A` for alphabetic numbering.

/// Formats a page count into a page label.
pub trait PageNumberFormatter {
    fn format(&self, number: u32) -> String;
}

impl<F> PageNumberFormatter for F
where
    F: Fn(u32) -> String,
{
    fn format(&self, number: u32) -> String {
        self(number)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberStyle {
    Decimal { min_width: usize },
    LowerRoman,
    UpperRoman,
    LowerAlpha,
    UpperAlpha,
}

/// A parsed number format token with optional digit grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberFormat {
    pub style: NumberStyle,
    pub grouping_separator: Option<char>,
    pub grouping_size: usize,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            style: NumberStyle::Decimal { min_width: 1 },
            grouping_separator: None,
            grouping_size: 0,
        }
    }
}

impl NumberFormat {
    /// Parse a format token. Unknown tokens fall back to plain decimals.
    pub fn parse(token: &str) -> Self {
        let style = match token {
            "i" => NumberStyle::LowerRoman,
            "I" => NumberStyle::UpperRoman,
            "a" => NumberStyle::LowerAlpha,
            "A" => NumberStyle::UpperAlpha,
            t if is_decimal_token(t) => NumberStyle::Decimal {
                min_width: t.chars().count(),
            },
            other => {
                log::warn!("Unsupported page number format '{other}'; using '1'");
                NumberStyle::Decimal { min_width: 1 }
            }
        };
        Self {
            style,
            ..Self::default()
        }
    }

    pub fn with_grouping(mut self, separator: char, size: usize) -> Self {
        self.grouping_separator = Some(separator);
        self.grouping_size = size;
        self
    }

    fn decimal(&self, number: u32, min_width: usize) -> String {
        let digits = format!("{number:0min_width$}");
        match self.grouping_separator {
            Some(sep) if self.grouping_size > 0 => group_digits(&digits, sep, self.grouping_size),
            _ => digits,
        }
    }
}

impl PageNumberFormatter for NumberFormat {
    fn format(&self, number: u32) -> String {
        match self.style {
            NumberStyle::Decimal { min_width } => self.decimal(number, min_width),
            NumberStyle::LowerRoman => roman(number)
                .map(|s| s.to_lowercase())
                .unwrap_or_else(|| self.decimal(number, 1)),
            NumberStyle::UpperRoman => roman(number).unwrap_or_else(|| self.decimal(number, 1)),
            NumberStyle::LowerAlpha => alpha(number, b'a').unwrap_or_else(|| self.decimal(number, 1)),
            NumberStyle::UpperAlpha => alpha(number, b'A').unwrap_or_else(|| self.decimal(number, 1)),
        }
    }
}

/// `1`, `01`, `001`…: zeros followed by a single `1`.
fn is_decimal_token(token: &str) -> bool {
    token.ends_with('1') && token[..token.len() - 1].chars().all(|c| c == '0')
}

fn group_digits(digits: &str, sep: char, size: usize) -> String {
    let chars: Vec<char> = digits.chars().collect();
    let mut out = String::with_capacity(chars.len() + chars.len() / size);
    for (i, ch) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % size == 0 {
            out.push(sep);
        }
        out.push(*ch);
    }
    out
}

/// Upper-case roman numeral, or `None` outside 1..=3999.
fn roman(mut number: u32) -> Option<String> {
    if number == 0 || number > 3999 {
        return None;
    }
    const TABLE: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut out = String::new();
    for (value, symbol) in TABLE {
        while number >= value {
            out.push_str(symbol);
            number -= value;
        }
    }
    Some(out)
}

/// Bijective base-26: a..z, aa..az, ba…
fn alpha(mut number: u32, base: u8) -> Option<String> {
    if number == 0 {
        return None;
    }
    let mut letters = Vec::new();
    while number > 0 {
        number -= 1;
        letters.push((base + (number % 26) as u8) as char);
        number /= 26;
    }
    Some(letters.into_iter().rev().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_padding() {
        assert_eq!(NumberFormat::parse("1").format(7), "7");
        assert_eq!(NumberFormat::parse("001").format(7), "007");
        assert_eq!(NumberFormat::parse("01").format(123), "123");
    }

    #[test]
    fn roman_numerals() {
        assert_eq!(NumberFormat::parse("i").format(4), "iv");
        assert_eq!(NumberFormat::parse("I").format(1994), "MCMXCIV");
        // Out of range falls back to decimal.
        assert_eq!(NumberFormat::parse("I").format(0), "0");
    }

    #[test]
    fn alphabetic() {
        let lower = NumberFormat::parse("a");
        assert_eq!(lower.format(1), "a");
        assert_eq!(lower.format(26), "z");
        assert_eq!(lower.format(27), "aa");
        assert_eq!(NumberFormat::parse("A").format(52), "AZ");
    }

    #[test]
    fn grouping() {
        let f = NumberFormat::parse("1").with_grouping(',', 3);
        assert_eq!(f.format(1234567), "1,234,567");
        assert_eq!(f.format(999), "999");
    }

    #[test]
    fn unknown_token_is_decimal() {
        assert_eq!(NumberFormat::parse("x").format(12), "12");
    }

    #[test]
    fn closures_are_formatters() {
        let f = |n: u32| format!("p.{n}");
        assert_eq!(PageNumberFormatter::format(&f, 3), "p.3");
    }
}
