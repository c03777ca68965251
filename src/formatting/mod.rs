//! Keystroke-time normalization for the payment form fields.
//!
//! Each transform is stateless and operates on the full current value of the
//! field, so pasted input is regrouped in a single pass. No semantic checks are
//! made (a month of `13` is left alone).

use std::fmt;
use std::str::FromStr;

const CARD_GROUP: usize = 4;
const EXPIRY_MONTH_DIGITS: usize = 2;
const EXPIRY_MAX_DIGITS: usize = 4;

/// Payment inputs that are reformatted as the user types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentField {
    CardNumber,
    Expiry,
    Cvv,
}

impl PaymentField {
    pub const ALL: [PaymentField; 3] = [
        PaymentField::CardNumber,
        PaymentField::Expiry,
        PaymentField::Cvv,
    ];

    pub fn format(self, raw: &str) -> String {
        match self {
            PaymentField::CardNumber => format_card_number(raw),
            PaymentField::Expiry => format_expiry(raw),
            PaymentField::Cvv => format_cvv(raw),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PaymentField::CardNumber => "Card number",
            PaymentField::Expiry => "Expiry (MM/YY)",
            PaymentField::Cvv => "CVV",
        }
    }
}

impl fmt::Display for PaymentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PaymentField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "card" | "card-number" | "cardnumber" => Ok(PaymentField::CardNumber),
            "expiry" | "exp" => Ok(PaymentField::Expiry),
            "cvv" | "cvc" => Ok(PaymentField::Cvv),
            other => Err(format!("unknown payment field `{other}`")),
        }
    }
}

fn digits(raw: &str) -> String {
    raw.chars().filter(|ch| ch.is_ascii_digit()).collect()
}

/// `"4242424242424242"` becomes `"4242 4242 4242 4242"`; the final group may be short.
pub fn format_card_number(raw: &str) -> String {
    let digits = digits(raw);
    let mut formatted = String::with_capacity(digits.len() + digits.len() / CARD_GROUP);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && index % CARD_GROUP == 0 {
            formatted.push(' ');
        }
        formatted.push(ch);
    }
    formatted
}

/// Inserts `/` after the month digits and keeps at most `MMYY`.
pub fn format_expiry(raw: &str) -> String {
    let digits = digits(raw);
    if digits.len() < EXPIRY_MONTH_DIGITS {
        return digits;
    }
    let end = digits.len().min(EXPIRY_MAX_DIGITS);
    format!(
        "{}/{}",
        &digits[..EXPIRY_MONTH_DIGITS],
        &digits[EXPIRY_MONTH_DIGITS..end]
    )
}

pub fn format_cvv(raw: &str) -> String {
    digits(raw)
}

/// Last four digits of a card number, if at least four were entered.
pub fn card_last_four(card: &str) -> Option<String> {
    let digits = digits(card);
    (digits.len() >= CARD_GROUP).then(|| digits[digits.len() - CARD_GROUP..].to_string())
}

/// Display value of one payment input, rewritten on every keystroke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentFieldBuffer {
    field: PaymentField,
    display: String,
}

impl PaymentFieldBuffer {
    pub fn new(field: PaymentField) -> Self {
        Self {
            field,
            display: String::new(),
        }
    }

    /// Replaces the buffer with the formatted form of `raw` and returns it.
    pub fn apply(&mut self, raw: &str) -> &str {
        self.display = self.field.format(raw);
        &self.display
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn is_empty(&self) -> bool {
        self.display.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_number_groups_by_four() {
        assert_eq!(format_card_number("4242424242424242"), "4242 4242 4242 4242");
        assert_eq!(format_card_number("42424"), "4242 4");
        assert_eq!(format_card_number(""), "");
    }

    #[test]
    fn card_number_drops_non_digits_and_regroups() {
        assert_eq!(format_card_number("4242 42-42 abc 4"), "4242 4242 4");
        assert_eq!(format_card_number("4 2 4 2 4"), "4242 4");
    }

    #[test]
    fn card_number_has_no_length_cap() {
        let formatted = format_card_number(&"1".repeat(22));
        assert_eq!(formatted, "1111 1111 1111 1111 1111 11");
    }

    #[test]
    fn expiry_inserts_slash_after_month() {
        assert_eq!(format_expiry("1"), "1");
        assert_eq!(format_expiry("12"), "12/");
        assert_eq!(format_expiry("122"), "12/2");
        assert_eq!(format_expiry("1225"), "12/25");
    }

    #[test]
    fn expiry_truncates_to_four_digits() {
        assert_eq!(format_expiry("12/2599"), "12/25");
        assert_eq!(format_expiry("122599"), "12/25");
    }

    #[test]
    fn expiry_does_not_validate_month() {
        assert_eq!(format_expiry("1399"), "13/99");
    }

    #[test]
    fn expiry_reformats_existing_slash() {
        assert_eq!(format_expiry("12/"), "12/");
        assert_eq!(format_expiry("1/2"), "12/");
    }

    #[test]
    fn cvv_keeps_digits_only() {
        assert_eq!(format_cvv("1a2b3"), "123");
        assert_eq!(format_cvv("12345"), "12345");
    }

    #[test]
    fn last_four_requires_four_digits() {
        assert_eq!(card_last_four("4242 4242 4242 1234").as_deref(), Some("1234"));
        assert_eq!(card_last_four("123"), None);
    }

    #[test]
    fn buffer_is_rewritten_from_latest_value() {
        let mut buffer = PaymentFieldBuffer::new(PaymentField::CardNumber);
        assert_eq!(buffer.apply("4242"), "4242");
        assert_eq!(buffer.apply("42424"), "4242 4");
        assert_eq!(buffer.apply(""), "");
        assert!(buffer.is_empty());
    }

    #[test]
    fn field_names_parse() {
        assert_eq!("card".parse::<PaymentField>(), Ok(PaymentField::CardNumber));
        assert_eq!("EXPIRY".parse::<PaymentField>(), Ok(PaymentField::Expiry));
        assert!("pin".parse::<PaymentField>().is_err());
    }
}
