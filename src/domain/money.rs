use std::fmt;

/// Parse a user-entered quantity (weight or unit price) as a real number.
/// Surrounding whitespace is ignored. Empty, non-numeric and non-finite
/// inputs are rejected.
/// Example: "2" -> 2.0, " 18.5 " -> 18.5, "-1" -> -1.0
pub fn parse_amount(input: &str) -> Result<f64, ParseAmountError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseAmountError::Empty);
    }

    let value: f64 = input.parse().map_err(|_| ParseAmountError::InvalidFormat)?;
    if !value.is_finite() {
        return Err(ParseAmountError::NotFinite);
    }
    Ok(value)
}

/// Round to two decimal places, halves away from zero.
/// Example: 2.5 * 18.0 -> 45.0, 1.333 * 3.0 -> 4.0, 0.125 -> 0.13
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Line total for a sale: `weight * unit_price`, rounded to cents.
pub fn line_total(weight: f64, unit_price: f64) -> f64 {
    round_to_cents(weight * unit_price)
}

/// Format a real number in its shortest round-trip form, always keeping a
/// decimal point so whole values stay recognisable as reals.
/// Example: 2.0 -> "2.0", 1.5 -> "1.5", 36.0 -> "36.0"
pub fn format_real(value: f64) -> String {
    format!("{:?}", value)
}

/// Format a money value with exactly two decimals.
/// Example: 36.0 -> "36.00", 4.5 -> "4.50"
pub fn format_money(value: f64) -> String {
    format!("{:.2}", value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseAmountError {
    Empty,
    InvalidFormat,
    NotFinite,
}

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAmountError::Empty => write!(f, "no number given"),
            ParseAmountError::InvalidFormat => write!(f, "not a number"),
            ParseAmountError::NotFinite => write!(f, "number must be finite"),
        }
    }
}

impl std::error::Error for ParseAmountError {}
