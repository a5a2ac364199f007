//! Numeric argument parsing shared by every command.
//!
//! Both parsers only accept plain ASCII digits. Signs and exponents are
//! refused: a leading `-` would otherwise be ambiguous with a flag, and the
//! tokenizer already treats any `-`-prefixed token as one.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NumberError {
    #[error("empty value")]
    Empty,
    #[error("unexpected character '{0}'")]
    InvalidCharacter(char),
    #[error("more than one decimal point")]
    ExtraDecimalPoint,
    #[error("no digits")]
    NoDigits,
    #[error("value is too large")]
    Overflow,
}

/// Parse a non-negative decimal such as `150`, `7.5`, `.5` or `5.`.
pub fn parse_amount(text: &str) -> Result<f64, NumberError> {
    if text.is_empty() {
        return Err(NumberError::Empty);
    }

    let mut seen_point = false;
    let mut digits = 0usize;
    for c in text.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' if seen_point => return Err(NumberError::ExtraDecimalPoint),
            '.' => seen_point = true,
            other => return Err(NumberError::InvalidCharacter(other)),
        }
    }
    if digits == 0 {
        return Err(NumberError::NoDigits);
    }

    let value: f64 = text.parse().map_err(|_| NumberError::NoDigits)?;
    if !value.is_finite() {
        return Err(NumberError::Overflow);
    }
    Ok(value)
}

/// Parse a non-negative integer made only of ASCII digits.
pub fn parse_count(text: &str) -> Result<u64, NumberError> {
    if text.is_empty() {
        return Err(NumberError::Empty);
    }
    if let Some(bad) = text.chars().find(|c| !c.is_ascii_digit()) {
        return Err(NumberError::InvalidCharacter(bad));
    }
    text.parse::<u64>().map_err(|_| NumberError::Overflow)
}
