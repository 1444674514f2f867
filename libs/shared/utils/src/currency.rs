use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum CurrencyError {
    #[error("amount contains no digits")]
    Empty,

    #[error("amount out of range")]
    OutOfRange,
}

/// Parse masked currency input. The entry convention is digits-only with
/// the last two digits as cents: "15000" -> 150.00, "R$ 1.234,56" -> 1234.56.
pub fn parse_masked_amount(input: &str) -> Result<Decimal, CurrencyError> {
    let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Err(CurrencyError::Empty);
    }

    let cents: i64 = digits.parse().map_err(|_| CurrencyError::OutOfRange)?;
    Ok(Decimal::new(cents, 2))
}
