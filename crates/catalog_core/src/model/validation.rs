//! Field constraint checks shared by category and item drafts.

use rust_decimal::Decimal;
use thiserror::Error;

/// Maximum digits allowed left of the decimal point in a price.
pub const PRICE_INTEGER_DIGITS: u32 = 8;
/// Maximum digits allowed right of the decimal point in a price.
pub const PRICE_FRACTION_DIGITS: u32 = 2;

/// One violated field constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be blank")]
    Blank { field: &'static str },
    #[error("{field} must be at most {max} characters, got {actual}")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
    #[error("price must not be negative, got {0}")]
    NegativePrice(Decimal),
    #[error("price allows at most 2 fraction digits, got {0}")]
    PriceScale(Decimal),
    #[error("price allows at most 8 integer digits, got {0}")]
    PriceIntegerDigits(Decimal),
    #[error("stock must not be negative, got {0}")]
    NegativeStock(i32),
    #[error("page index must not be negative, got {0}")]
    NegativePage(i64),
    #[error("page size must be positive, got {0}")]
    NonPositivePageSize(i64),
    #[error("page index must fit in 32 bits, got {0}")]
    PageOutOfRange(i64),
    #[error("page size must fit in 32 bits, got {0}")]
    PageSizeOutOfRange(i64),
}

/// Rejects blank or over-long text. Length is counted in characters.
pub fn check_text(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Blank { field });
    }
    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong { field, max, actual });
    }
    Ok(())
}

/// Checks sign, scale and integer width of a price.
///
/// Trailing fractional zeros do not count toward the scale, so `1.500`
/// is accepted and `1.005` is not.
pub fn check_price(price: Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ValidationError::NegativePrice(price));
    }
    if price.normalize().scale() > PRICE_FRACTION_DIGITS {
        return Err(ValidationError::PriceScale(price));
    }
    if price.trunc() >= Decimal::from(10_i64.pow(PRICE_INTEGER_DIGITS)) {
        return Err(ValidationError::PriceIntegerDigits(price));
    }
    Ok(())
}

pub fn check_stock(stock: i32) -> Result<(), ValidationError> {
    if stock < 0 {
        return Err(ValidationError::NegativeStock(stock));
    }
    Ok(())
}
