use crate::types::errors::ValidationError;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;

const TOTAL_DECIMAL_PLACES: u32 = 2;

static NUMBER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("number pattern is a valid regex")
});

/// Parses a user supplied number, accepting `,` as the decimal separator.
///
/// No range checks are applied: zero and negative values are valid. Well formed numbers
/// beyond what a [`Decimal`] holds are reported as [`ValidationError::OutOfRange`].
pub fn parse_decimal(value: &str) -> Result<Decimal, ValidationError> {
    let normalized = value.trim().replace(',', ".");

    if !NUMBER_PATTERN.is_match(&normalized) {
        return Err(ValidationError::NotNumeric);
    }

    Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .map_err(|_| ValidationError::OutOfRange)
}

/// `round(price * quantity, 2)` with banker's rounding, `None` on overflow.
pub fn round_total(price: Decimal, quantity: Decimal) -> Option<Decimal> {
    price.checked_mul(quantity)
        .map(|total| total.round_dp(TOTAL_DECIMAL_PLACES))
}
