use thiserror::Error;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
pub enum ValidationError {
    #[error("Validation error: expected DD.MM.YYYY")]
    Format,
    #[error("Validation error: no such calendar date")]
    Calendar,
    #[error("Validation error: not a number")]
    NotNumeric,
    #[error("Validation error: value is blank")]
    Blank,
    #[error("Validation error: value is too large")]
    TooLarge,
    #[error("Validation error: number is outside the supported range")]
    OutOfRange
}
