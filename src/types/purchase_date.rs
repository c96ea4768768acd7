use crate::types::errors::ValidationError;
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::LazyLock;

const DISPLAY_FORMAT: &str = "%d.%m.%Y";

static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{2}\.\d{2}\.\d{4}$").expect("date pattern is a valid regex")
});

/// Calendar date of a purchase, entered and displayed as `DD.MM.YYYY`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
pub struct PurchaseDate(NaiveDate);

impl PurchaseDate {
    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl Display for PurchaseDate {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0.format(DISPLAY_FORMAT))
    }
}

impl FromStr for PurchaseDate {
    type Err = ValidationError;

    /// Checks the shape first so that a well-formed but impossible date
    /// (`31.02.2025`) is told apart from free text.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();

        if !DATE_PATTERN.is_match(value) {
            return Err(ValidationError::Format);
        }

        let date = NaiveDate::parse_from_str(value, DISPLAY_FORMAT)
            .map_err(|_| ValidationError::Calendar)?;

        if date.year() < 1 {
            return Err(ValidationError::Calendar);
        }

        Ok(PurchaseDate(date))
    }
}
