use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Purchase, Submitter};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single value written to the tabular store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(#[serde(with = "rust_decimal::serde::float")] Decimal)
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<Decimal> for Cell {
    fn from(value: Decimal) -> Self {
        Cell::Number(value)
    }
}

/// Flattened, write-once row: the purchase fields, then the submitter, then the append time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SubmissionRow(Vec<Cell>);

impl SubmissionRow {
    pub const WIDTH: usize = 13;

    pub fn new(purchase: &Purchase, submitter: &Submitter, timestamp: NaiveDateTime) -> Self {
        SubmissionRow(vec![
            purchase.date.to_string().into(),
            purchase.seller.as_str().into(),
            purchase.description.as_str().into(),
            purchase.price.into(),
            purchase.unit.as_str().into(),
            purchase.quantity.into(),
            purchase.total.into(),
            purchase.note.as_str().into(),
            submitter.full_name().into(),
            submitter.user_id.to_string().into(),
            submitter.handle().into(),
            submitter.phone().into(),
            timestamp.format(TIMESTAMP_FORMAT).to_string().into()
        ])
    }

    pub fn cells(&self) -> &[Cell] {
        &self.0
    }
}
