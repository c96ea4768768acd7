use rust_decimal::Decimal;

use crate::types::PurchaseDate;

/// In-progress purchase captured field by field, in dialogue order.
///
/// `total` is derived once when the note is captured and is never recomputed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionRecord {
    pub date: Option<PurchaseDate>,
    pub seller: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub unit: Option<String>,
    pub quantity: Option<Decimal>,
    pub total: Option<Decimal>,
    pub note: Option<String>
}

impl SessionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Returns the finished purchase once every field, `total` included, is present.
    pub fn to_purchase(&self) -> Option<Purchase> {
        Some(Purchase {
            date: self.date?,
            seller: self.seller.clone()?,
            description: self.description.clone()?,
            price: self.price?,
            unit: self.unit.clone()?,
            quantity: self.quantity?,
            total: self.total?,
            note: self.note.clone()?
        })
    }
}

/// A fully captured purchase, ready for confirmation and submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Purchase {
    pub date: PurchaseDate,
    pub seller: String,
    pub description: String,
    pub price: Decimal,
    pub unit: String,
    pub quantity: Decimal,
    pub total: Decimal,
    pub note: String
}
