mod decimal;
mod errors;
mod purchase_date;

pub use decimal::{parse_decimal, round_total};
pub use errors::ValidationError;
pub use purchase_date::PurchaseDate;

pub type ChatId = i64;
pub type UserId = u64;
pub type MessageId = i64;

/// Key of a single user's dialogue inside a single chat.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct SessionId {
    pub chat_id: ChatId,
    pub user_id: UserId
}

impl SessionId {
    pub fn new(chat_id: ChatId, user_id: UserId) -> Self {
        Self { chat_id, user_id }
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}:{}", self.chat_id, self.user_id)
    }
}
