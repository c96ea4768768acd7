use crate::types::UserId;

pub const MISSING_FIELD_PLACEHOLDER: &str = "-";

/// Identity of the chat user who sends a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitter {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub phone_number: Option<String>
}

impl Submitter {
    pub fn new(user_id: UserId, first_name: impl Into<String>) -> Self {
        Self {
            user_id,
            first_name: first_name.into(),
            last_name: None,
            username: None,
            phone_number: None
        }
    }

    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last_name) => format!("{} {}", self.first_name, last_name),
            None => self.first_name.clone()
        }
    }

    pub fn handle(&self) -> &str {
        self.username.as_deref().unwrap_or(MISSING_FIELD_PLACEHOLDER)
    }

    pub fn phone(&self) -> &str {
        self.phone_number.as_deref().unwrap_or(MISSING_FIELD_PLACEHOLDER)
    }
}
