mod errors;
mod telegram;
#[cfg(test)]
mod tests;
mod update;

use async_trait::async_trait;

use crate::models::Keyboard;
use crate::types::{MessageId, SessionId};

pub use errors::TransportError;
pub use telegram::TelegramClient;
pub use update::Update;

/// Outbound half of the chat gateway.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Sends a new message to the session's chat and returns its id.
    async fn send_text(&self, session_id: SessionId, text: &str, keyboard: Option<&Keyboard>) -> Result<MessageId, TransportError>;

    /// Replaces the text and inline buttons of an earlier message.
    async fn edit_message(&self, session_id: SessionId, message_id: MessageId, text: &str, keyboard: Option<&Keyboard>) -> Result<(), TransportError>;

    /// Tells the client a button press was received.
    async fn acknowledge(&self, callback_id: &str) -> Result<(), TransportError>;
}

#[async_trait]
impl<T: Transport> Transport for std::sync::Arc<T> {
    async fn send_text(&self, session_id: SessionId, text: &str, keyboard: Option<&Keyboard>) -> Result<MessageId, TransportError> {
        (**self).send_text(session_id, text, keyboard).await
    }

    async fn edit_message(&self, session_id: SessionId, message_id: MessageId, text: &str, keyboard: Option<&Keyboard>) -> Result<(), TransportError> {
        (**self).edit_message(session_id, message_id, text, keyboard).await
    }

    async fn acknowledge(&self, callback_id: &str) -> Result<(), TransportError> {
        (**self).acknowledge(callback_id).await
    }
}
