use std::str::FromStr;

use crate::models::Submitter;
use crate::types::{MessageId, SessionId};

/// Inline button tokens used during confirmation.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Action {
    Confirm,
    Cancel,
    Again,
    Exit
}

impl Action {
    pub fn token(&self) -> &'static str {
        match self {
            Action::Confirm => "confirm",
            Action::Cancel => "cancel",
            Action::Again => "again",
            Action::Exit => "exit"
        }
    }
}

impl FromStr for Action {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "confirm" => Ok(Action::Confirm),
            "cancel" => Ok(Action::Cancel),
            "again" => Ok(Action::Again),
            "exit" => Ok(Action::Exit),
            _ => Err(())
        }
    }
}

/// What the user did, independent of the chat transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Plain text, including reply keyboard presses.
    Text(String),
    /// Inline button press. `message_id` is the message carrying the button.
    Button {
        callback_id: String,
        message_id: Option<MessageId>,
        data: String
    },
    /// `/name` command, without the slash and any `@bot` suffix.
    Command(String)
}

/// A single inbound event routed to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub session_id: SessionId,
    pub sender: Submitter,
    pub event: Event
}
