use crate::models::Action;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub action: Action
}

impl InlineButton {
    pub fn new(label: &str, action: Action) -> Self {
        Self { label: label.to_string(), action }
    }
}

/// Buttons attached to an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    /// Persistent keyboard whose buttons send their label as text.
    Reply {
        buttons: Vec<String>,
        resize: bool
    },
    /// Buttons attached to the message itself, reporting an action token.
    Inline(Vec<InlineButton>)
}

/// An outgoing message produced by a dialogue step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Send {
        text: String,
        keyboard: Option<Keyboard>
    },
    /// Replaces the message whose button triggered the step.
    Edit {
        text: String,
        keyboard: Option<Keyboard>
    }
}

impl Reply {
    pub fn send(text: impl Into<String>) -> Self {
        Reply::Send { text: text.into(), keyboard: None }
    }

    pub fn edit(text: impl Into<String>) -> Self {
        Reply::Edit { text: text.into(), keyboard: None }
    }

    pub fn with_keyboard(self, keyboard: Keyboard) -> Self {
        match self {
            Reply::Send { text, .. } => Reply::Send { text, keyboard: Some(keyboard) },
            Reply::Edit { text, .. } => Reply::Edit { text, keyboard: Some(keyboard) }
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Reply::Send { text, .. } | Reply::Edit { text, .. } => text
        }
    }

    pub fn keyboard(&self) -> Option<&Keyboard> {
        match self {
            Reply::Send { keyboard, .. } | Reply::Edit { keyboard, .. } => keyboard.as_ref()
        }
    }
}
