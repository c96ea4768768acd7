use serde::Deserialize;

use crate::models::{Event, Inbound, Submitter};
use crate::types::{ChatId, MessageId, SessionId, UserId};

/// A Bot API update, reduced to the parts the dialogue reacts to.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: MessageId,
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: ChatId
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<Message>,
    pub data: Option<String>
}

impl From<User> for Submitter {
    //NOTE: The Bot API never exposes a user's phone number on updates, so it stays empty
    fn from(user: User) -> Self {
        Submitter {
            user_id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
            phone_number: None
        }
    }
}

impl Update {
    /// Converts the update into a dialogue event.
    ///
    /// Returns `None` for updates without a sender or without text, such as
    /// channel posts, photos or inline-mode callbacks, and for commands
    /// addressed to a bot other than `bot_username`.
    pub fn into_inbound(self, bot_username: &str) -> Option<Inbound> {
        if let Some(query) = self.callback_query {
            let message = query.message?;

            return Some(Inbound {
                session_id: SessionId::new(message.chat.id, query.from.id),
                event: Event::Button {
                    callback_id: query.id,
                    message_id: Some(message.message_id),
                    data: query.data.unwrap_or_default()
                },
                sender: query.from.into()
            });
        }

        let message = self.message?;
        let from = message.from?;
        let event = parse_text(message.text?, bot_username)?;

        Some(Inbound {
            session_id: SessionId::new(message.chat.id, from.id),
            event,
            sender: from.into()
        })
    }
}

/// `/start@SomeBot args` becomes `Command("start")`; anything else is text.
fn parse_text(text: String, bot_username: &str) -> Option<Event> {
    let Some(command) = text.strip_prefix('/') else {
        return Some(Event::Text(text));
    };

    let word = command.split_whitespace().next().unwrap_or_default();
    let (name, addressee) = match word.split_once('@') {
        Some((name, addressee)) => (name, Some(addressee)),
        None => (word, None)
    };

    if name.is_empty() {
        return Some(Event::Text(text));
    }

    //NOTE: Usernames are case insensitive
    if addressee.is_some_and(|addressee| !addressee.eq_ignore_ascii_case(bot_username)) {
        return None;
    }

    Some(Event::Command(name.to_string()))
}
