use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::models::{Inbound, Keyboard};
use crate::transport::update::User;
use crate::transport::{Transport, TransportError, Update};
use crate::types::{ChatId, MessageId, SessionId};

const RETRY_DELAY: Duration = Duration::from_secs(3);
const ALLOWED_UPDATES: [&str; 2] = ["message", "callback_query"];

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: MessageId
}

#[derive(Debug, Serialize)]
pub(crate) struct KeyboardButton<'a> {
    text: &'a str
}

#[derive(Debug, Serialize)]
pub(crate) struct InlineKeyboardButton<'a> {
    text: &'a str,
    callback_data: &'static str
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum ReplyMarkup<'a> {
    Keyboard {
        keyboard: Vec<Vec<KeyboardButton<'a>>>,
        resize_keyboard: bool
    },
    Inline {
        inline_keyboard: Vec<Vec<InlineKeyboardButton<'a>>>
    }
}

impl<'a> From<&'a Keyboard> for ReplyMarkup<'a> {
    fn from(keyboard: &'a Keyboard) -> Self {
        match keyboard {
            Keyboard::Reply { buttons, resize } => ReplyMarkup::Keyboard {
                keyboard: vec![buttons.iter().map(|label| KeyboardButton { text: label }).collect()],
                resize_keyboard: *resize
            },
            Keyboard::Inline(buttons) => ReplyMarkup::Inline {
                inline_keyboard: vec![buttons.iter()
                    .map(|button| InlineKeyboardButton { text: &button.label, callback_data: button.action.token() })
                    .collect()]
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: ChatId,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<ReplyMarkup<'a>>
}

#[derive(Debug, Serialize)]
struct EditMessageText<'a> {
    chat_id: ChatId,
    message_id: MessageId,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<ReplyMarkup<'a>>
}

#[derive(Debug, Serialize)]
struct AnswerCallbackQuery<'a> {
    callback_query_id: &'a str
}

#[derive(Debug, Serialize)]
struct GetMe {}

#[derive(Debug, Serialize)]
struct GetUpdates {
    offset: i64,
    timeout: u64,
    allowed_updates: [&'static str; 2]
}

/// Bot API client: long polling for updates plus the outbound calls of [`Transport`].
pub struct TelegramClient {
    client: Client,
    endpoint: String,
    poll_timeout: Duration,
    username: String
}

impl TelegramClient {
    /// Builds the client and looks up the bot's own username, which also proves the token works.
    pub async fn connect(api_url: &str, token: &str, poll_timeout: Duration) -> Result<Self, TransportError> {
        //NOTE: The HTTP timeout must outlive the long poll itself
        let client = Client::builder()
            .timeout(poll_timeout + Duration::from_secs(10))
            .build()?;

        let mut telegram = Self {
            client,
            endpoint: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
            poll_timeout,
            username: String::new()
        };

        let me: User = telegram.call("getMe", &GetMe {}).await?;
        telegram.username = me.username.ok_or(TransportError::MissingResult("getMe"))?;

        info!("Connected to Telegram as [@{}]", telegram.username);

        Ok(telegram)
    }

    async fn call<P, R>(&self, method: &'static str, params: &P) -> Result<R, TransportError>
    where
        P: Serialize + Sync,
        R: DeserializeOwned
    {
        let response: ApiResponse<R> = self.client.post(format!("{}/{}", self.endpoint, method))
            .json(params)
            .send()
            .await?
            .json()
            .await?;

        if !response.ok {
            return Err(TransportError::Api {
                method,
                description: response.description.unwrap_or_default()
            });
        }

        response.result.ok_or(TransportError::MissingResult(method))
    }

    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, TransportError> {
        let params = GetUpdates {
            offset,
            timeout: self.poll_timeout.as_secs(),
            allowed_updates: ALLOWED_UPDATES
        };

        self.call("getUpdates", &params).await
    }

    /// Feeds every usable update into `sender` until the receiving side closes.
    ///
    /// Polling failures are logged and retried after a short pause.
    pub async fn poll_updates(self: Arc<Self>, sender: mpsc::Sender<Inbound>) {
        let mut offset = 0;

        info!("Polling for updates");

        loop {
            let updates = match self.get_updates(offset).await {
                Ok(updates) => updates,
                Err(error) => {
                    warn!("Polling for updates failed: {error}");
                    sleep(RETRY_DELAY).await;
                    continue;
                }
            };

            for update in updates {
                let update_id = update.update_id;
                offset = offset.max(update_id + 1);

                let Some(inbound) = update.into_inbound(&self.username) else {
                    debug!("Skipping update [{update_id}] without a dialogue event");
                    continue;
                };

                if sender.send(inbound).await.is_err() {
                    info!("Update receiver closed, polling stopped");
                    return;
                }
            }
        }
    }
}

#[async_trait]
impl Transport for TelegramClient {
    async fn send_text(&self, session_id: SessionId, text: &str, keyboard: Option<&Keyboard>) -> Result<MessageId, TransportError> {
        let params = SendMessage {
            chat_id: session_id.chat_id,
            text,
            reply_markup: keyboard.map(ReplyMarkup::from)
        };

        let sent: SentMessage = self.call("sendMessage", &params).await?;

        Ok(sent.message_id)
    }

    async fn edit_message(&self, session_id: SessionId, message_id: MessageId, text: &str, keyboard: Option<&Keyboard>) -> Result<(), TransportError> {
        //NOTE: Edited messages can only carry inline buttons
        let reply_markup = keyboard
            .filter(|keyboard| matches!(keyboard, Keyboard::Inline(_)))
            .map(ReplyMarkup::from);

        let params = EditMessageText {
            chat_id: session_id.chat_id,
            message_id,
            text,
            reply_markup
        };

        let _: serde_json::Value = self.call("editMessageText", &params).await?;

        Ok(())
    }

    async fn acknowledge(&self, callback_id: &str) -> Result<(), TransportError> {
        let params = AnswerCallbackQuery { callback_query_id: callback_id };

        let _: bool = self.call("answerCallbackQuery", &params).await?;

        Ok(())
    }
}
