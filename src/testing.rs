//! In-memory doubles for the transport and the row sink.

use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::Notify;

use crate::models::{Inbound, Event, Keyboard, Purchase, SubmissionRow, Submitter};
use crate::sink::{RowSink, SinkError};
use crate::transport::{Transport, TransportError};
use crate::types::{MessageId, PurchaseDate, SessionId};

/// RSA key used to sign token requests against local Google stand-ins.
pub const SERVICE_ACCOUNT_KEY: &str = include_str!("../tests/fixtures/service_account_key.pem");

pub fn sample_submitter() -> Submitter {
    let mut submitter = Submitter::new(42, "Ivan");
    submitter.last_name = Some("Petrov".to_string());
    submitter
}

pub fn sample_purchase() -> Purchase {
    Purchase {
        date: PurchaseDate::from_str("02.06.2025").unwrap(),
        seller: "Рынок".to_string(),
        description: "Яблоки".to_string(),
        price: Decimal::from_str("12.5").unwrap(),
        unit: "кг".to_string(),
        quantity: Decimal::from(4),
        total: Decimal::from(50),
        note: "–".to_string()
    }
}

pub fn text(session_id: SessionId, value: &str) -> Inbound {
    Inbound {
        session_id,
        sender: Submitter::new(session_id.user_id, "Ivan"),
        event: Event::Text(value.to_string())
    }
}

pub fn command(session_id: SessionId, name: &str) -> Inbound {
    Inbound {
        session_id,
        sender: Submitter::new(session_id.user_id, "Ivan"),
        event: Event::Command(name.to_string())
    }
}

pub fn button(session_id: SessionId, data: &str) -> Inbound {
    Inbound {
        session_id,
        sender: Submitter::new(session_id.user_id, "Ivan"),
        event: Event::Button { callback_id: format!("cb-{data}"), message_id: Some(100), data: data.to_string() }
    }
}

/// Every input that takes a session from the start through the summary.
pub fn full_entry(session_id: SessionId) -> Vec<Inbound> {
    let mut events = vec![command(session_id, "start")];
    events.extend(["02.06.2025", "Рынок", "Яблоки", "12,5", "кг", "4", "–"].map(|value| text(session_id, value)));
    events
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent { session_id: SessionId, text: String, keyboard: Option<Keyboard> },
    Edited { session_id: SessionId, message_id: MessageId, text: String, keyboard: Option<Keyboard> },
    Acknowledged { callback_id: String }
}

#[derive(Default)]
pub struct RecordingTransport {
    deliveries: Mutex<Vec<Delivery>>,
    delivered: Notify
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().unwrap().clone()
    }

    pub fn texts_for(&self, session_id: SessionId) -> Vec<String> {
        self.deliveries().into_iter().filter_map(|delivery| match delivery {
            Delivery::Sent { session_id: id, text, .. } | Delivery::Edited { session_id: id, text, .. } if id == session_id => Some(text),
            _ => None
        }).collect()
    }

    /// Waits until at least `count` messages were sent or edited.
    pub async fn wait_for_texts(&self, count: usize) {
        let wait = async {
            loop {
                let notified = self.delivered.notified();
                let texts = self.deliveries().iter().filter(|delivery| !matches!(delivery, Delivery::Acknowledged { .. })).count();
                if texts >= count {
                    return;
                }
                notified.await;
            }
        };

        tokio::time::timeout(Duration::from_secs(5), wait).await.unwrap();
    }

    fn record(&self, delivery: Delivery) {
        self.deliveries.lock().unwrap().push(delivery);
        self.delivered.notify_waiters();
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_text(&self, session_id: SessionId, text: &str, keyboard: Option<&Keyboard>) -> Result<MessageId, TransportError> {
        self.record(Delivery::Sent { session_id, text: text.to_string(), keyboard: keyboard.cloned() });
        Ok(1)
    }

    async fn edit_message(&self, session_id: SessionId, message_id: MessageId, text: &str, keyboard: Option<&Keyboard>) -> Result<(), TransportError> {
        self.record(Delivery::Edited { session_id, message_id, text: text.to_string(), keyboard: keyboard.cloned() });
        Ok(())
    }

    async fn acknowledge(&self, callback_id: &str) -> Result<(), TransportError> {
        self.record(Delivery::Acknowledged { callback_id: callback_id.to_string() });
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSink {
    rows: Arc<Mutex<Vec<SubmissionRow>>>
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> Vec<SubmissionRow> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl RowSink for RecordingSink {
    async fn append_row(&self, row: &SubmissionRow) -> Result<(), SinkError> {
        self.rows.lock().unwrap().push(row.clone());
        Ok(())
    }
}

pub struct FailingSink;

#[async_trait]
impl RowSink for FailingSink {
    async fn append_row(&self, _row: &SubmissionRow) -> Result<(), SinkError> {
        Err(SinkError::Api { endpoint: "values append", status: 503, body: "quota exceeded".to_string() })
    }
}
