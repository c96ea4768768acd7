use super::telegram::ReplyMarkup;
use super::{TelegramClient, Transport, TransportError, Update};
use crate::models::{prompts, Event, Submitter};
use crate::types::SessionId;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;

const BOT_USERNAME: &str = "LevkinBot";

fn parse(value: serde_json::Value) -> Result<Update> {
    Ok(serde_json::from_value(value)?)
}

#[test]
fn test_text_message_becomes_text_event() -> Result<()> {
    let update = parse(json!({
        "update_id": 10,
        "message": {
            "message_id": 5,
            "chat": { "id": -100, "type": "group" },
            "from": { "id": 42, "is_bot": false, "first_name": "Ivan", "last_name": "Petrov", "username": "ivan" },
            "date": 1717315200,
            "text": "02.06.2025"
        }
    }))?;

    let inbound = update.into_inbound(BOT_USERNAME).ok_or_else(|| anyhow!("text update was dropped"))?;

    assert_eq!(inbound.session_id, SessionId::new(-100, 42));
    assert_eq!(inbound.event, Event::Text("02.06.2025".to_string()));
    assert_eq!(inbound.sender.full_name(), "Ivan Petrov");
    assert_eq!(inbound.sender.handle(), "ivan");
    assert_eq!(inbound.sender.phone(), "-");

    Ok(())
}

#[test]
fn test_commands_drop_slash_bot_suffix_and_arguments() -> Result<()> {
    let test_cases = [("/start", "start"), ("/cancel@LevkinBot", "cancel"), ("/start now", "start")];

    for (text, expected) in test_cases {
        let update = parse(json!({
            "update_id": 1,
            "message": { "message_id": 1, "chat": { "id": 1 }, "from": { "id": 1, "first_name": "A" }, "text": text }
        }))?;

        let inbound = update.into_inbound(BOT_USERNAME).ok_or_else(|| anyhow!("command update was dropped"))?;

        assert_eq!(inbound.event, Event::Command(expected.to_string()));
    }

    Ok(())
}

#[test]
fn test_commands_addressed_to_other_bots_are_skipped() -> Result<()> {
    let test_cases = [("/start@OtherBot", false), ("/cancel@levkinbot", true), ("/start@LevkinBot now", true)];

    for (text, delivered) in test_cases {
        let update = parse(json!({
            "update_id": 1,
            "message": { "message_id": 1, "chat": { "id": 1 }, "from": { "id": 1, "first_name": "A" }, "text": text }
        }))?;

        assert_eq!(update.into_inbound(BOT_USERNAME).is_some(), delivered, "text: {text:?}");
    }

    Ok(())
}

#[test]
fn test_lone_slash_stays_text() -> Result<()> {
    let update = parse(json!({
        "update_id": 1,
        "message": { "message_id": 1, "chat": { "id": 1 }, "from": { "id": 1, "first_name": "A" }, "text": "/" }
    }))?;

    let inbound = update.into_inbound(BOT_USERNAME).ok_or_else(|| anyhow!("update was dropped"))?;

    assert_eq!(inbound.event, Event::Text("/".to_string()));

    Ok(())
}

#[test]
fn test_callback_query_becomes_button_event() -> Result<()> {
    let update = parse(json!({
        "update_id": 11,
        "callback_query": {
            "id": "cb-1",
            "from": { "id": 42, "first_name": "Ivan" },
            "message": { "message_id": 9, "chat": { "id": 42 }, "text": "📋 Проверьте данные:" },
            "chat_instance": "x",
            "data": "confirm"
        }
    }))?;

    let inbound = update.into_inbound(BOT_USERNAME).ok_or_else(|| anyhow!("callback update was dropped"))?;

    assert_eq!(inbound.session_id, SessionId::new(42, 42));
    assert_eq!(inbound.sender, Submitter::new(42, "Ivan"));
    assert_eq!(inbound.event, Event::Button {
        callback_id: "cb-1".to_string(),
        message_id: Some(9),
        data: "confirm".to_string()
    });

    Ok(())
}

#[test]
fn test_updates_without_dialogue_content_are_skipped() -> Result<()> {
    let photo = parse(json!({
        "update_id": 1,
        "message": { "message_id": 1, "chat": { "id": 1 }, "from": { "id": 1, "first_name": "A" }, "photo": [] }
    }))?;
    let channel_post = parse(json!({
        "update_id": 2,
        "message": { "message_id": 1, "chat": { "id": 1 }, "text": "hi" }
    }))?;
    let inline_callback = parse(json!({
        "update_id": 3,
        "callback_query": { "id": "cb", "from": { "id": 1, "first_name": "A" }, "data": "confirm" }
    }))?;
    let edited = parse(json!({ "update_id": 4 }))?;

    assert!(photo.into_inbound(BOT_USERNAME).is_none());
    assert!(channel_post.into_inbound(BOT_USERNAME).is_none());
    assert!(inline_callback.into_inbound(BOT_USERNAME).is_none());
    assert!(edited.into_inbound(BOT_USERNAME).is_none());

    Ok(())
}

#[test]
fn test_reply_keyboard_serializes_as_resized_single_row() -> Result<()> {
    let keyboard = prompts::main_keyboard();

    let markup = serde_json::to_value(ReplyMarkup::from(&keyboard))?;

    assert_eq!(markup, json!({
        "keyboard": [[{ "text": "➕ Новая запись" }, { "text": "❌ Отмена" }]],
        "resize_keyboard": true
    }));

    Ok(())
}

#[test]
fn test_inline_keyboard_serializes_action_tokens() -> Result<()> {
    let keyboard = prompts::continue_keyboard();

    let markup = serde_json::to_value(ReplyMarkup::from(&keyboard))?;

    assert_eq!(markup, json!({
        "inline_keyboard": [[
            { "text": "➕ Да", "callback_data": "again" },
            { "text": "❌ Нет", "callback_data": "exit" }
        ]]
    }));

    Ok(())
}

/// Stand-in for the Bot API of the bot with token `TEST`.
#[derive(Default)]
struct TelegramStub {
    offsets: Mutex<Vec<i64>>,
    polls: AtomicUsize,
    sent: Mutex<Vec<Value>>
}

fn text_update(update_id: i64, text: &str) -> Value {
    json!({
        "update_id": update_id,
        "message": { "message_id": update_id, "chat": { "id": 1 }, "from": { "id": 1, "first_name": "A" }, "text": text }
    })
}

async fn get_me() -> Json<Value> {
    Json(json!({ "ok": true, "result": { "id": 7, "is_bot": true, "first_name": "Ledger", "username": "LevkinBot" } }))
}

async fn get_updates(State(stub): State<Arc<TelegramStub>>, Json(body): Json<Value>) -> Json<Value> {
    stub.offsets.lock().unwrap().push(body["offset"].as_i64().unwrap_or(-1));

    let result = match stub.polls.fetch_add(1, Ordering::SeqCst) {
        0 => json!([
            text_update(5, "a"),
            text_update(6, "/start@OtherBot"),
            { "update_id": 7, "message": { "message_id": 7, "chat": { "id": 1 }, "from": { "id": 1, "first_name": "A" }, "photo": [] } }
        ]),
        1 => json!([text_update(8, "b")]),
        _ => json!([text_update(9, "c")])
    };

    Json(json!({ "ok": true, "result": result }))
}

async fn send_message(State(stub): State<Arc<TelegramStub>>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let chat_id = body["chat_id"].as_i64();
    stub.sent.lock().unwrap().push(body);

    if chat_id == Some(404) {
        return (StatusCode::BAD_REQUEST, Json(json!({ "ok": false, "error_code": 400, "description": "Bad Request: chat not found" })));
    }

    (StatusCode::OK, Json(json!({ "ok": true, "result": { "message_id": 77, "date": 0, "chat": { "id": chat_id } } })))
}

async fn connect_stub(stub: Arc<TelegramStub>) -> Result<TelegramClient> {
    let router = Router::new()
        .route("/botTEST/getMe", post(get_me))
        .route("/botTEST/getUpdates", post(get_updates))
        .route("/botTEST/sendMessage", post(send_message))
        .with_state(stub);

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let base_url = format!("http://{}", listener.local_addr()?);

    tokio::spawn(async move { axum::serve(listener, router).await });

    Ok(TelegramClient::connect(&base_url, "TEST", Duration::ZERO).await?)
}

#[tokio::test]
async fn test_send_text_returns_message_id_and_surfaces_rejections() -> Result<()> {
    let stub = Arc::new(TelegramStub::default());
    let client = connect_stub(stub.clone()).await?;

    let keyboard = prompts::main_keyboard();
    let message_id = client.send_text(SessionId::new(1, 1), prompts::DATE_PROMPT, Some(&keyboard)).await?;

    assert_eq!(message_id, 77);

    let rejected = client.send_text(SessionId::new(404, 1), prompts::DATE_PROMPT, None).await;

    assert!(matches!(
        &rejected,
        Err(TransportError::Api { method: "sendMessage", description }) if description == "Bad Request: chat not found"
    ));

    let sent = stub.sent.lock().unwrap().clone();

    assert_eq!(sent[0]["text"], json!(prompts::DATE_PROMPT));
    assert_eq!(sent[0]["reply_markup"]["resize_keyboard"], json!(true));
    assert!(sent[1].get("reply_markup").is_none());

    Ok(())
}

#[tokio::test]
async fn test_poll_updates_skips_foreign_commands_and_advances_offset() -> Result<()> {
    let stub = Arc::new(TelegramStub::default());
    let client = Arc::new(connect_stub(stub.clone()).await?);
    let (sender, mut receiver) = mpsc::channel(1);

    let poller = tokio::spawn(client.poll_updates(sender));

    let first = timeout(Duration::from_secs(5), receiver.recv()).await?.ok_or_else(|| anyhow!("no first update"))?;
    let second = timeout(Duration::from_secs(5), receiver.recv()).await?.ok_or_else(|| anyhow!("no second update"))?;

    assert_eq!(first.event, Event::Text("a".to_string()));
    assert_eq!(second.event, Event::Text("b".to_string()));

    drop(receiver);
    timeout(Duration::from_secs(5), poller).await??;

    let offsets = stub.offsets.lock().unwrap().clone();

    assert_eq!(&offsets[..3], &[0, 8, 9]);

    Ok(())
}
