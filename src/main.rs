mod actors;
mod config;
mod engine;
mod health;
mod models;
mod sink;
mod storage;
#[cfg(test)]
mod testing;
mod transport;
mod types;

use std::io::stderr;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tokio::signal;
use tokio::task::JoinError;
use tracing::level_filters::LevelFilter;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use crate::config::Config;
use crate::engine::{BotContext, BotEngine};
use crate::sink::GoogleSheetsSink;
use crate::transport::TelegramClient;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    setup_logging(config.log_level);

    info!("Starting purchase ledger bot");

    let telegram = Arc::new(
        TelegramClient::connect(&config.telegram_api_url, &config.bot_token, config.poll_timeout)
            .await
            .context("Failed to connect to Telegram")?
    );

    let sink = GoogleSheetsSink::connect(
        config.credentials.clone(),
        config.google_endpoints.clone(),
        config.spreadsheet.clone(),
        config.worksheet.clone()
    )
        .await
        .context("Failed to connect to the spreadsheet")?;

    let context = Arc::new(BotContext::new(telegram.clone(), sink));
    let engine = BotEngine::new(context).with_idle_timeout(config.session_idle_timeout);
    let (sender, receiver) = engine.channel();

    //NOTE: The liveness endpoint and the conversation engine share nothing and are supervised separately
    let mut health = tokio::spawn(health::serve(SocketAddr::from(([0, 0, 0, 0], config.port))));
    let mut poller = tokio::spawn(telegram.poll_updates(sender));
    let mut dispatcher = tokio::spawn(async move { engine.run(receiver).await });

    //NOTE: Only a requested shutdown is a clean exit
    let outcome = tokio::select! {
        result = &mut health => Err(stopped("Liveness endpoint", result)),
        result = &mut dispatcher => Err(stopped("Dispatcher", result)),
        _ = signal::ctrl_c() => {
            info!("Shutdown requested");
            Ok(())
        }
    };

    //NOTE: Stopping the poller closes the channel, which lets the dispatcher drain every session
    poller.abort();
    let _ = (&mut poller).await;

    if !dispatcher.is_finished() {
        match dispatcher.await {
            Ok(Ok(())) => {}
            Ok(Err(error)) => error!("Dispatcher failed during shutdown: {error}"),
            Err(error) => error!("Dispatcher task failed during shutdown: {error}")
        }
    }

    health.abort();

    match &outcome {
        Ok(()) => info!("Stopped"),
        Err(error) => error!("Stopped unexpectedly: {error:#}")
    }

    outcome
}

fn stopped(task: &str, result: Result<Result<()>, JoinError>) -> anyhow::Error {
    match result {
        Ok(Ok(())) => anyhow!("{task} stopped unexpectedly"),
        Ok(Err(error)) => error.context(format!("{task} failed")),
        Err(error) => anyhow!(error).context(format!("{task} task failed"))
    }
}

fn setup_logging(level: LevelFilter) {
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry()
        .with(terminal_log)
        .init();
}
