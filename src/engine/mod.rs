mod bot_engine;

pub use bot_engine::{BotContext, BotEngine};
