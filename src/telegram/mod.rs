pub mod client;
pub mod commands;

pub use client::{TelegramClient, TelegramError};
pub use commands::{decision_reply, new_request_alert, parse_command, ModerationCommand};
