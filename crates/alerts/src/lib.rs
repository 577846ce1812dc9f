//! Telegram alerting for sentiment threshold crossings.
//!
//! This crate provides:
//! - JSON-file subscription storage per chat
//! - Transition detection over classified sentiment states
//! - A raw Telegram Bot API client (sendMessage / getUpdates)
//! - Inbound command parsing and routing

pub mod commands;
pub mod engine;
pub mod message;
pub mod store;
pub mod telegram;

pub use commands::{handle_command, Command, KnownPairs};
pub use engine::{AlertEngine, SentimentAlert};
pub use message::format_alert;
pub use store::{StoreError, SubscriptionStore};
pub use telegram::{next_offset, InboundMessage, TelegramClient, TelegramError};
