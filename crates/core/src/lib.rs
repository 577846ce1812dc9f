//! Core data types for the sentiment alert bot.

pub mod snapshot;
pub mod state;
pub mod symbol;

pub use snapshot::*;
pub use state::*;
pub use symbol::*;

/// Telegram chat identifier, the recipient namespace for notifications.
pub type ChatId = i64;
