//! Myfxbook community outlook provider.
//!
//! This crate provides:
//! - Session login with lazy re-authentication
//! - Outlook snapshot fetching with per-entry tolerant decoding

pub mod error;
pub mod myfxbook;

pub use error::ProviderError;
pub use myfxbook::MyfxbookClient;
