//! Currency pair symbols and the known-pair table.

use compact_str::CompactString;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Pairs the bot knows about, with their flag decorations for `/pairs`.
pub const KNOWN_PAIRS: &[(&str, &str)] = &[
    ("EURUSD", "\u{1F1EA}\u{1F1FA}\u{1F1FA}\u{1F1F8}"),
    ("GBPUSD", "\u{1F1EC}\u{1F1E7}\u{1F1FA}\u{1F1F8}"),
    ("USDJPY", "\u{1F1FA}\u{1F1F8}\u{1F1EF}\u{1F1F5}"),
    ("AUDUSD", "\u{1F1E6}\u{1F1FA}\u{1F1FA}\u{1F1F8}"),
    ("USDCAD", "\u{1F1FA}\u{1F1F8}\u{1F1E8}\u{1F1E6}"),
    ("USDCHF", "\u{1F1FA}\u{1F1F8}\u{1F1E8}\u{1F1ED}"),
    ("NZDUSD", "\u{1F1F3}\u{1F1FF}\u{1F1FA}\u{1F1F8}"),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SymbolError {
    #[error("symbol must be exactly 6 characters: {0}")]
    BadLength(String),
    #[error("symbol must be ASCII alphabetic: {0}")]
    NonAlphabetic(String),
}

/// A 6-letter currency pair code (e.g., "EURUSD"), always uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Symbol(CompactString);

impl Symbol {
    /// Validate and normalize a pair code. Input is uppercased.
    pub fn new(code: &str) -> Result<Self, SymbolError> {
        let code = code.trim();
        if code.len() != 6 {
            return Err(SymbolError::BadLength(code.to_string()));
        }
        if !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(SymbolError::NonAlphabetic(code.to_string()));
        }
        Ok(Self(CompactString::new(code.to_ascii_uppercase())))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Flag decoration from the known-pair table, empty for unlisted pairs.
    pub fn flag(&self) -> &'static str {
        KNOWN_PAIRS
            .iter()
            .find(|(code, _)| *code == self.as_str())
            .map(|(_, flag)| *flag)
            .unwrap_or("")
    }

    /// Whether this pair appears in the known-pair table.
    pub fn is_known(&self) -> bool {
        KNOWN_PAIRS.iter().any(|(code, _)| *code == self.as_str())
    }
}

impl FromStr for Symbol {
    type Err = SymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Symbol::new(s)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
