//! File-backed subscription store.
//!
//! One JSON object mapping chat id (as a string) to an array of pair
//! codes. The whole file is read once at startup and rewritten in full
//! after each mutation.

use sentiment_core::{ChatId, Symbol};
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("subscription file I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("subscription file format error: {0}")]
    Format(#[from] serde_json::Error),
}

/// Per-chat symbol subscriptions, persisted to a flat JSON file.
#[derive(Debug)]
pub struct SubscriptionStore {
    path: PathBuf,
    subs: BTreeMap<ChatId, BTreeSet<Symbol>>,
}

impl SubscriptionStore {
    /// Load subscriptions from `path`. A missing file yields an empty
    /// store; entries that do not parse as chat ids or valid symbols are
    /// dropped with a warning.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(Self {
                    path,
                    subs: BTreeMap::new(),
                })
            }
            Err(err) => return Err(err.into()),
        };

        if raw.trim().is_empty() {
            return Ok(Self {
                path,
                subs: BTreeMap::new(),
            });
        }

        let parsed: BTreeMap<String, Vec<String>> = serde_json::from_str(&raw)?;
        let mut subs = BTreeMap::new();
        for (chat, codes) in parsed {
            let chat_id: ChatId = match chat.parse() {
                Ok(id) => id,
                Err(_) => {
                    warn!(chat = %chat, "dropping subscription entry with bad chat id");
                    continue;
                }
            };
            let mut set = BTreeSet::new();
            for code in codes {
                match Symbol::new(&code) {
                    Ok(symbol) => {
                        set.insert(symbol);
                    }
                    Err(err) => {
                        warn!(chat_id, code = %code, error = %err, "dropping bad symbol");
                    }
                }
            }
            subs.insert(chat_id, set);
        }

        Ok(Self { path, subs })
    }

    /// Rewrite the whole file from the in-memory state.
    pub fn save(&self) -> Result<(), StoreError> {
        let out: BTreeMap<String, Vec<&str>> = self
            .subs
            .iter()
            .map(|(chat, set)| {
                (
                    chat.to_string(),
                    set.iter().map(|s| s.as_str()).collect(),
                )
            })
            .collect();
        let raw = serde_json::to_string_pretty(&out)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }

    /// Add a symbol to a chat's set. Returns false when already present.
    pub fn add(&mut self, chat_id: ChatId, symbol: Symbol) -> bool {
        self.subs.entry(chat_id).or_default().insert(symbol)
    }

    /// Remove a symbol from a chat's set. Returns false when absent.
    pub fn remove(&mut self, chat_id: ChatId, symbol: &Symbol) -> bool {
        self.subs
            .get_mut(&chat_id)
            .map(|set| set.remove(symbol))
            .unwrap_or(false)
    }

    /// A chat's current subscriptions, empty when the chat is unknown.
    pub fn symbols_for(&self, chat_id: ChatId) -> Vec<Symbol> {
        self.subs
            .get(&chat_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Iterate over all (chat, subscription set) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (ChatId, &BTreeSet<Symbol>)> {
        self.subs.iter().map(|(chat, set)| (*chat, set))
    }

    pub fn is_empty(&self) -> bool {
        self.subs.values().all(|set| set.is_empty())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sym(code: &str) -> Symbol {
        Symbol::new(code).unwrap()
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SubscriptionStore::load(dir.path().join("subs.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subs.json");

        let mut store = SubscriptionStore::load(&path).unwrap();
        assert!(store.add(42, sym("EURUSD")));
        assert!(store.add(42, sym("GBPUSD")));
        assert!(store.add(7, sym("USDJPY")));
        store.save().unwrap();

        let reloaded = SubscriptionStore::load(&path).unwrap();
        assert_eq!(reloaded.symbols_for(42), vec![sym("EURUSD"), sym("GBPUSD")]);
        assert_eq!(reloaded.symbols_for(7), vec![sym("USDJPY")]);
    }

    #[test]
    fn test_add_then_remove_restores_prior_set() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SubscriptionStore::load(dir.path().join("subs.json")).unwrap();
        store.add(1, sym("EURUSD"));
        let before = store.symbols_for(1);

        assert!(store.add(1, sym("NZDUSD")));
        assert!(store.remove(1, &sym("NZDUSD")));
        assert_eq!(store.symbols_for(1), before);
    }

    #[test]
    fn test_duplicate_add_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SubscriptionStore::load(dir.path().join("subs.json")).unwrap();
        assert!(store.add(1, sym("EURUSD")));
        assert!(!store.add(1, sym("EURUSD")));
        assert_eq!(store.symbols_for(1).len(), 1);
    }

    #[test]
    fn test_remove_unknown_chat_is_false() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SubscriptionStore::load(dir.path().join("subs.json")).unwrap();
        assert!(!store.remove(99, &sym("EURUSD")));
    }

    #[test]
    fn test_load_drops_malformed_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subs.json");
        std::fs::write(
            &path,
            r#"{"42": ["EURUSD", "BAD", "EUR/US"], "not-a-chat": ["GBPUSD"]}"#,
        )
        .unwrap();

        let store = SubscriptionStore::load(&path).unwrap();
        assert_eq!(store.symbols_for(42), vec![sym("EURUSD")]);
        assert_eq!(store.iter().count(), 1);
    }
}
