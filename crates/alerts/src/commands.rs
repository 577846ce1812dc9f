//! Inbound command parsing and routing.
//!
//! The first whitespace-delimited token selects the command
//! (case-insensitive); an optional second token is the symbol argument,
//! uppercased before use. Unknown symbols are rejected outright rather
//! than subscribed speculatively, matching the known-pair validation of
//! `/pairs`.

use crate::store::{StoreError, SubscriptionStore};
use sentiment_core::{ChatId, Symbol, KNOWN_PAIRS};
use std::collections::BTreeSet;

const USAGE: &str = "Commands:\n\
    /pairs - list available pairs\n\
    /add <PAIR> - subscribe to a pair\n\
    /remove <PAIR> - unsubscribe from a pair\n\
    /mylist - show your subscriptions";

/// A parsed inbound command. Argument-taking commands keep the raw
/// argument so the router can answer with a usage hint when it is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Pairs,
    Add(Option<String>),
    Remove(Option<String>),
    MyList,
    Help,
}

impl Command {
    /// Parse a message body. Anything unrecognized (including `/start`)
    /// maps to `Help`.
    pub fn parse(text: &str) -> Self {
        let mut tokens = text.split_whitespace();
        let head = match tokens.next() {
            Some(head) => head.to_ascii_lowercase(),
            None => return Command::Help,
        };
        let arg = tokens.next().map(|a| a.to_ascii_uppercase());

        match head.as_str() {
            "/pairs" => Command::Pairs,
            "/add" => Command::Add(arg),
            "/remove" => Command::Remove(arg),
            "/mylist" => Command::MyList,
            _ => Command::Help,
        }
    }
}

/// The set of pairs accepted by `/add` and listed by `/pairs`. Seeded
/// from the static table and widened with whatever the most recent
/// outlook snapshot reported.
#[derive(Debug, Default)]
pub struct KnownPairs {
    set: BTreeSet<Symbol>,
}

impl KnownPairs {
    pub fn from_static() -> Self {
        let set = KNOWN_PAIRS
            .iter()
            .filter_map(|(code, _)| Symbol::new(code).ok())
            .collect();
        Self { set }
    }

    /// Merge symbols seen in a fresh snapshot into the known set.
    pub fn merge<'a>(&mut self, symbols: impl Iterator<Item = &'a Symbol>) {
        self.set.extend(symbols.cloned());
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.set.contains(symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.set.iter()
    }
}

/// Route one inbound message: mutate and persist the store as needed and
/// return the reply text for the sender.
pub fn handle_command(
    store: &mut SubscriptionStore,
    known: &KnownPairs,
    chat_id: ChatId,
    text: &str,
) -> Result<String, StoreError> {
    let reply = match Command::parse(text) {
        Command::Pairs => {
            let lines: Vec<String> = known
                .iter()
                .map(|s| format!("{} {}", s, s.flag()).trim_end().to_string())
                .collect();
            if lines.is_empty() {
                "No pairs known yet".to_string()
            } else {
                lines.join("\n")
            }
        }

        Command::Add(None) => "Usage: /add <PAIR>, e.g. /add EURUSD".to_string(),
        Command::Add(Some(arg)) => match Symbol::new(&arg) {
            Err(_) => format!("Not a valid pair code: {}", arg),
            Ok(symbol) if !known.contains(&symbol) => {
                format!("Unknown pair: {}. See /pairs", symbol)
            }
            Ok(symbol) => {
                if store.add(chat_id, symbol.clone()) {
                    store.save()?;
                    format!("Subscribed to {} {}", symbol, symbol.flag())
                        .trim_end()
                        .to_string()
                } else {
                    format!("Already subscribed to {}", symbol)
                }
            }
        },

        Command::Remove(None) => "Usage: /remove <PAIR>, e.g. /remove EURUSD".to_string(),
        Command::Remove(Some(arg)) => match Symbol::new(&arg) {
            Err(_) => format!("Not a valid pair code: {}", arg),
            Ok(symbol) => {
                if store.remove(chat_id, &symbol) {
                    store.save()?;
                    format!("Removed {}", symbol)
                } else {
                    format!("{} is not in your list", symbol)
                }
            }
        },

        Command::MyList => {
            let symbols = store.symbols_for(chat_id);
            if symbols.is_empty() {
                "Your list is empty. Add pairs with /add <PAIR>".to_string()
            } else {
                symbols
                    .iter()
                    .map(|s| format!("{} {}", s, s.flag()).trim_end().to_string())
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }

        Command::Help => USAGE.to_string(),
    };

    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sym(code: &str) -> Symbol {
        Symbol::new(code).unwrap()
    }

    fn empty_store() -> (tempfile::TempDir, SubscriptionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SubscriptionStore::load(dir.path().join("subs.json")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_parse_is_case_insensitive_and_uppercases_arg() {
        assert_eq!(
            Command::parse("/ADD eurusd"),
            Command::Add(Some("EURUSD".to_string()))
        );
        assert_eq!(Command::parse("/Pairs"), Command::Pairs);
        assert_eq!(Command::parse("/MyList extra tokens"), Command::MyList);
    }

    #[test]
    fn test_parse_unrecognized_and_start_are_help() {
        assert_eq!(Command::parse("/start"), Command::Help);
        assert_eq!(Command::parse("hello bot"), Command::Help);
        assert_eq!(Command::parse("   "), Command::Help);
    }

    #[test]
    fn test_add_and_remove_round_trip() {
        let (_dir, mut store) = empty_store();
        let known = KnownPairs::from_static();

        let reply = handle_command(&mut store, &known, 1, "/add eurusd").unwrap();
        assert!(reply.starts_with("Subscribed to EURUSD"));
        assert_eq!(store.symbols_for(1), vec![sym("EURUSD")]);

        let reply = handle_command(&mut store, &known, 1, "/remove EURUSD").unwrap();
        assert_eq!(reply, "Removed EURUSD");
        assert!(store.symbols_for(1).is_empty());
    }

    #[test]
    fn test_add_persists_to_file() {
        let (_dir, mut store) = empty_store();
        let known = KnownPairs::from_static();
        handle_command(&mut store, &known, 1, "/add GBPUSD").unwrap();

        let reloaded = SubscriptionStore::load(store.path()).unwrap();
        assert_eq!(reloaded.symbols_for(1), vec![sym("GBPUSD")]);
    }

    #[test]
    fn test_add_unknown_pair_rejected_and_not_persisted() {
        // Well-formed 6-letter code, but not in the known-pair set.
        let (_dir, mut store) = empty_store();
        let known = KnownPairs::from_static();

        let reply = handle_command(&mut store, &known, 1, "/add XYZABC").unwrap();
        assert_eq!(reply, "Unknown pair: XYZABC. See /pairs");
        assert!(store.symbols_for(1).is_empty());
        assert!(SubscriptionStore::load(store.path())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_add_malformed_pair_rejected() {
        let (_dir, mut store) = empty_store();
        let known = KnownPairs::from_static();
        let reply = handle_command(&mut store, &known, 1, "/add EUR").unwrap();
        assert_eq!(reply, "Not a valid pair code: EUR");
    }

    #[test]
    fn test_missing_argument_is_usage_without_mutation() {
        let (_dir, mut store) = empty_store();
        let known = KnownPairs::from_static();

        let reply = handle_command(&mut store, &known, 1, "/add").unwrap();
        assert!(reply.starts_with("Usage: /add"));
        let reply = handle_command(&mut store, &known, 1, "/remove").unwrap();
        assert!(reply.starts_with("Usage: /remove"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_when_not_subscribed() {
        let (_dir, mut store) = empty_store();
        let known = KnownPairs::from_static();
        let reply = handle_command(&mut store, &known, 1, "/remove USDJPY").unwrap();
        assert_eq!(reply, "USDJPY is not in your list");
    }

    #[test]
    fn test_mylist_empty_and_populated() {
        let (_dir, mut store) = empty_store();
        let known = KnownPairs::from_static();

        let reply = handle_command(&mut store, &known, 1, "/mylist").unwrap();
        assert!(reply.contains("empty"));

        handle_command(&mut store, &known, 1, "/add EURUSD").unwrap();
        let reply = handle_command(&mut store, &known, 1, "/mylist").unwrap();
        assert!(reply.contains("EURUSD"));
    }

    #[test]
    fn test_pairs_lists_known_set_with_flags() {
        let (_dir, mut store) = empty_store();
        let known = KnownPairs::from_static();
        let reply = handle_command(&mut store, &known, 1, "/pairs").unwrap();
        assert!(reply.contains("EURUSD"));
        assert!(reply.contains("NZDUSD"));
    }

    #[test]
    fn test_known_pairs_merge_from_snapshot() {
        let mut known = KnownPairs::from_static();
        let extra = sym("EURGBP");
        assert!(!known.contains(&extra));
        known.merge([extra.clone()].iter());
        assert!(known.contains(&extra));
    }
}
