//! Transition detection over classified sentiment states.
//!
//! The engine keeps the last observed state per (chat, symbol) in memory
//! and produces an alert only when a pair moves into a crowded state it
//! was not already in. A drop back below threshold records NONE without
//! alerting, so a later re-entry fires again as a fresh transition.

use crate::store::SubscriptionStore;
use sentiment_core::{AlertReason, ChatId, ClassifiedState, SentimentSnapshot, Symbol};
use std::collections::HashMap;
use tracing::debug;

/// A notification produced by one pass. The driver formats and sends it.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentAlert {
    pub chat_id: ChatId,
    pub symbol: Symbol,
    pub long_pct: f64,
    pub short_pct: f64,
    pub state: ClassifiedState,
    pub reason: AlertReason,
}

/// Stateful alert engine. One instance lives for the process lifetime;
/// its transition table is deliberately not persisted, so a restart
/// re-alerts for pairs still above threshold.
pub struct AlertEngine {
    threshold: f64,
    last_states: HashMap<(ChatId, Symbol), ClassifiedState>,
}

impl AlertEngine {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            last_states: HashMap::new(),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Run one pass over every chat's subscriptions against a fresh
    /// outlook snapshot, returning the alerts to deliver. Pairs the
    /// provider returned no data for are skipped silently.
    pub fn run_pass(
        &mut self,
        store: &SubscriptionStore,
        outlook: &HashMap<Symbol, SentimentSnapshot>,
    ) -> Vec<SentimentAlert> {
        let mut alerts = Vec::new();
        for (chat_id, symbols) in store.iter() {
            for symbol in symbols {
                let Some(snapshot) = outlook.get(symbol) else {
                    debug!(chat_id, symbol = %symbol, "no outlook data, skipping");
                    continue;
                };
                if let Some(alert) = self.observe(chat_id, snapshot) {
                    alerts.push(alert);
                }
            }
        }
        alerts
    }

    /// Feed one reading for one chat through the transition rules.
    pub fn observe(
        &mut self,
        chat_id: ChatId,
        snapshot: &SentimentSnapshot,
    ) -> Option<SentimentAlert> {
        let key = (chat_id, snapshot.symbol.clone());
        let new = snapshot.classify(self.threshold);
        let previous = self.last_states.get(&key).copied();

        if new == previous.unwrap_or_default() {
            // Unchanged, including the never-seen NONE case.
            return None;
        }

        if new == ClassifiedState::None {
            // Reset tracking so a re-entry counts as a fresh transition.
            self.last_states.insert(key, ClassifiedState::None);
            return None;
        }

        let reason = match previous {
            None => AlertReason::FirstEntry,
            Some(from) => AlertReason::Flip { from, to: new },
        };
        self.last_states.insert(key, new);

        Some(SentimentAlert {
            chat_id,
            symbol: snapshot.symbol.clone(),
            long_pct: snapshot.long_pct,
            short_pct: snapshot.short_pct,
            state: new,
            reason,
        })
    }

    /// Last recorded state for a (chat, symbol) pair, NONE when untracked.
    pub fn last_state(&self, chat_id: ChatId, symbol: &Symbol) -> ClassifiedState {
        self.last_states
            .get(&(chat_id, symbol.clone()))
            .copied()
            .unwrap_or_default()
    }
}
