//! Threshold classification of sentiment readings.

use crate::SentimentSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default crowding threshold in percent.
pub const DEFAULT_THRESHOLD: f64 = 65.0;

/// Discrete threshold-crossing category for one pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ClassifiedState {
    /// Neither side at or above threshold.
    #[default]
    None,
    /// Only the long side at or above threshold.
    Long,
    /// Only the short side at or above threshold.
    Short,
    /// Both sides at or above threshold.
    Both,
}

impl ClassifiedState {
    /// Classify a reading against a threshold. Comparisons are inclusive,
    /// so a reading exactly at the threshold counts as crowded.
    pub fn classify(long_pct: f64, short_pct: f64, threshold: f64) -> Self {
        let long = long_pct >= threshold;
        let short = short_pct >= threshold;
        match (long, short) {
            (true, true) => ClassifiedState::Both,
            (true, false) => ClassifiedState::Long,
            (false, true) => ClassifiedState::Short,
            (false, false) => ClassifiedState::None,
        }
    }

    /// Suggested contrarian action for a crowded state, None for `None`.
    pub fn action_label(self) -> Option<&'static str> {
        match self {
            ClassifiedState::Long => Some("SELL (crowded LONG)"),
            ClassifiedState::Short => Some("BUY (crowded SHORT)"),
            ClassifiedState::Both => Some("CHECK (both sides >= threshold)"),
            ClassifiedState::None => None,
        }
    }
}

impl fmt::Display for ClassifiedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ClassifiedState::None => "NONE",
            ClassifiedState::Long => "LONG",
            ClassifiedState::Short => "SHORT",
            ClassifiedState::Both => "BOTH",
        };
        f.write_str(s)
    }
}

impl SentimentSnapshot {
    /// Classify this reading against a threshold.
    pub fn classify(&self, threshold: f64) -> ClassifiedState {
        ClassifiedState::classify(self.long_pct, self.short_pct, threshold)
    }
}

/// Why an alert fired for a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertReason {
    /// Previous state was NONE; the pair just crossed the threshold.
    FirstEntry,
    /// The pair moved directly between two crowded states.
    Flip {
        from: ClassifiedState,
        to: ClassifiedState,
    },
}

impl fmt::Display for AlertReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertReason::FirstEntry => f.write_str("first entry into threshold"),
            AlertReason::Flip { from, to } => write!(f, "flip from {} to {}", from, to),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Symbol;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_classify_four_way_split() {
        assert_eq!(
            ClassifiedState::classify(70.0, 20.0, 65.0),
            ClassifiedState::Long
        );
        assert_eq!(
            ClassifiedState::classify(20.0, 70.0, 65.0),
            ClassifiedState::Short
        );
        assert_eq!(
            ClassifiedState::classify(70.0, 70.0, 65.0),
            ClassifiedState::Both
        );
        assert_eq!(
            ClassifiedState::classify(50.0, 50.0, 65.0),
            ClassifiedState::None
        );
    }

    #[test]
    fn test_classify_inclusive_boundary() {
        // Exactly at threshold counts as crowded, not NONE.
        assert_eq!(
            ClassifiedState::classify(65.0, 20.0, 65.0),
            ClassifiedState::Long
        );
        assert_eq!(
            ClassifiedState::classify(65.0, 65.0, 65.0),
            ClassifiedState::Both
        );
    }

    #[test]
    fn test_classify_idempotent() {
        let snap = SentimentSnapshot::new(Symbol::new("EURUSD").unwrap(), 70.0, 20.0);
        assert_eq!(snap.classify(65.0), snap.classify(65.0));
    }

    #[test]
    fn test_action_labels() {
        assert_eq!(
            ClassifiedState::Long.action_label(),
            Some("SELL (crowded LONG)")
        );
        assert_eq!(
            ClassifiedState::Short.action_label(),
            Some("BUY (crowded SHORT)")
        );
        assert_eq!(
            ClassifiedState::Both.action_label(),
            Some("CHECK (both sides >= threshold)")
        );
        assert_eq!(ClassifiedState::None.action_label(), None);
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(
            AlertReason::FirstEntry.to_string(),
            "first entry into threshold"
        );
        let flip = AlertReason::Flip {
            from: ClassifiedState::None,
            to: ClassifiedState::Short,
        };
        assert_eq!(flip.to_string(), "flip from NONE to SHORT");
    }
}
