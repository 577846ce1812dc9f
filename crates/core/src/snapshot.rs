//! Sentiment snapshot readings.

use crate::Symbol;

/// One provider-reported reading of aggregate long/short positioning
/// for a single pair. Produced fresh on every fetch, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentSnapshot {
    pub symbol: Symbol,
    /// Percentage of community positions that are long, in [0, 100].
    pub long_pct: f64,
    /// Percentage of community positions that are short, in [0, 100].
    pub short_pct: f64,
}

impl SentimentSnapshot {
    pub fn new(symbol: Symbol, long_pct: f64, short_pct: f64) -> Self {
        Self {
            symbol,
            long_pct,
            short_pct,
        }
    }
}
