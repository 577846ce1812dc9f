//! Myfxbook community outlook client.
//!
//! Two JSON-over-HTTPS exchanges: `login.json` trades credentials for a
//! session id, `get-community-outlook.json` returns per-pair long/short
//! positioning. The session id is cached for the process lifetime and
//! refreshed once when the provider reports it invalid.

use crate::error::ProviderError;
use sentiment_core::{SentimentSnapshot, Symbol};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://www.myfxbook.com/api";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    error: bool,
    #[serde(default)]
    message: String,
    #[serde(default)]
    session: String,
}

#[derive(Debug, Deserialize)]
struct OutlookResponse {
    #[serde(default)]
    error: bool,
    #[serde(default)]
    message: String,
    #[serde(default)]
    symbols: Vec<serde_json::Value>,
}

/// Session client for the Myfxbook community outlook API.
pub struct MyfxbookClient {
    http: reqwest::Client,
    base_url: String,
    email: String,
    password: String,
    session: Option<String>,
}

impl MyfxbookClient {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self::with_base_url(email, password, DEFAULT_BASE_URL)
    }

    /// Point the client at a different base URL (tests, mirrors).
    pub fn with_base_url(
        email: impl Into<String>,
        password: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base_url: base_url.into(),
            email: email.into(),
            password: password.into(),
            session: None,
        }
    }

    /// Whether a session id is currently cached.
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Exchange credentials for a session id and cache it.
    pub async fn login(&mut self) -> Result<(), ProviderError> {
        let url = format!("{}/login.json", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("email", self.email.as_str()), ("password", self.password.as_str())])
            .send()
            .await?;
        let payload: LoginResponse = response.json().await?;

        if payload.error {
            return Err(ProviderError::Auth(payload.message));
        }
        if payload.session.is_empty() {
            return Err(ProviderError::Auth("empty session returned".to_string()));
        }

        debug!("Myfxbook login ok");
        self.session = Some(payload.session);
        Ok(())
    }

    /// Fetch the current community outlook for all pairs.
    ///
    /// Logs in lazily when no session is held. A provider-reported error on
    /// the outlook call is treated as an expired session: the client
    /// re-logs-in and refetches exactly once before surfacing the error.
    pub async fn community_outlook(
        &mut self,
    ) -> Result<HashMap<Symbol, SentimentSnapshot>, ProviderError> {
        if self.session.is_none() {
            self.login().await?;
        }

        match self.fetch_outlook().await {
            Ok(map) => Ok(map),
            Err(err) if err.is_auth() => {
                warn!(error = %err, "outlook fetch rejected, re-authenticating");
                self.session = None;
                self.login().await?;
                self.fetch_outlook().await
            }
            Err(err) => Err(err),
        }
    }

    async fn fetch_outlook(&self) -> Result<HashMap<Symbol, SentimentSnapshot>, ProviderError> {
        let session = self
            .session
            .as_deref()
            .ok_or_else(|| ProviderError::Auth("no session held".to_string()))?;

        let url = format!("{}/get-community-outlook.json", self.base_url);
        let response = self.http.get(&url).query(&[("session", session)]).send().await?;
        let payload: OutlookResponse = response.json().await?;

        if payload.error {
            return Err(ProviderError::Auth(payload.message));
        }

        Ok(parse_outlook_entries(&payload.symbols))
    }
}

/// Decode outlook entries, skipping malformed ones rather than failing the
/// whole fetch.
fn parse_outlook_entries(entries: &[serde_json::Value]) -> HashMap<Symbol, SentimentSnapshot> {
    let mut out = HashMap::new();
    for entry in entries {
        match parse_outlook_entry(entry) {
            Some(snapshot) => {
                out.insert(snapshot.symbol.clone(), snapshot);
            }
            None => {
                warn!(entry = %entry, "skipping malformed outlook entry");
            }
        }
    }
    out
}

fn parse_outlook_entry(entry: &serde_json::Value) -> Option<SentimentSnapshot> {
    let symbol = entry["name"]
        .as_str()
        .or_else(|| entry["symbol"].as_str())
        .and_then(|s| Symbol::new(s).ok())?;
    let long_pct = parse_percentage(&entry["longPercentage"])?;
    let short_pct = parse_percentage(&entry["shortPercentage"])?;
    Some(SentimentSnapshot::new(symbol, long_pct, short_pct))
}

/// Percentages arrive either as JSON numbers or as strings, sometimes with
/// a trailing percent sign.
fn parse_percentage(value: &serde_json::Value) -> Option<f64> {
    if let Some(n) = value.as_f64() {
        return Some(n);
    }
    value
        .as_str()
        .map(|s| s.trim().trim_end_matches('%').trim())
        .and_then(|s| s.parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_percentage_number() {
        assert_eq!(parse_percentage(&json!(64.5)), Some(64.5));
        assert_eq!(parse_percentage(&json!(0)), Some(0.0));
    }

    #[test]
    fn test_parse_percentage_string_with_suffix() {
        assert_eq!(parse_percentage(&json!("72%")), Some(72.0));
        assert_eq!(parse_percentage(&json!(" 72.5 % ")), Some(72.5));
        assert_eq!(parse_percentage(&json!("33.1")), Some(33.1));
    }

    #[test]
    fn test_parse_percentage_rejects_garbage() {
        assert_eq!(parse_percentage(&json!("n/a")), None);
        assert_eq!(parse_percentage(&json!(null)), None);
        assert_eq!(parse_percentage(&json!({})), None);
    }

    #[test]
    fn test_parse_entry_symbol_field_fallback() {
        let entry = json!({"symbol": "eurusd", "longPercentage": 70, "shortPercentage": 30});
        let snap = parse_outlook_entry(&entry).unwrap();
        assert_eq!(snap.symbol.as_str(), "EURUSD");
        assert_eq!(snap.long_pct, 70.0);
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let entries = vec![
            json!({"name": "EURUSD", "longPercentage": "70%", "shortPercentage": "30%"}),
            json!({"name": "GBPUSD"}), // missing percentages
            json!({"longPercentage": 50, "shortPercentage": 50}), // missing symbol
            json!({"name": "USDJPY", "longPercentage": "abc", "shortPercentage": 10}),
            json!({"name": "AUDUSD", "longPercentage": 40.0, "shortPercentage": 60.0}),
        ];
        let map = parse_outlook_entries(&entries);
        assert_eq!(map.len(), 2);
        let eur = &map[&Symbol::new("EURUSD").unwrap()];
        assert_eq!(eur.long_pct, 70.0);
        assert_eq!(eur.short_pct, 30.0);
        assert!(map.contains_key(&Symbol::new("AUDUSD").unwrap()));
    }

    #[test]
    fn test_login_response_error_shape() {
        let payload: LoginResponse =
            serde_json::from_str(r#"{"error":true,"message":"Invalid email or password"}"#)
                .unwrap();
        assert!(payload.error);
        assert_eq!(payload.message, "Invalid email or password");
        assert!(payload.session.is_empty());
    }

    #[test]
    fn test_outlook_response_shape() {
        let payload: OutlookResponse = serde_json::from_str(
            r#"{"error":false,"message":"","symbols":[{"name":"EURUSD","shortPercentage":45,"longPercentage":55}]}"#,
        )
        .unwrap();
        assert!(!payload.error);
        assert_eq!(payload.symbols.len(), 1);
    }
}
