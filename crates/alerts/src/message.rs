//! Alert message formatting.

use crate::engine::SentimentAlert;

/// Format an alert as the outbound Telegram text.
pub fn format_alert(alert: &SentimentAlert) -> String {
    let action = alert.state.action_label().unwrap_or("CHECK");
    let flag = alert.symbol.flag();
    let header = format!("ALERT {} {}", alert.symbol, flag)
        .trim_end()
        .to_string();

    let mut msg = format!(
        "{}\n{:.1}% long / {:.1}% short -> {}\nReason: {}",
        header, alert.long_pct, alert.short_pct, action, alert.reason
    );

    let now = chrono::Utc::now();
    msg.push_str(&format!("\n{}", now.format("%Y-%m-%d %H:%M:%S UTC")));
    msg
}
