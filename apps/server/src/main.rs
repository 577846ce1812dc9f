//! Sentiment Bot - Headless Poller
//!
//! Polls the Myfxbook community outlook, classifies each subscribed pair
//! against a crowding threshold and notifies Telegram chats on state
//! transitions. Inbound bot commands manage per-chat subscriptions.

mod config;

use clap::Parser;
use config::{AppConfig, Args};
use sentiment_alerts::{
    format_alert, handle_command, next_offset, AlertEngine, KnownPairs, SubscriptionStore,
    TelegramClient,
};
use sentiment_provider::MyfxbookClient;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

fn init_logging(level: &str) {
    let level = match level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Everything one pass needs, owned by main for the process lifetime.
struct Bot {
    provider: MyfxbookClient,
    telegram: TelegramClient,
    store: SubscriptionStore,
    known: KnownPairs,
    engine: AlertEngine,
    offset: Option<i64>,
}

impl Bot {
    /// One pass: drain inbound commands, fetch the outlook, send alerts.
    /// Provider failures abandon the pass; delivery failures are logged
    /// per chat and never abort the rest of the pass.
    async fn run_pass(&mut self) {
        self.drain_commands().await;

        let outlook = match self.provider.community_outlook().await {
            Ok(outlook) => outlook,
            Err(err) => {
                error!(error = %err, "outlook fetch failed, skipping pass");
                return;
            }
        };
        info!(pairs = outlook.len(), "fetched community outlook");
        self.known.merge(outlook.keys());

        let alerts = self.engine.run_pass(&self.store, &outlook);
        for alert in alerts {
            info!(
                chat_id = alert.chat_id,
                symbol = %alert.symbol,
                state = %alert.state,
                reason = %alert.reason,
                "sentiment alert"
            );
            let text = format_alert(&alert);
            if let Err(err) = self.telegram.send_message(alert.chat_id, &text).await {
                error!(chat_id = alert.chat_id, error = %err, "failed to send alert");
            }
        }
    }

    /// Pull pending Telegram updates and route each command, advancing
    /// the offset cursor past everything seen.
    async fn drain_commands(&mut self) {
        let messages = match self.telegram.get_updates(self.offset).await {
            Ok(messages) => messages,
            Err(err) => {
                error!(error = %err, "failed to fetch Telegram updates");
                return;
            }
        };
        self.offset = next_offset(&messages, self.offset);

        for msg in messages {
            match handle_command(&mut self.store, &self.known, msg.chat_id, &msg.text) {
                Ok(reply) => {
                    if let Err(err) = self.telegram.send_message(msg.chat_id, &reply).await {
                        error!(chat_id = msg.chat_id, error = %err, "failed to send reply");
                    }
                }
                Err(err) => {
                    error!(chat_id = msg.chat_id, error = %err, "failed to persist subscriptions");
                }
            }
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_logging(&args.log_level);

    let config = match AppConfig::from_env(&args) {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "configuration error");
            std::process::exit(1);
        }
    };

    let mut store = match SubscriptionStore::load(&config.subscriptions_file) {
        Ok(store) => store,
        Err(err) => {
            error!(
                path = %config.subscriptions_file.display(),
                error = %err,
                "cannot load subscription file"
            );
            std::process::exit(1);
        }
    };

    // Single-recipient mode: give the configured chat every known pair
    // unless it has already built its own list.
    if let Some(chat_id) = config.default_chat_id {
        if store.symbols_for(chat_id).is_empty() {
            for (code, _) in sentiment_core::KNOWN_PAIRS {
                if let Ok(symbol) = code.parse::<sentiment_core::Symbol>() {
                    store.add(chat_id, symbol);
                }
            }
            if let Err(err) = store.save() {
                error!(chat_id, error = %err, "failed to persist default subscriptions");
            } else {
                info!(chat_id, "subscribed default chat to all known pairs");
            }
        }
    }

    info!(
        threshold = config.threshold,
        one_shot = config.one_shot,
        interval_secs = config.poll_interval.as_secs(),
        "starting sentiment bot"
    );

    let mut bot = Bot {
        provider: MyfxbookClient::new(
            config.myfxbook_email.as_str(),
            config.myfxbook_password.as_str(),
        ),
        telegram: TelegramClient::new(&config.telegram_token),
        store,
        known: KnownPairs::from_static(),
        engine: AlertEngine::new(config.threshold),
        offset: None,
    };

    if config.one_shot {
        bot.run_pass().await;
        info!("one-shot pass complete");
        return;
    }

    loop {
        bot.run_pass().await;

        tokio::select! {
            _ = tokio::time::sleep(config.poll_interval) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
        }
    }
}
