//! Watch stream binary - follows a streaming translation session and prints
//! progress as each locale finishes
//!
//! Usage:
//!   cargo run --bin watch-stream -- tour giza-pyramids
//!
//! Optional environment variables:
//! - TRANSLATION_SERVER_URL (defaults to http://localhost:8080)
//! - TRANSLATION_LOCALES (defaults to every supported locale)
//! - WATCH_TIMEOUT_SECS (no timeout when unset)

use anyhow::{bail, Context, Result};
use locale_relay::consumer::{SessionOutcome, TranslationClient};
use locale_relay::locale::LocaleRegistry;
use locale_relay::session::{LocaleStatus, SessionSnapshot, TranslationSession};
use std::time::Duration;
use tracing::info;

/// Minimal config for watching (no provider/DB required)
struct WatchConfig {
    server_url: String,
    locales: LocaleRegistry,
    timeout: Option<Duration>,
}

impl WatchConfig {
    fn from_env() -> Result<Self> {
        Ok(Self {
            server_url: std::env::var("TRANSLATION_SERVER_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            locales: match std::env::var("TRANSLATION_LOCALES") {
                Ok(codes) => LocaleRegistry::from_codes(&codes)
                    .context("Invalid TRANSLATION_LOCALES")?,
                Err(_) => LocaleRegistry::default(),
            },
            timeout: std::env::var("WATCH_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs),
        })
    }
}

fn print_progress(snapshot: &SessionSnapshot) {
    let line = snapshot
        .statuses
        .iter()
        .map(|entry| {
            let mark = match entry.status {
                LocaleStatus::Pending => "·",
                LocaleStatus::Translating => "…",
                LocaleStatus::Done => "✓",
                LocaleStatus::Error => "✗",
            };
            format!("{} {}", mark, entry.locale.code())
        })
        .collect::<Vec<_>>()
        .join("  ");
    println!("[{:>3.0}%] {}", snapshot.progress * 100.0, line);
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("locale_relay=warn".parse()?)
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [entity_type, id] = args.as_slice() else {
        bail!("Usage: watch-stream <entity_type> <id>");
    };

    let config = WatchConfig::from_env()?;
    let client = TranslationClient::new(&config.server_url);
    let mut session = TranslationSession::new(&config.locales);

    let mut updates = session.subscribe();
    let printer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            print_progress(&snapshot);
        }
    });

    info!("Watching {} '{}' on {}", entity_type, id, config.server_url);
    let outcome = client
        .stream_session(entity_type, id, &mut session, config.timeout)
        .await?;

    // Dropping the session closes the watch channel and ends the printer
    let bundle = session.into_bundle();
    let _ = printer.await;

    println!();
    match &outcome {
        SessionOutcome::Completed => println!("Session complete"),
        SessionOutcome::Truncated { unfinished } => {
            println!("Stream ended early, {} locales unfinished", unfinished.len())
        }
        SessionOutcome::Failed(message) => println!("Session failed: {}", message),
        SessionOutcome::Interrupted(message) => println!("Connection lost: {}", message),
        SessionOutcome::TimedOut { expired } => {
            println!("Timed out, {} locales expired", expired.len())
        }
    }

    println!("{}", serde_json::to_string_pretty(&bundle)?);
    Ok(())
}
