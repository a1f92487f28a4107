//! Client side of a streaming translation session.
//!
//! [`consume`] reads raw byte chunks, decodes frames and folds every event
//! into a [`TranslationSession`]. It stops when the stream ends, when the
//! transport fails, or when the server reports a session-level error.
//! Nothing already merged is ever rolled back.

use crate::framer::FrameDecoder;
use crate::locale::Locale;
use crate::session::TranslationSession;
use anyhow::{anyhow, Context, Result};
use futures::{Stream, StreamExt};
use reqwest::Url;
use std::fmt::Display;
use std::time::Duration;
use tracing::{debug, info, warn};

/// How a consumed session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The stream ended after every locale reached done or error.
    Completed,
    /// The stream ended while these locales were still unfinished.
    Truncated { unfinished: Vec<Locale> },
    /// The server reported a session-level error.
    Failed(String),
    /// Reading from the transport failed mid-stream.
    Interrupted(String),
    /// The deadline passed; these locales were marked as failed.
    TimedOut { expired: Vec<Locale> },
}

/// Drive `session` from a stream of byte chunks until it ends.
pub async fn consume<S, B, E>(stream: S, session: &mut TranslationSession) -> SessionOutcome
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    futures::pin_mut!(stream);
    let mut decoder = FrameDecoder::new();

    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                warn!("Translation stream interrupted: {}", e);
                return SessionOutcome::Interrupted(e.to_string());
            }
        };

        for event in decoder.push(chunk.as_ref()) {
            session.apply(event);
            if let Some(message) = session.failure() {
                return SessionOutcome::Failed(message.to_string());
            }
        }
    }

    if decoder.has_pending() {
        debug!("Stream ended inside a frame, dropping the incomplete record");
    }

    let unfinished = session.unfinished();
    if unfinished.is_empty() {
        SessionOutcome::Completed
    } else {
        info!("Stream ended with {} unfinished locales", unfinished.len());
        SessionOutcome::Truncated { unfinished }
    }
}

/// [`consume`] with a deadline for the whole session.
///
/// When the deadline passes, every unfinished locale is marked as failed.
pub async fn consume_with_timeout<S, B, E>(
    stream: S,
    session: &mut TranslationSession,
    timeout: Duration,
) -> SessionOutcome
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    let result = tokio::time::timeout(timeout, consume(stream, &mut *session)).await;
    match result {
        Ok(outcome) => outcome,
        Err(_) => {
            let expired = session.expire_pending();
            warn!(
                "Translation session timed out after {:?}, {} locales expired",
                timeout,
                expired.len()
            );
            SessionOutcome::TimedOut { expired }
        }
    }
}

/// HTTP client for a running translation server.
#[derive(Debug, Clone)]
pub struct TranslationClient {
    http: reqwest::Client,
    base_url: String,
}

impl TranslationClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Stream endpoint for an entity, with `entity_type` and `id` escaped as
    /// single path segments.
    fn stream_url(&self, entity_type: &str, id: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid translation server URL: {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("Translation server URL cannot be a base: {}", self.base_url))?
            .pop_if_empty()
            .extend(["api", "translations", entity_type, id, "stream"]);
        Ok(url)
    }

    /// Open the event stream for an entity and feed it into `session`.
    ///
    /// Errors only when the stream cannot be opened; everything after that
    /// is reported through the returned [`SessionOutcome`].
    pub async fn stream_session(
        &self,
        entity_type: &str,
        id: &str,
        session: &mut TranslationSession,
        timeout: Option<Duration>,
    ) -> Result<SessionOutcome> {
        let url = self.stream_url(entity_type, id)?;
        info!("Opening translation stream {}", url);

        let response = self
            .http
            .get(url)
            .header("Accept", "text/event-stream")
            .send()
            .await
            .context("Failed to connect to translation server")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Translation server returned {}: {}", status, body);
        }

        let stream = response.bytes_stream();
        let outcome = match timeout {
            Some(timeout) => consume_with_timeout(stream, session, timeout).await,
            None => consume(stream, session).await,
        };
        Ok(outcome)
    }
}
