//! Stream relay pipeline: one prompt in, one ordered event stream out.
//!
//! Lifecycle:
//! ```text
//! Init → Connecting ──status──▶ Streaming ──done──▶ Completed
//!             │                     │
//!             └──────error──────────┴──────▶ Failed
//! ```
//!
//! The returned stream owns the upstream connection. Dropping it (client
//! disconnect) drops the connection and nothing is persisted.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{Stream, StreamExt};
use thinkrelay_core::config::StreamConfig;
use thinkrelay_core::error::Error as CoreError;
use thinkrelay_core::ndjson;
use tracing::{debug, info, warn};

use crate::storage::HistoryStore;
use crate::upstream::{Upstream, UpstreamError};

use super::classifier::Classifier;
use super::encoder::error_event;
use super::keepalive::Watchdog;
use super::types::{CONNECTED, OutboundEvent, RelayError};

/// Per-relay behaviour knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayOptions {
    /// Upstream silence after which a keepalive event is emitted.
    pub keepalive: Duration,
    /// Replace `done` with an `error` event when saving the exchange fails.
    pub report_persistence_errors: bool,
}

impl Default for RelayOptions {
    fn default() -> Self {
        Self::from(&StreamConfig::default())
    }
}

impl From<&StreamConfig> for RelayOptions {
    fn from(config: &StreamConfig) -> Self {
        Self {
            keepalive: config.keepalive_interval(),
            report_persistence_errors: config.report_persistence_errors,
        }
    }
}

/// Outcome of one wait on the upstream.
enum Tick {
    Line(Option<Result<String, UpstreamError>>),
    Idle,
}

/// Relays prompts to an [`Upstream`] and records finished exchanges in a
/// [`HistoryStore`].
pub struct StreamRelay<U, S> {
    upstream: U,
    store: S,
    options: RelayOptions,
}

impl<U, S> StreamRelay<U, S>
where
    U: Upstream + 'static,
    S: HistoryStore + 'static,
{
    pub const fn new(upstream: U, store: S, options: RelayOptions) -> Self {
        Self {
            upstream,
            store,
            options,
        }
    }

    pub const fn upstream(&self) -> &U {
        &self.upstream
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Run one exchange.
    ///
    /// Always starts with `status` and always terminates: with `done` after
    /// a complete generation, or with a single fatal `error`.
    pub fn stream(self: Arc<Self>, prompt: String) -> impl Stream<Item = OutboundEvent> + Send {
        async_stream::stream! {
            // Optimistic: sent before the backend has accepted anything.
            yield OutboundEvent::Status(CONNECTED.to_string());

            let mut lines = match self.upstream.open(&prompt).await {
                Ok(lines) => lines,
                Err(e) => {
                    let err = RelayError::from(e);
                    warn!(error = %err, "Failed to open upstream stream");
                    yield error_event(&err);
                    return;
                }
            };

            let mut classifier = Classifier::new();
            let mut watchdog = Watchdog::new(self.options.keepalive);
            let mut fragments = 0_usize;

            loop {
                let tick = tokio::select! {
                    biased;
                    line = lines.next() => Tick::Line(line),
                    () = watchdog.expired() => Tick::Idle,
                };

                let line = match tick {
                    Tick::Idle => {
                        debug!(fragments, "Upstream silent, sending keepalive");
                        watchdog.reset();
                        yield OutboundEvent::Keepalive;
                        continue;
                    }
                    Tick::Line(None) => break,
                    Tick::Line(Some(Err(e))) => {
                        let err = RelayError::from(e);
                        warn!(error = %err, fragments, "Upstream stream failed");
                        yield error_event(&err);
                        return;
                    }
                    Tick::Line(Some(Ok(line))) => line,
                };

                if line.is_empty() {
                    // Blank lines do not reset the watchdog; one arriving as it
                    // expires still owes the client a keepalive.
                    if watchdog.is_due() {
                        watchdog.reset();
                        yield OutboundEvent::Keepalive;
                    }
                    continue;
                }

                let event = match ndjson::parse_line(&line) {
                    Ok(fragment) => {
                        if fragments == 0 {
                            debug!(model = ?fragment.model, "First fragment received");
                        }
                        if fragment.done {
                            debug!(fragments, "Upstream reported end of generation");
                        }
                        classifier.feed(&fragment.response)
                    }
                    Err(e) => {
                        let detail = match e {
                            CoreError::NdjsonParse(detail) => detail,
                            other => other.to_string(),
                        };
                        let prefix: String = line.chars().take(100).collect();
                        warn!(error = %detail, line = %prefix, "Failed to decode upstream line");
                        error_event(&RelayError::Decode(detail))
                    }
                };
                fragments += 1;
                yield event;
                watchdog.reset();
            }

            let transcript = classifier.into_transcript();
            match self
                .store
                .append(&prompt, &transcript.answer, &transcript.reasoning)
                .await
            {
                Ok(id) => info!(
                    id,
                    fragments,
                    answer_chars = transcript.answer.chars().count(),
                    reasoning_chars = transcript.reasoning.chars().count(),
                    "Stream completed"
                ),
                Err(e) => {
                    warn!(error = %e, "Failed to save exchange");
                    if self.options.report_persistence_errors {
                        yield error_event(&RelayError::Persistence(e.to_string()));
                        return;
                    }
                }
            }

            yield OutboundEvent::Done;
        }
    }
}
