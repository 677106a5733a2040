//! Wire encoding for [`OutboundEvent`].
//!
//! Each event becomes one SSE frame, `data: {json}\n\n`, whose JSON object
//! has a `type` field and, for text-bearing events, a `content` field.

use axum::response::sse::Event;
use tracing::error;

use super::types::{OutboundEvent, RelayError};

/// Used if an event somehow fails to serialize.
const FALLBACK_PAYLOAD: &str = r#"{"type":"error","content":"Failed to encode event"}"#;

/// JSON payload of one frame. Always a single line.
pub fn payload(event: &OutboundEvent) -> String {
    serde_json::to_string(event).unwrap_or_else(|e| {
        error!(error = %e, ?event, "Failed to serialize event");
        FALLBACK_PAYLOAD.to_string()
    })
}

/// SSE frame for one event.
pub fn frame(event: &OutboundEvent) -> Event {
    Event::default().data(payload(event))
}

/// Escape a message as the body of a JSON string literal.
///
/// Quotes, backslashes and control characters come out as escape sequences,
/// so the result is plain single-line text.
pub fn sanitize(message: &str) -> String {
    let quoted = serde_json::Value::String(message.to_owned()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}

/// `error` event for a relay failure, with the message sanitized.
pub fn error_event(err: &RelayError) -> OutboundEvent {
    OutboundEvent::Error(sanitize(&err.to_string()))
}
