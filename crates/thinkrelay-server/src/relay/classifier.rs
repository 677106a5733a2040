//! Reasoning/answer segment classifier.
//!
//! Reasoning models wrap their chain of thought in `<think>` ... `</think>`.
//! Ollama streams each sentinel as a fragment of its own, so classification
//! is a two-state machine driven by exact fragment matches.

use super::types::OutboundEvent;

/// Fragment that opens a reasoning segment.
pub const THINK_OPEN: &str = "<think>";
/// Fragment that closes a reasoning segment.
pub const THINK_CLOSE: &str = "</think>";

/// Which partition fragments currently belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Segment {
    #[default]
    Answering,
    Thinking,
}

/// Result of feeding one fragment to [`transition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: Segment,
    pub event: OutboundEvent,
    /// Partition the fragment text belongs to; `None` for sentinels.
    pub accumulate: Option<Segment>,
}

/// Pure state reducer.
///
/// Sentinels are recognised by exact equality only, and flip the state
/// regardless of the current one. Every other fragment, including empty
/// or odd-looking text, belongs to the current segment.
pub fn transition(state: Segment, text: &str) -> Transition {
    match text {
        THINK_OPEN => Transition {
            state: Segment::Thinking,
            event: OutboundEvent::ThinkStart,
            accumulate: None,
        },
        THINK_CLOSE => Transition {
            state: Segment::Answering,
            event: OutboundEvent::ThinkEnd,
            accumulate: None,
        },
        _ => Transition {
            state,
            event: match state {
                Segment::Thinking => OutboundEvent::ThinkContent(text.to_string()),
                Segment::Answering => OutboundEvent::Content(text.to_string()),
            },
            accumulate: Some(state),
        },
    }
}

/// Final text of one exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    pub answer: String,
    pub reasoning: String,
}

/// Per-request classifier: current state plus both accumulators.
#[derive(Debug, Default)]
pub struct Classifier {
    state: Segment,
    transcript: Transcript,
}

impl Classifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn state(&self) -> Segment {
        self.state
    }

    /// Classify one fragment, record its text, and return the event to emit.
    pub fn feed(&mut self, text: &str) -> OutboundEvent {
        let step = transition(self.state, text);
        match step.accumulate {
            Some(Segment::Answering) => self.transcript.answer.push_str(text),
            Some(Segment::Thinking) => self.transcript.reasoning.push_str(text),
            None => {}
        }
        self.state = step.state;
        step.event
    }

    pub fn into_transcript(self) -> Transcript {
        self.transcript
    }
}
