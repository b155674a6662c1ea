use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::GeneratedPayload;

pub const INTERRUPTED_MESSAGE: &str = "The request was interrupted before it completed.";

/// Status of the latest submission. Exactly one variant holds, so a result and an error
/// are never shown together.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
    Idle,
    Loading,
    Success(GeneratedPayload),
    Failure(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    /// Bumped on every submit; completions carrying an older value are dropped.
    pub generation: u64,
    pub request_id: Option<Uuid>,
    pub outcome: Outcome,
    pub updated_at: DateTime<Utc>,
}

impl Default for Submission {
    fn default() -> Self {
        Self { generation: 0, request_id: None, outcome: Outcome::Idle, updated_at: Utc::now() }
    }
}

impl Submission {
    pub fn is_loading(&self) -> bool {
        matches!(self.outcome, Outcome::Loading)
    }

    pub fn payload(&self) -> Option<&GeneratedPayload> {
        match &self.outcome {
            Outcome::Success(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Failure(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Event {
    Started { request_id: Uuid },
    Succeeded { generation: u64, payload: GeneratedPayload },
    Failed { generation: u64, message: String },
    /// The in-flight submit was dropped before it produced a result.
    Abandoned { generation: u64 },
}

impl Event {
    fn generation(&self) -> Option<u64> {
        match self {
            Event::Started { .. } => None,
            Event::Succeeded { generation, .. }
            | Event::Failed { generation, .. }
            | Event::Abandoned { generation } => Some(*generation),
        }
    }
}

/// Computes the next state. The previous value is never mutated.
pub fn reduce(state: &Submission, event: Event) -> Submission {
    if let Some(generation) = event.generation() {
        if generation != state.generation || !state.is_loading() {
            return state.clone();
        }
    }

    let (generation, request_id, outcome) = match event {
        Event::Started { request_id } => (state.generation + 1, Some(request_id), Outcome::Loading),
        Event::Succeeded { generation, payload } => {
            (generation, state.request_id, Outcome::Success(payload))
        }
        Event::Failed { generation, message } => {
            (generation, state.request_id, Outcome::Failure(message))
        }
        Event::Abandoned { generation } => {
            (generation, state.request_id, Outcome::Failure(INTERRUPTED_MESSAGE.to_string()))
        }
    };

    Submission { generation, request_id, outcome, updated_at: Utc::now() }
}
