//! Lifecycle event types emitted by the pipeline executor (spec.md §4.7).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::DocumentState;

/// The kind of lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    PipelineStarted,
    PhaseStarted,
    PhaseCompleted,
    ApprovalRequested,
    ApprovalReceived,
    RevisionStarted,
    PipelineCompleted,
    PipelineFailed,
    Warning,
    Info,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EventType::PipelineStarted => "PIPELINE_STARTED",
            EventType::PhaseStarted => "PHASE_STARTED",
            EventType::PhaseCompleted => "PHASE_COMPLETED",
            EventType::ApprovalRequested => "APPROVAL_REQUESTED",
            EventType::ApprovalReceived => "APPROVAL_RECEIVED",
            EventType::RevisionStarted => "REVISION_STARTED",
            EventType::PipelineCompleted => "PIPELINE_COMPLETED",
            EventType::PipelineFailed => "PIPELINE_FAILED",
            EventType::Warning => "WARNING",
            EventType::Info => "INFO",
        };
        write!(f, "{s}")
    }
}

/// A single lifecycle event, as delivered to listeners and external
/// observers (spec.md §4.7, §6 event schema).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: uuid::Uuid,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub topic: String,
    pub previous_state: Option<DocumentState>,
    pub current_state: Option<DocumentState>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub document_ref: uuid::Uuid,
}

impl Event {
    pub fn new(
        event_type: EventType,
        topic: impl Into<String>,
        document_ref: uuid::Uuid,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            event_type,
            topic: topic.into(),
            previous_state: None,
            current_state: None,
            message: message.into(),
            timestamp: Utc::now(),
            document_ref,
        }
    }

    pub fn with_transition(mut self, from: DocumentState, to: DocumentState) -> Self {
        self.previous_state = Some(from);
        self.current_state = Some(to);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_display_matches_spec_literal() {
        assert_eq!(EventType::PhaseCompleted.to_string(), "PHASE_COMPLETED");
        assert_eq!(EventType::PipelineFailed.to_string(), "PIPELINE_FAILED");
    }

    #[test]
    fn event_serde_roundtrip_uses_type_tag() {
        let doc_ref = uuid::Uuid::new_v4();
        let event = Event::new(EventType::PipelineStarted, "article-pipeline", doc_ref, "starting");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "PIPELINE_STARTED");
        let restored: Event = serde_json::from_value(json).unwrap();
        assert_eq!(restored.document_ref, doc_ref);
    }
}
