//! pipeline-core
//!
//! Shared infrastructure for the content-generation pipeline: the document
//! state machine, the LLM port, the human approval gate, the synchronous
//! event bus and metrics, configuration, and error kinds. The executor and
//! the six specialist agents live in `pipeline-agents` and depend on this
//! crate.

#![allow(dead_code)]

pub mod approval;
pub mod config;
pub mod error;
pub mod events;
pub mod json_extract;
pub mod llm;
pub mod metrics;
pub mod state;

pub use approval::{ApprovalDecision, ApprovalGate, ApprovalRequest, AutoApprove, ConsoleApproval, ExternalApproval};
pub use config::PipelineConfig;
pub use error::PipelineError;
pub use events::{Event, EventBus, EventListener, EventType, ListenerId, SharedEventBus};
pub use json_extract::extract_json;
pub use llm::{HttpLlmClient, LlmClient, MockLlm};
pub use metrics::Metrics;
pub use state::{
    clamp_score, ArticleDraft, Brief, ConfidenceLevel, Contribution, CriticReport, Document,
    DocumentState, FactCheckReport, FinalArticle, KeyFact, QuestionableClaim, RecommendedAction,
    ResearchBrief, StateMachine, TransitionRecord,
};
