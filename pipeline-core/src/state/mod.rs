//! Document state machine and artifact types (spec.md §3, §4.1, §4.2).
//!
//! `phase` owns the state graph and the legality of transitions; `artifacts`
//! owns the typed payloads each stage produces; `document` threads both
//! through a single mutable container for the lifetime of one pipeline run.

pub mod artifacts;
pub mod document;
pub mod phase;

pub use artifacts::{
    clamp_score, ArticleDraft, ConfidenceLevel, CriticReport, FactCheckReport, FinalArticle,
    KeyFact, QuestionableClaim, RecommendedAction, ResearchBrief,
};
pub use document::{Brief, Contribution, Document};
pub use phase::{DocumentState, StateMachine, TransitionRecord};
