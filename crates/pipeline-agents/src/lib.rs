//! pipeline-agents
//!
//! The six LLM-backed specialists (plus the deterministic Publisher) and the
//! executor that drives a `Document` through them (spec.md §4.4, §4.5, §4.8).
//! Depends on `pipeline-core` for the state machine, LLM port, approval gate,
//! event bus, and metrics.

pub mod agents;
pub mod envelope;
pub mod executor;
pub mod prompts;

pub use agents::{page_name, publish, Critic, Editor, FactChecker, Researcher, Writer};
pub use envelope::{run_envelope, AgentArtifact, AgentRole, SpecialistAgent};
pub use executor::{Executor, PipelineResult};
