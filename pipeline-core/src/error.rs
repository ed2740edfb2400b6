//! Pipeline-wide error kinds.
//!
//! Transient and parse/semantic failures are recovered inside the agent
//! envelope and never escape it; only `AgentFailure` and the approval
//! outcomes surface to the executor (see `crates/pipeline-agents`).

use crate::state::DocumentState;

/// Every error kind the pipeline can produce.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The LLM provider could not be reached. Retryable by the envelope.
    #[error("LLM unavailable: {0}")]
    LlmUnavailable(String),

    /// The LLM call exceeded its configured timeout. Retryable by the envelope.
    #[error("LLM call timed out after {0:?}")]
    LlmTimeout(std::time::Duration),

    /// The response did not contain a parseable JSON object.
    #[error("response did not contain valid JSON: {0}")]
    ResponseNotJson(String),

    /// A mandatory field was missing from the parsed response.
    #[error("missing required field `{0}` in response")]
    MissingField(String),

    /// A field was present but outside its valid range.
    #[error("field `{field}` out of range: {detail}")]
    OutOfRange { field: String, detail: String },

    /// An agent-specific validator rejected the produced artifact.
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// Retries exhausted inside the agent envelope (terminal).
    #[error("agent `{role}` failed after {attempts} attempt(s): {reason}")]
    AgentFailure {
        role: String,
        attempts: u32,
        reason: String,
        last_response: String,
    },

    /// A state transition was attempted that is not in the transition table.
    #[error("invalid transition {from} -> {to}")]
    InvalidTransition {
        from: DocumentState,
        to: DocumentState,
    },

    /// A mutation was attempted on a terminal (published/rejected) document.
    #[error("document is terminal ({0}) and cannot be mutated")]
    DocumentTerminal(DocumentState),

    /// A human approver explicitly rejected the document.
    #[error("approval rejected: {0}")]
    ApprovalRejected(String),

    /// The approval gate did not respond within its timeout.
    #[error("approval timed out after {0:?}")]
    ApprovalTimeout(std::time::Duration),

    /// The run was cancelled via its cancellation token.
    #[error("pipeline run cancelled: {0}")]
    Cancelled(String),

    /// An I/O failure (publishing output, writing a failure dump, loading config).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Whether the envelope should retry on this error (transient / parse / semantic).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PipelineError::LlmUnavailable(_)
                | PipelineError::LlmTimeout(_)
                | PipelineError::ResponseNotJson(_)
                | PipelineError::MissingField(_)
                | PipelineError::OutOfRange { .. }
                | PipelineError::ValidationFailed(_)
        )
    }
}
