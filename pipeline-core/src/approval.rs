//! Human-in-the-loop Approval Gate (spec.md §4.6).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncBufReadExt;

use crate::error::PipelineError;
use crate::state::DocumentState;

/// Decision returned by an approval gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalDecision {
    Approve,
    /// Carries the human's stated reason, if any, so it can be surfaced in
    /// `PipelineResult::error_message` (spec.md §8 scenario 5).
    Reject(Option<String>),
    RequestChanges,
}

/// What a human (or external system) is being asked to approve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub document_id: uuid::Uuid,
    pub at_state: DocumentState,
    pub summary: String,
    pub content_preview: String,
}

/// `requestApproval(request) -> decision`, with a timeout (spec.md §4.6).
#[async_trait]
pub trait ApprovalGate: Send + Sync {
    async fn request(
        &self,
        req: &ApprovalRequest,
        timeout: Duration,
    ) -> Result<ApprovalDecision, PipelineError>;
}

/// Always approves immediately. Default gate.
pub struct AutoApprove;

#[async_trait]
impl ApprovalGate for AutoApprove {
    async fn request(
        &self,
        _req: &ApprovalRequest,
        _timeout: Duration,
    ) -> Result<ApprovalDecision, PipelineError> {
        Ok(ApprovalDecision::Approve)
    }
}

/// Interactive console prompt. Reaching EOF (piped/non-interactive stdin)
/// auto-approves rather than hanging forever, per spec.md §4.6.
pub struct ConsoleApproval;

#[async_trait]
impl ApprovalGate for ConsoleApproval {
    async fn request(
        &self,
        req: &ApprovalRequest,
        timeout: Duration,
    ) -> Result<ApprovalDecision, PipelineError> {
        println!(
            "Approval requested at {} for document {}: {}\n[a]pprove / [r]eject / [c]hanges > ",
            req.at_state, req.document_id, req.summary
        );

        let read_lines = async {
            let stdin = tokio::io::stdin();
            let mut lines = tokio::io::BufReader::new(stdin).lines();
            let decision_line = lines.next_line().await?;
            let reason_line = match decision_line.as_deref().map(str::trim).map(str::to_lowercase) {
                Some(ref d) if d == "r" || d == "reject" => lines.next_line().await?,
                _ => None,
            };
            std::io::Result::Ok((decision_line, reason_line))
        };

        match tokio::time::timeout(timeout, read_lines).await {
            Err(_) => Err(PipelineError::ApprovalTimeout(timeout)),
            Ok(Err(e)) => Err(PipelineError::ApprovalRejected(format!("stdin read error: {e}"))),
            Ok(Ok((None, _))) => Ok(ApprovalDecision::Approve),
            Ok(Ok((Some(line), reason))) => match line.trim().to_lowercase().as_str() {
                "r" | "reject" => Ok(ApprovalDecision::Reject(reason.map(|r| r.trim().to_string()))),
                "c" | "changes" => Ok(ApprovalDecision::RequestChanges),
                _ => Ok(ApprovalDecision::Approve),
            },
        }
    }
}

/// The boxed future an `ExternalApproval` closure returns.
type ApprovalFuture = std::pin::Pin<
    Box<dyn std::future::Future<Output = Result<ApprovalDecision, PipelineError>> + Send>,
>;

type ExternalApprover = dyn Fn(&ApprovalRequest) -> ApprovalFuture + Send + Sync;

/// Wraps a user-supplied async closure or channel consumer for approvals
/// sourced from outside the process (a web hook, a queue, a Slack bot).
pub struct ExternalApproval {
    handler: Box<ExternalApprover>,
}

impl ExternalApproval {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&ApprovalRequest) -> ApprovalFuture + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
        }
    }
}

#[async_trait]
impl ApprovalGate for ExternalApproval {
    async fn request(
        &self,
        req: &ApprovalRequest,
        timeout: Duration,
    ) -> Result<ApprovalDecision, PipelineError> {
        tokio::time::timeout(timeout, (self.handler)(req))
            .await
            .map_err(|_| PipelineError::ApprovalTimeout(timeout))?
    }
}
