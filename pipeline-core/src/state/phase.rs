//! Document state machine — explicit phases and legal transition guards.
//!
//! Mirrors the orchestrator state machine pattern: every transition is
//! validated against a fixed table and recorded for replay/diagnostics, and
//! terminal states can never be left.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// The set of phases a document moves through on its way to publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentState {
    /// The document exists but no stage has run yet.
    Created,
    /// The Researcher is gathering facts and an outline.
    Researching,
    /// The Writer is producing the first draft.
    Drafting,
    /// The FactChecker is verifying claims in the draft.
    FactChecking,
    /// The Editor is producing the final article.
    Editing,
    /// The Critic is reviewing structure, syntax, readability.
    Critiquing,
    /// Waiting on a human-in-the-loop approval decision.
    AwaitingApproval,
    /// Terminal — the article was published.
    Published,
    /// Terminal — the run ended without publishing.
    Rejected,
}

impl DocumentState {
    /// Whether this is a terminal state (no further transitions allowed).
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Published | Self::Rejected)
    }

    /// Whether this state represents in-progress stage execution (as
    /// opposed to the pre-loop `Created` state or a terminal state).
    pub fn is_processing(self) -> bool {
        !matches!(self, Self::Created) && !self.is_terminal()
    }

    /// The next state on the happy path, ignoring skip flags and revision
    /// edges (the executor applies those on top of this).
    pub fn next_in_happy_flow(self) -> Option<Self> {
        match self {
            Self::Created => Some(Self::Researching),
            Self::Researching => Some(Self::Drafting),
            Self::Drafting => Some(Self::FactChecking),
            Self::FactChecking => Some(Self::Editing),
            Self::Editing => Some(Self::Critiquing),
            Self::Critiquing => Some(Self::Published),
            Self::AwaitingApproval | Self::Published | Self::Rejected => None,
        }
    }

    /// The producer stage a revision edge from this state reverts to.
    ///
    /// `None` when this state has no revision predecessor in the happy flow.
    pub fn previous_for_revision(self) -> Option<Self> {
        match self {
            Self::Drafting => Some(Self::Researching),
            Self::FactChecking => Some(Self::Drafting),
            Self::Editing => Some(Self::FactChecking),
            Self::Critiquing => Some(Self::Editing),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "CREATED"),
            Self::Researching => write!(f, "RESEARCHING"),
            Self::Drafting => write!(f, "DRAFTING"),
            Self::FactChecking => write!(f, "FACT_CHECKING"),
            Self::Editing => write!(f, "EDITING"),
            Self::Critiquing => write!(f, "CRITIQUING"),
            Self::AwaitingApproval => write!(f, "AWAITING_APPROVAL"),
            Self::Published => write!(f, "PUBLISHED"),
            Self::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// Legal transitions between document states (spec.md §4.1).
///
/// ```text
/// CREATED            -> RESEARCHING | REJECTED
/// RESEARCHING        -> DRAFTING | AWAITING_APPROVAL | REJECTED
/// DRAFTING           -> FACT_CHECKING | EDITING | AWAITING_APPROVAL | REJECTED
/// FACT_CHECKING      -> EDITING | DRAFTING | AWAITING_APPROVAL | REJECTED
/// EDITING            -> CRITIQUING | PUBLISHED | FACT_CHECKING | DRAFTING | AWAITING_APPROVAL | REJECTED
/// CRITIQUING         -> PUBLISHED | EDITING | DRAFTING | AWAITING_APPROVAL | REJECTED
/// AWAITING_APPROVAL  -> <the phase before it> | PUBLISHED | REJECTED
/// PUBLISHED,REJECTED -> (terminal)
/// ```
///
/// `AWAITING_APPROVAL`'s "phase before it" edge is validated by the caller
/// (the Executor tracks which phase it parked on before requesting
/// approval); this table only allows the two universal escapes plus the
/// generic return edge, which is why `pre_approval` is threaded through.
fn is_legal_transition(from: DocumentState, to: DocumentState, pre_approval: Option<DocumentState>) -> bool {
    use DocumentState::*;

    if from.is_terminal() {
        return false;
    }

    if from == AwaitingApproval {
        return to == Published
            || to == Rejected
            || pre_approval == Some(to);
    }

    matches!(
        (from, to),
        (Created, Researching)
            | (Created, Rejected)
            | (Researching, Drafting)
            | (Researching, AwaitingApproval)
            | (Researching, Rejected)
            | (Drafting, FactChecking)
            | (Drafting, Editing)
            | (Drafting, AwaitingApproval)
            | (Drafting, Rejected)
            | (FactChecking, Editing)
            | (FactChecking, Drafting)
            | (FactChecking, AwaitingApproval)
            | (FactChecking, Rejected)
            | (Editing, Critiquing)
            | (Editing, Published)
            | (Editing, FactChecking)
            | (Editing, Drafting)
            | (Editing, AwaitingApproval)
            | (Editing, Rejected)
            | (Critiquing, Published)
            | (Critiquing, Editing)
            | (Critiquing, Drafting)
            | (Critiquing, AwaitingApproval)
            | (Critiquing, Rejected)
    )
}

/// A single recorded state transition, kept for audit/replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: DocumentState,
    pub to: DocumentState,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// The document state machine: current state plus a complete transition log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateMachine {
    current: DocumentState,
    /// The state the machine was in immediately before entering
    /// `AwaitingApproval`, so the `APPROVE` decision knows where to return.
    pre_approval: Option<DocumentState>,
    transitions: Vec<TransitionRecord>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            current: DocumentState::Created,
            pre_approval: None,
            transitions: Vec::new(),
        }
    }

    pub fn current(&self) -> DocumentState {
        self.current
    }

    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    pub fn is_terminal(&self) -> bool {
        self.current.is_terminal()
    }

    /// Attempt to move to `to`, recording the reason if the transition is legal.
    pub fn transition_to(&mut self, to: DocumentState, reason: Option<&str>) -> Result<(), PipelineError> {
        if !is_legal_transition(self.current, to, self.pre_approval) {
            return Err(PipelineError::InvalidTransition {
                from: self.current,
                to,
            });
        }

        if to == DocumentState::AwaitingApproval {
            self.pre_approval = Some(self.current);
        } else if self.current == DocumentState::AwaitingApproval {
            self.pre_approval = None;
        }

        self.transitions.push(TransitionRecord {
            from: self.current,
            to,
            timestamp: chrono::Utc::now(),
            reason: reason.map(String::from),
        });

        tracing::debug!(from = %self.current, to = %to, "document state transition");
        self.current = to;
        Ok(())
    }

    /// Summary string for logs and CLI output.
    pub fn summary(&self) -> String {
        let path: Vec<String> = self.transitions.iter().map(|t| t.to.to_string()).collect();
        if path.is_empty() {
            format!("{}", self.current)
        } else {
            format!("CREATED -> {}", path.join(" -> "))
        }
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_created() {
        let sm = StateMachine::new();
        assert_eq!(sm.current(), DocumentState::Created);
        assert!(!sm.is_terminal());
    }

    #[test]
    fn happy_path_skip_both() {
        let mut sm = StateMachine::new();
        sm.transition_to(DocumentState::Researching, None).unwrap();
        sm.transition_to(DocumentState::Drafting, None).unwrap();
        sm.transition_to(DocumentState::Editing, Some("skip-factcheck")).unwrap();
        sm.transition_to(DocumentState::Published, Some("skip-critique")).unwrap();
        assert!(sm.is_terminal());
        assert_eq!(sm.transitions().len(), 4);
    }

    #[test]
    fn full_happy_path() {
        let mut sm = StateMachine::new();
        for s in [
            DocumentState::Researching,
            DocumentState::Drafting,
            DocumentState::FactChecking,
            DocumentState::Editing,
            DocumentState::Critiquing,
            DocumentState::Published,
        ] {
            sm.transition_to(s, None).unwrap();
        }
        assert_eq!(sm.current(), DocumentState::Published);
    }

    #[test]
    fn revision_edge_factcheck_to_drafting() {
        let mut sm = StateMachine::new();
        sm.transition_to(DocumentState::Researching, None).unwrap();
        sm.transition_to(DocumentState::Drafting, None).unwrap();
        sm.transition_to(DocumentState::FactChecking, None).unwrap();
        sm.transition_to(DocumentState::Drafting, Some("revise")).unwrap();
        assert_eq!(sm.current(), DocumentState::Drafting);
    }

    #[test]
    fn revision_edge_critique_to_drafting_for_structural_issues() {
        let mut sm = StateMachine::new();
        for s in [
            DocumentState::Researching,
            DocumentState::Drafting,
            DocumentState::FactChecking,
            DocumentState::Editing,
            DocumentState::Critiquing,
        ] {
            sm.transition_to(s, None).unwrap();
        }
        sm.transition_to(DocumentState::Drafting, Some("revise")).unwrap();
        assert_eq!(sm.current(), DocumentState::Drafting);
    }

    #[test]
    fn cannot_skip_states() {
        let mut sm = StateMachine::new();
        let err = sm.transition_to(DocumentState::Editing, None).unwrap_err();
        match err {
            PipelineError::InvalidTransition { from, to } => {
                assert_eq!(from, DocumentState::Created);
                assert_eq!(to, DocumentState::Editing);
            }
            other => panic!("expected InvalidTransition, got {other:?}"),
        }
    }

    #[test]
    fn cannot_leave_terminal_state() {
        let mut sm = StateMachine::new();
        sm.transition_to(DocumentState::Rejected, None).unwrap();
        assert!(sm.transition_to(DocumentState::Researching, None).is_err());
    }

    #[test]
    fn approval_returns_to_pre_approval_state() {
        let mut sm = StateMachine::new();
        sm.transition_to(DocumentState::Researching, None).unwrap();
        sm.transition_to(DocumentState::AwaitingApproval, None).unwrap();
        sm.transition_to(DocumentState::Researching, Some("approved")).unwrap();
        assert_eq!(sm.current(), DocumentState::Researching);
    }

    #[test]
    fn approval_rejection_is_terminal() {
        let mut sm = StateMachine::new();
        sm.transition_to(DocumentState::Researching, None).unwrap();
        sm.transition_to(DocumentState::AwaitingApproval, None).unwrap();
        sm.transition_to(DocumentState::Rejected, Some("rejected")).unwrap();
        assert!(sm.is_terminal());
    }

    #[test]
    fn any_non_terminal_state_can_reject() {
        for state in [
            DocumentState::Created,
            DocumentState::Researching,
            DocumentState::Drafting,
            DocumentState::FactChecking,
            DocumentState::Editing,
            DocumentState::Critiquing,
        ] {
            let mut sm = StateMachine {
                current: state,
                pre_approval: None,
                transitions: Vec::new(),
            };
            assert!(sm.transition_to(DocumentState::Rejected, None).is_ok());
        }
    }

    #[test]
    fn next_in_happy_flow_matches_table() {
        assert_eq!(
            DocumentState::Created.next_in_happy_flow(),
            Some(DocumentState::Researching)
        );
        assert_eq!(DocumentState::Published.next_in_happy_flow(), None);
    }

    #[test]
    fn previous_for_revision_matches_table() {
        assert_eq!(
            DocumentState::FactChecking.previous_for_revision(),
            Some(DocumentState::Drafting)
        );
        assert_eq!(DocumentState::Researching.previous_for_revision(), None);
    }

    #[test]
    fn transition_record_has_timestamp_and_reason() {
        let mut sm = StateMachine::new();
        sm.transition_to(DocumentState::Researching, Some("begin")).unwrap();
        let record = &sm.transitions()[0];
        assert_eq!(record.reason.as_deref(), Some("begin"));
    }

    #[test]
    fn state_machine_serde_roundtrip() {
        let mut sm = StateMachine::new();
        sm.transition_to(DocumentState::Researching, None).unwrap();
        let json = serde_json::to_string(&sm).unwrap();
        let restored: StateMachine = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.current(), DocumentState::Researching);
    }
}
