//! Pipeline Executor (C8): drives a Document through the state machine,
//! honouring revision limits, skip flags, approvals, and failure recovery
//! (spec.md §4.8).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use pipeline_core::{
    ApprovalDecision, ApprovalGate, ApprovalRequest, AutoApprove, ConfidenceLevel, Document,
    DocumentState, Event, EventType, LlmClient, Metrics, PipelineConfig, PipelineError,
    SharedEventBus,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::agents::{self, Critic, Editor, FactChecker, Researcher, Writer};
use crate::envelope::{run_envelope, SpecialistAgent};

/// Outcome of one pipeline run (spec.md §4.8.4).
#[derive(Debug)]
pub struct PipelineResult {
    pub success: bool,
    pub document: Document,
    pub output_path: Option<PathBuf>,
    pub total_time: Duration,
    pub error_message: Option<String>,
    pub failed_at_state: Option<DocumentState>,
    pub failed_document_path: Option<PathBuf>,
}

/// Drives one document to a terminal state, wiring the LLM port, approval
/// gate, event bus, and metrics the agents and revision logic need.
pub struct Executor {
    llm: Arc<dyn LlmClient>,
    approval_gate: Arc<dyn ApprovalGate>,
    event_bus: SharedEventBus,
    metrics: Arc<Metrics>,
    config: PipelineConfig,
}

/// Which approval checkpoint (if any) follows the just-completed phase, and
/// where a `REQUEST_CHANGES` decision sends the document back to (spec.md
/// §4.6: "research→research, draft→draft, factcheck→draft,
/// pre-publish→editing").
enum ApprovalPoint {
    AfterResearch,
    AfterDraft,
    AfterFactCheck,
    BeforePublish,
}

impl ApprovalPoint {
    fn changes_target(&self) -> DocumentState {
        match self {
            ApprovalPoint::AfterResearch => DocumentState::Researching,
            ApprovalPoint::AfterDraft => DocumentState::Drafting,
            ApprovalPoint::AfterFactCheck => DocumentState::Drafting,
            ApprovalPoint::BeforePublish => DocumentState::Editing,
        }
    }
}

impl Executor {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        approval_gate: Arc<dyn ApprovalGate>,
        event_bus: SharedEventBus,
        metrics: Arc<Metrics>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            llm,
            approval_gate,
            event_bus,
            metrics,
            config,
        }
    }

    /// Convenience entry point: runs with a token the caller never cancels.
    pub async fn run(&self, document: Document) -> PipelineResult {
        self.run_with_cancellation(document, CancellationToken::new()).await
    }

    #[tracing::instrument(skip_all, fields(document_id = %document.id, topic = %document.brief.topic))]
    pub async fn run_with_cancellation(
        &self,
        mut document: Document,
        token: CancellationToken,
    ) -> PipelineResult {
        let started = Instant::now();
        self.metrics.record_pipeline_started();
        self.emit(Event::new(
            EventType::PipelineStarted,
            &document.brief.topic,
            document.id,
            "pipeline run starting",
        ));

        let mut output_path: Option<PathBuf> = None;
        // When a revision or `REQUEST_CHANGES` decision reverts the document, the
        // state machine has already landed on the phase to re-run; the next loop
        // iteration must dispatch to that phase directly rather than advancing
        // past it via `choose_next`.
        let mut forced_next: Option<DocumentState> = None;

        loop {
            if token.is_cancelled() {
                return self.finish_cancelled(document, started);
            }
            if document.is_terminal() {
                break;
            }

            let current = document.state();
            let next = match forced_next.take() {
                Some(n) => n,
                None => match choose_next(current, &self.config) {
                    Some(n) => n,
                    None => break,
                },
            };

            self.emit(
                Event::new(
                    EventType::PhaseStarted,
                    &document.brief.topic,
                    document.id,
                    format!("starting {next}"),
                )
                .with_transition(current, next),
            );

            let phase_started = Instant::now();

            if next == DocumentState::Published {
                match agents::publish(&mut document, &self.config) {
                    Ok(path) => {
                        output_path = Some(path);
                        self.metrics
                            .record_agent_invocation("publisher", phase_started.elapsed());
                    }
                    Err(e) => {
                        return self
                            .finish_agent_failure(document, current, e.to_string(), started)
                            .await;
                    }
                }
            } else {
                // A revision or approval revert already lands the document on
                // `next` itself (see `apply_review_decisions`/
                // `maybe_request_approval`); only the happy-path advance still
                // needs a transition performed here.
                if document.state() != next {
                    if let Err(e) = document.transition_to(next, None) {
                        return self.finish_agent_failure(document, current, e.to_string(), started).await;
                    }
                }

                let agent = agent_for(next);
                if let Err(e) = run_envelope(agent.as_ref(), &self.llm, &mut document, &self.config, &token).await
                {
                    self.metrics
                        .record_agent_invocation(&next.to_string().to_lowercase(), phase_started.elapsed());
                    return self.finish_agent_failure(document, next, e.to_string(), started).await;
                }
                self.metrics
                    .record_agent_invocation(&next.to_string().to_lowercase(), phase_started.elapsed());
            }

            self.emit(Event::new(
                EventType::PhaseCompleted,
                &document.brief.topic,
                document.id,
                format!("completed {next}"),
            ));

            if next == DocumentState::Published {
                continue;
            }

            match self.apply_review_decisions(&mut document, next) {
                ReviewOutcome::Reverted(target) => {
                    forced_next = Some(target);
                    continue;
                }
                ReviewOutcome::Rejected(reason) => {
                    return self.finish_rejected(document, next, reason, started);
                }
                ReviewOutcome::Proceed => {}
            }

            match self.maybe_request_approval(&mut document, next, &token).await {
                Ok(ApprovalOutcome::Continue) => {}
                Ok(ApprovalOutcome::Reverted(target)) => {
                    forced_next = Some(target);
                    continue;
                }
                Ok(ApprovalOutcome::Rejected(reason)) => {
                    return self.finish_rejected(document, DocumentState::AwaitingApproval, reason, started);
                }
                Err(e) => {
                    return self
                        .finish_agent_failure(document, DocumentState::AwaitingApproval, e.to_string(), started)
                        .await;
                }
            }
        }

        self.metrics.record_pipeline_completed(started.elapsed());
        self.emit(Event::new(
            EventType::PipelineCompleted,
            &document.brief.topic,
            document.id,
            "pipeline run completed",
        ));

        PipelineResult {
            success: true,
            document,
            output_path,
            total_time: started.elapsed(),
            error_message: None,
            failed_at_state: None,
            failed_document_path: None,
        }
    }

    fn apply_review_decisions(&self, document: &mut Document, next: DocumentState) -> ReviewOutcome {
        match next {
            DocumentState::FactChecking => self.apply_fact_check_decision(document),
            DocumentState::Critiquing => self.apply_critique_decision(document),
            _ => ReviewOutcome::Proceed,
        }
    }

    fn apply_fact_check_decision(&self, document: &mut Document) -> ReviewOutcome {
        let report = match &document.fact_check_report {
            Some(r) => r.clone(),
            None => return ReviewOutcome::Proceed,
        };

        if report.recommended_action == pipeline_core::RecommendedAction::Reject {
            return ReviewOutcome::Rejected("fact checker rejected the draft".into());
        }

        let min_confidence: ConfidenceLevel = self.config.minimum_confidence.parse().unwrap_or(ConfidenceLevel::Medium);
        let should_revise = report.recommended_action == pipeline_core::RecommendedAction::Revise
            || report.overall_confidence < min_confidence
            || (self.config.require_verified_claims && report.verified_claims.is_empty());

        if !should_revise {
            return ReviewOutcome::Proceed;
        }

        if document.total_revisions() < self.config.max_revision_cycles {
            document.bump_revision("fact_checking->drafting");
            self.metrics.record_revision_cycle();
            if let Err(e) = document.transition_to(DocumentState::Drafting, Some("revise")) {
                return ReviewOutcome::Rejected(e.to_string());
            }
            self.emit(Event::new(
                EventType::RevisionStarted,
                &document.brief.topic,
                document.id,
                "reverting to drafting after fact check",
            ));
            ReviewOutcome::Reverted(DocumentState::Drafting)
        } else {
            self.emit(Event::new(
                EventType::Warning,
                &document.brief.topic,
                document.id,
                "revision budget exhausted after fact check, proceeding to editing",
            ));
            ReviewOutcome::Proceed
        }
    }

    fn apply_critique_decision(&self, document: &mut Document) -> ReviewOutcome {
        let report = match &document.critic_report {
            Some(r) => r.clone(),
            None => return ReviewOutcome::Proceed,
        };

        if report.recommended_action == pipeline_core::RecommendedAction::Reject {
            return ReviewOutcome::Rejected("critic rejected the article".into());
        }
        if report.recommended_action != pipeline_core::RecommendedAction::Revise {
            return ReviewOutcome::Proceed;
        }

        if document.total_revisions() >= self.config.max_revision_cycles {
            self.emit(Event::new(
                EventType::Warning,
                &document.brief.topic,
                document.id,
                "revision budget exhausted after critique, proceeding to publish",
            ));
            return ReviewOutcome::Proceed;
        }

        let (edge, target) = if report.has_primarily_syntax_issues() {
            ("critiquing->editing", DocumentState::Editing)
        } else {
            ("critiquing->drafting", DocumentState::Drafting)
        };

        document.bump_revision(edge);
        self.metrics.record_revision_cycle();
        if let Err(e) = document.transition_to(target, Some("revise")) {
            return ReviewOutcome::Rejected(e.to_string());
        }
        self.emit(Event::new(
            EventType::RevisionStarted,
            &document.brief.topic,
            document.id,
            format!("reverting to {target} after critique"),
        ));
        ReviewOutcome::Reverted(target)
    }

    async fn maybe_request_approval(
        &self,
        document: &mut Document,
        next: DocumentState,
        token: &CancellationToken,
    ) -> Result<ApprovalOutcome, PipelineError> {
        let point = match approval_point_for(next, &self.config) {
            Some(p) => p,
            None => return Ok(ApprovalOutcome::Continue),
        };

        let pre_state = document.state();
        document.transition_to(DocumentState::AwaitingApproval, None)?;
        self.metrics.record_approval_requested();
        self.emit(Event::new(
            EventType::ApprovalRequested,
            &document.brief.topic,
            document.id,
            format!("approval requested at {pre_state}"),
        ));

        let request = ApprovalRequest {
            document_id: document.id,
            at_state: pre_state,
            summary: format!("{pre_state} complete for \"{}\"", document.brief.topic),
            content_preview: document.last_produced_content().unwrap_or("").chars().take(400).collect(),
        };

        let decision = tokio::select! {
            _ = token.cancelled() => return Err(PipelineError::Cancelled("cancelled during approval".into())),
            d = self.approval_gate.request(&request, self.config.approval_timeout) => d?,
        };

        self.emit(Event::new(
            EventType::ApprovalReceived,
            &document.brief.topic,
            document.id,
            format!("approval decision: {decision:?}"),
        ));

        match decision {
            ApprovalDecision::Approve => {
                self.metrics.record_approval_granted();
                document.transition_to(pre_state, Some("approved"))?;
                Ok(ApprovalOutcome::Continue)
            }
            ApprovalDecision::RequestChanges => {
                self.metrics.record_approval_granted();
                let target = point.changes_target();
                document.bump_revision(&format!("approval({pre_state})->{target}"));
                self.metrics.record_revision_cycle();
                // The state machine only allows AWAITING_APPROVAL to return to the
                // phase it was parked from; reach `target` in a second hop when the
                // mapped revision edge (e.g. factcheck->draft) isn't that phase.
                document.transition_to(pre_state, Some("requested changes"))?;
                if target != pre_state {
                    document.transition_to(target, Some("requested changes"))?;
                }
                self.emit(Event::new(
                    EventType::RevisionStarted,
                    &document.brief.topic,
                    document.id,
                    format!("approval requested changes, reverting to {target}"),
                ));
                Ok(ApprovalOutcome::Reverted(target))
            }
            ApprovalDecision::Reject(reason) => {
                self.metrics.record_approval_rejected();
                let reason = reason.unwrap_or(request.summary);
                Ok(ApprovalOutcome::Rejected(reason))
            }
        }
    }

    async fn finish_agent_failure(
        &self,
        mut document: Document,
        failed_at: DocumentState,
        reason: String,
        started: Instant,
    ) -> PipelineResult {
        let failed_document_path = persist_failure_document(&document, &self.config, &reason);
        self.metrics.record_pipeline_failed(failed_at, started.elapsed());
        let _ = document.transition_to(DocumentState::Rejected, Some(&reason));
        self.emit(Event::new(
            EventType::PipelineFailed,
            &document.brief.topic,
            document.id,
            reason.clone(),
        ));

        PipelineResult {
            success: false,
            document,
            output_path: None,
            total_time: started.elapsed(),
            error_message: Some(reason),
            failed_at_state: Some(failed_at),
            failed_document_path,
        }
    }

    fn finish_rejected(
        &self,
        mut document: Document,
        failed_at: DocumentState,
        reason: String,
        started: Instant,
    ) -> PipelineResult {
        self.metrics.record_pipeline_failed(failed_at, started.elapsed());
        let _ = document.transition_to(DocumentState::Rejected, Some(&reason));
        self.emit(Event::new(
            EventType::PipelineFailed,
            &document.brief.topic,
            document.id,
            reason.clone(),
        ));

        PipelineResult {
            success: false,
            document,
            output_path: None,
            total_time: started.elapsed(),
            error_message: Some(reason),
            failed_at_state: Some(failed_at),
            failed_document_path: None,
        }
    }

    fn finish_cancelled(&self, mut document: Document, started: Instant) -> PipelineResult {
        let failed_at = document.state();
        self.metrics.record_pipeline_failed(failed_at, started.elapsed());
        let _ = document.transition_to(DocumentState::Rejected, Some("cancelled"));
        self.emit(Event::new(
            EventType::PipelineFailed,
            &document.brief.topic,
            document.id,
            "cancelled",
        ));

        PipelineResult {
            success: false,
            document,
            output_path: None,
            total_time: started.elapsed(),
            error_message: Some("cancelled".into()),
            failed_at_state: Some(failed_at),
            failed_document_path: None,
        }
    }

    fn emit(&self, event: Event) {
        info!(event_type = %event.event_type, "{}", event.message);
        self.event_bus.emit(event);
    }
}

enum ReviewOutcome {
    Proceed,
    Reverted(DocumentState),
    Rejected(String),
}

enum ApprovalOutcome {
    Continue,
    Reverted(DocumentState),
    Rejected(String),
}

/// Default executor: `AutoApprove` gate, a fresh `EventBus`/`Metrics` pair.
impl Executor {
    pub fn with_defaults(llm: Arc<dyn LlmClient>, config: PipelineConfig) -> Self {
        Self::new(
            llm,
            Arc::new(AutoApprove),
            pipeline_core::EventBus::shared(),
            Arc::new(Metrics::new()),
            config,
        )
    }
}

/// The happy-path successor of `current`, honouring `skip_fact_check` and
/// `skip_critique` (spec.md §4.8.1). `None` once a terminal state is
/// reached or while parked in `AWAITING_APPROVAL` (the executor never calls
/// this while parked there; approval transitions are handled separately).
fn choose_next(current: DocumentState, config: &PipelineConfig) -> Option<DocumentState> {
    match current {
        DocumentState::Drafting if config.skip_fact_check => Some(DocumentState::Editing),
        DocumentState::Editing if config.skip_critique => Some(DocumentState::Published),
        other => other.next_in_happy_flow(),
    }
}

fn agent_for(state: DocumentState) -> Box<dyn SpecialistAgent> {
    match state {
        DocumentState::Researching => Box::new(Researcher),
        DocumentState::Drafting => Box::new(Writer),
        DocumentState::FactChecking => Box::new(FactChecker),
        DocumentState::Editing => Box::new(Editor),
        DocumentState::Critiquing => Box::new(Critic),
        other => unreachable!("no LLM-backed agent for state {other}"),
    }
}

fn approval_point_for(completed: DocumentState, config: &PipelineConfig) -> Option<ApprovalPoint> {
    match completed {
        DocumentState::Researching if config.approve_after_research => Some(ApprovalPoint::AfterResearch),
        DocumentState::Drafting if config.approve_after_draft => Some(ApprovalPoint::AfterDraft),
        DocumentState::FactChecking if config.approve_after_fact_check => Some(ApprovalPoint::AfterFactCheck),
        DocumentState::Critiquing if config.approve_before_publish => Some(ApprovalPoint::BeforePublish),
        DocumentState::Editing if config.skip_critique && config.approve_before_publish => {
            Some(ApprovalPoint::BeforePublish)
        }
        _ => None,
    }
}

/// On `AgentFailure`, dump the last produced content to
/// `<outputDir>/failed-<topic>-<timestamp>.<ext>` (spec.md §4.8.3).
fn persist_failure_document(document: &Document, config: &PipelineConfig, reason: &str) -> Option<PathBuf> {
    let content = document.last_produced_content()?;
    let dir = PathBuf::from(&config.output_dir);
    if std::fs::create_dir_all(&dir).is_err() {
        return None;
    }
    let timestamp = document.created_at.timestamp();
    let filename = format!("failed-{}-{timestamp}.{}", agents::page_name(&document.brief.topic), config.output_extension);
    let path = dir.join(filename);
    let dump = format!("# Failure: {reason}\n\n{content}");
    std::fs::write(&path, dump).ok()?;
    warn!(path = %path.display(), reason, "persisted failure document");
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline_core::{Brief, EventBus, ExternalApproval, MockLlm};
    use std::sync::Mutex;

    fn brief() -> Brief {
        Brief {
            topic: "Git branching strategies".into(),
            audience: "devs".into(),
            target_word_count: 800,
            required_sections: vec![],
            related_pages: vec![],
        }
    }

    fn research_json() -> String {
        serde_json::json!({
            "key_facts": [
                {"text": "a", "source": null}, {"text": "b", "source": null},
                {"text": "c", "source": null}, {"text": "d", "source": null}, {"text": "e", "source": null},
            ],
            "suggested_outline": ["Intro", "Trunk-based", "Feature branches"],
            "related_pages": [],
        })
        .to_string()
    }

    fn draft_json(words: usize) -> String {
        serde_json::json!({
            "wiki_content": vec!["word"; words].join(" "),
            "summary": "s",
            "categories": [],
            "metadata": {},
        })
        .to_string()
    }

    fn fact_check_json(action: &str, confidence: &str) -> String {
        serde_json::json!({
            "verified_claims": ["a"],
            "questionable_claims": [],
            "consistency_issues": [],
            "overall_confidence": confidence,
            "recommended_action": action,
        })
        .to_string()
    }

    fn final_article_json(score: f64) -> String {
        serde_json::json!({
            "wiki_content": "Final content with enough words to pass.",
            "metadata": {},
            "edit_summary": "cleanup",
            "quality_score": score,
            "added_links": [],
        })
        .to_string()
    }

    fn critic_json(action: &str) -> String {
        serde_json::json!({
            "overall_score": 0.85, "structure_score": 0.9, "syntax_score": 0.9, "readability_score": 0.8,
            "structure_issues": [], "syntax_issues": [], "style_issues": [], "suggestions": [],
            "recommended_action": action,
        })
        .to_string()
    }

    fn executor_with(responses: Vec<String>, config: PipelineConfig) -> (Executor, Arc<Mutex<Vec<String>>>) {
        let llm: Arc<dyn LlmClient> = Arc::new(MockLlm::new(responses));
        let events: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let bus = EventBus::shared();
        {
            let events = events.clone();
            bus.register(Arc::new(move |e: &pipeline_core::Event| {
                events.lock().unwrap().push(e.event_type.to_string());
                Ok(())
            }));
        }
        let executor = Executor::new(llm, Arc::new(AutoApprove), bus, Arc::new(Metrics::new()), config);
        (executor, events)
    }

    #[tokio::test]
    async fn happy_path_skip_both_phases() {
        let mut config = PipelineConfig::default();
        config.skip_fact_check = true;
        config.skip_critique = true;
        config.output_dir = tempfile::tempdir().unwrap().into_path().to_string_lossy().to_string();

        let (executor, _events) = executor_with(
            vec![research_json(), draft_json(1200), final_article_json(0.85)],
            config,
        );

        let result = executor.run(Document::new(brief())).await;
        assert!(result.success, "{:?}", result.error_message);
        assert_eq!(result.document.state(), DocumentState::Published);
        assert_eq!(result.document.total_revisions(), 0);
        assert!(result.output_path.is_some());
    }

    #[tokio::test]
    async fn one_revision_cycle_on_fact_check_revise() {
        let config = PipelineConfig::default();
        let output_dir = tempfile::tempdir().unwrap().into_path().to_string_lossy().to_string();
        let mut config = config;
        config.output_dir = output_dir;

        let (executor, events) = executor_with(
            vec![
                research_json(),
                draft_json(800),
                fact_check_json("REVISE", "LOW"),
                draft_json(800),
                fact_check_json("APPROVE", "MEDIUM"),
                final_article_json(0.9),
                critic_json("APPROVE"),
            ],
            config,
        );

        let result = executor.run(Document::new(brief())).await;
        assert!(result.success, "{:?}", result.error_message);
        assert_eq!(result.document.total_revisions(), 1);
        assert_eq!(result.document.state(), DocumentState::Published);
        assert_eq!(events.lock().unwrap().iter().filter(|e| *e == "REVISION_STARTED").count(), 1);
    }

    #[tokio::test]
    async fn revision_budget_exhausted_still_publishes_with_warning() {
        let mut config = PipelineConfig::default();
        config.max_revision_cycles = 2;
        config.output_dir = tempfile::tempdir().unwrap().into_path().to_string_lossy().to_string();

        let (executor, events) = executor_with(
            vec![
                research_json(),
                draft_json(800),
                fact_check_json("REVISE", "LOW"),
                draft_json(800),
                fact_check_json("REVISE", "LOW"),
                draft_json(800),
                fact_check_json("REVISE", "LOW"),
                final_article_json(0.9),
                critic_json("APPROVE"),
            ],
            config,
        );

        let result = executor.run(Document::new(brief())).await;
        assert!(result.success, "{:?}", result.error_message);
        assert_eq!(result.document.total_revisions(), 2);
        let log = events.lock().unwrap();
        assert_eq!(log.iter().filter(|e| *e == "REVISION_STARTED").count(), 2);
        assert!(log.iter().any(|e| e == "WARNING"));
    }

    #[tokio::test]
    async fn editor_quality_below_threshold_fails_after_retries() {
        let mut config = PipelineConfig::default();
        config.skip_fact_check = true;
        config.skip_critique = true;
        config.output_dir = tempfile::tempdir().unwrap().into_path().to_string_lossy().to_string();

        let low_quality = final_article_json(0.4);
        let (executor, _events) = executor_with(
            vec![research_json(), draft_json(800), low_quality.clone(), low_quality.clone(), low_quality],
            config,
        );

        let result = executor.run(Document::new(brief())).await;
        assert!(!result.success);
        assert_eq!(result.document.state(), DocumentState::Rejected);
        assert_eq!(result.failed_at_state, Some(DocumentState::Editing));
        assert!(result.failed_document_path.is_some());
    }

    #[tokio::test]
    async fn approval_rejection_ends_pipeline_with_no_output() {
        let mut config = PipelineConfig::default();
        config.skip_fact_check = true;
        config.skip_critique = true;
        config.approve_before_publish = true;
        config.output_dir = tempfile::tempdir().unwrap().into_path().to_string_lossy().to_string();

        let llm: Arc<dyn LlmClient> = Arc::new(MockLlm::new(vec![
            research_json(),
            draft_json(800),
            final_article_json(0.9),
        ]));
        let gate: Arc<dyn ApprovalGate> = Arc::new(ExternalApproval::new(|_req| {
            Box::pin(async { Ok(ApprovalDecision::Reject(Some("not good enough".to_string()))) })
        }));
        let executor = Executor::new(llm, gate, EventBus::shared(), Arc::new(Metrics::new()), config);

        let result = executor.run(Document::new(brief())).await;
        assert!(!result.success);
        assert_eq!(result.document.state(), DocumentState::Rejected);
        assert!(result.output_path.is_none());
        assert!(result.error_message.unwrap().contains("not good enough"));
    }

    #[tokio::test]
    async fn llm_failure_then_recovery_within_retry_budget() {
        let mut config = PipelineConfig::default();
        config.skip_fact_check = true;
        config.skip_critique = true;
        config.output_dir = tempfile::tempdir().unwrap().into_path().to_string_lossy().to_string();

        let (executor, _events) = executor_with(
            vec![
                "not valid json at all".to_string(),
                research_json(),
                draft_json(800),
                final_article_json(0.9),
            ],
            config,
        );

        let result = executor.run(Document::new(brief())).await;
        assert!(result.success, "{:?}", result.error_message);
        let researcher_contribution = result
            .document
            .contributions()
            .iter()
            .find(|c| c.agent_role == "researcher")
            .unwrap();
        assert!(researcher_contribution.summary.contains("attempt 2"));
    }
}
