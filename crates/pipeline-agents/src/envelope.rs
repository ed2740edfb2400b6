//! The agent execution envelope shared by every specialist (spec.md §4.4).
//!
//! Prompt assembly, a single LLM call, JSON extraction, field parsing,
//! validation, and a bounded retry loop with corrective reprompting all
//! live here so each specialist only supplies its prompt/parser/validator.

use std::sync::Arc;
use std::time::{Duration, Instant};

use pipeline_core::{
    extract_json, Contribution, Document, LlmClient, PipelineConfig, PipelineError,
};
use tokio_util::sync::CancellationToken;

/// Extra attempts beyond the first (spec.md §4.4 step 6: "K=2 extra
/// attempts, total 3").
const MAX_EXTRA_ATTEMPTS: u32 = 2;

/// Fixed, non-exponential backoff between retry attempts.
const RETRY_BACKOFF: Duration = Duration::from_secs(2);

/// Which specialist role produced a contribution or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentRole {
    Researcher,
    Writer,
    FactChecker,
    Editor,
    Critic,
    Publisher,
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AgentRole::Researcher => "researcher",
            AgentRole::Writer => "writer",
            AgentRole::FactChecker => "fact_checker",
            AgentRole::Editor => "editor",
            AgentRole::Critic => "critic",
            AgentRole::Publisher => "publisher",
        };
        write!(f, "{s}")
    }
}

/// The parsed, validated payload one specialist produces. An enum rather
/// than a trait associated type so the envelope and executor can handle
/// every specialist through one object-safe `SpecialistAgent` trait.
#[derive(Debug, Clone)]
pub enum AgentArtifact {
    Research(pipeline_core::ResearchBrief),
    Draft(pipeline_core::ArticleDraft),
    FactCheck(pipeline_core::FactCheckReport),
    Edited(pipeline_core::FinalArticle),
    Critique(pipeline_core::CriticReport),
}

/// One LLM-backed specialist: fixed system prompt, temperature, and its own
/// prompt builder / parser / validator / apply step.
pub trait SpecialistAgent: Send + Sync {
    fn role(&self) -> AgentRole;
    fn temperature(&self) -> f32;
    fn system_prompt(&self) -> &str;
    fn build_user_prompt(&self, document: &Document) -> String;
    fn parse(&self, raw: &serde_json::Value) -> Result<AgentArtifact, PipelineError>;
    fn validate(
        &self,
        artifact: &AgentArtifact,
        document: &Document,
        config: &PipelineConfig,
    ) -> Result<(), PipelineError>;
    fn apply(&self, artifact: AgentArtifact, document: &mut Document) -> Result<(), PipelineError>;
}

/// Run one specialist's envelope end to end: assemble the prompt, call the
/// LLM, extract and validate the JSON payload, retrying on failure, then
/// write the artifact to `document` and record a contribution.
pub async fn run_envelope(
    agent: &dyn SpecialistAgent,
    llm: &Arc<dyn LlmClient>,
    document: &mut Document,
    config: &PipelineConfig,
    token: &CancellationToken,
) -> Result<(), PipelineError> {
    let role = agent.role();
    let user_prompt = agent.build_user_prompt(document);
    let system_prompt = agent.system_prompt().to_string();
    let started_at = chrono::Utc::now();
    let start = Instant::now();

    let mut last_response = String::new();
    let mut last_reason = String::new();
    let mut correction: Option<String> = None;

    for attempt in 1..=(MAX_EXTRA_ATTEMPTS + 1) {
        let prompt = match &correction {
            Some(note) => format!(
                "{user_prompt}\n\n## Correction needed\nYour previous response was invalid: {note}\nPrevious response:\n{last_response}\n\nRespond again with a corrected JSON object only.",
            ),
            None => user_prompt.clone(),
        };

        tracing::debug!(role = %role, attempt, "invoking agent");

        let call_result = llm
            .generate(&system_prompt, &prompt, agent.temperature(), config.phase_timeout, token)
            .await;

        let response = match call_result {
            Ok(r) => r,
            Err(e) if e.is_retryable() && attempt <= MAX_EXTRA_ATTEMPTS => {
                last_reason = e.to_string();
                tracing::warn!(role = %role, attempt, error = %last_reason, "llm call failed, retrying");
                tokio::time::sleep(RETRY_BACKOFF).await;
                continue;
            }
            Err(e) => return Err(agent_failure(role, attempt, e.to_string(), last_response)),
        };
        last_response = response.clone();

        let parsed = extract_json(&response).and_then(|value| agent.parse(&value));
        let artifact = match parsed {
            Ok(artifact) => artifact,
            Err(e) => {
                last_reason = e.to_string();
                if attempt <= MAX_EXTRA_ATTEMPTS {
                    tracing::warn!(role = %role, attempt, error = %last_reason, "response parse failed, retrying");
                    correction = Some(last_reason.clone());
                    tokio::time::sleep(RETRY_BACKOFF).await;
                    continue;
                }
                return Err(agent_failure(role, attempt, last_reason, last_response));
            }
        };

        if let Err(e) = agent.validate(&artifact, document, config) {
            last_reason = e.to_string();
            if attempt <= MAX_EXTRA_ATTEMPTS {
                tracing::warn!(role = %role, attempt, error = %last_reason, "validation failed, retrying");
                correction = Some(last_reason.clone());
                tokio::time::sleep(RETRY_BACKOFF).await;
                continue;
            }
            return Err(agent_failure(role, attempt, last_reason, last_response));
        }

        agent.apply(artifact, document)?;
        document.record_contribution(Contribution {
            agent_role: role.to_string(),
            started_at,
            duration: start.elapsed(),
            metrics: Default::default(),
            summary: format!("attempt {attempt}, response length {}", response.len()),
        })?;
        return Ok(());
    }

    Err(agent_failure(role, MAX_EXTRA_ATTEMPTS + 1, last_reason, last_response))
}

fn agent_failure(role: AgentRole, attempts: u32, reason: String, last_response: String) -> PipelineError {
    PipelineError::AgentFailure {
        role: role.to_string(),
        attempts,
        reason,
        last_response,
    }
}
