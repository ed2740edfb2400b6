//! Critic specialist: final article -> `CriticReport` (spec.md §4.5).

use pipeline_core::{clamp_score, CriticReport, Document, PipelineConfig, PipelineError};

use crate::envelope::{AgentArtifact, AgentRole, SpecialistAgent};
use crate::prompts::CRITIC_PREAMBLE;

pub struct Critic;

impl SpecialistAgent for Critic {
    fn role(&self) -> AgentRole {
        AgentRole::Critic
    }

    fn temperature(&self) -> f32 {
        0.3
    }

    fn system_prompt(&self) -> &str {
        CRITIC_PREAMBLE
    }

    fn build_user_prompt(&self, document: &Document) -> String {
        let content = document
            .final_article
            .as_ref()
            .map(|a| a.wiki_content.as_str())
            .or_else(|| document.draft.as_ref().map(|d| d.wiki_content.as_str()))
            .unwrap_or("(no content)");
        format!("Article:\n{content}")
    }

    fn parse(&self, raw: &serde_json::Value) -> Result<AgentArtifact, PipelineError> {
        let mut report: CriticReport = serde_json::from_value(raw.clone())
            .map_err(|e| PipelineError::MissingField(e.to_string()))?;
        report.overall_score = clamp_score(report.overall_score);
        report.structure_score = clamp_score(report.structure_score);
        report.syntax_score = clamp_score(report.syntax_score);
        report.readability_score = clamp_score(report.readability_score);
        Ok(AgentArtifact::Critique(report))
    }

    fn validate(
        &self,
        artifact: &AgentArtifact,
        _document: &Document,
        _config: &PipelineConfig,
    ) -> Result<(), PipelineError> {
        let AgentArtifact::Critique(_) = artifact else {
            unreachable!("critic always produces AgentArtifact::Critique");
        };
        Ok(())
    }

    fn apply(&self, artifact: AgentArtifact, document: &mut Document) -> Result<(), PipelineError> {
        let AgentArtifact::Critique(report) = artifact else {
            unreachable!("critic always produces AgentArtifact::Critique");
        };
        document.set_critic_report(report)
    }
}
