//! FactChecker specialist: draft -> `FactCheckReport` (spec.md §4.5).

use pipeline_core::{Document, FactCheckReport, PipelineConfig, PipelineError, RecommendedAction};

use crate::envelope::{AgentArtifact, AgentRole, SpecialistAgent};
use crate::prompts::FACT_CHECKER_PREAMBLE;

pub struct FactChecker;

impl SpecialistAgent for FactChecker {
    fn role(&self) -> AgentRole {
        AgentRole::FactChecker
    }

    fn temperature(&self) -> f32 {
        0.1
    }

    fn system_prompt(&self) -> &str {
        FACT_CHECKER_PREAMBLE
    }

    fn build_user_prompt(&self, document: &Document) -> String {
        let draft_content = document
            .draft
            .as_ref()
            .map(|d| d.wiki_content.as_str())
            .unwrap_or("(no draft)");
        let facts = document
            .research_brief
            .as_ref()
            .map(|r| {
                r.key_facts
                    .iter()
                    .map(|f| format!("- {}", f.text))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default();

        format!("Draft:\n{draft_content}\n\nResearch key facts:\n{facts}")
    }

    fn parse(&self, raw: &serde_json::Value) -> Result<AgentArtifact, PipelineError> {
        let report: FactCheckReport = serde_json::from_value(raw.clone())
            .map_err(|e| PipelineError::MissingField(e.to_string()))?;
        Ok(AgentArtifact::FactCheck(report))
    }

    fn validate(
        &self,
        artifact: &AgentArtifact,
        _document: &Document,
        config: &PipelineConfig,
    ) -> Result<(), PipelineError> {
        let AgentArtifact::FactCheck(report) = artifact else {
            unreachable!("fact checker always produces AgentArtifact::FactCheck");
        };
        if config.require_verified_claims
            && report.verified_claims.is_empty()
            && report.recommended_action == RecommendedAction::Approve
        {
            return Err(PipelineError::ValidationFailed(
                "require_verified_claims is set but no claims were verified for an APPROVE recommendation".into(),
            ));
        }
        Ok(())
    }

    fn apply(&self, artifact: AgentArtifact, document: &mut Document) -> Result<(), PipelineError> {
        let AgentArtifact::FactCheck(report) = artifact else {
            unreachable!("fact checker always produces AgentArtifact::FactCheck");
        };
        document.set_fact_check_report(report)
    }
}
