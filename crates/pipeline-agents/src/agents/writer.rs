//! Writer specialist: research brief -> `ArticleDraft` (spec.md §4.5).

use pipeline_core::{ArticleDraft, Document, PipelineConfig, PipelineError};

use crate::envelope::{AgentArtifact, AgentRole, SpecialistAgent};
use crate::prompts::WRITER_PREAMBLE;

pub struct Writer;

impl SpecialistAgent for Writer {
    fn role(&self) -> AgentRole {
        AgentRole::Writer
    }

    fn temperature(&self) -> f32 {
        0.7
    }

    fn system_prompt(&self) -> &str {
        WRITER_PREAMBLE
    }

    fn build_user_prompt(&self, document: &Document) -> String {
        let brief = &document.brief;
        let research = document
            .research_brief
            .as_ref()
            .map(|r| {
                format!(
                    "Key facts:\n{}\nSuggested outline: {:?}",
                    r.key_facts
                        .iter()
                        .map(|f| format!("- {}", f.text))
                        .collect::<Vec<_>>()
                        .join("\n"),
                    r.suggested_outline
                )
            })
            .unwrap_or_else(|| "No research brief available.".to_string());

        format!(
            "Topic: {}\nAudience: {}\nTarget word count: {}\nRequired sections: {:?}\n\n{research}",
            brief.topic, brief.audience, brief.target_word_count, brief.required_sections,
        )
    }

    fn parse(&self, raw: &serde_json::Value) -> Result<AgentArtifact, PipelineError> {
        let draft: ArticleDraft = serde_json::from_value(raw.clone())
            .map_err(|e| PipelineError::MissingField(e.to_string()))?;
        Ok(AgentArtifact::Draft(draft))
    }

    fn validate(
        &self,
        artifact: &AgentArtifact,
        document: &Document,
        _config: &PipelineConfig,
    ) -> Result<(), PipelineError> {
        let AgentArtifact::Draft(draft) = artifact else {
            unreachable!("writer always produces AgentArtifact::Draft");
        };
        validate_against_brief(draft, document)
    }

    fn apply(&self, artifact: AgentArtifact, document: &mut Document) -> Result<(), PipelineError> {
        let AgentArtifact::Draft(draft) = artifact else {
            unreachable!("writer always produces AgentArtifact::Draft");
        };
        document.set_draft(draft)
    }
}

/// Word-count-within-30% and required-sections-present checks against the
/// brief (spec.md §4.5 Writer validator).
fn validate_against_brief(draft: &ArticleDraft, document: &Document) -> Result<(), PipelineError> {
    if draft.wiki_content.trim().is_empty() {
        return Err(PipelineError::ValidationFailed("draft content is blank".into()));
    }

    let word_count = draft.wiki_content.split_whitespace().count() as f64;
    let target = document.brief.target_word_count as f64;
    if target > 0.0 {
        let deviation = (word_count - target).abs() / target;
        if deviation > 0.30 {
            return Err(PipelineError::ValidationFailed(format!(
                "word count {word_count} deviates {:.0}% from target {target} (max 30%)",
                deviation * 100.0
            )));
        }
    }

    let content_lower = draft.wiki_content.to_lowercase();
    for section in &document.brief.required_sections {
        if !content_lower.contains(&section.to_lowercase()) {
            return Err(PipelineError::ValidationFailed(format!(
                "required section `{section}` missing from draft"
            )));
        }
    }

    Ok(())
}
