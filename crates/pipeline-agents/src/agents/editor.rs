//! Editor specialist: draft + fact-check report -> `FinalArticle` (spec.md §4.5).

use pipeline_core::{clamp_score, Document, FinalArticle, PipelineConfig, PipelineError};

use crate::envelope::{AgentArtifact, AgentRole, SpecialistAgent};
use crate::prompts::EDITOR_PREAMBLE;

pub struct Editor;

impl SpecialistAgent for Editor {
    fn role(&self) -> AgentRole {
        AgentRole::Editor
    }

    fn temperature(&self) -> f32 {
        0.5
    }

    fn system_prompt(&self) -> &str {
        EDITOR_PREAMBLE
    }

    fn build_user_prompt(&self, document: &Document) -> String {
        let draft_content = document
            .draft
            .as_ref()
            .map(|d| d.wiki_content.as_str())
            .unwrap_or("(no draft)");

        let issues = document
            .fact_check_report
            .as_ref()
            .map(|r| {
                r.questionable_claims
                    .iter()
                    .map(|c| format!("- {}: {}", c.claim, c.issue))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_else(|| "(no fact-check issues)".to_string());

        let suggested_links = document.brief.related_pages.join(", ");

        format!(
            "Draft:\n{draft_content}\n\nFact-check issues:\n{issues}\n\nSuggested internal links: {suggested_links}",
        )
    }

    fn parse(&self, raw: &serde_json::Value) -> Result<AgentArtifact, PipelineError> {
        let mut article: FinalArticle = serde_json::from_value(raw.clone())
            .map_err(|e| PipelineError::MissingField(e.to_string()))?;
        article.quality_score = clamp_score(article.quality_score);
        Ok(AgentArtifact::Edited(article))
    }

    fn validate(
        &self,
        artifact: &AgentArtifact,
        _document: &Document,
        config: &PipelineConfig,
    ) -> Result<(), PipelineError> {
        let AgentArtifact::Edited(article) = artifact else {
            unreachable!("editor always produces AgentArtifact::Edited");
        };
        if article.wiki_content.trim().is_empty() {
            return Err(PipelineError::ValidationFailed("edited content is blank".into()));
        }
        if article.quality_score < config.min_editor_score {
            return Err(PipelineError::ValidationFailed(format!(
                "quality_score {} below minimum {}",
                article.quality_score, config.min_editor_score
            )));
        }
        Ok(())
    }

    fn apply(&self, artifact: AgentArtifact, document: &mut Document) -> Result<(), PipelineError> {
        let AgentArtifact::Edited(article) = artifact else {
            unreachable!("editor always produces AgentArtifact::Edited");
        };
        document.set_final_article(article)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline_core::Brief;

    fn document() -> Document {
        Document::new(Brief {
            topic: "t".into(),
            audience: "a".into(),
            target_word_count: 10,
            required_sections: vec![],
            related_pages: vec!["Related Page".into()],
        })
    }

    fn article(content: &str, score: f64) -> FinalArticle {
        FinalArticle {
            wiki_content: content.into(),
            metadata: Default::default(),
            edit_summary: "cleanup".into(),
            quality_score: score,
            added_links: vec![],
        }
    }

    #[test]
    fn rejects_blank_content() {
        let agent = Editor;
        let doc = document();
        let artifact = AgentArtifact::Edited(article("   ", 0.9));
        assert!(agent.validate(&artifact, &doc, &PipelineConfig::default()).is_err());
    }

    #[test]
    fn rejects_quality_score_below_threshold() {
        let agent = Editor;
        let doc = document();
        let artifact = AgentArtifact::Edited(article("content", 0.5));
        assert!(agent.validate(&artifact, &doc, &PipelineConfig::default()).is_err());
    }

    #[test]
    fn accepts_quality_score_at_threshold() {
        let agent = Editor;
        let doc = document();
        let artifact = AgentArtifact::Edited(article("content", 0.7));
        assert!(agent.validate(&artifact, &doc, &PipelineConfig::default()).is_ok());
    }

    #[test]
    fn parse_clamps_out_of_range_quality_score() {
        let agent = Editor;
        let raw = serde_json::json!({
            "wiki_content": "content",
            "metadata": {},
            "edit_summary": "cleanup",
            "quality_score": 1.8,
            "added_links": [],
        });
        let AgentArtifact::Edited(article) = agent.parse(&raw).unwrap() else {
            panic!("expected Edited artifact");
        };
        assert_eq!(article.quality_score, 1.0);
    }
}
