//! Researcher specialist: brief -> `ResearchBrief` (spec.md §4.5).

use pipeline_core::{Document, PipelineConfig, PipelineError, ResearchBrief};

use crate::envelope::{AgentArtifact, AgentRole, SpecialistAgent};
use crate::prompts::RESEARCHER_PREAMBLE;

pub struct Researcher;

impl SpecialistAgent for Researcher {
    fn role(&self) -> AgentRole {
        AgentRole::Researcher
    }

    fn temperature(&self) -> f32 {
        0.3
    }

    fn system_prompt(&self) -> &str {
        RESEARCHER_PREAMBLE
    }

    fn build_user_prompt(&self, document: &Document) -> String {
        format!(
            "Topic: {}\nAudience: {}\nTarget word count: {}\nRequired sections: {:?}\nRelated pages: {:?}",
            document.brief.topic,
            document.brief.audience,
            document.brief.target_word_count,
            document.brief.required_sections,
            document.brief.related_pages,
        )
    }

    fn parse(&self, raw: &serde_json::Value) -> Result<AgentArtifact, PipelineError> {
        let brief: ResearchBrief = serde_json::from_value(raw.clone())
            .map_err(|e| PipelineError::MissingField(e.to_string()))?;
        Ok(AgentArtifact::Research(brief))
    }

    fn validate(
        &self,
        artifact: &AgentArtifact,
        _document: &Document,
        _config: &PipelineConfig,
    ) -> Result<(), PipelineError> {
        let AgentArtifact::Research(brief) = artifact else {
            unreachable!("researcher always produces AgentArtifact::Research");
        };
        if brief.key_facts.len() < 3 {
            return Err(PipelineError::ValidationFailed(format!(
                "expected at least 3 key facts, got {}",
                brief.key_facts.len()
            )));
        }
        if brief.suggested_outline.len() < 2 {
            return Err(PipelineError::ValidationFailed(format!(
                "expected at least 2 outline sections, got {}",
                brief.suggested_outline.len()
            )));
        }
        Ok(())
    }

    fn apply(&self, artifact: AgentArtifact, document: &mut Document) -> Result<(), PipelineError> {
        let AgentArtifact::Research(brief) = artifact else {
            unreachable!("researcher always produces AgentArtifact::Research");
        };
        document.set_research_brief(brief)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline_core::{Brief, DocumentState, KeyFact};

    fn document() -> Document {
        Document::new(Brief {
            topic: "Ownership".into(),
            audience: "beginners".into(),
            target_word_count: 400,
            required_sections: vec![],
            related_pages: vec![],
        })
    }

    #[test]
    fn rejects_fewer_than_three_facts() {
        let agent = Researcher;
        let doc = document();
        let artifact = AgentArtifact::Research(ResearchBrief {
            key_facts: vec![KeyFact { text: "a".into(), source: None }],
            suggested_outline: vec!["Intro".into(), "Body".into()],
            related_pages: vec![],
        });
        assert!(agent.validate(&artifact, &doc, &PipelineConfig::default()).is_err());
    }

    #[test]
    fn accepts_three_facts_and_two_sections() {
        let agent = Researcher;
        let doc = document();
        let artifact = AgentArtifact::Research(ResearchBrief {
            key_facts: vec![
                KeyFact { text: "a".into(), source: None },
                KeyFact { text: "b".into(), source: None },
                KeyFact { text: "c".into(), source: None },
            ],
            suggested_outline: vec!["Intro".into(), "Body".into()],
            related_pages: vec![],
        });
        assert!(agent.validate(&artifact, &doc, &PipelineConfig::default()).is_ok());
    }

    #[test]
    fn apply_sets_research_brief_on_document() {
        let agent = Researcher;
        let mut doc = document();
        doc.transition_to(DocumentState::Researching, None).unwrap();
        let artifact = AgentArtifact::Research(ResearchBrief {
            key_facts: vec![
                KeyFact { text: "a".into(), source: None },
                KeyFact { text: "b".into(), source: None },
                KeyFact { text: "c".into(), source: None },
            ],
            suggested_outline: vec!["Intro".into(), "Body".into()],
            related_pages: vec![],
        });
        agent.apply(artifact, &mut doc).unwrap();
        assert!(doc.research_brief.is_some());
    }
}
