//! Document — the mutable container a pipeline run threads through the
//! state machine (spec.md §3/§4.2).
//!
//! The Document is exclusively owned by the Executor for the duration of a
//! run. Agents receive a `&mut Document` for one call and must not retain
//! it; the event bus passes documents to listeners by shared reference and
//! listeners must treat them as read-only snapshots.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::state::artifacts::{ArticleDraft, CriticReport, FactCheckReport, FinalArticle, ResearchBrief};
use crate::state::phase::{DocumentState, StateMachine};

/// Immutable input describing what to write about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brief {
    pub topic: String,
    pub audience: String,
    pub target_word_count: u32,
    #[serde(default)]
    pub required_sections: Vec<String>,
    #[serde(default)]
    pub related_pages: Vec<String>,
}

/// A single entry in the document's append-only contribution log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contribution {
    pub agent_role: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub duration: Duration,
    #[serde(default)]
    pub metrics: BTreeMap<String, f64>,
    pub summary: String,
}

/// The mutable per-run document. All mutation goes through the methods
/// below; every one of them fails if the document is terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: uuid::Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    state_machine: StateMachine,
    pub brief: Brief,

    pub research_brief: Option<ResearchBrief>,
    pub draft: Option<ArticleDraft>,
    pub fact_check_report: Option<FactCheckReport>,
    pub final_article: Option<FinalArticle>,
    pub critic_report: Option<CriticReport>,

    contributions: Vec<Contribution>,
    revision_counts: BTreeMap<String, u32>,
}

impl Document {
    pub fn new(brief: Brief) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            state_machine: StateMachine::new(),
            brief,
            research_brief: None,
            draft: None,
            fact_check_report: None,
            final_article: None,
            critic_report: None,
            contributions: Vec::new(),
            revision_counts: BTreeMap::new(),
        }
    }

    pub fn state(&self) -> DocumentState {
        self.state_machine.current()
    }

    pub fn state_machine(&self) -> &StateMachine {
        &self.state_machine
    }

    pub fn is_terminal(&self) -> bool {
        self.state_machine.is_terminal()
    }

    fn guard_mutable(&self) -> Result<(), PipelineError> {
        if self.is_terminal() {
            return Err(PipelineError::DocumentTerminal(self.state()));
        }
        Ok(())
    }

    /// Move the document to `to`, failing if either the document is
    /// terminal or the transition is illegal.
    pub fn transition_to(&mut self, to: DocumentState, reason: Option<&str>) -> Result<(), PipelineError> {
        self.guard_mutable()?;
        self.state_machine.transition_to(to, reason)
    }

    pub fn set_research_brief(&mut self, brief: ResearchBrief) -> Result<(), PipelineError> {
        self.guard_mutable()?;
        self.research_brief = Some(brief);
        Ok(())
    }

    pub fn set_draft(&mut self, draft: ArticleDraft) -> Result<(), PipelineError> {
        self.guard_mutable()?;
        self.draft = Some(draft);
        Ok(())
    }

    pub fn set_fact_check_report(&mut self, report: FactCheckReport) -> Result<(), PipelineError> {
        self.guard_mutable()?;
        self.fact_check_report = Some(report);
        Ok(())
    }

    pub fn set_final_article(&mut self, article: FinalArticle) -> Result<(), PipelineError> {
        self.guard_mutable()?;
        self.final_article = Some(article);
        Ok(())
    }

    pub fn set_critic_report(&mut self, report: CriticReport) -> Result<(), PipelineError> {
        self.guard_mutable()?;
        self.critic_report = Some(report);
        Ok(())
    }

    /// Append a contribution entry. Ordering equals execution order because
    /// this is the only way to add one and the log is never reordered.
    pub fn record_contribution(&mut self, entry: Contribution) -> Result<(), PipelineError> {
        self.guard_mutable()?;
        self.contributions.push(entry);
        Ok(())
    }

    pub fn contributions(&self) -> &[Contribution] {
        &self.contributions
    }

    /// Bump and return the revision count for a named revision edge
    /// (e.g. `"fact_checking->drafting"`).
    pub fn bump_revision(&mut self, edge: &str) -> u32 {
        let count = self.revision_counts.entry(edge.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    pub fn revision_count(&self, edge: &str) -> u32 {
        self.revision_counts.get(edge).copied().unwrap_or(0)
    }

    pub fn total_revisions(&self) -> u32 {
        self.revision_counts.values().sum()
    }

    /// Most recently produced content, used for failure-dump persistence
    /// (spec.md §4.8.3): prefers the final article, then the draft.
    pub fn last_produced_content(&self) -> Option<&str> {
        self.final_article
            .as_ref()
            .map(|a| a.wiki_content.as_str())
            .or_else(|| self.draft.as_ref().map(|d| d.wiki_content.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brief() -> Brief {
        Brief {
            topic: "Git branching strategies".into(),
            audience: "devs".into(),
            target_word_count: 800,
            required_sections: vec!["Introduction".into(), "Trunk-based development".into()],
            related_pages: vec![],
        }
    }

    #[test]
    fn new_document_starts_created() {
        let doc = Document::new(brief());
        assert_eq!(doc.state(), DocumentState::Created);
        assert!(!doc.is_terminal());
        assert!(doc.contributions().is_empty());
    }

    #[test]
    fn terminal_document_rejects_all_mutation() {
        let mut doc = Document::new(brief());
        doc.transition_to(DocumentState::Rejected, Some("test")).unwrap();
        assert!(doc.is_terminal());

        let err = doc
            .set_draft(ArticleDraft {
                wiki_content: "x".into(),
                summary: "x".into(),
                categories: vec![],
                metadata: Default::default(),
            })
            .unwrap_err();
        assert!(matches!(err, PipelineError::DocumentTerminal(_)));

        assert!(doc.transition_to(DocumentState::Researching, None).is_err());
    }

    #[test]
    fn contributions_are_append_only_in_order() {
        let mut doc = Document::new(brief());
        for role in ["researcher", "writer", "editor"] {
            doc.record_contribution(Contribution {
                agent_role: role.into(),
                started_at: chrono::Utc::now(),
                duration: Duration::from_millis(10),
                metrics: Default::default(),
                summary: format!("{role} done"),
            })
            .unwrap();
        }
        let roles: Vec<_> = doc.contributions().iter().map(|c| c.agent_role.as_str()).collect();
        assert_eq!(roles, vec!["researcher", "writer", "editor"]);
    }

    #[test]
    fn revision_counter_tracks_per_edge() {
        let mut doc = Document::new(brief());
        assert_eq!(doc.bump_revision("fact_checking->drafting"), 1);
        assert_eq!(doc.bump_revision("fact_checking->drafting"), 2);
        assert_eq!(doc.bump_revision("critiquing->editing"), 1);
        assert_eq!(doc.total_revisions(), 3);
        assert_eq!(doc.revision_count("unused_edge"), 0);
    }

    #[test]
    fn last_produced_content_prefers_final_article() {
        let mut doc = Document::new(brief());
        doc.set_draft(ArticleDraft {
            wiki_content: "draft content".into(),
            summary: "s".into(),
            categories: vec![],
            metadata: Default::default(),
        })
        .unwrap();
        assert_eq!(doc.last_produced_content(), Some("draft content"));

        doc.set_final_article(FinalArticle {
            wiki_content: "final content".into(),
            metadata: Default::default(),
            edit_summary: "edited".into(),
            quality_score: 0.9,
            added_links: vec![],
        })
        .unwrap();
        assert_eq!(doc.last_produced_content(), Some("final content"));
    }

    #[test]
    fn document_serde_roundtrip() {
        let doc = Document::new(brief());
        let json = serde_json::to_string(&doc).unwrap();
        let restored: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.state(), DocumentState::Created);
        assert_eq!(restored.brief.topic, "Git branching strategies");
    }
}
