//! Typed artifacts produced by each pipeline stage (spec.md §3).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Confidence level a FactChecker assigns to its overall verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl std::str::FromStr for ConfidenceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            other => Err(format!("unknown confidence level: {other}")),
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Recommended next action returned by FactChecker and Critic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecommendedAction {
    Approve,
    Revise,
    Reject,
}

impl std::str::FromStr for RecommendedAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "APPROVE" => Ok(Self::Approve),
            "REVISE" => Ok(Self::Revise),
            "REJECT" => Ok(Self::Reject),
            other => Err(format!("unknown recommended action: {other}")),
        }
    }
}

impl std::fmt::Display for RecommendedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Approve => write!(f, "APPROVE"),
            Self::Revise => write!(f, "REVISE"),
            Self::Reject => write!(f, "REJECT"),
        }
    }
}

/// A single researched fact, optionally sourced.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct KeyFact {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Output of the Researcher agent.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResearchBrief {
    pub key_facts: Vec<KeyFact>,
    pub suggested_outline: Vec<String>,
    #[serde(default)]
    pub related_pages: Vec<String>,
}

/// Output of the Writer agent.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ArticleDraft {
    pub wiki_content: String,
    pub summary: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub metadata: std::collections::BTreeMap<String, String>,
}

/// A questionable claim flagged by the FactChecker.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QuestionableClaim {
    pub claim: String,
    pub issue: String,
    #[serde(default)]
    pub suggestion: Option<String>,
}

/// Output of the FactChecker agent.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FactCheckReport {
    #[serde(default)]
    pub verified_claims: Vec<String>,
    #[serde(default)]
    pub questionable_claims: Vec<QuestionableClaim>,
    #[serde(default)]
    pub consistency_issues: Vec<String>,
    pub overall_confidence: ConfidenceLevel,
    pub recommended_action: RecommendedAction,
}

/// Output of the Editor agent.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FinalArticle {
    pub wiki_content: String,
    #[serde(default)]
    pub metadata: std::collections::BTreeMap<String, String>,
    pub edit_summary: String,
    pub quality_score: f64,
    #[serde(default)]
    pub added_links: Vec<String>,
}

/// Output of the Critic agent.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CriticReport {
    pub overall_score: f64,
    pub structure_score: f64,
    pub syntax_score: f64,
    pub readability_score: f64,
    #[serde(default)]
    pub structure_issues: Vec<String>,
    #[serde(default)]
    pub syntax_issues: Vec<String>,
    #[serde(default)]
    pub style_issues: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    pub recommended_action: RecommendedAction,
}

impl CriticReport {
    /// True when the issues are mostly cosmetic: some syntax issues but at
    /// most one structural issue and at most two style issues. Used by the
    /// executor to decide whether a `REVISE` reverts to Editing (cheap fix)
    /// or all the way back to Drafting (spec.md §4.8.2).
    pub fn has_primarily_syntax_issues(&self) -> bool {
        !self.syntax_issues.is_empty()
            && self.structure_issues.len() <= 1
            && self.style_issues.len() <= 2
    }
}

/// Clamp a parsed numeric score into `[0, 1]` (spec.md §4.4 step 4).
pub fn clamp_score(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}
