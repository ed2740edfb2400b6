//! Pipeline configuration (SPEC_FULL.md §4.0), layered env-over-file.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Runtime configuration for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub max_revision_cycles: u32,
    pub phase_timeout: Duration,
    pub approval_timeout: Duration,

    pub skip_fact_check: bool,
    pub skip_critique: bool,

    pub approve_after_research: bool,
    pub approve_after_draft: bool,
    pub approve_after_fact_check: bool,
    pub approve_before_publish: bool,

    pub require_verified_claims: bool,
    pub minimum_confidence: String,

    /// Numeric floor for the Editor's self-reported `quality_score`
    /// (spec.md §6 `quality.minEditorScore`).
    pub min_editor_score: f64,

    pub output_dir: String,
    pub output_extension: String,

    /// OpenAI-compatible base URL for the default `HttpLlmClient`.
    pub llm_base_url: String,
    /// Model identifier sent in chat-completion requests.
    pub llm_model: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_revision_cycles: 3,
            phase_timeout: Duration::from_secs(5 * 60),
            approval_timeout: Duration::from_secs(30 * 60),
            skip_fact_check: false,
            skip_critique: false,
            approve_after_research: false,
            approve_after_draft: false,
            approve_after_fact_check: false,
            approve_before_publish: false,
            require_verified_claims: false,
            minimum_confidence: "MEDIUM".to_string(),
            min_editor_score: 0.7,
            output_dir: "./output".to_string(),
            output_extension: "txt".to_string(),
            llm_base_url: "http://localhost:8080/v1".to_string(),
            llm_model: "gpt-4o-mini".to_string(),
        }
    }
}

/// Mirrors the serializable shape but with everything optional, so a TOML
/// file only needs to name the fields it overrides.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PipelineConfigFile {
    max_revision_cycles: Option<u32>,
    phase_timeout_secs: Option<u64>,
    approval_timeout_secs: Option<u64>,
    skip_fact_check: Option<bool>,
    skip_critique: Option<bool>,
    approve_after_research: Option<bool>,
    approve_after_draft: Option<bool>,
    approve_after_fact_check: Option<bool>,
    approve_before_publish: Option<bool>,
    require_verified_claims: Option<bool>,
    minimum_confidence: Option<String>,
    min_editor_score: Option<f64>,
    output_dir: Option<String>,
    output_extension: Option<String>,
    llm_base_url: Option<String>,
    llm_model: Option<String>,
}

impl PipelineConfig {
    /// Start from defaults, apply a TOML file's overrides, then apply
    /// `PIPELINE_*` environment variable overrides — env wins.
    pub fn from_file(path: &std::path::Path) -> Result<Self, PipelineError> {
        let contents = std::fs::read_to_string(path)?;
        let file: PipelineConfigFile = toml::from_str(&contents)
            .map_err(|e| PipelineError::ValidationFailed(format!("invalid config file: {e}")))?;

        let mut config = Self::default();
        if let Some(v) = file.max_revision_cycles {
            config.max_revision_cycles = v;
        }
        if let Some(v) = file.phase_timeout_secs {
            config.phase_timeout = Duration::from_secs(v);
        }
        if let Some(v) = file.approval_timeout_secs {
            config.approval_timeout = Duration::from_secs(v);
        }
        if let Some(v) = file.skip_fact_check {
            config.skip_fact_check = v;
        }
        if let Some(v) = file.skip_critique {
            config.skip_critique = v;
        }
        if let Some(v) = file.approve_after_research {
            config.approve_after_research = v;
        }
        if let Some(v) = file.approve_after_draft {
            config.approve_after_draft = v;
        }
        if let Some(v) = file.approve_after_fact_check {
            config.approve_after_fact_check = v;
        }
        if let Some(v) = file.approve_before_publish {
            config.approve_before_publish = v;
        }
        if let Some(v) = file.require_verified_claims {
            config.require_verified_claims = v;
        }
        if let Some(v) = file.minimum_confidence {
            config.minimum_confidence = v;
        }
        if let Some(v) = file.min_editor_score {
            config.min_editor_score = v;
        }
        if let Some(v) = file.output_dir {
            config.output_dir = v;
        }
        if let Some(v) = file.output_extension {
            config.output_extension = v;
        }
        if let Some(v) = file.llm_base_url {
            config.llm_base_url = v;
        }
        if let Some(v) = file.llm_model {
            config.llm_model = v;
        }

        config.apply_env_overrides();
        Ok(config)
    }

    /// Defaults with `PIPELINE_*` environment variable overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("PIPELINE_MAX_REVISION_CYCLES") {
            if let Ok(parsed) = v.parse() {
                self.max_revision_cycles = parsed;
            }
        }
        if let Ok(v) = std::env::var("PIPELINE_PHASE_TIMEOUT_SECS") {
            if let Ok(parsed) = v.parse() {
                self.phase_timeout = Duration::from_secs(parsed);
            }
        }
        if let Ok(v) = std::env::var("PIPELINE_APPROVAL_TIMEOUT_SECS") {
            if let Ok(parsed) = v.parse() {
                self.approval_timeout = Duration::from_secs(parsed);
            }
        }
        if let Some(v) = env_bool("PIPELINE_SKIP_FACTCHECK") {
            self.skip_fact_check = v;
        }
        if let Some(v) = env_bool("PIPELINE_SKIP_CRITIQUE") {
            self.skip_critique = v;
        }
        if let Some(v) = env_bool("PIPELINE_APPROVAL_AFTER_RESEARCH") {
            self.approve_after_research = v;
        }
        if let Some(v) = env_bool("PIPELINE_APPROVAL_AFTER_DRAFT") {
            self.approve_after_draft = v;
        }
        if let Some(v) = env_bool("PIPELINE_APPROVAL_AFTER_FACTCHECK") {
            self.approve_after_fact_check = v;
        }
        if let Some(v) = env_bool("PIPELINE_APPROVAL_BEFORE_PUBLISH") {
            self.approve_before_publish = v;
        }
        if let Some(v) = env_bool("PIPELINE_REQUIRE_VERIFIED_CLAIMS") {
            self.require_verified_claims = v;
        }
        if let Ok(v) = std::env::var("PIPELINE_MINIMUM_CONFIDENCE") {
            self.minimum_confidence = v;
        }
        if let Ok(v) = std::env::var("PIPELINE_MIN_EDITOR_SCORE") {
            if let Ok(parsed) = v.parse() {
                self.min_editor_score = parsed;
            }
        }
        if let Ok(v) = std::env::var("PIPELINE_OUTPUT_DIR") {
            self.output_dir = v;
        }
        if let Ok(v) = std::env::var("PIPELINE_LLM_BASE_URL") {
            self.llm_base_url = v;
        }
        if let Ok(v) = std::env::var("PIPELINE_LLM_MODEL") {
            self.llm_model = v;
        }
    }
}

fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key).ok().and_then(|v| match v.to_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_revision_cycles, 3);
        assert_eq!(config.phase_timeout, Duration::from_secs(300));
        assert_eq!(config.approval_timeout, Duration::from_secs(1800));
        assert!(!config.skip_fact_check);
        assert!(!config.skip_critique);
    }

    #[test]
    fn env_overrides_apply_over_defaults() {
        std::env::set_var("PIPELINE_MAX_REVISION_CYCLES", "5");
        std::env::set_var("PIPELINE_SKIP_CRITIQUE", "true");
        let config = PipelineConfig::from_env();
        assert_eq!(config.max_revision_cycles, 5);
        assert!(config.skip_critique);
        std::env::remove_var("PIPELINE_MAX_REVISION_CYCLES");
        std::env::remove_var("PIPELINE_SKIP_CRITIQUE");
    }

    #[test]
    fn file_overrides_then_env_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.toml");
        std::fs::write(&path, "max_revision_cycles = 7\nskip_fact_check = true\n").unwrap();

        std::env::set_var("PIPELINE_MAX_REVISION_CYCLES", "9");
        let config = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(config.max_revision_cycles, 9);
        assert!(config.skip_fact_check);
        std::env::remove_var("PIPELINE_MAX_REVISION_CYCLES");
    }

    #[test]
    fn config_serde_roundtrip() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let restored: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.max_revision_cycles, config.max_revision_cycles);
        assert_eq!(restored.llm_model, config.llm_model);
    }
}
