use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use pipeline_agents::Executor;
use pipeline_core::{
    AutoApprove, Brief, ConsoleApproval, Document, EventBus, HttpLlmClient, LlmClient, Metrics,
    MockLlm, PipelineConfig,
};

/// Run one document through the agentic content-generation pipeline
/// (spec.md §6).
#[derive(Parser, Debug)]
#[command(name = "pipeline-agents", version, about)]
struct Cli {
    /// Topic for the article. Ignored if --brief-file is given.
    #[arg(long)]
    topic: Option<String>,

    /// Target audience. Ignored if --brief-file is given.
    #[arg(long, default_value = "general readers")]
    audience: String,

    /// Target word count. Ignored if --brief-file is given.
    #[arg(long, default_value_t = 800)]
    word_count: u32,

    /// Required section headings, comma-separated.
    #[arg(long, value_delimiter = ',')]
    sections: Vec<String>,

    /// Related page topics to link to, comma-separated.
    #[arg(long, value_delimiter = ',')]
    related: Vec<String>,

    /// Load the brief from a JSON file instead of the flags above.
    #[arg(long)]
    brief_file: Option<PathBuf>,

    /// Load pipeline configuration from a TOML file (env vars still win).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use the scripted in-memory LLM instead of calling a real endpoint.
    /// With no responses given, canned minimally-valid JSON is used for
    /// every phase — useful for a dry run without an inference endpoint.
    #[arg(long)]
    mock: bool,

    /// Approve every approval gate automatically instead of prompting on
    /// stdin. Has no effect unless the config enables an approval point.
    #[arg(long)]
    auto_approve: bool,
}

fn load_brief(cli: &Cli) -> Result<Brief> {
    if let Some(path) = &cli.brief_file {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading brief file {}", path.display()))?;
        return serde_json::from_str(&contents)
            .with_context(|| format!("parsing brief file {}", path.display()));
    }

    let topic = cli
        .topic
        .clone()
        .context("--topic is required unless --brief-file is given")?;

    Ok(Brief {
        topic,
        audience: cli.audience.clone(),
        target_word_count: cli.word_count,
        required_sections: cli.sections.clone(),
        related_pages: cli.related.clone(),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("loading config file {}", path.display()))?,
        None => PipelineConfig::from_env(),
    };

    let brief = load_brief(&cli)?;
    info!(topic = %brief.topic, audience = %brief.audience, "starting pipeline run");

    let llm: Arc<dyn LlmClient> = if cli.mock {
        warn!("--mock set: using scripted responses, no inference endpoint will be called");
        Arc::new(MockLlm::new(mock_responses()))
    } else {
        info!(base_url = %config.llm_base_url, model = %config.llm_model, "using HTTP LLM client");
        Arc::new(HttpLlmClient::new(
            config.llm_base_url.clone(),
            config.llm_model.clone(),
            std::env::var("PIPELINE_LLM_API_KEY").ok(),
        ))
    };

    let approval_gate = if cli.auto_approve {
        Arc::new(AutoApprove) as Arc<dyn pipeline_core::ApprovalGate>
    } else {
        Arc::new(ConsoleApproval) as Arc<dyn pipeline_core::ApprovalGate>
    };

    let executor = Executor::new(
        llm,
        approval_gate,
        EventBus::shared(),
        Arc::new(Metrics::new()),
        config,
    );

    let document = Document::new(brief);
    let result = executor.run(document).await;

    if let Some(path) = &result.output_path {
        info!(path = %path.display(), "article published");
    }
    if let Some(reason) = &result.error_message {
        warn!(failed_at = ?result.failed_at_state, "pipeline failed: {reason}");
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&result.document.state())
            .unwrap_or_else(|_| "\"<unknown>\"".to_string())
    );
    info!(
        success = result.success,
        elapsed_secs = result.total_time.as_secs_f64(),
        "pipeline run finished"
    );

    std::process::exit(if result.success { 0 } else { 1 });
}

/// Minimal canned responses covering every phase, for `--mock` dry runs
/// that never hit a revision cycle.
fn mock_responses() -> Vec<String> {
    vec![
        serde_json::json!({
            "key_facts": [
                {"text": "Mock researched fact one.", "source": null},
                {"text": "Mock researched fact two.", "source": null},
                {"text": "Mock researched fact three.", "source": null},
            ],
            "suggested_outline": ["Overview", "Details"],
            "related_pages": [],
        })
        .to_string(),
        serde_json::json!({
            "wiki_content": "== Overview ==\nMock draft content covering the topic briefly.",
            "summary": "Mock draft summary.",
            "categories": [],
            "metadata": {},
        })
        .to_string(),
        serde_json::json!({
            "verified_claims": ["Mock draft content is plausible."],
            "questionable_claims": [],
            "consistency_issues": [],
            "overall_confidence": "HIGH",
            "recommended_action": "APPROVE",
        })
        .to_string(),
        serde_json::json!({
            "wiki_content": "== Overview ==\nMock draft content covering the topic briefly.",
            "metadata": {},
            "edit_summary": "Mock copyedit pass.",
            "quality_score": 0.9,
            "added_links": [],
        })
        .to_string(),
        serde_json::json!({
            "overall_score": 0.9,
            "structure_score": 0.9,
            "syntax_score": 0.9,
            "readability_score": 0.9,
            "structure_issues": [],
            "syntax_issues": [],
            "style_issues": [],
            "suggestions": [],
            "recommended_action": "APPROVE",
        })
        .to_string(),
    ]
}
