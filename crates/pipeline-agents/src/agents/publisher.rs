//! Publisher: writes the final article to disk and closes out the document
//! (spec.md §4.5). Unlike the other five specialists this makes no LLM
//! call, so it does not go through `run_envelope`/`SpecialistAgent`.

use std::path::PathBuf;

use pipeline_core::{Document, DocumentState, PipelineConfig, PipelineError};

/// Turn a topic into a `PageName`: each whitespace-separated word is
/// capitalized and the words are concatenated with no separator, matching
/// the wiki-style page-name convention spec.md §6/§8 expects
/// (`"Git branching strategies"` -> `"GitBranchingStrategies"`).
pub(crate) fn page_name(topic: &str) -> String {
    let cleaned: String = topic
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect();
    cleaned
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Write `document`'s final article to `<output_dir>/<PageName>.<ext>` and
/// transition the document to `PUBLISHED`.
pub fn publish(document: &mut Document, config: &PipelineConfig) -> Result<PathBuf, PipelineError> {
    let article = document
        .final_article
        .as_ref()
        .ok_or_else(|| PipelineError::ValidationFailed("cannot publish without a final article".into()))?;

    std::fs::create_dir_all(&config.output_dir)?;
    let path = PathBuf::from(&config.output_dir)
        .join(page_name(&document.brief.topic))
        .with_extension(&config.output_extension);
    std::fs::write(&path, &article.wiki_content)?;

    document.transition_to(DocumentState::Published, Some("published"))?;
    tracing::info!(path = %path.display(), "published article");
    Ok(path)
}
