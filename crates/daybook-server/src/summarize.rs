use tracing::warn;

use crate::openai::Completion;
use crate::prompts;

/// Structured summary of a raw diary entry. Deterministic (temperature 0);
/// failures degrade to an empty string so the reply pipeline never aborts
/// over a missing analysis section.
pub async fn generate_summary<C: Completion>(llm: &C, raw_diary: &str) -> String {
    match llm.complete(prompts::DIARY_SUMMARY, raw_diary, 0.0).await {
        Ok(text) => text,
        Err(err) => {
            warn!(error = %err, "diary summary generation failed");
            String::new()
        }
    }
}

/// Next-step recommendations derived from the structured summary. Some
/// variability is fine here (temperature 0.5); same empty-string contract.
pub async fn generate_next_steps<C: Completion>(llm: &C, structured_summary: &str) -> String {
    match llm
        .complete(prompts::DIARY_NEXT_STEPS, structured_summary, 0.5)
        .await
    {
        Ok(text) => text,
        Err(err) => {
            warn!(error = %err, "next steps generation failed");
            String::new()
        }
    }
}
