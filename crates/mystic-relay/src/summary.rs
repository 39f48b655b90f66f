use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::SummaryError;
use crate::prompt;
use crate::provider::ReadingProvider;
use crate::reading::SummaryArtifact;

/// Converts a finished reading into a validated shareable summary.
///
/// Runs independently of the main relay, only when the caller asks for a
/// shareable artifact. Model output that fails to parse gets exactly one
/// repair pass; a second failure surfaces `SummaryError::Validation` with no
/// further retries, so a persistently confused model cannot run up provider
/// cost.
pub struct Summarizer {
    provider: Arc<dyn ReadingProvider>,
}

impl Summarizer {
    /// Creates a summarizer over the given provider.
    pub fn new(provider: Arc<dyn ReadingProvider>) -> Self {
        Self { provider }
    }

    /// Summarizes `reading` into the structured artifact.
    pub async fn summarize(
        &self,
        reading: &str,
        locale: Option<&str>,
    ) -> Result<SummaryArtifact, SummaryError> {
        let raw = self
            .provider
            .complete(prompt::summary_prompt(reading, locale))
            .await?;
        match parse_artifact(&raw) {
            Ok(artifact) => {
                debug!(cards = artifact.cards.len(), "summary validated on first pass");
                Ok(artifact)
            }
            Err(first_err) => {
                warn!(error = %first_err, "summary output invalid, attempting one repair pass");
                let repaired = self.provider.complete(prompt::repair_prompt(&raw)).await?;
                parse_artifact(&repaired).map_err(|err| {
                    SummaryError::Validation(format!("still invalid after repair: {err}"))
                })
            }
        }
    }
}

/// Parses model output into a `SummaryArtifact`, tolerating a Markdown code
/// fence around the JSON.
fn parse_artifact(text: &str) -> Result<SummaryArtifact, String> {
    let artifact: SummaryArtifact = serde_json::from_str(strip_code_fence(text))
        .map_err(|err| format!("not valid summary JSON: {err}"))?;
    if artifact.cards.is_empty() {
        return Err("summary JSON has no cards".to_string());
    }
    Ok(artifact)
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
