//! Memory recall augmentation: query the memory backends behind a positive
//! recall decision, compress long results, and frame the augmented prompt.

use std::sync::Arc;

use crate::llm::LlmClient;

/// `(query, max_results) -> results`. Either memory backend may fail
/// independently; failures are caught per-callback, not aggregated.
pub type MemorySearchProvider = Arc<dyn Fn(&str, usize) -> Result<Vec<String>, String> + Send + Sync>;

const COMPRESSION_THRESHOLD_CHARS: usize = 3000;
const DEFAULT_MAX_RESULTS: usize = 10;

const COMPRESS_PERSONA: &str = "You are the hippocampus — compress the following recalled memories. \
Preserve facts, names, and dates; do not add information that is not already present.";

/// Query whichever of `archival_search`/`conversation_search` are wired up,
/// merge their results, compress them if the combined text is long, and
/// frame the whole thing after `user_message`. Returns `user_message`
/// unaugmented if neither provider finds anything.
pub async fn augment_with_recall(
    llm: &dyn LlmClient,
    user_message: &str,
    reason: &str,
    search_query: &str,
    archival_search: Option<&MemorySearchProvider>,
    conversation_search: Option<&MemorySearchProvider>,
) -> String {
    let mut results = Vec::new();

    if let Some(provider) = archival_search {
        match provider(search_query, DEFAULT_MAX_RESULTS) {
            Ok(found) => results.extend(found),
            Err(err) => tracing::warn!(error = %err, "hippocampus: archival search failed"),
        }
    }
    if let Some(provider) = conversation_search {
        match provider(search_query, DEFAULT_MAX_RESULTS) {
            Ok(found) => results.extend(found),
            Err(err) => tracing::warn!(error = %err, "hippocampus: conversation search failed"),
        }
    }

    if results.is_empty() {
        return user_message.to_string();
    }

    let mut combined = results.join("\n\n");
    if combined.len() > COMPRESSION_THRESHOLD_CHARS {
        combined = compress_memories(llm, &combined).await;
    }

    format!("{user_message}\n\n---\n[Memory recall: {reason}]\n{combined}\n[End of recall]")
}

/// Ask the hippocampus's own model to compress recalled text. Falls back to
/// the original uncompressed text if the call fails or returns nothing.
async fn compress_memories(llm: &dyn LlmClient, combined: &str) -> String {
    let prompt = format!(
        "{COMPRESS_PERSONA}\n\n<memories>\n{combined}\n</memories>\n\nReturn the compressed text only."
    );
    match llm.chat(&prompt, None).await {
        Ok(response) if !response.trim().is_empty() => format!("[Compressed summary] {}", response.trim()),
        Ok(_) => combined.to_string(),
        Err(err) => {
            tracing::warn!(error = %err, "hippocampus: memory compression failed, using raw text");
            combined.to_string()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::llm::{ActorTool, LlmError};
    use async_trait::async_trait;
    use serde_json::Value;

    struct FixedLlm(String);

    #[async_trait]
    impl LlmClient for FixedLlm {
        async fn chat(&self, _user_message: &str, _max_tool_iterations: Option<u32>) -> Result<String, LlmError> {
            Ok(self.0.clone())
        }
        fn add_tool(&self, _tool: Arc<dyn ActorTool>, _schema: Option<Value>) {}
        fn set_system_prompt(&self, _prompt: String) {}
    }

    struct FailingLlm;

    #[async_trait]
    impl LlmClient for FailingLlm {
        async fn chat(&self, _user_message: &str, _max_tool_iterations: Option<u32>) -> Result<String, LlmError> {
            Err(LlmError::Failure("down".to_string()))
        }
        fn add_tool(&self, _tool: Arc<dyn ActorTool>, _schema: Option<Value>) {}
        fn set_system_prompt(&self, _prompt: String) {}
    }

    fn provider(results: Vec<&str>) -> MemorySearchProvider {
        let results: Vec<String> = results.into_iter().map(str::to_string).collect();
        Arc::new(move |_q, _n| Ok(results.clone()))
    }

    fn failing_provider() -> MemorySearchProvider {
        Arc::new(|_q, _n| Err("backend unavailable".to_string()))
    }

    #[tokio::test]
    async fn no_providers_returns_unaugmented() {
        let llm = FixedLlm(String::new());
        let result = augment_with_recall(&llm, "hi", "why", "query", None, None).await;
        assert_eq!(result, "hi");
    }

    #[tokio::test]
    async fn short_results_are_framed_without_compression() {
        let llm = FixedLlm(String::new());
        let archival = provider(vec!["fact one"]);
        let result = augment_with_recall(&llm, "hi", "relevant", "q", Some(&archival), None).await;
        assert!(result.starts_with("hi\n\n---\n[Memory recall: relevant]\nfact one\n[End of recall]"));
    }

    #[tokio::test]
    async fn one_failing_provider_does_not_block_the_other() {
        let llm = FixedLlm(String::new());
        let archival = failing_provider();
        let conversation = provider(vec!["still found this"]);
        let result = augment_with_recall(&llm, "hi", "why", "q", Some(&archival), Some(&conversation)).await;
        assert!(result.contains("still found this"));
    }

    #[tokio::test]
    async fn long_results_are_compressed_and_prefixed() {
        let llm = FixedLlm("short summary".to_string());
        let long_text = "x".repeat(COMPRESSION_THRESHOLD_CHARS + 500);
        let archival = provider(vec![long_text.as_str()]);
        let result = augment_with_recall(&llm, "hi", "why", "q", Some(&archival), None).await;
        assert!(result.contains("[Compressed summary] short summary"));
        assert!(!result.contains(&long_text));
    }

    #[tokio::test]
    async fn compression_failure_falls_back_to_raw_text() {
        let long_text = "y".repeat(COMPRESSION_THRESHOLD_CHARS + 500);
        let archival = provider(vec![long_text.as_str()]);
        let result = augment_with_recall(&FailingLlm, "hi", "why", "q", Some(&archival), None).await;
        assert!(result.contains(&long_text));
        assert!(!result.contains("[Compressed summary]"));
    }
}
