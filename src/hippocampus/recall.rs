//! Recall decision: whether a memory lookup would benefit the current turn.

use serde::{Deserialize, Serialize};

use crate::hippocampus::json::parse_lenient;
use crate::llm::LlmClient;
use crate::message::{ChatRole, ChatTurn};

const RECALL_PERSONA: &str = "You are the hippocampus — a memory-recall gatekeeper for a personal \
assistant. Given the recent conversation and a new message, decide whether searching long-term \
memory would meaningfully help answer it. Be conservative: most turns need no recall.";

const MAX_RECENT_FOR_RECALL: usize = 5;
const RECALL_MESSAGE_TRUNCATE_CHARS: usize = 200;

/// Output of [`analyze_for_recall`]. `none()` is the neutral default used
/// when the analyzer is disabled or any step fails.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RecallDecision {
    pub should_recall: bool,
    pub search_query: Option<String>,
    pub reason: Option<String>,
}

impl RecallDecision {
    pub fn none() -> Self {
        Self::default()
    }
}

/// Render the last [`MAX_RECENT_FOR_RECALL`] turns as `"<role>: <content>"`
/// lines, each truncated to [`RECALL_MESSAGE_TRUNCATE_CHARS`], or
/// `"(new conversation)"` if there is no history yet.
pub fn format_recent_messages(recent_messages: &[ChatTurn]) -> String {
    if recent_messages.is_empty() {
        return "(new conversation)".to_string();
    }
    let tail_start = recent_messages.len().saturating_sub(MAX_RECENT_FOR_RECALL);
    recent_messages[tail_start..]
        .iter()
        .map(|turn| {
            let role = match turn.role {
                ChatRole::User => "user",
                ChatRole::Assistant => "assistant",
            };
            let content: String = turn.content.chars().take(RECALL_MESSAGE_TRUNCATE_CHARS).collect();
            format!("{role}: {content}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decide whether `new_message` warrants a memory lookup, given up to the
/// last five `recent_messages` for context. Robust to non-JSON model
/// output (see [`crate::hippocampus::json::parse_lenient`]); any LLM
/// failure or unparseable response yields [`RecallDecision::none`].
pub async fn analyze_for_recall(
    llm: &dyn LlmClient,
    new_message: &str,
    recent_messages: &[ChatTurn],
) -> RecallDecision {
    let context = format_recent_messages(recent_messages);
    let prompt = format!(
        "{RECALL_PERSONA}\n\n<recent_messages>\n{context}\n</recent_messages>\n\n<new_message>\n{new_message}\n</new_message>\n\nRespond with JSON only, no prose: {{\"should_recall\": bool, \"search_query\": string|null, \"reason\": string|null}}"
    );

    match llm.chat(&prompt, None).await {
        Ok(response) => parse_lenient::<RecallDecision>(&response).unwrap_or_else(|| {
            tracing::warn!("hippocampus: recall response was not valid JSON");
            RecallDecision::none()
        }),
        Err(err) => {
            tracing::warn!(error = %err, "hippocampus: recall decision LLM call failed");
            RecallDecision::none()
        }
    }
}
