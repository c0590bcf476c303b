//! The hippocampus analyzer: two synchronous, LLM-backed decisions that
//! gate memory augmentation and reply delivery for the principal's turn.
//!
//! Unlike the actor runner and the amygdala, the hippocampus never drives a
//! multi-turn actor loop — each decision is exactly one `LlmClient::chat`
//! call against a fixed persona prompt, with a strict JSON output contract
//! and a conservative fallback whenever the model or the parse fails.
//!
//! # Module Organization
//!
//! - `json.rs` - lenient JSON extraction shared by both decisions
//! - `recall.rs` - `analyze_for_recall`, `RecallDecision`
//! - `judge.rs` - `judge_response`, `ResponseJudgment`, caller-side enforcement
//! - `augment.rs` - memory-backend querying, compression, prompt framing

pub mod augment;
pub mod json;
pub mod judge;
pub mod recall;

pub use augment::{augment_with_recall, MemorySearchProvider};
pub use judge::{enforce_send_continue_rule, judge_response, ResponseJudgment};
pub use recall::{analyze_for_recall, format_recent_messages, RecallDecision};

use std::sync::Arc;

use crate::llm::LlmClient;
use crate::message::ChatTurn;

/// Produces a fresh LLM client scoped to the lightweight model the
/// hippocampus runs against, distinct from whatever model an actor's own
/// `ActorConfig::model` names.
pub type LlmFactory = Arc<dyn Fn() -> Arc<dyn LlmClient> + Send + Sync>;

/// The hippocampus analyzer. A [`Hippocampus::disabled`] instance short-
/// circuits both decisions to their neutral defaults without ever touching
/// an LLM factory or a memory provider.
pub struct Hippocampus {
    llm_factory: Option<LlmFactory>,
    archival_search: Option<MemorySearchProvider>,
    conversation_search: Option<MemorySearchProvider>,
}

impl Hippocampus {
    pub fn new(llm_factory: LlmFactory) -> Self {
        Self {
            llm_factory: Some(llm_factory),
            archival_search: None,
            conversation_search: None,
        }
    }

    /// An analyzer with no backing model: `analyze_for_recall` always
    /// yields `none()`, `judge_response` always yields `default_result()`,
    /// and `augment_message` is the identity function.
    pub fn disabled() -> Self {
        Self {
            llm_factory: None,
            archival_search: None,
            conversation_search: None,
        }
    }

    pub fn with_archival_search(mut self, provider: MemorySearchProvider) -> Self {
        self.archival_search = Some(provider);
        self
    }

    pub fn with_conversation_search(mut self, provider: MemorySearchProvider) -> Self {
        self.conversation_search = Some(provider);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.llm_factory.is_some()
    }

    pub async fn analyze_for_recall(&self, new_message: &str, recent_messages: &[ChatTurn]) -> RecallDecision {
        let Some(factory) = &self.llm_factory else {
            return RecallDecision::none();
        };
        recall::analyze_for_recall(factory().as_ref(), new_message, recent_messages).await
    }

    pub async fn judge_response(
        &self,
        original_request: &str,
        agent_response: &str,
        iteration: u32,
        is_continuation: bool,
    ) -> ResponseJudgment {
        let Some(factory) = &self.llm_factory else {
            return ResponseJudgment::default_result();
        };
        judge::judge_response(factory().as_ref(), original_request, agent_response, iteration, is_continuation).await
    }

    /// Run the full pre-send pipeline: decide whether to recall, query
    /// whatever memory backends are wired up, compress if needed, and frame
    /// the result after `user_message`. Returns `user_message` unchanged if
    /// recall isn't warranted, the model gave no usable search query, or
    /// nothing was found.
    pub async fn augment_message(&self, user_message: &str, recent_messages: &[ChatTurn]) -> String {
        let Some(factory) = &self.llm_factory else {
            return user_message.to_string();
        };
        let decision = recall::analyze_for_recall(factory().as_ref(), user_message, recent_messages).await;
        if !decision.should_recall {
            return user_message.to_string();
        }
        let Some(query) = decision.search_query.filter(|q| !q.trim().is_empty()) else {
            return user_message.to_string();
        };
        let reason = decision.reason.unwrap_or_else(|| "related context".to_string());

        augment::augment_with_recall(
            factory().as_ref(),
            user_message,
            &reason,
            &query,
            self.archival_search.as_ref(),
            self.conversation_search.as_ref(),
        )
        .await
    }
}
