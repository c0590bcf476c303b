//! External interface contracts: the LLM client, the tool registry, and
//! transient-error classification.
//!
//! Concrete LLM provider transports (HTTP, OAuth token refresh, streaming)
//! are out of scope — this module only fixes the trait boundary the rest of
//! the runtime programs against, per the external-interfaces contract.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors from an LLM client call.
#[derive(Debug, Error, Clone)]
pub enum LlmError {
    #[error("LLM call failed: {0}")]
    Failure(String),
}

impl LlmError {
    /// Retriable transport errors (SSL record MAC failures, connection
    /// resets) and rate-limit signals (HTTP 429), classified by substring on
    /// the lowercased error message — the same classification the client
    /// layer uses to decide whether to retry with backoff.
    pub fn is_transient(&self) -> bool {
        let msg = self.to_string().to_lowercase();
        is_transient_error_message(&msg)
    }

    pub fn is_rate_limited(&self) -> bool {
        let msg = self.to_string().to_lowercase();
        is_rate_limit_message(&msg)
    }
}

/// Substring classification for transient/retriable transport failures.
pub fn is_transient_error_message(lowered: &str) -> bool {
    const TRANSIENT_MARKERS: &[&str] = &[
        "ssl",
        "bad_record_mac",
        "connection reset",
        "connection aborted",
        "broken pipe",
        "timed out",
    ];
    TRANSIENT_MARKERS.iter().any(|m| lowered.contains(m)) || is_rate_limit_message(lowered)
}

/// Substring classification for HTTP 429 / rate-limit signals.
pub fn is_rate_limit_message(lowered: &str) -> bool {
    lowered.contains("429") || lowered.contains("rate limit") || lowered.contains("too many requests")
}

/// A tool an actor can bind. Tools may perform arbitrary I/O; failures are
/// captured and returned as a string to the LLM rather than propagated.
#[async_trait]
pub trait ActorTool: Send + Sync {
    fn name(&self) -> &str;
    async fn call(&self, args: Value) -> String;
}

/// `tool_name -> (function, schema)`, as supplied to the runner. Schemas are
/// opaque to the core; they are passed straight through to the LLM client.
pub type ToolRegistryMap = HashMap<String, (Arc<dyn ActorTool>, Option<Value>)>;

/// The LLM client contract consumed by actors, the heartbeat, and the
/// hippocampus analyzer. Tool invocation and streaming are delegated: the
/// core only ever observes the final assistant string plus whatever side
/// effects the bound tool functions performed.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send `user_message`, run up to `max_tool_iterations` tool round-trips,
    /// and return the final assistant text.
    async fn chat(&self, user_message: &str, max_tool_iterations: Option<u32>) -> Result<String, LlmError>;

    /// Bind a tool for subsequent `chat` calls.
    fn add_tool(&self, tool: Arc<dyn ActorTool>, schema: Option<Value>);

    /// Replace the system prompt used for subsequent `chat` calls.
    fn set_system_prompt(&self, prompt: String);
}

/// Provider callback: produces a recent-signals snapshot for the heartbeat.
/// May fail; failures are caught by the caller and surrogate text is
/// substituted.
pub type RecentSignalsProvider = Arc<dyn Fn() -> Result<String, String> + Send + Sync>;

/// Provider callback: produces a principal-context snapshot for the
/// heartbeat.
pub type PrincipalContextProvider = Arc<dyn Fn() -> Result<String, String> + Send + Sync>;

/// Transport callback consumed by the principal via the conversation
/// manager. The core never calls the chat transport directly except
/// through this.
#[async_trait]
pub trait UserTransport: Send + Sync {
    async fn send_to_user(&self, chat_id: i64, text: &str) -> Result<(), String>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn ssl_bad_record_mac_is_transient() {
        let msg = "[SSL: SSLV3_ALERT_BAD_RECORD_MAC] sslv3 alert bad record mac (_ssl.c:2580)".to_lowercase();
        assert!(is_transient_error_message(&msg));
    }

    #[test]
    fn rate_limit_classification() {
        assert!(is_rate_limit_message("429 too many requests"));
        assert!(!is_rate_limit_message("connection reset by peer"));
    }

    #[test]
    fn connection_reset_is_transient_but_not_rate_limited() {
        assert!(is_transient_error_message("connection reset by peer"));
        assert!(!is_rate_limit_message("connection reset by peer"));
    }
}
