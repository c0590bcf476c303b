//! Actor configuration supplied at spawn time.

use serde::{Deserialize, Serialize};

/// Default per-actor inbox capacity.
pub const DEFAULT_INBOX_CAPACITY: usize = 256;

/// Static configuration for a spawned actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorConfig {
    /// Human-readable label, shown in discovery listings and prompts.
    pub name: String,
    /// Peer-discovery tag. Has no authority implications.
    pub group: String,
    /// Free-text goals the actor must pursue.
    pub goals: String,
    /// Optional model override for this actor's LLM client.
    pub model: Option<String>,
    /// Tool names this actor is permitted to bind.
    pub tools: Vec<String>,
    /// Maximum runner turns before forced termination.
    pub max_turns: u32,
    /// History window size fed to the LLM as chat context.
    pub max_messages: usize,
}

impl ActorConfig {
    pub fn new(name: impl Into<String>, goals: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: "default".to_string(),
            goals: goals.into(),
            model: None,
            tools: Vec::new(),
            max_turns: 20,
            max_messages: 50,
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn with_tools(mut self, tools: Vec<String>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Whether this actor is allowed to bind `spawn_subagent`, beyond the
    /// implicit grant every principal has.
    pub fn permits_spawn(&self) -> bool {
        self.tools.iter().any(|t| t == "spawn")
    }
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self::new("unnamed", "")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn default_group_is_default() {
        let cfg = ActorConfig::new("bob", "be helpful");
        assert_eq!(cfg.group, "default");
        assert_eq!(cfg.max_turns, 20);
        assert_eq!(cfg.max_messages, 50);
    }

    #[test]
    fn permits_spawn_requires_literal_token() {
        let cfg = ActorConfig::new("bob", "x").with_tools(vec!["read_file".into()]);
        assert!(!cfg.permits_spawn());
        let cfg = cfg.with_tools(vec!["spawn".into()]);
        assert!(cfg.permits_spawn());
    }
}
