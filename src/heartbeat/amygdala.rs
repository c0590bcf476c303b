//! The heartbeat actor: a background emotional-salience and flashback
//! monitor. Runs a short LLM round on a schedule, tags recent user signals
//! for valence/arousal, watches for repeated high-arousal themes, and
//! notifies the principal only when escalation is warranted. It never
//! talks to the user directly.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;

use crate::actor::{Actor, ActorConfig, ActorState};
use crate::heartbeat::config::{FLASHBACK_LOOKBACK, ROUND_HISTORY_LEN};
use crate::heartbeat::heuristics::heuristic_seed_tags;
use crate::heartbeat::status::{AmygdalaStatus, RoundRecord, RoundState};
use crate::ids::ActorId;
use crate::llm::{LlmClient, PrincipalContextProvider, RecentSignalsProvider, ToolRegistryMap};
use crate::message::ActorMessage;
use crate::registry::ActorRegistry;
use crate::tools::create_actor_tools;
use crate::workspace;

const GOALS: &str = "Tag emotional salience, track arousal patterns, detect flashbacks, \
and notify the principal only when escalation is warranted.";

const ROUND_TOOLS: &[&str] = &[
    "read_file",
    "write_file",
    "edit_file",
    "list_directory",
    "grep_search",
    "conversation_search",
    "memory_read",
];

const ROUND_MAX_TURNS: u32 = 6;
const MAX_TOOL_ITERATIONS: u32 = 4;

/// Produces a fresh LLM client for a round, already scoped to whatever
/// auxiliary model and context/token limits the caller wants this
/// background actor to run against.
pub type LlmFactory = Arc<dyn Fn() -> Arc<dyn LlmClient> + Send + Sync>;

pub struct Amygdala {
    registry: ActorRegistry,
    available_tools: ToolRegistryMap,
    cortex_id: ActorId,
    llm_factory: LlmFactory,
    recent_signals_provider: Option<RecentSignalsProvider>,
    principal_context_provider: Option<PrincipalContextProvider>,
    workspace_dir: PathBuf,

    status: Mutex<AmygdalaStatus>,
    round_history: Mutex<VecDeque<RoundRecord>>,
    active_patterns: Mutex<VecDeque<String>>,
}

impl Amygdala {
    pub fn new(
        registry: ActorRegistry,
        available_tools: ToolRegistryMap,
        cortex_id: ActorId,
        llm_factory: LlmFactory,
        workspace_dir: PathBuf,
    ) -> Self {
        Self {
            registry,
            available_tools,
            cortex_id,
            llm_factory,
            recent_signals_provider: None,
            principal_context_provider: None,
            workspace_dir,
            status: Mutex::new(AmygdalaStatus::default()),
            round_history: Mutex::new(VecDeque::with_capacity(ROUND_HISTORY_LEN)),
            active_patterns: Mutex::new(VecDeque::with_capacity(FLASHBACK_LOOKBACK)),
        }
    }

    pub fn with_recent_signals_provider(mut self, provider: RecentSignalsProvider) -> Self {
        self.recent_signals_provider = Some(provider);
        self
    }

    pub fn with_principal_context_provider(mut self, provider: PrincipalContextProvider) -> Self {
        self.principal_context_provider = Some(provider);
        self
    }

    fn state_file(&self) -> PathBuf {
        self.workspace_dir.join("amygdala_state.md")
    }

    fn tags_file(&self) -> PathBuf {
        self.workspace_dir.join("emotional_tags.md")
    }

    fn recent_signals(&self) -> String {
        match &self.recent_signals_provider {
            None => "(no signal provider)".to_string(),
            Some(provider) => match provider() {
                Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
                Ok(_) => "(no recent user signals)".to_string(),
                Err(err) => format!("(failed to get recent signals: {err})"),
            },
        }
    }

    fn principal_context(&self) -> String {
        match &self.principal_context_provider {
            None => String::new(),
            Some(provider) => provider().unwrap_or_default(),
        }
    }

    /// Pull out the most recent `[USER_NOTIFY]`/`[AMYGDALA_ALERT]` message
    /// this round's actor sent toward `cortex_id`, if any.
    fn extract_user_notification(messages: &[ActorMessage], cortex_id: &ActorId) -> Option<String> {
        let mut last = None;
        for m in messages {
            if &m.recipient != cortex_id || &m.sender == cortex_id {
                continue;
            }
            let text = m.content.trim();
            if let Some(rest) = text.strip_prefix("[USER_NOTIFY]") {
                last = Some(rest.trim().to_string());
            } else if text.starts_with("[AMYGDALA_ALERT]") {
                last = Some(text.to_string());
            }
        }
        last
    }

    fn update_active_patterns(&self, seeds: &[crate::heartbeat::heuristics::SeedTag]) {
        let mut patterns = self.active_patterns.lock();
        for seed in seeds {
            if !seed.high_arousal {
                continue;
            }
            if let Some(first) = seed.tags.first() {
                if patterns.len() == FLASHBACK_LOOKBACK {
                    patterns.pop_front();
                }
                patterns.push_back(first.clone());
            }
        }
    }

    /// Run one round. Always returns `None`: this actor never speaks to the
    /// user directly, it only escalates to the principal via actor messages
    /// (observable afterward through `status()`/`get_context_view()`).
    pub async fn run_round(&self) -> Option<String> {
        let round_started_at = Utc::now();
        let timestamp = round_started_at.format("%Y-%m-%d %H:%M UTC").to_string();
        {
            let mut status = self.status.lock();
            status.state = RoundState::Running;
            status.last_started_at = Some(round_started_at);
            status.last_error.clear();
        }
        let pruned_before = workspace::compact_log(
            &self.tags_file(),
            crate::heartbeat::config::TAG_LOG_MAX_CHARS,
            crate::heartbeat::config::TAG_LOG_KEEP_LINES,
        );
        if pruned_before > 0 {
            self.status.lock().tags_pruned_total += pruned_before as u64;
        }

        let previous_state = workspace::read_file_or(&self.state_file(), "(none)");
        let recent_signals = self.recent_signals();
        let (seeds, seed_tags_text) = heuristic_seed_tags(&recent_signals);

        let config = ActorConfig::new("amygdala", GOALS)
            .with_group("main")
            .with_tools(ROUND_TOOLS.iter().map(|s| s.to_string()).collect())
            .with_max_turns(ROUND_MAX_TURNS);

        let actor = match self.registry.spawn(config.clone(), Some(self.cortex_id.clone()), false) {
            Ok(actor) => actor,
            Err(err) => {
                self.status.lock().last_error = err.to_string();
                tracing::error!(error = %err, "amygdala: failed to spawn round actor");
                return None;
            }
        };

        let llm = (self.llm_factory)();
        let principal_context: String = self.principal_context().chars().take(4000).collect();
        llm.set_system_prompt(build_system_prompt(&self.workspace_dir, &principal_context));

        for tool in create_actor_tools(actor.clone(), self.registry.clone()) {
            llm.add_tool(tool, None);
        }
        for tool_name in &config.tools {
            if let Some((tool, schema)) = self.available_tools.get(tool_name) {
                llm.add_tool(tool.clone(), schema.clone());
            }
        }

        self.registry.cleanup_terminated();
        tracing::info!(actor_id = %actor.id, "amygdala round starting");

        let round_message = format!(
            "[Amygdala Round - {timestamp}]\n\nRecent user signals:\n{recent_signals}\n\nHeuristic seed tags:\n{seed_tags_text}\n\nPrevious state:\n{previous_state}\n\nDetect salience, tag emotions, check flashbacks, update files, and terminate."
        );

        let mut user_message: Option<String> = None;
        for turn in 0..config.max_turns {
            actor.set_turns(turn + 1);
            if actor.state() == ActorState::Terminated {
                break;
            }

            let incoming = actor.drain_inbox().await;
            let turn_message = if turn == 0 {
                round_message.clone()
            } else if !incoming.is_empty() {
                incoming.iter().map(|m| format!("[From {}]: {}", m.sender, m.content)).collect::<Vec<_>>().join("\n")
            } else {
                "[Continue. If complete, call terminate(result).]".to_string()
            };

            match llm.chat(&turn_message, Some(MAX_TOOL_ITERATIONS)).await {
                Ok(_) => {}
                Err(err) => {
                    tracing::error!(actor_id = %actor.id, error = %err, "amygdala LLM error");
                    self.status.lock().last_error = err.to_string();
                    break;
                }
            }

            let history = actor.history();
            if let Some(extracted) = Self::extract_user_notification(&history, &self.cortex_id) {
                user_message = Some(extracted);
            }

            if actor.state() == ActorState::Terminated {
                break;
            }
        }

        if actor.state() != ActorState::Terminated {
            actor.terminate(Some(format!("Amygdala round complete (turn {})", actor.turns())));
        }

        let round_completed_at = Utc::now();
        let duration_seconds = (round_completed_at - round_started_at).num_milliseconds() as f64 / 1000.0;
        let result = actor.result().unwrap_or_else(|| "No result".to_string());
        let result_trunc: String = result.chars().take(240).collect();

        {
            let mut status = self.status.lock();
            status.rounds_total += 1;
            status.last_completed_at = Some(round_completed_at);
            status.last_turns = actor.turns();
            status.last_result = result_trunc.clone();
            if let Some(ref alert) = user_message {
                status.last_alert = alert.chars().take(240).collect();
            }
            status.state = RoundState::Idle;
        }

        self.update_active_patterns(&seeds);

        let mut history = self.round_history.lock();
        if history.len() == ROUND_HISTORY_LEN {
            history.pop_front();
        }
        history.push_back(RoundRecord {
            started_at: round_started_at,
            completed_at: round_completed_at,
            turns: actor.turns(),
            duration_seconds,
            alert: user_message.is_some(),
            error: self.status.lock().last_error.clone(),
            result: result_trunc,
        });
        drop(history);

        let pruned_after = workspace::compact_log(
            &self.tags_file(),
            crate::heartbeat::config::TAG_LOG_MAX_CHARS,
            crate::heartbeat::config::TAG_LOG_KEEP_LINES,
        );
        if pruned_after > 0 {
            self.status.lock().tags_pruned_total += pruned_after as u64;
        }

        None
    }

    pub fn status(&self) -> AmygdalaStatus {
        self.status.lock().clone()
    }

    pub fn round_history(&self) -> Vec<RoundRecord> {
        self.round_history.lock().iter().cloned().collect()
    }

    pub fn active_patterns(&self) -> Vec<String> {
        self.active_patterns.lock().iter().cloned().collect()
    }

    /// Render a compact operator-facing view combining status, active
    /// patterns, and the tail of both workspace files.
    pub fn get_context_view(&self, max_chars: usize) -> String {
        let state_text = workspace::read_file_or(&self.state_file(), "(amygdala_state.md not found)");
        let tags_text = workspace::read_file_or(&self.tags_file(), "(emotional_tags.md not found)");
        let status = self.status();
        let half = max_chars / 2;
        let state_clip: String = state_text.chars().take(half).collect();
        let tags_clip: String = tags_text.chars().take(half).collect();
        let patterns = self.active_patterns();
        let patterns_line = if patterns.is_empty() { "(none)".to_string() } else { patterns.join(", ") };

        format!(
            "# Amygdala Context\n\n- state: {:?}\n- rounds_total: {}\n- last_turns: {}\n- last_error: {}\n- tags_pruned_total: {}\n\n## Active patterns\n{patterns_line}\n\n## amygdala_state.md\n{state_clip}\n\n## emotional_tags.md\n{tags_clip}",
            status.state, status.rounds_total, status.last_turns,
            if status.last_error.is_empty() { "-" } else { &status.last_error },
            status.tags_pruned_total,
        )
    }
}

fn build_system_prompt(workspace_dir: &std::path::Path, principal_context: &str) -> String {
    let workspace = workspace_dir.display();
    let context = if principal_context.is_empty() { "(none)" } else { principal_context };
    format!(
        "You are the heartbeat actor — a background emotional salience module.\n\n\
<purpose>\n\
You perform fast emotional monitoring for the principal assistant:\n\
- Tag recent user signals with valence and arousal\n\
- Detect urgency, threat, social tension, and boundary risks\n\
- Detect flashbacks (repeated unresolved high-arousal themes)\n\
- Notify the principal only when escalation is justified\n\
</purpose>\n\n\
<inputs>\n\
- Recent user signals are provided in the round message\n\
- Previous state at: {workspace}/amygdala_state.md\n\
- Emotional tags log at: {workspace}/emotional_tags.md\n\
- Principal context snapshot:\n{context}\n\
</inputs>\n\n\
<workflow>\n\
1. Read {workspace}/amygdala_state.md if present.\n\
2. Review recent user signals from this round message.\n\
3. Produce compact tags (valence [-1..1], arousal [0..1], trigger categories, confidence [0..1]).\n\
4. Check flashback likelihood: similar high-arousal themes repeating across rounds.\n\
5. Write updates to:\n\
   - {workspace}/emotional_tags.md (append concise entries)\n\
   - {workspace}/amygdala_state.md (latest baseline + active concerns)\n\
6. If urgent/escalation needed, send_message(principal_id, \"[AMYGDALA_ALERT] ...\").\n\
7. Call terminate(result) with concise summary.\n\
</workflow>\n\n\
<rules>\n\
- You are not user-facing.\n\
- Avoid spam: only escalate on meaningful urgency or strong repeated pattern.\n\
- Keep state concise and operational.\n\
- Use absolute paths rooted at {workspace}.\n\
- Most rounds should be quick (2-3 turns).\n\
</rules>"
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::llm::{ActorTool, LlmError};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::collections::HashMap;

    struct StubLlm;

    #[async_trait]
    impl LlmClient for StubLlm {
        async fn chat(&self, _user_message: &str, _max_tool_iterations: Option<u32>) -> Result<String, LlmError> {
            Ok("terminate".to_string())
        }
        fn add_tool(&self, _tool: Arc<dyn ActorTool>, _schema: Option<Value>) {}
        fn set_system_prompt(&self, _prompt: String) {}
    }

    #[tokio::test]
    async fn run_round_force_terminates_and_records_history() {
        let registry = ActorRegistry::new();
        let cortex = registry.spawn(ActorConfig::new("cortex", "serve"), None, true).unwrap();
        let dir = std::env::temp_dir().join(format!("lethe-amygdala-{}", uuid::Uuid::new_v4()));
        let amygdala = Amygdala::new(
            registry,
            HashMap::new(),
            cortex.id.clone(),
            Arc::new(|| Arc::new(StubLlm) as Arc<dyn LlmClient>),
            dir.clone(),
        );
        let result = amygdala.run_round().await;
        assert!(result.is_none());
        assert_eq!(amygdala.status().rounds_total, 1);
        assert_eq!(amygdala.round_history().len(), 1);
        std::fs::remove_dir_all(&dir).ok();
    }
}
