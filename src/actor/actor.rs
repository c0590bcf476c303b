//! The actor value type and its behavior contract.

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use crate::actor::config::{ActorConfig, DEFAULT_INBOX_CAPACITY};
use crate::actor::error::ActorError;
use crate::actor::inbox::Inbox;
use crate::actor::info::ActorInfo;
use crate::actor::state::ActorState;
use crate::ids::{ActorId, MessageId};
use crate::message::{ActorMessage, ChatRole, ChatTurn};
use crate::registry::ActorRegistry;

/// Default timeout for [`Actor::wait_for_reply`], in seconds.
pub const DEFAULT_REPLY_TIMEOUT_SECS: u64 = 120;

/// An autonomous unit with its own inbox, history, and LLM-driven behavior.
///
/// Actors are always constructed through [`ActorRegistry::spawn`], never
/// directly, so that the registry can maintain the unique-principal
/// invariant and the spawn/termination bookkeeping.
pub struct Actor {
    pub id: ActorId,
    pub config: ActorConfig,
    pub spawned_by: Option<ActorId>,
    pub is_principal: bool,
    pub created_at: DateTime<Utc>,

    state: RwLock<ActorState>,
    inbox: Inbox,
    history: Mutex<Vec<ActorMessage>>,
    result: Mutex<Option<String>>,
    turns: AtomicU32,

    registry: ActorRegistry,
}

impl Actor {
    pub(crate) fn new(
        config: ActorConfig,
        registry: ActorRegistry,
        spawned_by: Option<ActorId>,
        is_principal: bool,
    ) -> Self {
        let id = ActorId::new();
        tracing::info!(actor_id = %id, name = %config.name, group = %config.group, "actor created");
        Self {
            id,
            spawned_by,
            is_principal,
            created_at: Utc::now(),
            state: RwLock::new(ActorState::Initializing),
            inbox: Inbox::new(DEFAULT_INBOX_CAPACITY),
            history: Mutex::new(Vec::new()),
            result: Mutex::new(None),
            turns: AtomicU32::new(0),
            config,
            registry,
        }
    }

    pub fn state(&self) -> ActorState {
        *self.state.read()
    }

    pub(crate) fn set_state(&self, next: ActorState) {
        let mut guard = self.state.write();
        if guard.can_transition_to(next) {
            *guard = next;
        }
    }

    pub fn turns(&self) -> u32 {
        self.turns.load(Ordering::SeqCst)
    }

    pub(crate) fn set_turns(&self, turns: u32) {
        self.turns.store(turns, Ordering::SeqCst);
    }

    pub fn result(&self) -> Option<String> {
        self.result.lock().clone()
    }

    /// Public projection visible to other actors via discovery.
    pub fn info(&self) -> ActorInfo {
        ActorInfo {
            id: self.id.clone(),
            name: self.config.name.clone(),
            group: self.config.group.clone(),
            goals: self.config.goals.clone(),
            state: self.state(),
            spawned_by: self.spawned_by.clone(),
        }
    }

    /// Receive a message from another actor: append to history, enqueue into
    /// the inbox. Never blocks beyond the inbox bound.
    pub async fn send(&self, message: ActorMessage) {
        tracing::debug!(
            actor_id = %self.id,
            from = %message.sender,
            "message received"
        );
        self.history.lock().push(message.clone());
        self.inbox.push(message).await;
    }

    /// Send a message to another actor, resolved through the registry.
    pub async fn send_to(
        &self,
        recipient_id: &ActorId,
        content: impl Into<String>,
        reply_to: Option<MessageId>,
    ) -> Result<ActorMessage, ActorError> {
        let recipient = self
            .registry
            .get(recipient_id)
            .ok_or_else(|| ActorError::UnknownActor(recipient_id.clone()))?;
        let message = ActorMessage::new(self.id.clone(), recipient_id.clone(), content, reply_to);
        recipient.send(message.clone()).await;
        self.history.lock().push(message.clone());
        Ok(message)
    }

    /// Block until a message arrives or `timeout` elapses. Never raises on
    /// timeout — returns `None`.
    pub async fn wait_for_reply(&self, timeout: Duration) -> Option<ActorMessage> {
        let reply = self.inbox.recv_timeout(timeout).await;
        if reply.is_none() {
            tracing::warn!(actor_id = %self.id, "timed out waiting for reply");
        }
        reply
    }

    /// Drain everything currently queued, without blocking.
    pub async fn drain_inbox(&self) -> Vec<ActorMessage> {
        self.inbox.drain_nonblocking().await
    }

    /// The full send/receive history for this actor. Never drained; this is
    /// the append-only ledger `get_context_messages` and flashback-style
    /// reviewers (the heartbeat actor) read from.
    pub fn history(&self) -> Vec<ActorMessage> {
        self.history.lock().clone()
    }

    /// Best-effort synchronous delivery: used when no async runtime is
    /// driving the call, e.g. a termination notification fired outside a
    /// tokio context. Appends to history and enqueues without awaiting.
    pub(crate) fn deliver_sync(&self, message: ActorMessage) {
        self.history.lock().push(message.clone());
        self.inbox.try_push(message);
    }

    /// Idempotent transition to `Terminated`. Only the first call has any
    /// effect; later calls are no-ops.
    pub fn terminate(&self, result: Option<String>) {
        if self.state().is_terminated() {
            return;
        }
        let result = result.unwrap_or_else(|| format!("Actor {} terminated", self.config.name));
        tracing::info!(actor_id = %self.id, name = %self.config.name, result = %truncate(&result, 80), "actor terminated");
        *self.result.lock() = Some(result);
        self.set_state(ActorState::Terminated);
        self.registry.on_actor_terminated(&self.id);
    }

    /// Assemble the LLM system prompt: role framing, goals, group awareness,
    /// and the rules for the tools this actor will be offered.
    pub fn build_system_prompt(&self) -> String {
        let mut parts = Vec::new();

        if self.is_principal {
            parts.push("You are the principal actor (butler) — the user's direct assistant.".to_string());
            parts.push("You are the ONLY actor that communicates with the user.".to_string());
            parts.push("You can spawn subagents to handle subtasks, then report results to the user.".to_string());
        } else {
            parts.push(format!("You are a subagent actor named '{}'.", self.config.name));
            let parent = self.spawned_by.as_ref().map(|id| id.to_string()).unwrap_or_default();
            parts.push(format!(
                "You were spawned by actor '{parent}' to accomplish a specific task."
            ));
            parts.push(
                "You CANNOT talk to the user directly. Report your results to the actor that spawned you."
                    .to_string(),
            );
        }

        parts.push(format!("\n<goals>\n{}\n</goals>", self.config.goals));

        let group_actors = self.registry.discover(&self.config.group);
        let other_actors: Vec<_> = group_actors.into_iter().filter(|a| a.id != self.id).collect();
        if !other_actors.is_empty() {
            parts.push("\n<group_actors>".to_string());
            parts.push(format!("Other actors in group '{}':", self.config.group));
            for info in &other_actors {
                parts.push(format!(
                    "- {} (id={}, state={:?}): {}",
                    info.name, info.id, info.state, info.goals
                ));
            }
            parts.push("</group_actors>".to_string());
        }

        let history = self.history.lock();
        let inbox_messages: Vec<_> = history
            .iter()
            .filter(|m| m.sender != self.id)
            .rev()
            .take(10)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        if !inbox_messages.is_empty() {
            parts.push("\n<inbox>".to_string());
            parts.push("Recent messages from other actors:".to_string());
            for message in inbox_messages {
                parts.push(format_for_prompt(message));
            }
            parts.push("</inbox>".to_string());
        }
        drop(history);

        parts.push("\n<rules>".to_string());
        parts.push("- Use `send_message(actor_id, content)` to communicate with other actors".to_string());
        parts.push("- Use `discover_actors(group)` to find actors in your group".to_string());
        if self.is_principal {
            parts.push(
                "- Use `spawn_subagent(name, group, goals, tools)` to create child actors for subtasks"
                    .to_string(),
            );
        }
        parts.push(
            "- Use `terminate(result)` when your task is complete — include a summary of what you accomplished"
                .to_string(),
        );
        parts.push("- You can terminate yourself, but NOT other actors".to_string());
        parts.push("</rules>".to_string());

        parts.join("\n")
    }

    /// Project the last `max_messages` history entries into alternating
    /// assistant/user turns for the LLM client's chat context.
    pub fn get_context_messages(&self) -> Vec<ChatTurn> {
        let history = self.history.lock();
        let window_start = history.len().saturating_sub(self.config.max_messages);
        history[window_start..]
            .iter()
            .map(|message| {
                if message.sender == self.id {
                    ChatTurn {
                        role: ChatRole::Assistant,
                        content: message.content.clone(),
                    }
                } else {
                    let label = self
                        .registry
                        .get(&message.sender)
                        .map(|actor| actor.config.name.clone())
                        .unwrap_or_else(|| message.sender.to_string());
                    ChatTurn {
                        role: ChatRole::User,
                        content: format!("[From {label}]: {}", message.content),
                    }
                }
            })
            .collect()
    }
}

fn format_for_prompt(message: &ActorMessage) -> String {
    let ts = message.created_at.format("%H:%M:%S");
    let reply = message
        .reply_to
        .as_ref()
        .map(|id| format!(" (reply to {id})"))
        .unwrap_or_default();
    format!("[{ts}] {}{reply}: {}", message.sender, message.content)
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn terminate_is_idempotent() {
        let registry = ActorRegistry::new();
        let actor = registry
            .spawn(ActorConfig::new("solo", "goals"), None, false)
            .unwrap();
        actor.terminate(Some("first".to_string()));
        actor.terminate(Some("second".to_string()));
        assert_eq!(actor.result(), Some("first".to_string()));
        assert!(actor.state().is_terminated());
    }

    #[tokio::test]
    async fn send_to_unknown_recipient_errors() {
        let registry = ActorRegistry::new();
        let actor = registry
            .spawn(ActorConfig::new("solo", "goals"), None, false)
            .unwrap();
        let err = actor
            .send_to(&ActorId::from("ghost0000"), "hi", None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn delivery_appends_to_both_histories() {
        let registry = ActorRegistry::new();
        let a = registry.spawn(ActorConfig::new("a", "g"), None, false).unwrap();
        let b = registry.spawn(ActorConfig::new("b", "g"), None, false).unwrap();
        a.send_to(&b.id, "hello", None).await.unwrap();
        let b_reply = b.wait_for_reply(Duration::from_millis(50)).await;
        assert!(b_reply.is_some());
        assert_eq!(a.get_context_messages().len(), 1);
        assert_eq!(b.get_context_messages().len(), 1);
    }
}
