//! The message value type exchanged between actors.
//!
//! There is exactly one message shape in this domain — an inter-actor chat
//! turn — so `ActorMessage` is a concrete struct rather than a trait
//! implementor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ActorId, MessageId};

/// An immutable message exchanged between two actors.
///
/// Delivery invariant: a `ActorMessage` appears in the recipient's inbox
/// exactly once and in both participants' histories exactly once. Nothing in
/// this type is mutable after construction; `ActorMessage::new` is the only
/// constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorMessage {
    pub id: MessageId,
    pub sender: ActorId,
    pub recipient: ActorId,
    pub content: String,
    pub reply_to: Option<MessageId>,
    pub created_at: DateTime<Utc>,
}

impl ActorMessage {
    pub fn new(
        sender: ActorId,
        recipient: ActorId,
        content: impl Into<String>,
        reply_to: Option<MessageId>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            sender,
            recipient,
            content: content.into(),
            reply_to,
            created_at: Utc::now(),
        }
    }

    /// Short human-readable line, used in log output and tool confirmations.
    pub fn format(&self) -> String {
        format!(
            "[{}] {} -> {}: {}",
            self.id, self.sender, self.recipient, self.content
        )
    }
}

/// One turn of an LLM chat transcript, as projected from an actor's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}
