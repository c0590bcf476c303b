//! Identity types shared across the runtime.
//!
//! Every actor and message gets a short, process-unique identifier: the first
//! eight hex characters of a v4 UUID. This keeps log lines and tool-call
//! arguments readable while remaining unique enough in practice for a
//! single-process runtime; collisions are astronomically unlikely and are
//! not guarded against.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn short_id() -> String {
    let full = Uuid::new_v4().simple().to_string();
    full[..8].to_string()
}

/// Unique identifier for an [`crate::actor::Actor`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(String);

impl ActorId {
    pub fn new() -> Self {
        Self(short_id())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ActorId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ActorId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Unique identifier for a [`crate::message::ActorMessage`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    pub fn new() -> Self {
        Self(short_id())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for MessageId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn actor_ids_are_eight_hex_chars() {
        let id = ActorId::new();
        assert_eq!(id.as_str().len(), 8);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn ids_are_distinct() {
        assert_ne!(ActorId::new(), ActorId::new());
        assert_ne!(MessageId::new(), MessageId::new());
    }

    #[test]
    fn display_matches_as_str() {
        let id = ActorId::new();
        assert_eq!(id.to_string(), id.as_str());
    }
}
