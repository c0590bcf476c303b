//! Actor-level error kinds.

use thiserror::Error;

use crate::ids::ActorId;

/// Errors raised by actor-to-actor operations.
///
/// These never escape into the LLM loop: the runner and the tool bindings
/// catch them and fold them into a string result, per the "no error escapes
/// the loop" rule.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActorError {
    /// `send_to`/`send_message` named an id the registry does not know.
    #[error("actor {0} not found")]
    UnknownActor(ActorId),

    /// `send_message` targeted an actor that has already terminated.
    #[error("actor {0} is terminated")]
    ActorTerminated(ActorId),

    /// A second principal spawn was attempted while one was already live.
    #[error("a principal actor is already running ({0})")]
    PrincipalConflict(ActorId),
}

impl ActorError {
    /// Whether the caller should treat this as unrecoverable for the current
    /// operation (as opposed to something a retry or a different argument
    /// could fix).
    pub fn is_fatal(&self) -> bool {
        matches!(self, ActorError::PrincipalConflict(_))
    }

    /// Whether the failure is a "not found" class, useful for callers that
    /// want to present a uniform "unknown id" message.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ActorError::UnknownActor(_))
    }

    pub fn is_retryable(&self) -> bool {
        false
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn actor_error_is_send_sync() {
        assert_send_sync::<ActorError>();
    }

    #[test]
    fn classification_helpers() {
        let id = ActorId::from("deadbeef");
        assert!(ActorError::PrincipalConflict(id.clone()).is_fatal());
        assert!(ActorError::UnknownActor(id.clone()).is_not_found());
        assert!(!ActorError::ActorTerminated(id).is_fatal());
    }
}
