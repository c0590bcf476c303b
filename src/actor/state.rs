//! Actor lifecycle state.

use serde::{Deserialize, Serialize};

/// The lifecycle state of an [`super::Actor`].
///
/// States only move forward: `Initializing -> Running -> (Waiting)? -> Terminated`.
/// `Terminated` is absorbing — an actor never leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorState {
    Initializing,
    Running,
    Waiting,
    Terminated,
}

impl ActorState {
    /// Whether `self -> next` is a legal lifecycle transition.
    pub fn can_transition_to(self, next: ActorState) -> bool {
        use ActorState::*;
        match (self, next) {
            (Initializing, Running) => true,
            (Running, Waiting) => true,
            (Running, Terminated) => true,
            (Waiting, Running) => true,
            (Waiting, Terminated) => true,
            (same, next) if same == next => true,
            _ => false,
        }
    }

    pub fn is_terminated(self) -> bool {
        matches!(self, ActorState::Terminated)
    }
}

impl Default for ActorState {
    fn default() -> Self {
        ActorState::Initializing
    }
}
