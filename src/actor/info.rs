//! Public projection of an actor for discovery.

use serde::{Deserialize, Serialize};

use crate::actor::state::ActorState;
use crate::ids::ActorId;

/// Everything a peer is allowed to know about another actor.
///
/// Never exposes inbox, history, or result — those are private to the actor
/// and its runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorInfo {
    pub id: ActorId,
    pub name: String,
    pub group: String,
    pub goals: String,
    pub state: ActorState,
    pub spawned_by: Option<ActorId>,
}

impl ActorInfo {
    /// Render a listing line, annotating the caller's own entry with "(you)".
    pub fn format_for(&self, viewer: &ActorId) -> String {
        let marker = if &self.id == viewer { " (you)" } else { "" };
        format!(
            "- {} [{}] group={} goals=\"{}\"{}",
            self.name, self.id, self.group, self.goals, marker
        )
    }
}
