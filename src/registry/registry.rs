//! The actor registry: spawn, lookup, discovery, and termination notification.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;

use crate::actor::{Actor, ActorConfig, ActorError, ActorInfo};
use crate::ids::ActorId;
use crate::message::ActorMessage;

/// Owns the set of live actors. The sole authority for spawn, discovery, and
/// parent notification on termination.
///
/// Cheaply cloneable: internally an `Arc<DashMap<..>>`, so every spawned
/// [`Actor`] can hold its own handle back to the registry without needing a
/// separate `Arc<ActorRegistry>` wrapper, mirroring the lock-free registry
/// pattern this runtime uses for its message-routing tables.
#[derive(Clone)]
pub struct ActorRegistry {
    actors: Arc<DashMap<ActorId, Arc<Actor>>>,
    principal_id: Arc<RwLock<Option<ActorId>>>,
}

impl ActorRegistry {
    pub fn new() -> Self {
        Self {
            actors: Arc::new(DashMap::new()),
            principal_id: Arc::new(RwLock::new(None)),
        }
    }

    /// Spawn a new actor. Fails with `PrincipalConflict` if a second
    /// principal spawn is attempted while one is already live.
    pub fn spawn(
        &self,
        config: ActorConfig,
        spawned_by: Option<ActorId>,
        is_principal: bool,
    ) -> Result<Arc<Actor>, ActorError> {
        if is_principal {
            if let Some(existing) = self.principal_id.read().clone() {
                if self.get(&existing).map(|a| !a.state().is_terminated()).unwrap_or(false) {
                    return Err(ActorError::PrincipalConflict(existing));
                }
            }
        }

        let actor = Arc::new(Actor::new(config, self.clone(), spawned_by, is_principal));
        actor.set_state(crate::actor::ActorState::Running);

        if is_principal {
            *self.principal_id.write() = Some(actor.id.clone());
        }

        tracing::info!(
            actor_id = %actor.id,
            name = %actor.config.name,
            principal = is_principal,
            "registry: spawned actor"
        );
        self.actors.insert(actor.id.clone(), actor.clone());
        Ok(actor)
    }

    pub fn get(&self, id: &ActorId) -> Option<Arc<Actor>> {
        self.actors.get(id).map(|entry| entry.value().clone())
    }

    pub fn get_principal(&self) -> Option<Arc<Actor>> {
        let id = self.principal_id.read().clone()?;
        self.get(&id)
    }

    /// Non-terminated actors whose group matches. Ordering is unspecified
    /// but stable per call (DashMap iteration order for a fixed snapshot).
    pub fn discover(&self, group: &str) -> Vec<ActorInfo> {
        self.actors
            .iter()
            .filter(|entry| entry.value().config.group == group && !entry.value().state().is_terminated())
            .map(|entry| entry.value().info())
            .collect()
    }

    /// Non-terminated direct descendants of `parent_id`.
    pub fn get_children(&self, parent_id: &ActorId) -> Vec<Arc<Actor>> {
        self.actors
            .iter()
            .filter(|entry| {
                entry.value().spawned_by.as_ref() == Some(parent_id) && !entry.value().state().is_terminated()
            })
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Called by `Actor::terminate`. If the parent exists and is still
    /// Running, enqueue a `[TERMINATED]` notification. Delivery is
    /// best-effort: `Actor::send` itself never fails from the registry's
    /// point of view, so there is no synchronous/async split to make here —
    /// the caller decides whether to await it or spawn it as a background
    /// task (see the runner and amygdala callers).
    pub fn on_actor_terminated(&self, actor_id: &ActorId) {
        let Some(actor) = self.get(actor_id) else {
            return;
        };
        let Some(parent_id) = actor.spawned_by.clone() else {
            return;
        };
        let Some(parent) = self.get(&parent_id) else {
            return;
        };
        if parent.state().is_terminated() {
            return;
        }

        let result = actor.result().unwrap_or_else(|| "no result".to_string());
        let content = format!("[TERMINATED] {} finished: {}", actor.config.name, result);
        let message = ActorMessage::new(actor_id.clone(), parent_id, content, None);

        // Best-effort delivery: if a tokio runtime is driving this call we
        // schedule it as a task so `terminate` (a sync function) never has
        // to block; if not, deliver directly into history/inbox so
        // synchronous teardown paths still observe the notification.
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move { parent.send(message).await });
            }
            Err(_) => {
                parent.deliver_sync(message);
            }
        }
    }

    pub fn active_count(&self) -> usize {
        self.actors.iter().filter(|entry| !entry.value().state().is_terminated()).count()
    }

    pub fn all_actors(&self) -> Vec<ActorInfo> {
        self.actors.iter().map(|entry| entry.value().info()).collect()
    }

    /// Remove terminated actors. Safe to call concurrently with spawns.
    pub fn cleanup_terminated(&self) {
        let terminated: Vec<ActorId> = self
            .actors
            .iter()
            .filter(|entry| entry.value().state().is_terminated())
            .map(|entry| entry.key().clone())
            .collect();
        for id in &terminated {
            self.actors.remove(id);
        }
        if !terminated.is_empty() {
            tracing::info!(count = terminated.len(), "registry: cleaned up terminated actors");
        }
    }
}

impl Default for ActorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
