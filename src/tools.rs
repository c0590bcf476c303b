//! Actor tools: bound functions that close over `(actor, registry)`.
//!
//! Every actor gets `send_message`, `wait_for_response`, `discover_actors`,
//! and `terminate`. `spawn_subagent` is added only for principals and for
//! actors whose config explicitly grants the `"spawn"` tool.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::actor::{Actor, ActorConfig};
use crate::ids::ActorId;
use crate::llm::ActorTool;
use crate::registry::ActorRegistry;

fn arg_str(args: &Value, key: &str) -> Option<String> {
    args.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

struct SendMessageTool {
    actor: Arc<Actor>,
    registry: ActorRegistry,
}

#[async_trait]
impl ActorTool for SendMessageTool {
    fn name(&self) -> &str {
        "send_message"
    }

    async fn call(&self, args: Value) -> String {
        let actor_id = arg_str(&args, "actor_id").unwrap_or_default();
        let content = arg_str(&args, "content").unwrap_or_default();
        let reply_to = arg_str(&args, "reply_to").map(|s| s.as_str().into());

        let Some(target) = self.registry.get(&ActorId::from(actor_id.as_str())) else {
            return format!(
                "Error: actor {actor_id} not found. Use discover_actors() to find available actors."
            );
        };
        if target.state().is_terminated() {
            return format!("Error: actor {actor_id} ({}) is terminated.", target.config.name);
        }
        match self.actor.send_to(&target.id, content, reply_to).await {
            Ok(message) => format!(
                "Message sent (id={}) to {} ({actor_id})",
                message.id, target.config.name
            ),
            Err(err) => format!("Error: {err}"),
        }
    }
}

struct WaitForResponseTool {
    actor: Arc<Actor>,
    registry: ActorRegistry,
}

#[async_trait]
impl ActorTool for WaitForResponseTool {
    fn name(&self) -> &str {
        "wait_for_response"
    }

    async fn call(&self, args: Value) -> String {
        let timeout_seconds = args
            .get("timeout")
            .and_then(|v| v.as_f64())
            .unwrap_or(60.0)
            .max(0.0);
        match self
            .actor
            .wait_for_reply(Duration::from_secs_f64(timeout_seconds))
            .await
        {
            None => "Timed out waiting for response.".to_string(),
            Some(message) => {
                let sender_name = self
                    .registry
                    .get(&message.sender)
                    .map(|a| a.config.name.clone())
                    .unwrap_or_else(|| message.sender.to_string());
                format!("[From {sender_name}] {}", message.content)
            }
        }
    }
}

struct DiscoverActorsTool {
    actor: Arc<Actor>,
    registry: ActorRegistry,
}

#[async_trait]
impl ActorTool for DiscoverActorsTool {
    fn name(&self) -> &str {
        "discover_actors"
    }

    async fn call(&self, args: Value) -> String {
        let group = arg_str(&args, "group").unwrap_or_default();
        let search_group = if group.is_empty() {
            self.actor.config.group.clone()
        } else {
            group
        };
        let infos = self.registry.discover(&search_group);
        if infos.is_empty() {
            return format!("No active actors in group '{search_group}'.");
        }
        infos
            .iter()
            .map(|info| info.format_for(&self.actor.id))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

struct TerminateTool {
    actor: Arc<Actor>,
}

#[async_trait]
impl ActorTool for TerminateTool {
    fn name(&self) -> &str {
        "terminate"
    }

    async fn call(&self, args: Value) -> String {
        let result = arg_str(&args, "result");
        self.actor.terminate(result);
        "Terminated. Result sent to parent.".to_string()
    }
}

struct SpawnSubagentTool {
    actor: Arc<Actor>,
    registry: ActorRegistry,
}

#[async_trait]
impl ActorTool for SpawnSubagentTool {
    fn name(&self) -> &str {
        "spawn_subagent"
    }

    async fn call(&self, args: Value) -> String {
        let name = arg_str(&args, "name").unwrap_or_else(|| "subagent".to_string());
        let goals = arg_str(&args, "goals").unwrap_or_default();
        let group = arg_str(&args, "group").filter(|g| !g.is_empty());
        let tools_csv = arg_str(&args, "tools").unwrap_or_default();
        let model = arg_str(&args, "model");
        let max_turns = args.get("max_turns").and_then(|v| v.as_u64()).unwrap_or(20) as u32;

        let tool_list: Vec<String> = tools_csv
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let mut config = ActorConfig::new(name, goals)
            .with_group(group.unwrap_or_else(|| self.actor.config.group.clone()))
            .with_tools(tool_list)
            .with_max_turns(max_turns);
        if let Some(model) = model {
            config = config.with_model(model);
        }

        match self.registry.spawn(config.clone(), Some(self.actor.id.clone()), false) {
            Ok(child) => format!(
                "Spawned subagent '{}' (id={}) in group '{}'.\nGoals: {}\nIt will message you when done.",
                config.name, child.id, config.group, config.goals
            ),
            Err(err) => format!("Error: {err}"),
        }
    }
}

/// Build the standard tool set for `actor`. `spawn_subagent` is included
/// only for principals or actors whose config explicitly grants `"spawn"`.
pub fn create_actor_tools(actor: Arc<Actor>, registry: ActorRegistry) -> Vec<Arc<dyn ActorTool>> {
    let mut tools: Vec<Arc<dyn ActorTool>> = vec![
        Arc::new(SendMessageTool {
            actor: actor.clone(),
            registry: registry.clone(),
        }),
        Arc::new(WaitForResponseTool {
            actor: actor.clone(),
            registry: registry.clone(),
        }),
        Arc::new(DiscoverActorsTool {
            actor: actor.clone(),
            registry: registry.clone(),
        }),
        Arc::new(TerminateTool { actor: actor.clone() }),
    ];

    if actor.is_principal || actor.config.permits_spawn() {
        tools.push(Arc::new(SpawnSubagentTool { actor, registry }));
    }

    tools
}
