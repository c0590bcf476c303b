//! The actor runner: drives one non-principal actor's LLM turn loop.

use std::sync::Arc;
use std::time::Duration;

use crate::actor::{Actor, ActorState};
use crate::llm::{LlmClient, ToolRegistryMap};
use crate::registry::ActorRegistry;
use crate::tools::create_actor_tools;

/// How long the runner waits for a fresh inbox message after a
/// non-acknowledgment response, before starting the next turn. This is a
/// pacing heuristic only — removing it does not violate any contract an
/// implementer of this crate is required to uphold.
const IDLE_WAIT: Duration = Duration::from_secs(2);

const ACKNOWLEDGMENT_TOKENS: &[&str] = &["ok", "done", "understood"];

/// Runs one non-principal actor's LLM loop asynchronously.
pub struct ActorRunner {
    actor: Arc<Actor>,
    registry: ActorRegistry,
    llm: Arc<dyn LlmClient>,
    available_tools: ToolRegistryMap,
}

impl ActorRunner {
    pub fn new(
        actor: Arc<Actor>,
        registry: ActorRegistry,
        llm: Arc<dyn LlmClient>,
        available_tools: ToolRegistryMap,
    ) -> Self {
        Self {
            actor,
            registry,
            llm,
            available_tools,
        }
    }

    /// Run the actor's LLM loop until completion or max turns. Never
    /// surfaces an error to the caller — every failure path terminates the
    /// actor and records the reason in its result.
    pub async fn run(&self) -> String {
        let actor = &self.actor;

        for tool in create_actor_tools(actor.clone(), self.registry.clone()) {
            self.llm.add_tool(tool, None);
        }
        for tool_name in &actor.config.tools {
            match self.available_tools.get(tool_name) {
                Some((tool, schema)) => self.llm.add_tool(tool.clone(), schema.clone()),
                None => tracing::warn!(actor_id = %actor.id, tool = %tool_name, "requested tool not available"),
            }
        }

        self.llm.set_system_prompt(actor.build_system_prompt());

        let initial_message = format!(
            "You are actor '{}'. Your goals:\n\n{}\n\nBegin working on your task. Use tools as needed. When done, call terminate(result) with a summary.",
            actor.config.name, actor.config.goals
        );

        tracing::info!(actor_id = %actor.id, name = %actor.config.name, "actor starting execution");

        let mut last_response = String::new();

        for turn in 0..actor.config.max_turns {
            actor.set_turns(turn + 1);

            if actor.state() == ActorState::Terminated {
                break;
            }

            let incoming = actor.drain_inbox().await;

            let message = if turn == 0 {
                initial_message.clone()
            } else if !incoming.is_empty() {
                incoming
                    .iter()
                    .map(|m| {
                        let sender_name = self
                            .registry
                            .get(&m.sender)
                            .map(|a| a.config.name.clone())
                            .unwrap_or_else(|| m.sender.to_string());
                        format!("[Message from {sender_name}]: {}", m.content)
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            } else {
                "[System: Continue working on your goals. Call terminate(result) when done.]".to_string()
            };

            match self.llm.chat(&message, None).await {
                Ok(response) => last_response = response,
                Err(err) => {
                    tracing::error!(actor_id = %actor.id, error = %err, "actor LLM error");
                    actor.terminate(Some(format!("Error: {err}")));
                    break;
                }
            }

            if actor.state() == ActorState::Terminated {
                break;
            }

            let is_acknowledgment = ACKNOWLEDGMENT_TOKENS
                .iter()
                .any(|ack| last_response.trim().eq_ignore_ascii_case(ack));
            if is_acknowledgment {
                continue;
            }

            actor.wait_for_reply(IDLE_WAIT).await;
        }

        if actor.state() != ActorState::Terminated {
            tracing::warn!(actor_id = %actor.id, max_turns = actor.config.max_turns, "actor hit max turns");
            let trunc: String = last_response.chars().take(200).collect();
            let summary = if last_response.is_empty() { "none".to_string() } else { trunc };
            actor.terminate(Some(format!("Max turns reached. Last response: {summary}")));
        }

        actor.result().unwrap_or_else(|| "No result".to_string())
    }
}

/// Start an actor running in the background. Returns a join handle that can
/// be awaited for the result.
pub fn run_actor_in_background(runner: ActorRunner) -> tokio::task::JoinHandle<String> {
    tokio::spawn(async move { runner.run().await })
}
