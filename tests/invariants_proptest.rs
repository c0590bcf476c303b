//! Randomized checks for the invariants called out as testable properties:
//! unique principal, monotonic state, exactly-once delivery, and group
//! isolation under discovery. Each property is driven over many random
//! shapes rather than a single fixed scenario.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;

use lethe_core::prelude::*;

/// Single-threaded, like `#[tokio::test]`'s default flavor: the coalescing
/// property depends on submits not yielding to a concurrently-scheduled
/// process loop on another worker thread before they've all landed in
/// `pending`, exactly as the non-proptest coalescing tests rely on.
fn rt() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("build current-thread runtime")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// `get_principal` returns a value iff exactly one Running actor has
    /// `is_principal = true`. True regardless of how many non-principal
    /// spawns happen before or after it, and regardless of the principal
    /// attempt's position in the sequence.
    #[test]
    fn unique_principal_holds_across_random_spawn_order(
        pre_spawns in 0usize..8,
        post_spawns in 0usize..8,
        principal_position in 0usize..3,
    ) {
        let registry = ActorRegistry::new();

        for i in 0..pre_spawns {
            let _ = registry.spawn(ActorConfig::new(format!("pre{i}"), "x"), None, false);
        }

        let principal = if principal_position != 1 {
            registry.spawn(ActorConfig::new("principal", "serve"), None, true).ok()
        } else {
            None
        };

        for i in 0..post_spawns {
            let _ = registry.spawn(ActorConfig::new(format!("post{i}"), "x"), None, false);
        }

        match (principal, registry.get_principal()) {
            (Some(p), Some(found)) => prop_assert_eq!(p.id, found.id),
            (None, found) => prop_assert!(found.is_none()),
            (Some(_), None) => prop_assert!(false, "spawned principal must be discoverable"),
        }

        // A second principal spawn attempt must always be rejected while
        // the first is still Running, no matter how many other actors
        // were spawned around it.
        if registry.get_principal().is_some() {
            let conflict = registry.spawn(ActorConfig::new("intruder", "x"), None, true);
            prop_assert!(conflict.is_err());
        }
    }

    /// For any random sequence of terminations, `discover(group)` never
    /// contains a terminated actor, and always contains every non-terminated
    /// actor whose group matches — regardless of which subset was killed.
    #[test]
    fn discover_excludes_terminated_for_any_kill_subset(
        group_a_count in 1usize..6,
        group_b_count in 1usize..6,
        kill_mask in prop::collection::vec(any::<bool>(), 0..12),
    ) {
        let registry = ActorRegistry::new();
        let mut group_a = Vec::new();
        for i in 0..group_a_count {
            let a = registry
                .spawn(ActorConfig::new(format!("a{i}"), "x").with_group("team_a"), None, false)
                .expect("spawn must succeed");
            group_a.push(a);
        }
        let mut group_b = Vec::new();
        for i in 0..group_b_count {
            let b = registry
                .spawn(ActorConfig::new(format!("b{i}"), "x").with_group("team_b"), None, false)
                .expect("spawn must succeed");
            group_b.push(b);
        }

        let all: Vec<_> = group_a.iter().chain(group_b.iter()).collect();
        for (actor, &kill) in all.iter().zip(kill_mask.iter().cycle()) {
            if kill {
                actor.terminate(Some("killed".to_string()));
            }
        }

        let alive_a: Vec<_> = group_a.iter().filter(|a| !a.state().is_terminated()).map(|a| a.id.clone()).collect();
        let alive_b: Vec<_> = group_b.iter().filter(|b| !b.state().is_terminated()).map(|b| b.id.clone()).collect();

        let discovered_a: Vec<_> = registry.discover("team_a").into_iter().map(|i| i.id).collect();
        let discovered_b: Vec<_> = registry.discover("team_b").into_iter().map(|i| i.id).collect();

        prop_assert_eq!(to_sorted(discovered_a), to_sorted(alive_a));
        prop_assert_eq!(to_sorted(discovered_b), to_sorted(alive_b));
    }

    /// For any pair of actors and any message content, a completed `send_to`
    /// delivers exactly once into the recipient's inbox and exactly once
    /// into both participants' histories.
    #[test]
    fn delivery_is_exactly_once_for_any_content(content in "[a-zA-Z0-9 ]{0,40}") {
        rt().block_on(async {
            let registry = ActorRegistry::new();
            let a = registry.spawn(ActorConfig::new("a", "x"), None, false).expect("spawn a");
            let b = registry.spawn(ActorConfig::new("b", "x"), None, false).expect("spawn b");

            a.send_to(&b.id, content.clone(), None).await.expect("send_to");

            let a_history_matches = a.history().iter().filter(|m| m.content == content).count();
            let b_history_matches = b.history().iter().filter(|m| m.content == content).count();
            prop_assert_eq!(a_history_matches, 1);
            prop_assert_eq!(b_history_matches, 1);

            let drained = b.drain_inbox().await;
            let inbox_matches = drained.iter().filter(|m| m.content == content).count();
            prop_assert_eq!(inbox_matches, 1);
            Ok(())
        })?;
    }

    /// Any random batch of submissions to the same chat, arriving before a
    /// slow callback first reads them, is combined into one turn whose
    /// content is their FIFO-ordered join, and the chat's pending count is
    /// zero immediately after that turn completes.
    #[test]
    fn coalescing_preserves_fifo_order_for_any_batch(
        messages in prop::collection::vec("[a-zA-Z0-9]{1,10}", 1..6),
    ) {
        rt().block_on(async {
            tokio::time::pause();
            let manager = ConversationManager::new();
            let seen: std::sync::Arc<parking_lot::Mutex<Vec<String>>> =
                std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
            let seen_clone = seen.clone();
            let callback: ProcessCallback =
                std::sync::Arc::new(move |_chat_id, _user_id, combined, _metadata, _interrupt_check| {
                    let seen = seen_clone.clone();
                    Box::pin(async move {
                        tokio::time::sleep(std::time::Duration::from_millis(80)).await;
                        seen.lock().push(combined);
                        Ok(())
                    })
                });

            for message in &messages {
                manager.submit(7, "alice", message.clone(), serde_json::json!({}), callback.clone()).await;
            }
            tokio::time::sleep(std::time::Duration::from_millis(300)).await;

            let expected = messages.join("\n\n---\n[Additional message while processing:]\n");
            prop_assert_eq!(seen.lock().clone(), vec![expected]);
            prop_assert_eq!(manager.get_pending_count(7), 0);
            Ok(())
        })?;
    }
}

fn to_sorted<T: Ord>(mut v: Vec<T>) -> Vec<T> {
    v.sort();
    v
}

mod monotonic_and_bound {
    use super::*;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::collections::HashMap;
    use std::sync::Arc;

    struct FixedResponseLlm {
        response: String,
    }

    #[async_trait]
    impl LlmClient for FixedResponseLlm {
        async fn chat(&self, _user_message: &str, _max_tool_iterations: Option<u32>) -> Result<String, LlmError> {
            Ok(self.response.clone())
        }
        fn add_tool(&self, _tool: Arc<dyn ActorTool>, _schema: Option<Value>) {}
        fn set_system_prompt(&self, _prompt: String) {}
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Over any random mix of terminated and still-running actors, every
        /// observed state is one of the two reachable via the public API
        /// (`Running`, spawn's automatic `Initializing -> Running`, or
        /// `Terminated` after an explicit `terminate`), and a terminated
        /// actor never reports anything else afterwards, no matter how many
        /// times it is asked again.
        #[test]
        fn state_never_leaves_terminated_once_entered(
            terminate_before_checks in any::<bool>(),
            extra_checks in 0usize..5,
        ) {
            let registry = ActorRegistry::new();
            let actor = registry.spawn(ActorConfig::new("a", "x"), None, false).expect("spawn");
            prop_assert_eq!(actor.state(), ActorState::Running);

            if terminate_before_checks {
                actor.terminate(Some("done".to_string()));
            }

            for _ in 0..extra_checks {
                let state = actor.state();
                if terminate_before_checks {
                    prop_assert!(state.is_terminated());
                } else {
                    prop_assert!(!state.is_terminated());
                }
            }

            if !terminate_before_checks {
                actor.terminate(Some("done".to_string()));
            }
            prop_assert!(actor.state().is_terminated());
            // Terminated is absorbing: a second terminate call changes nothing.
            actor.terminate(Some("done again".to_string()));
            prop_assert!(actor.state().is_terminated());
        }

        /// For any `max_turns` and any LLM response that never acknowledges
        /// and never calls `terminate`, the runner force-terminates at
        /// exactly `max_turns` and never exceeds it.
        #[test]
        fn runner_never_exceeds_configured_max_turns(max_turns in 1u32..6) {
            rt().block_on(async {
                tokio::time::pause();
                let registry = ActorRegistry::new();
                let actor = registry
                    .spawn(ActorConfig::new("sub", "work").with_max_turns(max_turns), None, false)
                    .expect("spawn");
                let llm = Arc::new(FixedResponseLlm { response: "still working on it".to_string() });
                let runner = ActorRunner::new(actor.clone(), registry, llm, HashMap::new());
                let result = runner.run().await;

                prop_assert!(result.starts_with("Max turns reached."));
                prop_assert!(actor.state().is_terminated());
                prop_assert_eq!(actor.turns(), max_turns);
                Ok(())
            })?;
        }
    }
}
