//! Interruptible-coalescing submission: many chat messages in, one
//! combined processing turn out, with new messages arriving mid-turn
//! folded into the next turn instead of queued behind it.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;

use crate::conversation::state::ConversationState;

/// A cheap, side-effect-free predicate the callback can poll mid-turn to
/// notice a new message arrived without waiting for the turn boundary.
/// Reading it never clears it — only the processing loop clears the
/// underlying signal, between turns.
pub type InterruptCheck = Arc<dyn Fn() -> bool + Send + Sync>;

/// A processing callback: given a chat id, user id, the combined message
/// text, its merged metadata, and an `interrupt_check` predicate, does
/// whatever the principal does with a turn. Errors are logged and retried
/// against whatever arrived in the meantime; they never abort the chat's
/// processing loop.
pub type ProcessCallback = Arc<
    dyn Fn(i64, String, String, Value, InterruptCheck) -> Pin<Box<dyn Future<Output = Result<(), String>> + Send>>
        + Send
        + Sync,
>;

struct ChatEntry {
    state: ConversationState,
    is_processing: std::sync::atomic::AtomicBool,
    submit_lock: AsyncMutex<()>,
    current_task: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

impl ChatEntry {
    fn new() -> Self {
        Self {
            state: ConversationState::new(),
            is_processing: std::sync::atomic::AtomicBool::new(false),
            submit_lock: AsyncMutex::new(()),
            current_task: parking_lot::Mutex::new(None),
        }
    }
}

/// Owns one [`ConversationState`] per chat and the task driving its
/// processing loop. Cheaply cloneable.
#[derive(Clone)]
pub struct ConversationManager {
    chats: Arc<DashMap<i64, Arc<ChatEntry>>>,
}

impl ConversationManager {
    pub fn new() -> Self {
        Self {
            chats: Arc::new(DashMap::new()),
        }
    }

    fn get_or_create(&self, chat_id: i64) -> Arc<ChatEntry> {
        self.chats.entry(chat_id).or_insert_with(|| Arc::new(ChatEntry::new())).clone()
    }

    /// Queue `content` for `chat_id`. If no turn is currently processing
    /// this chat, spawns the processing loop. If one is already running,
    /// the new message is folded into the next combined turn and the
    /// in-flight turn's interrupt flag is raised.
    ///
    /// The returned guard is held only for this method's own critical
    /// section (enqueue + maybe-spawn); the processing loop itself runs
    /// without holding it, so a slow turn never blocks new submissions.
    pub async fn submit(
        &self,
        chat_id: i64,
        user_id: impl Into<String>,
        content: impl Into<String>,
        metadata: Value,
        process: ProcessCallback,
    ) {
        let entry = self.get_or_create(chat_id);
        let _guard = entry.submit_lock.lock().await;

        let was_processing = entry
            .is_processing
            .load(std::sync::atomic::Ordering::SeqCst);
        entry.state.set_user_id(user_id);
        entry.state.add_message(content, metadata, was_processing);

        if !was_processing {
            entry.is_processing.store(true, std::sync::atomic::Ordering::SeqCst);
            let entry_for_task = entry.clone();
            let handle = tokio::spawn(async move {
                process_loop(chat_id, entry_for_task, process).await;
            });
            *entry.current_task.lock() = Some(handle);
        }
    }

    pub fn is_processing(&self, chat_id: i64) -> bool {
        self.chats
            .get(&chat_id)
            .map(|e| e.is_processing.load(std::sync::atomic::Ordering::SeqCst))
            .unwrap_or(false)
    }

    pub fn get_pending_count(&self, chat_id: i64) -> usize {
        self.chats.get(&chat_id).map(|e| e.state.pending_count()).unwrap_or(0)
    }

    /// Abort the in-flight processing task for `chat_id`, if any, and clear
    /// whatever is pending. Returns whether there was a task running or
    /// anything pending to cancel.
    pub fn cancel(&self, chat_id: i64) -> bool {
        let Some(entry) = self.chats.get(&chat_id) else {
            return false;
        };
        let had_task = entry.current_task.lock().take().map(|task| task.abort()).is_some();
        let had_pending = entry.state.clear_pending();
        entry.is_processing.store(false, std::sync::atomic::Ordering::SeqCst);
        had_task || had_pending
    }
}

impl Default for ConversationManager {
    fn default() -> Self {
        Self::new()
    }
}

async fn process_loop(chat_id: i64, entry: Arc<ChatEntry>, process: ProcessCallback) {
    loop {
        entry.state.interrupt.clear();
        let Some((message, metadata)) = entry.state.get_combined_message() else {
            break;
        };
        let user_id = entry.state.user_id();

        let interrupt_check: InterruptCheck = {
            let entry = entry.clone();
            Arc::new(move || entry.state.check_interrupt())
        };

        if let Err(err) = process(chat_id, user_id, message, metadata, interrupt_check).await {
            tracing::warn!(chat_id, error = %err, "conversation turn failed, will retry with any new input");
        }

        if entry.state.pending_count() == 0 && !entry.state.check_interrupt() {
            break;
        }
    }

    entry.is_processing.store(false, std::sync::atomic::Ordering::SeqCst);
    *entry.current_task.lock() = None;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use parking_lot::Mutex as SyncMutex;
    use serde_json::json;
    use std::sync::Arc as StdArc;

    #[tokio::test]
    async fn single_submission_processes_once() {
        let manager = ConversationManager::new();
        let seen: StdArc<SyncMutex<Vec<String>>> = StdArc::new(SyncMutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let callback: ProcessCallback = Arc::new(move |_chat_id, _user_id, message, _metadata, _interrupt_check| {
            let seen = seen_clone.clone();
            Box::pin(async move {
                seen.lock().push(message);
                Ok(())
            })
        });
        manager.submit(1, "alice", "hello", json!({}), callback).await;
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(seen.lock().clone(), vec!["hello".to_string()]);
        assert!(!manager.is_processing(1));
    }

    #[tokio::test]
    async fn user_id_rides_along_with_the_combined_turn() {
        let manager = ConversationManager::new();
        let seen: StdArc<SyncMutex<Vec<String>>> = StdArc::new(SyncMutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let callback: ProcessCallback = Arc::new(move |_chat_id, user_id, _message, _metadata, _interrupt_check| {
            let seen = seen_clone.clone();
            Box::pin(async move {
                seen.lock().push(user_id);
                Ok(())
            })
        });
        manager.submit(5, "bob", "hi", json!({}), callback).await;
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(seen.lock().clone(), vec!["bob".to_string()]);
    }

    #[tokio::test]
    async fn interrupt_check_reflects_messages_arriving_mid_turn() {
        let manager = ConversationManager::new();
        let observed: StdArc<SyncMutex<Vec<bool>>> = StdArc::new(SyncMutex::new(Vec::new()));
        let observed_clone = observed.clone();
        let manager_clone = manager.clone();
        let injected_once = StdArc::new(std::sync::atomic::AtomicBool::new(false));
        let callback: ProcessCallback = Arc::new(move |chat_id, _user_id, _message, _metadata, interrupt_check| {
            let observed = observed_clone.clone();
            let manager = manager_clone.clone();
            let injected_once = injected_once.clone();
            Box::pin(async move {
                observed.lock().push(interrupt_check());
                if !injected_once.swap(true, std::sync::atomic::Ordering::SeqCst) {
                    manager.submit(chat_id, "alice", "second", json!({}), noop_callback()).await;
                    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                    observed.lock().push(interrupt_check());
                }
                Ok(())
            })
        });
        manager.submit(6, "alice", "first", json!({}), callback).await;
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        let results = observed.lock().clone();
        assert_eq!(&results[0..2], &[false, true]);
    }

    #[tokio::test]
    async fn messages_arriving_mid_turn_are_coalesced_into_next_turn() {
        let manager = ConversationManager::new();
        let seen: StdArc<SyncMutex<Vec<String>>> = StdArc::new(SyncMutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let manager_clone = manager.clone();
        let callback: ProcessCallback = Arc::new(move |chat_id, _user_id, message, _metadata, _interrupt_check| {
            let seen = seen_clone.clone();
            let manager = manager_clone.clone();
            Box::pin(async move {
                if seen.lock().is_empty() {
                    // simulate a slow first turn so the second submission
                    // arrives while this one is still in flight
                    manager.submit(chat_id, "alice", "second", json!({}), noop_callback()).await;
                    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                }
                seen.lock().push(message);
                Ok(())
            })
        });
        manager.submit(2, "alice", "first", json!({}), callback).await;
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        let results = seen.lock().clone();
        assert_eq!(results[0], "first");
    }

    fn noop_callback() -> ProcessCallback {
        Arc::new(|_chat_id, _user_id, _message, _metadata, _interrupt_check| Box::pin(async move { Ok(()) }))
    }

    #[tokio::test]
    async fn cancel_stops_processing_flag() {
        let manager = ConversationManager::new();
        let callback: ProcessCallback = Arc::new(|_chat_id, _user_id, _message, _metadata, _interrupt_check| {
            Box::pin(async move {
                tokio::time::sleep(std::time::Duration::from_secs(10)).await;
                Ok(())
            })
        });
        manager.submit(3, "alice", "slow", json!({}), callback).await;
        assert!(manager.is_processing(3));
        assert!(manager.cancel(3));
        assert!(!manager.is_processing(3));
    }

    #[tokio::test]
    async fn cancel_clears_pending_and_reports_false_when_nothing_to_cancel() {
        let manager = ConversationManager::new();
        assert!(!manager.cancel(99));

        let callback: ProcessCallback = Arc::new(|_chat_id, _user_id, _message, _metadata, _interrupt_check| {
            Box::pin(async move {
                tokio::time::sleep(std::time::Duration::from_secs(10)).await;
                Ok(())
            })
        });
        manager.submit(4, "alice", "slow", json!({}), callback.clone()).await;
        manager.submit(4, "alice", "queued while busy", json!({}), callback).await;
        assert_eq!(manager.get_pending_count(4), 1);
        assert!(manager.cancel(4));
        assert_eq!(manager.get_pending_count(4), 0);
    }
}
