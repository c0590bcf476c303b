//! Per-chat state: the pending-message queue and the interrupt flag that
//! lets a running turn notice a new message arrived.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::Value;

use crate::conversation::interrupt::InterruptSignal;

/// The literal separator spliced between coalesced messages. Kept exact
/// because the principal's LLM context is built from this text.
pub const COALESCE_SEPARATOR: &str = "\n\n---\n[Additional message while processing:]\n";

#[derive(Debug, Clone)]
pub struct PendingMessage {
    pub content: String,
    pub metadata: Value,
    pub arrived_at: DateTime<Utc>,
}

/// State for a single chat. Submission is serialized through
/// [`crate::conversation::manager::ConversationManager::submit`]'s own lock;
/// this type itself has no lock of its own beyond the `pending` mutex needed
/// to make `add_message`/`get_combined_message` atomic with each other.
#[derive(Debug, Default)]
pub struct ConversationState {
    pending: Mutex<Vec<PendingMessage>>,
    pub(crate) interrupt: InterruptSignal,
    user_id: Mutex<String>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
            interrupt: InterruptSignal::new(),
            user_id: Mutex::new(String::new()),
        }
    }

    /// Record the user id of the most recent submission. Per SPEC_FULL this
    /// rides along with the chat rather than per pending message — a chat
    /// has one active user conversing with the principal at a time.
    pub fn set_user_id(&self, user_id: impl Into<String>) {
        *self.user_id.lock() = user_id.into();
    }

    pub fn user_id(&self) -> String {
        self.user_id.lock().clone()
    }

    /// Queue a message. `currently_processing` tells the caller whether a
    /// turn is already in flight; if so this message interrupts it and the
    /// return value is `true`.
    pub fn add_message(&self, content: impl Into<String>, metadata: Value, currently_processing: bool) -> bool {
        self.pending.lock().push(PendingMessage {
            content: content.into(),
            metadata,
            arrived_at: Utc::now(),
        });
        if currently_processing {
            self.interrupt.set();
            true
        } else {
            false
        }
    }

    /// Drain all pending messages into a single combined message. A lone
    /// message passes through unchanged; several are joined with
    /// [`COALESCE_SEPARATOR`] and their metadata objects merged
    /// FIFO-later-wins (a later message's key overwrites an earlier one's).
    ///
    /// Returns `None` if nothing is pending.
    pub fn get_combined_message(&self) -> Option<(String, Value)> {
        let drained: Vec<PendingMessage> = std::mem::take(&mut *self.pending.lock());
        let is_single = drained.len() == 1;
        let mut drained = drained.into_iter();
        if drained.len() == 0 {
            return None;
        }
        if is_single {
            return drained.next().map(|only| (only.content, only.metadata));
        }

        let mut combined = String::new();
        let mut metadata = serde_json::Map::new();
        for (i, msg) in drained.enumerate() {
            if i == 0 {
                combined.push_str(&msg.content);
            } else {
                combined.push_str(COALESCE_SEPARATOR);
                combined.push_str(&msg.content);
            }
            if let Value::Object(map) = msg.metadata {
                for (k, v) in map {
                    metadata.insert(k, v);
                }
            }
        }
        Some((combined, Value::Object(metadata)))
    }

    pub fn check_interrupt(&self) -> bool {
        self.interrupt.is_set()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Discard everything queued, e.g. for `ConversationManager::cancel`.
    /// Returns whether there was anything to discard.
    pub fn clear_pending(&self) -> bool {
        let mut pending = self.pending.lock();
        let had_any = !pending.is_empty();
        pending.clear();
        had_any
    }
}
