//! Errors surfaced by the conversation manager.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConversationError {
    /// The processing task for this chat was cancelled before it produced a
    /// result, e.g. via [`crate::conversation::manager::ConversationManager::cancel`].
    #[error("conversation processing was cancelled")]
    Cancelled,
}
