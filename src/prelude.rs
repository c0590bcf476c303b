//! Convenient re-exports for building on top of the actor runtime.
//!
//! ```rust,ignore
//! use lethe_core::prelude::*;
//! ```

// Actor runtime
pub use crate::actor::{Actor, ActorConfig, ActorError, ActorInfo, ActorState};
pub use crate::ids::{ActorId, MessageId};
pub use crate::message::{ActorMessage, ChatRole, ChatTurn};
pub use crate::registry::ActorRegistry;
pub use crate::runner::ActorRunner;
pub use crate::tools::create_actor_tools;

// External interface contracts
pub use crate::llm::{ActorTool, LlmClient, LlmError, PrincipalContextProvider, RecentSignalsProvider, ToolRegistryMap, UserTransport};

// Conversation manager
pub use crate::conversation::{
    ConversationError, ConversationManager, ConversationState, InterruptCheck, InterruptSignal, ProcessCallback,
};

// Background reflex layer
pub use crate::heartbeat::{heuristic_seed_tags, Amygdala, AmygdalaStatus, HeartbeatConfig, RoundRecord, SeedTag};
pub use crate::hippocampus::{Hippocampus, MemorySearchProvider, RecallDecision, ResponseJudgment};

// Workspace I/O
pub use crate::workspace::{atomic_write, compact_log, read_file_or};
