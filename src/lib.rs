//! # lethe-core — actor runtime for a long-lived personal assistant
//!
//! A cooperating set of autonomous agents ("actors") that collectively
//! plan, act with tools, reflect, and converse. Three tightly coupled
//! subsystems form the core:
//!
//! 1. [`actor`] + [`registry`] + [`runner`] + [`tools`] — lifecycle,
//!    discovery, inter-actor messaging, and the per-actor LLM turn loop.
//! 2. [`conversation`] — a per-chat interruptible processing pipeline that
//!    coalesces new inbound messages into an in-flight task without losing
//!    work.
//! 3. [`heartbeat`] (the amygdala) + [`hippocampus`] — a periodic
//!    background reflex layer that tags salience and may escalate, and a
//!    synchronous analyzer that gates memory recall and reply delivery.
//!
//! These compose into the runtime's defining contract: at most one
//! principal actor speaks to the user; all work is delegated to short-lived
//! subagents; a background reflex layer continually observes and may
//! escalate; incoming user messages preempt and merge with whatever is in
//! flight.
//!
//! Concrete tool implementations, LLM provider transports, memory backends,
//! CLI entry points, configuration loading, and the chat transport are
//! deliberately out of scope — this crate only fixes the trait boundaries
//! those collaborators are consumed through (see [`llm`]).
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lethe_core::prelude::*;
//! use std::sync::Arc;
//!
//! let registry = ActorRegistry::new();
//! let butler = registry
//!     .spawn(ActorConfig::new("butler", "serve the user").with_group("main"), None, true)
//!     .unwrap();
//!
//! let researcher = registry
//!     .spawn(ActorConfig::new("researcher", "find 3 papers"), Some(butler.id.clone()), false)
//!     .unwrap();
//! // Drive `researcher` with an `ActorRunner` bound to a real `LlmClient`; when it
//! // terminates, the registry delivers a `[TERMINATED] ...` message into `butler`'s inbox.
//! ```
//!
//! # Module Organization
//!
//! ## Actor runtime
//! - [`ids`] - `ActorId`/`MessageId`, short process-unique identifiers
//! - [`message`] - `ActorMessage`, the one inter-actor message shape
//! - [`actor`] - `Actor`, `ActorConfig`, `ActorState`, `ActorInfo`, the inbox
//! - [`registry`] - `ActorRegistry`: spawn, lookup, discovery, termination notification
//! - [`runner`] - `ActorRunner`: the per-actor LLM turn loop
//! - [`tools`] - the standard actor tool set (`send_message`, `discover_actors`, ...)
//!
//! ## Conversation
//! - [`conversation`] - `ConversationManager`: interruptible-coalescing submission
//!
//! ## Background reflex layer
//! - [`heartbeat`] - `Amygdala`: periodic salience tagging and escalation
//! - [`hippocampus`] - recall decision and response judgment
//!
//! ## External interfaces & infrastructure
//! - [`llm`] - `LlmClient`, `ActorTool`, provider callback contracts
//! - [`workspace`] - atomic file writes and bounded log compaction
//!
//! # Architecture Principles
//!
//! - **Messages over callbacks.** Termination notification, like everything
//!   else an actor observes, arrives as an ordinary message through the
//!   same inbox — control and data flow share one ordering discipline.
//! - **No error escapes the loop.** Every actor-facing failure path
//!   (unknown recipient, LLM error, tool exception) is caught at its layer
//!   and folded into a string result or tool-result content; the only
//!   user-visible failure mode is "the principal sent no further message
//!   this round."
//! - **Edge-triggered interrupts, not booleans.** The conversation
//!   manager's interrupt signal coalesces repeated sets between clears into
//!   one, so a burst of user messages during a turn never multiplies
//!   interruptions.

pub mod actor;
pub mod conversation;
pub mod heartbeat;
pub mod hippocampus;
pub mod ids;
pub mod llm;
pub mod message;
pub mod prelude;
pub mod registry;
pub mod runner;
pub mod tools;
pub mod workspace;

pub use actor::{Actor, ActorConfig, ActorError, ActorInfo, ActorState};
pub use conversation::{ConversationError, ConversationManager, ConversationState, InterruptSignal};
pub use heartbeat::{Amygdala, AmygdalaStatus, HeartbeatConfig};
pub use hippocampus::{Hippocampus, RecallDecision, ResponseJudgment};
pub use ids::{ActorId, MessageId};
pub use llm::{ActorTool, LlmClient, LlmError};
pub use message::{ActorMessage, ChatRole, ChatTurn};
pub use registry::ActorRegistry;
pub use runner::ActorRunner;
