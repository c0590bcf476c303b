//! Actor value type, lifecycle state, configuration, and inbox.
//!
//! This crate has exactly one actor shape: an autonomous, LLM-driven unit
//! with its own inbox and history. `Actor` below is a concrete struct rather
//! than a trait — there is no second implementation to be generic over.
//!
//! # Module Organization
//!
//! - `state.rs` - `ActorState`, the forward-only lifecycle enum
//! - `config.rs` - `ActorConfig`, supplied at spawn time
//! - `info.rs` - `ActorInfo`, the public discovery projection
//! - `error.rs` - `ActorError`, the actor-to-actor failure kinds
//! - `inbox.rs` - `Inbox`, the bounded per-actor FIFO
//! - `actor.rs` - `Actor` itself: send/send_to/wait_for_reply/terminate/prompting

pub mod actor;
pub mod config;
pub mod error;
pub mod inbox;
pub mod info;
pub mod state;

pub use actor::{Actor, DEFAULT_REPLY_TIMEOUT_SECS};
pub use config::ActorConfig;
pub use error::ActorError;
pub use info::ActorInfo;
pub use state::ActorState;
