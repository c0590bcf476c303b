//! The heartbeat actor ("amygdala"): a periodic, single-shot background
//! reflex layer that tags emotional salience in recent user signals,
//! tracks recurring high-arousal patterns, and escalates to the principal
//! only through an ordinary actor message — never directly to the user.
//!
//! # Module Organization
//!
//! - `config.rs` - tunables (interval, thresholds, compaction limits)
//! - `status.rs` - `AmygdalaStatus`, `RoundRecord`, observable between rounds
//! - `heuristics.rs` - deterministic lexical seed-tagging pass
//! - `amygdala.rs` - `Amygdala` itself: `run_round`, status/history accessors

pub mod amygdala;
pub mod config;
pub mod heuristics;
pub mod status;

pub use amygdala::{Amygdala, LlmFactory};
pub use config::HeartbeatConfig;
pub use heuristics::{heuristic_seed_tags, SeedTag};
pub use status::{AmygdalaStatus, RoundRecord, RoundState};
