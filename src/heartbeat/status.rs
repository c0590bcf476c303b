//! Observable state the heartbeat actor exposes between rounds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub enum RoundState {
    Idle,
    Running,
}

#[derive(Debug, Clone)]
pub struct AmygdalaStatus {
    pub state: RoundState,
    pub rounds_total: u64,
    pub last_started_at: Option<DateTime<Utc>>,
    pub last_completed_at: Option<DateTime<Utc>>,
    pub last_turns: u32,
    pub last_alert: String,
    pub last_result: String,
    pub last_error: String,
    pub tags_pruned_total: u64,
}

impl Default for AmygdalaStatus {
    fn default() -> Self {
        Self {
            state: RoundState::Idle,
            rounds_total: 0,
            last_started_at: None,
            last_completed_at: None,
            last_turns: 0,
            last_alert: String::new(),
            last_result: String::new(),
            last_error: String::new(),
            tags_pruned_total: 0,
        }
    }
}

/// One completed round's summary, retained in a bounded ring for
/// flashback-style inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundRecord {
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub turns: u32,
    pub duration_seconds: f64,
    pub alert: bool,
    pub error: String,
    pub result: String,
}
