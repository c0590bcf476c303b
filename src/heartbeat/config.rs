//! Tunables for the heartbeat-driven emotional salience round.

use std::time::Duration;

/// Arousal at or above this is flagged `high_arousal` and feeds the
/// flashback pattern window.
pub const HIGH_AROUSAL_THRESHOLD: f64 = 0.75;

/// How many recent high-arousal pattern labels are kept for flashback
/// detection.
pub const FLASHBACK_LOOKBACK: usize = 12;

/// How many completed rounds' summaries are retained for inspection.
pub const ROUND_HISTORY_LEN: usize = 40;

/// Tag log is compacted once its file content exceeds this many bytes.
pub const TAG_LOG_MAX_CHARS: usize = 24_000;

/// How many trailing lines of the tag log survive a compaction.
pub const TAG_LOG_KEEP_LINES: usize = 140;

#[derive(Debug, Clone)]
pub struct HeartbeatConfig {
    /// How often `run_round` is invoked by the scheduler driving this
    /// actor. The round logic itself is agnostic to this value; it is
    /// carried here purely for the scheduler to read.
    pub interval: Duration,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(15 * 60),
        }
    }
}
