//! Deterministic lexical seed-tagging: a cheap, model-free pass over recent
//! user signals that gives the heartbeat actor a starting point before it
//! spends any LLM turns of its own.

use serde::{Deserialize, Serialize};

use crate::heartbeat::config::HIGH_AROUSAL_THRESHOLD;

const URGENCY_CUES: &[&str] = &["urgent", "asap", "now", "immediately", "broken", "error", "failed"];
const NEGATIVE_CUES: &[&str] = &["angry", "frustrated", "annoyed", "hate", "bad", "broken", "error", "failed"];
const POSITIVE_CUES: &[&str] = &["great", "love", "thanks", "good", "nice", "awesome"];
const CONTRAST_CUES: &[&str] = &[" but ", " though ", " however ", " keeps ", " still "];
const RISK_CUES: &[&str] = &["deadline", "late", "overdue", "risk", "lost"];

const MAX_SIGNAL_LINES: usize = 8;
const SIGNAL_TRUNCATE_CHARS: usize = 180;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeedTag {
    pub signal: String,
    pub valence: f64,
    pub arousal: f64,
    pub tags: Vec<String>,
    pub high_arousal: bool,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn tag_line(line: &str) -> SeedTag {
    let lower = line.to_lowercase();
    let mut arousal: f64 = 0.2;
    let mut valence: f64 = 0.0;
    let mut tags: Vec<String> = Vec::new();

    let has_positive = contains_any(&lower, POSITIVE_CUES);
    let has_negative = contains_any(&lower, NEGATIVE_CUES);
    let has_contrast = contains_any(&lower, CONTRAST_CUES);
    let has_sarcasm = lower.contains("yeah right")
        || lower.contains("sure...")
        || (lower.contains("great job") && has_negative);

    if contains_any(&lower, URGENCY_CUES) {
        arousal += 0.4;
        tags.push("urgency".to_string());
    }
    if has_negative {
        arousal += 0.25;
        valence -= 0.5;
        tags.push("negative_affect".to_string());
    }
    if has_positive {
        valence += 0.5;
        tags.push("positive_affect".to_string());
    }
    // Contrast or sarcasm means positive words may be framing frustration.
    if has_positive && (has_negative || has_contrast || has_sarcasm) {
        valence -= 0.6;
        arousal += 0.1;
        tags.push("mixed_or_ironic".to_string());
    }
    if contains_any(&lower, RISK_CUES) {
        arousal += 0.2;
        tags.push("risk".to_string());
    }

    arousal = arousal.clamp(0.0, 1.0);
    valence = valence.clamp(-1.0, 1.0);

    if tags.is_empty() {
        tags.push("neutral".to_string());
    }

    let signal: String = line.chars().take(SIGNAL_TRUNCATE_CHARS).collect();

    SeedTag {
        signal,
        valence: round2(valence),
        arousal: round2(arousal),
        high_arousal: arousal >= HIGH_AROUSAL_THRESHOLD,
        tags,
    }
}

/// Tag the last [`MAX_SIGNAL_LINES`] non-blank lines of `recent_signals`.
/// Returns both the structured seeds (for pattern tracking) and the exact
/// JSON rendering the round prompt embeds.
pub fn heuristic_seed_tags(recent_signals: &str) -> (Vec<SeedTag>, String) {
    let lines: Vec<&str> = recent_signals.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let tail_start = lines.len().saturating_sub(MAX_SIGNAL_LINES);
    let seeds: Vec<SeedTag> = lines[tail_start..].iter().map(|line| tag_line(line)).collect();

    if seeds.is_empty() {
        return (seeds, "(none)".to_string());
    }
    let rendered = serde_json::to_string_pretty(&seeds).unwrap_or_else(|_| "(none)".to_string());
    (seeds, rendered)
}
