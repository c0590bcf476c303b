//! Filesystem helpers shared by anything that persists state under the
//! workspace directory: atomic write-then-rename, and bounded append-only
//! log compaction.

use std::path::Path;

use chrono::Utc;

/// Write `contents` to `path` atomically: write to a sibling temp file,
/// then rename over the destination. A crash or concurrent reader never
/// observes a partially written file.
pub fn atomic_write(path: &Path, contents: &str) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;
    let tmp_path = dir.join(format!(
        ".{}.tmp",
        path.file_name().and_then(|n| n.to_str()).unwrap_or("workspace")
    ));
    std::fs::write(&tmp_path, contents)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Read `path` as a trimmed string, or `fallback` if the file is missing,
/// empty, or unreadable.
pub fn read_file_or(path: &Path, fallback: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let trimmed = content.trim();
            if trimmed.is_empty() {
                fallback.to_string()
            } else {
                trimmed.to_string()
            }
        }
        Err(_) => fallback.to_string(),
    }
}

/// Compact an append-only log once it exceeds `max_chars`, keeping only the
/// trailing `keep_lines` lines behind a short rollover header. Returns the
/// number of lines pruned (0 if no compaction was needed or the file is
/// absent).
pub fn compact_log(path: &Path, max_chars: usize, keep_lines: usize) -> usize {
    let Ok(content) = std::fs::read_to_string(path) else {
        return 0;
    };
    if content.len() <= max_chars {
        return 0;
    }

    let lines: Vec<&str> = content.lines().collect();
    let keep_start = lines.len().saturating_sub(keep_lines);
    let kept = &lines[keep_start..];
    let pruned = lines.len() - kept.len();

    let now = Utc::now().format("%Y-%m-%d %H:%M UTC");
    let mut header = vec![
        format!("# Emotional tags (compacted at {now})"),
        format!("- pruned_lines: {pruned}"),
        "- note: keeping only recent rolling window".to_string(),
        String::new(),
    ];
    header.extend(kept.iter().map(|s| s.to_string()));
    let rewritten = header.join("\n").trim().to_string() + "\n";

    if atomic_write(path, &rewritten).is_err() {
        return 0;
    }
    pruned
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn atomic_write_replaces_destination() {
        let dir = std::env::temp_dir().join(format!("lethe-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("state.md");
        atomic_write(&path, "first").unwrap();
        atomic_write(&path, "second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn read_file_or_falls_back_when_missing() {
        let path = Path::new("/nonexistent/path/does-not-exist.md");
        assert_eq!(read_file_or(path, "(none)"), "(none)");
    }

    #[test]
    fn compact_log_noop_under_threshold() {
        let dir = std::env::temp_dir().join(format!("lethe-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tags.md");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "short").unwrap();
        assert_eq!(compact_log(&path, 1000, 10), 0);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn compact_log_keeps_tail_and_reports_pruned() {
        let dir = std::env::temp_dir().join(format!("lethe-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tags.md");
        let lines: Vec<String> = (0..500).map(|i| format!("entry-{i}")).collect();
        std::fs::write(&path, lines.join("\n")).unwrap();
        let pruned = compact_log(&path, 100, 50);
        assert!(pruned > 0);
        let result = std::fs::read_to_string(&path).unwrap();
        assert!(result.contains("entry-499"));
        assert!(!result.contains("entry-0\n"));
        std::fs::remove_dir_all(&dir).ok();
    }
}
