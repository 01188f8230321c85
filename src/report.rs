use serde::Serialize;

use crate::apply::RunStats;

pub const DEFAULT_PREVIEW_LIMIT: usize = 15;
pub const DEFAULT_PREVIEW_WIDTH: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub mapping_entries: usize,
    pub inserted: usize,
    pub fuzzy_matched: usize,
    pub unmatched_count: usize,
    pub unmatched: Vec<String>,
}

impl RunReport {
    pub fn new(mapping_entries: usize, stats: &RunStats) -> Self {
        Self {
            mapping_entries,
            inserted: stats.inserted,
            fuzzy_matched: stats.fuzzy_matched,
            unmatched_count: stats.unmatched.len(),
            unmatched: stats.unmatched.clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Summary lines plus the first `limit` unmatched segments, each cut to `width` chars.
pub fn render_preview(stats: &RunStats, limit: usize, width: usize) -> String {
    let mut lines = vec![format!(
        "Inserted/updated {} <target> elements.",
        stats.inserted
    )];
    if stats.fuzzy_matched > 0 {
        lines.push(format!("Fuzzy matches: {}", stats.fuzzy_matched));
    }
    if !stats.unmatched.is_empty() {
        lines.push(format!(
            "Unmatched segments: {} (showing first {}):",
            stats.unmatched.len(),
            limit
        ));
        for segment in stats.unmatched.iter().take(limit) {
            lines.push(format!("- {}", truncate(segment, width)));
        }
    }
    lines.join("\n")
}

fn truncate(value: &str, width: usize) -> String {
    match value.char_indices().nth(width) {
        Some((end, _)) => format!("{}...", &value[..end]),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(unmatched: &[&str]) -> RunStats {
        RunStats {
            inserted: 2,
            fuzzy_matched: 0,
            unmatched: unmatched.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn preview_lists_unmatched_segments() {
        let out = render_preview(&stats(&["Goodbye"]), 15, 200);
        assert_eq!(
            out,
            "Inserted/updated 2 <target> elements.\nUnmatched segments: 1 (showing first 15):\n- Goodbye"
        );
    }

    #[test]
    fn preview_caps_entries_and_width() {
        let out = render_preview(&stats(&["ééééé", "b", "c"]), 2, 3);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[2], "- ééé...");
        assert_eq!(lines[3], "- b");
    }

    #[test]
    fn preview_without_unmatched_is_one_line() {
        assert_eq!(
            render_preview(&stats(&[]), 15, 200),
            "Inserted/updated 2 <target> elements."
        );
    }

    #[test]
    fn report_serializes_counts() {
        let report = RunReport::new(5, &stats(&["x"]));
        let json: serde_json::Value =
            serde_json::from_str(&report.to_json().expect("json")).expect("parse");
        assert_eq!(json["mapping_entries"], 5);
        assert_eq!(json["unmatched_count"], 1);
        assert_eq!(json["unmatched"][0], "x");
    }
}
