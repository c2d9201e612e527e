//! Per-line JSON parsing with skip-on-failure.

use log::{debug, warn};
use serde_json::Value;

/// Iterate the successfully parsed records of a decoded JSONL buffer.
///
/// Lines are numbered 1-based over the physical file, blank and malformed
/// lines included. Blank lines are skipped silently. A malformed line is
/// logged with its line number and skipped; iteration continues, so one
/// bad line never aborts the file.
pub fn records(content: &str) -> impl Iterator<Item = Value> + '_ {
    content.lines().enumerate().filter_map(|(idx, line)| {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        match serde_json::from_str(line) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Error parsing line {}: {}", idx + 1, e);
                debug!("Problematic line: {}", line);
                None
            }
        }
    })
}
