//! Diagnostic extraction from failed build logs.
//!
//! Every line matching the error marker contributes a window of context
//! lines around it. Overlapping or touching windows are merged, and
//! separate groups are divided by a `--` line.

use crate::config::BuildSettings;
use crate::error::UnitError;
use regex::Regex;
use std::path::Path;
use tracing::debug;

const GROUP_SEPARATOR: &str = "--";

/// Marker pattern and context window size.
#[derive(Debug, Clone)]
pub struct DiagnosticExtractor {
    marker: Regex,
    before: usize,
    after: usize,
}

impl DiagnosticExtractor {
    pub fn new(marker: Regex, before: usize, after: usize) -> Self {
        Self {
            marker,
            before,
            after,
        }
    }

    pub fn from_settings(settings: &BuildSettings) -> Result<Self, regex::Error> {
        Ok(Self::new(
            Regex::new(&settings.error_marker)?,
            settings.context_before,
            settings.context_after,
        ))
    }

    /// Context excerpt for `text`; empty when no line matches.
    pub fn excerpt(&self, text: &str) -> String {
        let lines: Vec<&str> = text.lines().collect();

        let mut groups: Vec<(usize, usize)> = Vec::new();
        for (index, line) in lines.iter().enumerate() {
            if !self.marker.is_match(line) {
                continue;
            }
            let start = index.saturating_sub(self.before);
            let end = (index + self.after).min(lines.len() - 1);
            match groups.last_mut() {
                Some(last) if start <= last.1 + 1 => last.1 = last.1.max(end),
                _ => groups.push((start, end)),
            }
        }

        let mut out = String::new();
        for (group_index, (start, end)) in groups.iter().enumerate() {
            if group_index > 0 {
                out.push_str(GROUP_SEPARATOR);
                out.push('\n');
            }
            for line in &lines[*start..=*end] {
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }

    /// Scan `log_path` and write the excerpt to `errors_path`.
    ///
    /// The errors file is written even when nothing matches. Returns the
    /// number of excerpt bytes written.
    pub fn extract(&self, log_path: &Path, errors_path: &Path) -> Result<usize, UnitError> {
        let raw = std::fs::read(log_path).map_err(|e| UnitError::io(log_path, e))?;
        let text = String::from_utf8_lossy(&raw);
        let excerpt = self.excerpt(&text);

        std::fs::write(errors_path, &excerpt).map_err(|e| UnitError::io(errors_path, e))?;
        debug!(
            errors = %errors_path.display(),
            bytes = excerpt.len(),
            "Wrote diagnostic excerpt"
        );
        Ok(excerpt.len())
    }
}
