//! Run reporting: per-unit results, progress records, and the final summary.

use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Terminal state of one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitOutcome {
    /// Build ran and exited 0
    Succeeded,
    /// Build ran and exited non-zero
    Failed,
    /// No description file for the unit
    Skipped,
    /// Any other error before, during or after the build
    Errored,
}

impl UnitOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            UnitOutcome::Succeeded => "success",
            UnitOutcome::Failed => "failed",
            UnitOutcome::Skipped => "skipped",
            UnitOutcome::Errored => "errored",
        }
    }
}

/// Everything reported about one unit once it reaches a terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitResult {
    pub unit: String,
    /// 1-based position in the submitted list
    pub index: usize,
    pub total: usize,
    /// Located description file
    pub model: Option<PathBuf>,
    /// Resolved service key
    pub key: Option<String>,
    /// Workspace root
    pub path: Option<PathBuf>,
    pub outcome: UnitOutcome,
    pub error: Option<String>,
    /// Stable label for the error, see [`crate::error::UnitError::kind`]
    pub error_kind: Option<String>,
    pub elapsed: Duration,
}

impl UnitResult {
    pub fn new(unit: impl Into<String>, index: usize, total: usize) -> Self {
        Self {
            unit: unit.into(),
            index,
            total,
            model: None,
            key: None,
            path: None,
            outcome: UnitOutcome::Errored,
            error: None,
            error_kind: None,
            elapsed: Duration::ZERO,
        }
    }

    /// `index/total`
    pub fn process(&self) -> String {
        format!("{}/{}", self.index, self.total)
    }

    /// Completion record printed once the unit finishes.
    pub fn to_record(&self) -> Value {
        let mut record = json!({
            "event": "completed",
            "sdk_id": self.unit,
            "process": self.process(),
        });
        if let Some(model) = &self.model {
            record["model"] = json!(model.display().to_string());
        }
        if let Some(key) = &self.key {
            record["key"] = json!(key);
        }
        if let Some(path) = &self.path {
            record["path"] = json!(path.display().to_string());
        }
        record["build"] = json!(self.outcome.label());
        if let Some(error) = &self.error {
            record["error"] = json!(error);
        }
        if let Some(kind) = &self.error_kind {
            record["error_kind"] = json!(kind);
        }
        record["time"] = json!(format_seconds(self.elapsed));
        record
    }
}

/// Start record printed when a unit's pipeline begins running.
pub fn started_record(unit: &str, index: usize, total: usize) -> Value {
    json!({
        "event": "started",
        "sdk_id": unit,
        "process": format!("{}/{}", index, total),
        "ts": chrono::Utc::now().to_rfc3339(),
    })
}

/// Receives progress records as units start and finish.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, record: &Value);
}

/// Prints each record to stdout as indented JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutProgress;

impl ProgressSink for StdoutProgress {
    fn emit(&self, record: &Value) {
        match serde_json::to_string_pretty(record) {
            Ok(text) => println!("{}", text),
            Err(e) => warn!(error = %e, "Failed to render progress record"),
        }
    }
}

/// `12.34 seconds`
pub fn format_seconds(elapsed: Duration) -> String {
    format!("{:.2} seconds", elapsed.as_secs_f64())
}

/// Aggregate of a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// One entry per submitted unit, ordered by index
    pub results: Vec<UnitResult>,
    pub workers: usize,
    pub cores: usize,
    pub hard_cap: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn count(&self, outcome: UnitOutcome) -> usize {
        self.results.iter().filter(|r| r.outcome == outcome).count()
    }

    /// True when every unit either succeeded or had nothing to build.
    pub fn all_ok(&self) -> bool {
        self.results
            .iter()
            .all(|r| matches!(r.outcome, UnitOutcome::Succeeded | UnitOutcome::Skipped))
    }

    /// Plain-text summary followed by a per-unit table.
    pub fn render(&self, styled: bool) -> String {
        let mut out = String::new();
        out.push_str(&format!("Processing {} SDKs\n", self.results.len()));
        out.push_str(&format!(
            "Using {} workers ({} cores available, max {} workers)\n",
            self.workers, self.cores, self.hard_cap
        ));
        out.push_str(&format!("Total time: {}\n", format_seconds(self.elapsed)));

        if self.results.is_empty() {
            return out;
        }

        let heading = "Results";
        if styled {
            out.push_str(&format!("\n{}\n", heading.bold().underline()));
        } else {
            out.push_str(&format!("\n{}\n", heading));
        }

        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["#", "Unit", "Outcome", "Time", "Detail"]);
        for result in &self.results {
            table.add_row(vec![
                result.index.to_string(),
                result.unit.clone(),
                result.outcome.label().to_string(),
                format!("{:.2}s", result.elapsed.as_secs_f64()),
                result.error.clone().unwrap_or_default(),
            ]);
        }
        out.push_str(&format!("{}\n", table));
        out.push_str(&format!(
            "{} succeeded, {} failed, {} skipped, {} errored\n",
            self.count(UnitOutcome::Succeeded),
            self.count(UnitOutcome::Failed),
            self.count(UnitOutcome::Skipped),
            self.count(UnitOutcome::Errored),
        ));
        out
    }
}
