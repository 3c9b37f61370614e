//! Bounded concurrent scheduler.
//!
//! One task per unit, at most `pool_size` pipelines running at once. Units
//! acquire pool permits in submission order and may finish in any order.
//! Every submitted unit yields exactly one [`UnitResult`], including units
//! whose task panicked. Repeated unit ids are dropped before scheduling so
//! no two running pipelines share a workspace.

use crate::pipeline::{run_unit, PipelineContext};
use crate::report::{started_record, ProgressSink, RunSummary, UnitOutcome, UnitResult};
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// Worker pool sizing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolPolicy {
    pub workers_per_core: usize,
    pub hard_cap: usize,
    /// Logical cores reported by the runtime environment
    pub parallelism: usize,
}

impl PoolPolicy {
    pub fn new(workers_per_core: usize, hard_cap: usize) -> Self {
        Self {
            workers_per_core,
            hard_cap,
            parallelism: available_parallelism(),
        }
    }

    /// `min(units, workers_per_core * parallelism, hard_cap)`
    pub fn pool_size(&self, units: usize) -> usize {
        units
            .min(self.workers_per_core.saturating_mul(self.parallelism))
            .min(self.hard_cap)
    }
}

pub fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

pub struct Scheduler {
    ctx: Arc<PipelineContext>,
    policy: PoolPolicy,
    progress: Arc<dyn ProgressSink>,
}

impl Scheduler {
    pub fn new(
        ctx: Arc<PipelineContext>,
        policy: PoolPolicy,
        progress: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            ctx,
            policy,
            progress,
        }
    }

    /// Run every unit and wait for all of them to reach a terminal state.
    pub async fn run(&self, units: Vec<String>) -> RunSummary {
        let started = Instant::now();
        let units = dedupe_units(units);
        let total = units.len();
        let workers = self.policy.pool_size(total);
        info!(
            units = total,
            workers,
            cores = self.policy.parallelism,
            hard_cap = self.policy.hard_cap,
            "Starting generation run"
        );

        let pool = Arc::new(Semaphore::new(workers.max(1)));
        let mut tasks = FuturesUnordered::new();
        for (position, unit) in units.into_iter().enumerate() {
            let index = position + 1;
            let ctx = Arc::clone(&self.ctx);
            let pool = Arc::clone(&pool);
            let progress = Arc::clone(&self.progress);
            let task_unit = unit.clone();

            let handle = tokio::spawn(async move {
                let _permit = pool
                    .acquire_owned()
                    .await
                    .map_err(|e| format!("worker pool closed: {}", e))?;
                progress.emit(&started_record(&task_unit, index, total));
                Ok::<UnitResult, String>(run_unit(&ctx, &task_unit, index, total).await)
            });
            tasks.push(async move { (unit, index, handle.await) });
        }

        let mut results = Vec::with_capacity(total);
        while let Some((unit, index, joined)) = tasks.next().await {
            let result = match joined {
                Ok(Ok(result)) => result,
                Ok(Err(message)) => errored(&unit, index, total, message),
                Err(join_error) => errored(&unit, index, total, join_error.to_string()),
            };
            if result.outcome == UnitOutcome::Errored {
                error!(
                    unit = %result.unit,
                    error = result.error.as_deref().unwrap_or("unknown error"),
                    "Failed to generate"
                );
            }
            self.progress.emit(&result.to_record());
            results.push(result);
        }
        results.sort_by_key(|r| r.index);

        let summary = RunSummary {
            results,
            workers,
            cores: self.policy.parallelism,
            hard_cap: self.policy.hard_cap,
            elapsed: started.elapsed(),
        };
        info!(
            succeeded = summary.count(UnitOutcome::Succeeded),
            failed = summary.count(UnitOutcome::Failed),
            skipped = summary.count(UnitOutcome::Skipped),
            errored = summary.count(UnitOutcome::Errored),
            "Generation run complete"
        );
        summary
    }
}

fn errored(unit: &str, index: usize, total: usize, message: String) -> UnitResult {
    let mut result = UnitResult::new(unit, index, total);
    result.outcome = UnitOutcome::Errored;
    result.error = Some(message);
    result.error_kind = Some("unexpected".to_string());
    result
}

/// Keep the first occurrence of each unit id, preserving input order.
pub fn dedupe_units(units: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    units
        .into_iter()
        .filter(|unit| {
            let first = seen.insert(unit.clone());
            if !first {
                warn!(unit = %unit, "Ignoring repeated unit id");
            }
            first
        })
        .collect()
}
