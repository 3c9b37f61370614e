//! Per-unit generation pipeline.
//!
//! locate -> resolve -> synthesize -> build -> extract diagnostics -> clean.
//! Every stage error stays inside the unit and is folded into its
//! [`UnitResult`]; nothing is shared between units except the read-only
//! [`PipelineContext`].

use crate::build::{BuildRunner, ShellBuildRunner};
use crate::config::{CodegenSettings, SdkgenConfig};
use crate::diagnostics::DiagnosticExtractor;
use crate::error::{ConfigError, UnitError};
use crate::locator::locate_description;
use crate::report::{UnitOutcome, UnitResult};
use crate::resolver::{resolve_service_key, DerivedNames};
use crate::synthesis::{materialize, BuildConfiguration};
use crate::workspace::{validate_unit_id, Workspace};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};

/// Read-only settings shared by every unit of a run.
pub struct PipelineContext {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub description_extension: String,
    pub codegen: CodegenSettings,
    pub extractor: DiagnosticExtractor,
    pub runner: Arc<dyn BuildRunner>,
}

impl PipelineContext {
    /// Context for `config` using the configured shell build command.
    pub fn from_config(config: &SdkgenConfig) -> Result<Self, ConfigError> {
        let runner = Arc::new(ShellBuildRunner::new(config.build.command.clone()));
        Self::with_runner(config, runner)
    }

    /// Context for `config` with a caller-supplied build runner.
    pub fn with_runner(
        config: &SdkgenConfig,
        runner: Arc<dyn BuildRunner>,
    ) -> Result<Self, ConfigError> {
        let extractor = DiagnosticExtractor::from_settings(&config.build)
            .map_err(|e| ConfigError::Invalid(format!("build.error_marker: {}", e)))?;
        Ok(Self {
            input_root: config.input_root.clone(),
            output_root: config.output_root.clone(),
            description_extension: config.description_extension.clone(),
            codegen: config.codegen.clone(),
            extractor,
            runner,
        })
    }
}

/// Run the whole pipeline for one unit. Never fails: errors become the outcome.
pub async fn run_unit(
    ctx: &PipelineContext,
    unit: &str,
    index: usize,
    total: usize,
) -> UnitResult {
    let span = info_span!("unit", unit = %unit, process = %format!("{}/{}", index, total));
    async {
        let started = Instant::now();
        let mut result = UnitResult::new(unit, index, total);

        match execute(ctx, unit, &mut result).await {
            Ok(()) => {
                result.outcome = UnitOutcome::Succeeded;
                info!("Build succeeded");
            }
            Err(err) => {
                result.outcome = classify(&err);
                result.error = Some(err.to_string());
                result.error_kind = Some(err.kind().to_string());
                match result.outcome {
                    UnitOutcome::Skipped => info!(reason = %err, "Skipped"),
                    UnitOutcome::Failed => warn!(error = %err, "Build failed"),
                    _ => {}
                }
            }
        }

        result.elapsed = started.elapsed();
        result
    }
    .instrument(span)
    .await
}

/// Map a pipeline error onto the unit's terminal state.
pub fn classify(err: &UnitError) -> UnitOutcome {
    match err {
        UnitError::NotFound { .. } => UnitOutcome::Skipped,
        UnitError::Build { .. } => UnitOutcome::Failed,
        _ => UnitOutcome::Errored,
    }
}

async fn execute(
    ctx: &PipelineContext,
    unit: &str,
    result: &mut UnitResult,
) -> Result<(), UnitError> {
    validate_unit_id(unit)?;

    let source = {
        let unit = unit.to_string();
        let input_root = ctx.input_root.clone();
        let extension = ctx.description_extension.clone();
        blocking(move || locate_description(&unit, &input_root, &extension)).await?
    };
    result.model = Some(source.clone());

    let service_key = {
        let source = source.clone();
        blocking(move || resolve_service_key(&source)).await?
    };
    result.key = Some(service_key.clone());
    let names = DerivedNames::from_service_key(&service_key, &ctx.codegen.namespace_prefix);
    debug!(
        service_key = %service_key,
        module = %names.module_name,
        namespace = %names.namespace,
        "Resolved service"
    );

    let workspace = Workspace::new(&ctx.output_root, unit);
    result.path = Some(workspace.root().to_path_buf());

    let guard = workspace.cleanup_guard();
    let built = build_in_workspace(ctx, &workspace, &service_key, &names, source).await;
    let cleaned = guard.finish();

    built?;
    cleaned
}

async fn build_in_workspace(
    ctx: &PipelineContext,
    workspace: &Workspace,
    service_key: &str,
    names: &DerivedNames,
    source: PathBuf,
) -> Result<(), UnitError> {
    let configuration = BuildConfiguration::new(&ctx.codegen, service_key, names);
    {
        let workspace = workspace.clone();
        blocking(move || {
            materialize(&workspace, &configuration, &source)?;
            workspace.clear_errors()
        })
        .await?;
    }

    info!(workspace = %workspace.root().display(), "Building");
    let log_path = workspace.log_path();
    let status = ctx.runner.run(workspace.root(), &log_path).await?;
    if status.success() {
        return Ok(());
    }

    let extractor = ctx.extractor.clone();
    let errors_path = workspace.errors_path();
    if let Err(e) = blocking(move || extractor.extract(&log_path, &errors_path)).await {
        warn!(error = %e, "Diagnostic extraction failed");
    }
    Err(UnitError::Build {
        status: status.code,
    })
}

/// Run filesystem work on tokio's blocking pool.
async fn blocking<T, F>(work: F) -> Result<T, UnitError>
where
    F: FnOnce() -> Result<T, UnitError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| UnitError::Unexpected(format!("Blocking task failed: {}", e)))?
}
