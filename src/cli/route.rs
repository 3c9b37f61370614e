//! CLI route: single route table and run context.

use crate::build::BuildRunner;
use crate::cli::parse::{Cli, Commands};
use crate::config::{ConfigLoader, SdkgenConfig};
use crate::error::CliError;
use crate::locator::discover_units;
use crate::pipeline::PipelineContext;
use crate::report::{ProgressSink, StdoutProgress};
use crate::resolver::DerivedNames;
use crate::scheduler::{PoolPolicy, Scheduler};
use serde_json::json;
use std::io::IsTerminal;
use std::sync::Arc;
use tracing::info;

/// Rendered command result. `success` drives the process exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub text: String,
    pub success: bool,
}

impl CommandOutput {
    fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            success: true,
        }
    }
}

/// Runtime context for CLI execution: effective configuration and run collaborators.
pub struct RunContext {
    config: SdkgenConfig,
    progress: Arc<dyn ProgressSink>,
    runner: Option<Arc<dyn BuildRunner>>,
    styled: bool,
}

impl RunContext {
    /// Load configuration for `cli` and apply its path overrides.
    pub fn new(cli: &Cli) -> Result<Self, CliError> {
        let mut config = match cli.config {
            Some(ref path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&cli.workspace)?,
        };
        if let Some(ref input) = cli.input {
            config.input_root = input.clone();
        }
        if let Some(ref output) = cli.output {
            config.output_root = output.clone();
        }
        Ok(Self::from_config(config))
    }

    pub fn from_config(config: SdkgenConfig) -> Self {
        Self {
            config,
            progress: Arc::new(StdoutProgress),
            runner: None,
            styled: std::io::stdout().is_terminal(),
        }
    }

    /// Replace the progress record sink (default: stdout).
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Replace the shell build runner.
    pub fn with_runner(mut self, runner: Arc<dyn BuildRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    pub fn config(&self) -> &SdkgenConfig {
        &self.config
    }

    pub fn styled(&self) -> bool {
        self.styled
    }

    /// Execute a CLI command via the single route table.
    pub async fn execute(&self, command: &Commands) -> Result<CommandOutput, CliError> {
        match command {
            Commands::Run {
                units,
                all,
                workers,
                build_command,
            } => {
                self.handle_run(units, *all, *workers, build_command.as_deref())
                    .await
            }
            Commands::List => self.handle_list(),
            Commands::Names { service_key } => self.handle_names(service_key),
            Commands::Config => Ok(CommandOutput::ok(ConfigLoader::render(&self.config)?)),
        }
    }

    async fn handle_run(
        &self,
        units: &[String],
        all: bool,
        workers: Option<usize>,
        build_command: Option<&str>,
    ) -> Result<CommandOutput, CliError> {
        let mut config = self.config.clone();
        if let Some(workers) = workers {
            config.build.hard_cap = workers;
        }
        if let Some(command) = build_command {
            config.build.command = command.to_string();
        }
        config.validate()?;

        let units = if all {
            discover_units(&config.input_root)?
        } else if units.is_empty() {
            config.units.clone()
        } else {
            units.to_vec()
        };
        if units.is_empty() {
            return Err(CliError::Usage("no units to process".to_string()));
        }
        info!(units = ?units, "Resolved unit list");

        let ctx = match self.runner {
            Some(ref runner) => PipelineContext::with_runner(&config, Arc::clone(runner))?,
            None => PipelineContext::from_config(&config)?,
        };
        let policy = PoolPolicy::new(config.build.workers_per_core, config.build.hard_cap);
        let scheduler = Scheduler::new(Arc::new(ctx), policy, Arc::clone(&self.progress));

        let summary = scheduler.run(units).await;
        Ok(CommandOutput {
            text: summary.render(self.styled),
            success: summary.all_ok(),
        })
    }

    fn handle_list(&self) -> Result<CommandOutput, CliError> {
        let units = discover_units(&self.config.input_root)?;
        Ok(CommandOutput::ok(units.join("\n")))
    }

    fn handle_names(&self, service_key: &str) -> Result<CommandOutput, CliError> {
        let names =
            DerivedNames::from_service_key(service_key, &self.config.codegen.namespace_prefix);
        let body = json!({
            "service": service_key,
            "model_name": names.model_name,
            "module_name": names.module_name,
            "namespace": names.namespace,
        });
        let text = serde_json::to_string_pretty(&body)
            .map_err(|e| CliError::Usage(format!("failed to render names: {}", e)))?;
        Ok(CommandOutput::ok(text))
    }
}
