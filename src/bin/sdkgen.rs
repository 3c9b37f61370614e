//! sdkgen CLI Binary
//!
//! Command-line entry point for the concurrent code generation driver.

use anyhow::Context;
use clap::Parser;
use sdkgen::cli::{Cli, RunContext};
use sdkgen::logging::{init_logging, LoggingConfig};
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    let context = match RunContext::new(&cli) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("{}", sdkgen::cli::map_error(&e, false));
            process::exit(1);
        }
    };

    // Initialize logging before any work happens
    let logging_config = build_logging_config(&cli, &context.config().logging);
    if let Err(e) = init_logging(&logging_config) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("sdkgen starting");

    match run(&cli, &context) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            error!("Command failed: {:#}", e);
            eprintln!("error: {:#}", e);
            process::exit(1);
        }
    }
}

/// Execute the command on a multi-threaded runtime, print its output, and
/// report whether it succeeded.
fn run(cli: &Cli, context: &RunContext) -> anyhow::Result<bool> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    match runtime.block_on(context.execute(&cli.command)) {
        Ok(output) => {
            info!(success = output.success, "Command completed");
            println!("{}", output.text);
            Ok(output.success)
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", sdkgen::cli::map_error(&e, context.styled()));
            Ok(false)
        }
    }
}

/// Build logging configuration from CLI args on top of the loaded config.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli, base: &LoggingConfig) -> LoggingConfig {
    let mut config = base.clone();

    if cli.quiet {
        config.enabled = false;
    }
    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = Some(file.clone());
        if cli.log_output.is_none() {
            config.output = "file".to_string();
        }
    }

    config
}
