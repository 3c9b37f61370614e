//! CLI parse: clap types for sdkgen. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// sdkgen - concurrent Smithy code generation for AWS service models
#[derive(Parser, Debug)]
#[command(name = "sdkgen")]
#[command(about = "Generate SDK code for many Smithy service models concurrently")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory searched for sdkgen.toml
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Model input root (one subdirectory per unit)
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Output root (one workspace per unit)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, default_value = "false")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Generate code for the given units (default: configured list)
    Run {
        /// Unit ids, e.g. s3 dynamodb ec2
        units: Vec<String>,

        /// Process every unit found under the input root
        #[arg(long, conflicts_with = "units")]
        all: bool,

        /// Override the worker hard cap
        #[arg(long)]
        workers: Option<usize>,

        /// Override the external build command
        #[arg(long)]
        build_command: Option<String>,
    },
    /// List units found under the input root
    List,
    /// Show the names derived from a service key
    Names {
        /// Service shape id, e.g. com.amazonaws.s3#AmazonS3
        service_key: String,
    },
    /// Print the effective configuration
    Config,
}
