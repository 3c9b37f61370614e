//! Configuration System
//!
//! Layered configuration for a generation run. Sources, lowest to highest
//! precedence: built-in defaults, the global config file, the workspace
//! `sdkgen.toml`, `SDKGEN__*` environment variables. CLI flags are applied
//! on top by the binary.

use crate::error::ConfigError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod merge;
mod sources;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SdkgenConfig {
    /// Directory holding one subdirectory per unit
    pub input_root: PathBuf,

    /// Directory receiving one workspace per unit
    pub output_root: PathBuf,

    /// Units processed when none are given on the command line
    pub units: Vec<String>,

    /// Extension of description files searched under each unit directory
    pub description_extension: String,

    pub build: BuildSettings,

    pub codegen: CodegenSettings,

    pub logging: LoggingConfig,
}

impl Default for SdkgenConfig {
    fn default() -> Self {
        Self {
            input_root: PathBuf::from("api-models-aws-main/models"),
            output_root: PathBuf::from("output"),
            units: vec!["s3".to_string(), "dynamodb".to_string(), "ec2".to_string()],
            description_extension: "json".to_string(),
            build: BuildSettings::default(),
            codegen: CodegenSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// External build invocation and worker pool settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BuildSettings {
    /// Shell command run in each workspace root
    pub command: String,

    /// Upper bound on concurrent units regardless of core count
    pub hard_cap: usize,

    /// Workers allowed per available core
    pub workers_per_core: usize,

    /// Regular expression marking error lines in the build log
    pub error_marker: String,

    /// Lines of context kept before each error line
    pub context_before: usize,

    /// Lines of context kept after each error line
    pub context_after: usize,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            command: "smithy build".to_string(),
            hard_cap: 64,
            workers_per_core: 4,
            error_marker: "ERROR".to_string(),
            context_before: 1,
            context_after: 12,
        }
    }
}

/// Contents of the synthesized build configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CodegenSettings {
    /// Plugin entry name under `plugins`
    pub plugin: String,

    /// Build configuration format version
    pub version: String,

    /// Maven coordinates resolved by the build tool
    pub dependencies: Vec<String>,

    /// Maven repository URLs
    pub repositories: Vec<String>,

    /// Prefix prepended to the derived module name
    pub namespace_prefix: String,
}

const SMITHY_VERSION: &str = "1.64.0";

impl Default for CodegenSettings {
    fn default() -> Self {
        let smithy = |artifact: &str| {
            format!("software.amazon.smithy:{}:{}", artifact, SMITHY_VERSION)
        };
        Self {
            plugin: "unison-codegen".to_string(),
            version: "1.0".to_string(),
            dependencies: vec![
                smithy("smithy-aws-traits"),
                smithy("smithy-aws-endpoints"),
                smithy("smithy-aws-smoke-test-model"),
                smithy("smithy-aws-iam-traits"),
                "io.smithy.unison:smithy-unison:0.1.0".to_string(),
            ],
            repositories: vec![
                "https://repo1.maven.org/maven2".to_string(),
                "file://${user.home}/.m2/repository".to_string(),
            ],
            namespace_prefix: "aws.".to_string(),
        }
    }
}

impl SdkgenConfig {
    /// Validate the configuration, collecting every problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        if self.build.command.trim().is_empty() {
            problems.push("build.command cannot be empty".to_string());
        }
        if self.build.hard_cap == 0 {
            problems.push("build.hard_cap must be at least 1".to_string());
        }
        if self.build.workers_per_core == 0 {
            problems.push("build.workers_per_core must be at least 1".to_string());
        }
        if let Err(e) = regex::Regex::new(&self.build.error_marker) {
            problems.push(format!("build.error_marker is not a valid pattern: {}", e));
        }
        if self.codegen.plugin.trim().is_empty() {
            problems.push("codegen.plugin cannot be empty".to_string());
        }
        if self.description_extension.trim().is_empty() {
            problems.push("description_extension cannot be empty".to_string());
        }
        for unit in &self.units {
            if let Err(e) = crate::workspace::validate_unit_id(unit) {
                problems.push(format!("units: {}", e));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems.join("; ")))
        }
    }
}

/// Loads [`SdkgenConfig`] from the layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load using the global file, `<workspace_root>/sdkgen.toml` and the environment.
    pub fn load(workspace_root: &Path) -> Result<SdkgenConfig, ConfigError> {
        let builder = merge::merge_policy::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = sources::workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = sources::environment::add_to_builder(builder);

        let config: SdkgenConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit file; the global and workspace files are not consulted.
    pub fn load_from_file(path: &Path) -> Result<SdkgenConfig, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Load(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let builder = merge::merge_policy::builder_with_defaults()?
            .add_source(config::File::from(path).required(true));
        let builder = sources::environment::add_to_builder(builder);

        let config: SdkgenConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Render the configuration as TOML.
    pub fn render(config: &SdkgenConfig) -> Result<String, ConfigError> {
        toml::to_string_pretty(config).map_err(|e| ConfigError::Load(e.to_string()))
    }
}
