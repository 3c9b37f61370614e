//! Build Configuration Synthesis
//!
//! Builds the `smithy-build.json` document for one unit and lays out the
//! unit's workspace: directories, a copy of the description file under
//! `model/`, and the serialized configuration at the workspace root.
//! The document is deterministic: same key and settings, same bytes.

use crate::config::CodegenSettings;
use crate::error::UnitError;
use crate::resolver::DerivedNames;
use crate::workspace::{Workspace, GENERATED_DIRNAME, MODEL_DIRNAME};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Build configuration consumed by the external build tool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildConfiguration {
    pub version: String,
    pub sources: Vec<String>,
    pub maven: MavenSettings,
    pub plugins: BTreeMap<String, PluginSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MavenSettings {
    pub dependencies: Vec<String>,
    pub repositories: Vec<Repository>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Repository {
    pub url: String,
}

/// Parameters of the code generator plugin entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PluginSettings {
    pub service: String,
    pub name: String,
    pub namespace: String,
    pub output_dir: String,
}

impl BuildConfiguration {
    /// Assemble the configuration for a resolved service.
    pub fn new(settings: &CodegenSettings, service_key: &str, names: &DerivedNames) -> Self {
        let mut plugins = BTreeMap::new();
        plugins.insert(
            settings.plugin.clone(),
            PluginSettings {
                service: service_key.to_string(),
                name: names.model_name.clone(),
                namespace: names.namespace.clone(),
                output_dir: GENERATED_DIRNAME.to_string(),
            },
        );

        Self {
            version: settings.version.clone(),
            sources: vec![MODEL_DIRNAME.to_string()],
            maven: MavenSettings {
                dependencies: settings.dependencies.clone(),
                repositories: settings
                    .repositories
                    .iter()
                    .map(|url| Repository { url: url.clone() })
                    .collect(),
            },
            plugins,
        }
    }

    /// Serialize as two-space indented JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Create the workspace, copy the description file into `model/` and write
/// the configuration. Returns the path of the copied description file.
pub fn materialize(
    workspace: &Workspace,
    configuration: &BuildConfiguration,
    source_path: &Path,
) -> Result<PathBuf, UnitError> {
    workspace.create()?;

    let file_name = source_path.file_name().ok_or_else(|| {
        UnitError::Unexpected(format!("{} has no file name", source_path.display()))
    })?;
    let model_copy = workspace.model_dir().join(file_name);
    std::fs::copy(source_path, &model_copy).map_err(|e| UnitError::io(source_path, e))?;

    let config_path = workspace.config_path();
    let body = configuration.to_json().map_err(|e| {
        UnitError::Unexpected(format!("Failed to serialize build configuration: {}", e))
    })?;
    std::fs::write(&config_path, body).map_err(|e| UnitError::io(&config_path, e))?;

    debug!(
        workspace = %workspace.root().display(),
        config = %config_path.display(),
        "Materialized build configuration"
    );
    Ok(model_copy)
}
