//! Merge rules: defaults, override order, conflict handling.
//!
//! Scalar defaults are seeded here so a partially written file still yields a
//! complete document; list and table defaults come from the `Default` impls.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("input_root", "api-models-aws-main/models")?
        .set_default("output_root", "output")?
        .set_default("description_extension", "json")?
        .set_default("build.command", "smithy build")?
        .set_default("build.hard_cap", 64_i64)?
        .set_default("build.workers_per_core", 4_i64)
}
