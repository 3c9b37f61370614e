//! sdkgen: concurrent code generation driver
//!
//! For each service unit: locate its Smithy JSON model, synthesize a
//! `smithy-build.json` for the code generator plugin, run the external build
//! in a per-unit workspace, and classify the result, scraping the build log
//! for diagnostics on failure. Units run concurrently under a bounded pool.

pub mod build;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod locator;
pub mod logging;
pub mod naming;
pub mod pipeline;
pub mod report;
pub mod resolver;
pub mod scheduler;
pub mod synthesis;
pub mod workspace;
