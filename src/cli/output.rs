//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::CliError;
use owo_colors::OwoColorize;

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &CliError, styled: bool) -> String {
    if styled {
        format!("{} {}", "error:".red().bold(), e)
    } else {
        format!("error: {}", e)
    }
}
