//! CLI domain: parse, route and output only.
//! Orchestration lives in the pipeline and scheduler; the route table only wires them up.

mod output;
mod parse;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands};
pub use route::{CommandOutput, RunContext};
