//! Integration tests for the sdkgen generation driver

mod cli_binary;
mod pipeline_end_to_end;
mod scheduler_behavior;
