//! CLI command implementations.

mod process;

pub use process::{run_process, ProcessRequest, RunStatus};
