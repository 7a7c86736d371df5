//! External tool invocation
//!
//! Commands are assembled from nested argument groups, flattened, and run as
//! child processes with merged output capture and an optional timeout.

pub mod command;
pub mod runner;

pub use command::{flatten, Arg, ToolCommand};
pub use runner::{
    ProcessRunner, ToolRunner, ToolStatus, SPAWN_FAILED_EXIT_CODE, TIMEOUT_EXIT_CODE,
};
