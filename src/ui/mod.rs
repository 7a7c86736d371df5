//! Terminal feedback for interactive builds
//!
//! Interactive terminals get an indicatif spinner tracking the build state;
//! CI and redirected output get nothing beyond the log lines.

mod context;
mod progress;

pub use context::UiContext;
pub use progress::{build_spinner, report_failure, report_success};
