//! Build spinner and final status lines

use super::context::UiContext;
use crate::bundle::BuildOutcome;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Spinner shown while the build runs; hidden outside interactive terminals
pub fn build_spinner(ctx: &UiContext) -> ProgressBar {
    if !ctx.is_interactive() {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner()
        .template("  {spinner:.cyan} {msg}  {elapsed:.dim}")
    {
        spinner.set_style(spinner_style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
    }
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

/// Print the success line for interactive runs
pub fn report_success(ctx: &UiContext, archive: &Path) {
    if ctx.is_interactive() {
        eprintln!("{} Bundle written to {}", style("✓").green(), archive.display());
    }
}

/// Print the tool failure line
pub fn report_failure(ctx: &UiContext, outcome: &BuildOutcome) {
    if let BuildOutcome::ToolFailed {
        state,
        item,
        status,
    } = outcome
    {
        let marker = if ctx.is_interactive() {
            style("✗").red()
        } else {
            style("[FAIL]").red()
        };
        eprintln!("{} {} {}: {}", marker, state, item, status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_interactive_spinner_is_hidden() {
        let spinner = build_spinner(&UiContext::non_interactive());
        assert!(spinner.is_hidden());
        spinner.set_message("Compiling shader basic...");
        spinner.finish_and_clear();
    }
}
