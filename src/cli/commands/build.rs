//! Build command - produce the bundle archive and dependency file

use crate::bundle::{BuildOptions, BuildOutcome, Orchestrator};
use crate::cli::Cli;
use crate::config::{Config, ConfigManager};
use crate::error::BundleResult;
use crate::tool::ProcessRunner;
use crate::ui::{self, UiContext};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Execute a bundle build
pub async fn execute(cli: &Cli) -> BundleResult<BuildOutcome> {
    let config_manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    let timeout = tool_timeout(cli, &config);
    debug!("Tool timeout: {:?}", timeout);

    let ctx = UiContext::detect();
    let mut orchestrator = Orchestrator::new(
        build_options(cli),
        config,
        Arc::new(ProcessRunner::new(timeout)),
    )?
    .with_progress(ui::build_spinner(&ctx));

    let outcome = orchestrator.run().await?;
    match &outcome {
        BuildOutcome::Success => ui::report_success(&ctx, &cli.archive),
        failure => ui::report_failure(&ctx, failure),
    }
    Ok(outcome)
}

fn build_options(cli: &Cli) -> BuildOptions {
    BuildOptions {
        manifest: cli.manifest.clone(),
        input_dir: cli.input_dir.clone(),
        output_dir: cli.output_dir.clone(),
        archive: cli.archive.clone(),
        depfile: cli.depfile.clone(),
        debug: cli.debug,
    }
}

/// Command line timeout wins over the configured one; 0 disables it
fn tool_timeout(cli: &Cli, config: &Config) -> Option<Duration> {
    match cli.timeout {
        Some(0) => None,
        Some(secs) => Some(Duration::from_secs(secs)),
        None => config.tools.timeout(),
    }
}
