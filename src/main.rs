//! mkbundle - incremental asset bundle builder
//!
//! CLI entry point.

use clap::Parser;
use console::style;
use mkbundle::cli::{commands, Cli, LogFormat};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match commands::build(&cli).await {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_logging(cli: &Cli) {
    // 0 = warn (tool failures and spinner only), 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("mkbundle=warn"),
        1 => EnvFilter::new("mkbundle=info"),
        _ => EnvFilter::new("mkbundle=debug"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match cli.log_format {
        LogFormat::Text => subscriber.without_time().init(),
        LogFormat::Json => subscriber.json().init(),
    }
}
