//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// mkbundle - incremental asset bundle builder
///
/// Compiles shaders, renders font atlases and compresses textures listed in a
/// bundle manifest, skipping tools whose inputs are unchanged, and packages
/// the results into a single archive with a make-style dependency file.
#[derive(Parser, Debug)]
#[command(name = "mkbundle")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Bundle manifest (JSON)
    #[arg(long = "bundle", value_name = "MANIFEST")]
    pub manifest: PathBuf,

    /// Input directory that manifest paths are relative to
    #[arg(long = "indir", value_name = "DIR")]
    pub input_dir: PathBuf,

    /// Output directory for the bundle tree, intermediates and cache
    #[arg(long = "outdir", value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Archive to write
    #[arg(long = "output", value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Make-style dependency file to write
    #[arg(long, value_name = "FILE")]
    pub depfile: PathBuf,

    /// Tool configuration file path
    #[arg(short, long, env = "MKBUNDLE_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Compile shaders with debug info and ship debug redistributables
    #[arg(long)]
    pub debug: bool,

    /// Per-tool time limit in seconds, overriding the configuration (0 = unlimited)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Log line format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    const REQUIRED: [&str; 11] = [
        "mkbundle",
        "--bundle",
        "bundle.json",
        "--indir",
        "assets",
        "--outdir",
        "build/out",
        "--output",
        "build/bundle.tar",
        "--depfile",
        "build/bundle.d",
    ];

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_required_flags() {
        let cli = Cli::try_parse_from(REQUIRED).unwrap();

        assert_eq!(cli.manifest, PathBuf::from("bundle.json"));
        assert_eq!(cli.input_dir, PathBuf::from("assets"));
        assert_eq!(cli.archive, PathBuf::from("build/bundle.tar"));
        assert!(!cli.debug);
        assert_eq!(cli.timeout, None);
        assert_eq!(cli.verbose, 0);
        assert_eq!(cli.log_format, LogFormat::Text);
    }

    #[test]
    fn parses_optional_flags() {
        let mut argv = REQUIRED.to_vec();
        argv.extend(["--debug", "--timeout", "30", "-vv", "--log-format", "json"]);

        let cli = Cli::try_parse_from(argv).unwrap();

        assert!(cli.debug);
        assert_eq!(cli.timeout, Some(30));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn missing_manifest_flag_is_rejected() {
        assert!(Cli::try_parse_from(&REQUIRED[..1]).is_err());
    }
}
