//! # credreg CLI entry point
//!
//! Parses command-line arguments, loads the processor configuration and
//! dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use credreg_cli::keys::{run_keys, KeysArgs};
use credreg_cli::replay::{run_replay, ReplayArgs};
use credreg_operation::ProcessorConfig;

/// Credential registry toolchain.
///
/// Replays signed RegisterModel, AddTemplate, Issue and Revoke operations
/// against an in-memory ledger and renders registry state keys.
#[derive(Parser, Debug)]
#[command(name = "credreg", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the processor configuration file (YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a scenario of signed operations and print a JSON report.
    Replay(ReplayArgs),

    /// Render or parse credential-registry state keys.
    Keys(KeysArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG applies only when no -v flag is given.
    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = load_config(cli.config.as_ref()).and_then(|config| match &cli.command {
        Commands::Replay(args) => run_replay(args, config),
        Commands::Keys(args) => run_keys(args),
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

/// The configuration at `path`, or the defaults when no path is given.
fn load_config(path: Option<&PathBuf>) -> Result<ProcessorConfig> {
    match path {
        Some(path) => {
            let config = ProcessorConfig::load(path)?;
            tracing::debug!(path = %path.display(), network_id = %config.network_id, "loaded config");
            Ok(config)
        }
        None => Ok(ProcessorConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use credreg_cli::keys::KeysCommand;

    #[test]
    fn cli_parse_replay() {
        let cli = Cli::try_parse_from(["credreg", "replay", "scenario.yaml"]).unwrap();
        if let Commands::Replay(args) = cli.command {
            assert_eq!(args.scenario, PathBuf::from("scenario.yaml"));
            assert!(args.out.is_none());
            assert!(!args.all_states);
        } else {
            panic!("expected replay");
        }
    }

    #[test]
    fn cli_parse_replay_with_options() {
        let cli = Cli::try_parse_from([
            "credreg",
            "-vv",
            "--config",
            "registry.yaml",
            "replay",
            "scenario.yaml",
            "--out",
            "report.json",
            "--all-states",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("registry.yaml")));
        if let Commands::Replay(args) = cli.command {
            assert_eq!(args.out, Some(PathBuf::from("report.json")));
            assert!(args.all_states);
        } else {
            panic!("expected replay");
        }
    }

    #[test]
    fn cli_parse_keys_credential() {
        let cli = Cli::try_parse_from([
            "credreg",
            "keys",
            "credential",
            "--contract",
            "contractmca",
            "--template",
            "tpl",
            "--credential",
            "c1",
        ])
        .unwrap();
        let Commands::Keys(args) = cli.command else {
            panic!("expected keys");
        };
        assert!(matches!(args.command, KeysCommand::Credential { .. }));
    }

    #[test]
    fn cli_parse_keys_holder_did() {
        let cli = Cli::try_parse_from([
            "credreg",
            "keys",
            "holder-did",
            "--contract",
            "contractmca",
            "--holder",
            "holdermca",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Keys(_)));
    }

    #[test]
    fn cli_rejects_missing_subcommand() {
        assert!(Cli::try_parse_from(["credreg"]).is_err());
    }

    #[test]
    fn cli_global_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["credreg", "keys", "parse", "x", "-v"]).unwrap();
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn load_config_defaults_without_path() {
        assert_eq!(load_config(None).unwrap(), ProcessorConfig::default());
    }
}
