//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! - `--debug`: Enable debug logging
//! - `--json-logs`: Emit logs as JSON lines on stderr

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// tou-stats - Export end-of-match statistics from a host snapshot
#[derive(Parser, Debug)]
#[command(name = "tou-stats")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Export one match from a snapshot
    #[command(
        name = "export",
        long_about = "Export the match captured in a host snapshot.\n\n\
            Loads the snapshot as the foreign runtime, initialises the bridge, \
            harvests the match and sends it to the configured collector. \
            Nothing is sent unless the config enables export and sets both \
            the token and the endpoint.",
        after_help = "\
EXAMPLES:
    # Send using the default config locations
    tou-stats export --snapshot match.json

    # Print the payload instead of sending it
    tou-stats export --snapshot match.json --dry-run

    # Use a specific config file
    tou-stats export --snapshot match.json --config ./ApiSet.ini"
    )]
    Export {
        /// Snapshot file describing the host runtime
        #[arg(long, value_name = "FILE")]
        snapshot: PathBuf,

        /// Config file to use instead of the default locations
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Directory for local backups
        #[arg(long, value_name = "DIR")]
        backup_dir: Option<PathBuf>,

        /// Print the payload instead of sending it
        #[arg(long)]
        dry_run: bool,
    },

    /// Show what the bridge resolves from a snapshot
    #[command(
        name = "inspect",
        long_about = "Resolve the foreign module in a snapshot and summarise the match.\n\n\
            Prints the module name, its version and compatibility verdict, \
            then one line per roster entry with the resolved role, modifiers \
            and kill count."
    )]
    Inspect {
        /// Snapshot file describing the host runtime
        #[arg(long, value_name = "FILE")]
        snapshot: PathBuf,
    },

    /// Manage the ApiSet.ini configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
EXAMPLES:
    # Bash
    tou-stats completion bash > ~/.local/share/bash-completion/completions/tou-stats

    # Zsh
    tou-stats completion zsh > ~/.zfunc/_tou-stats"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Write the default config file
    Init {
        /// Where to write it (defaults to <documents>/TownOfUs/ApiSet.ini)
        #[arg(long, value_name = "FILE")]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective config with secrets masked
    Show {
        /// Config file to use instead of the default locations
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_export_with_global_flags() {
        let cli = Cli::try_parse_from([
            "tou-stats",
            "export",
            "--snapshot",
            "m.json",
            "--dry-run",
            "--debug",
        ])
        .unwrap();
        assert!(cli.debug);
        match cli.command {
            Command::Export {
                snapshot, dry_run, ..
            } => {
                assert_eq!(snapshot, PathBuf::from("m.json"));
                assert!(dry_run);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn snapshot_is_required() {
        assert!(Cli::try_parse_from(["tou-stats", "inspect"]).is_err());
    }
}
