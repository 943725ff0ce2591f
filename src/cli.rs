//! CLI argument definitions for authctl.
//!
//! Uses `clap` derive macros to define the command-line interface.
//! Each subcommand has its own argument struct for type-safe parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Inspect the OAuth tokens held by the local authctl session.
#[derive(Debug, Parser)]
#[command(name = "authctl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path of the session file.
    ///
    /// Defaults to `authctl/session.json` under the platform
    /// configuration directory.
    #[arg(long, global = true, value_name = "FILE", env = "AUTHCTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print debug messages on stderr.
    #[arg(long, global = true)]
    pub debug: bool,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the current access token, refreshing it if needed.
    #[command(long_about = "Uses the stored credentials to print a token. \
        The token is refreshed first if it is about to expire, and the \
        session is updated with the result.")]
    Token(TokenArgs),
}

/// Arguments for the `token` subcommand.
///
/// `--header`, `--payload` and `--signature` are mutually exclusive; the
/// check happens in the command so it runs before any session I/O.
#[derive(Debug, Default, clap::Args)]
pub struct TokenArgs {
    /// Print the JSON header.
    #[arg(long)]
    pub header: bool,

    /// Print the JSON payload.
    #[arg(long)]
    pub payload: bool,

    /// Print the signature.
    #[arg(long)]
    pub signature: bool,

    /// Print the refresh token instead of the access token.
    #[arg(long)]
    pub refresh: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_token_flags_parse() {
        let cli = Cli::try_parse_from(["authctl", "token", "--payload", "--refresh"]).unwrap();
        let Commands::Token(args) = cli.command;
        assert!(args.payload);
        assert!(args.refresh);
        assert!(!args.header);
        assert!(!args.signature);
    }

    #[test]
    fn test_token_rejects_positional_arguments() {
        assert!(Cli::try_parse_from(["authctl", "token", "extra"]).is_err());
    }

    #[test]
    fn test_conflicting_flags_are_left_to_the_command() {
        // The parser accepts them; `mode::validate` reports the conflict.
        assert!(Cli::try_parse_from(["authctl", "token", "--header", "--payload"]).is_ok());
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli =
            Cli::try_parse_from(["authctl", "token", "--config", "/tmp/session.json"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/session.json")));
    }
}
