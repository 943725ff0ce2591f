//! authctl: inspect the OAuth tokens held by a local session.
//!
//! Entry point for the application. Parses CLI arguments and delegates
//! to the appropriate command handler.

#![forbid(unsafe_code)]

mod cli;
mod commands;
mod core;
mod display;
mod error;
mod logging;
mod session;

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use session::FileResolver;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Parse CLI arguments and dispatch to the appropriate command handler.
///
/// Returns normally instead of calling `process::exit` so destructors
/// (including `Zeroizing` token buffers) run.
fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.debug);

    match &cli.command {
        Commands::Token(args) => {
            let mut resolver = FileResolver::new(cli.config.clone());
            let stdout = io::stdout();
            let use_color = stdout.is_terminal();
            commands::token::execute(args, &mut resolver, &mut stdout.lock(), use_color)
        }
    }
}
