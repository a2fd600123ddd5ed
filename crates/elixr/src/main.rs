//! `elixr` - CLI for the e-liquid calculator
//!
//! This binary calculates mixes and manages saved recipes and the flavor
//! weight table.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;

use elixr::cli::{self, Cli};
use elixr::init_logging;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> elixr::Result<()> {
    let mut out = io::stdout().lock();
    let mut status = io::stderr().lock();
    cli::execute(cli, &mut out, &mut status)?;
    out.flush()?;
    Ok(())
}
