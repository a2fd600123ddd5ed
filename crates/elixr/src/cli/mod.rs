//! Command-line interface for elixr.
//!
//! This module provides the CLI structure for the `elixr` binary and the
//! handlers that run each command.

mod commands;
mod handlers;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{CalcCommand, ConfigCommand, FlavorCommand, OutputFormat, RecipeCommand};
pub use handlers::{execute, run};

/// elixr - E-liquid mixing calculator
///
/// Works out how many grams of nicotine base, VG, PG and each flavor go into
/// a mix, and keeps named recipes as JSON files.
#[derive(Debug, Parser)]
#[command(name = "elixr")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Calculate component weights for a mix
    Calc(CalcCommand),

    /// Manage saved recipes
    #[command(subcommand)]
    Recipe(RecipeCommand),

    /// Manage the flavor weight table
    #[command(subcommand)]
    Flavor(FlavorCommand),

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn cli_with(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Config(ConfigCommand::Path),
        }
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "elixr");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_levels() {
        use crate::logging::Verbosity;

        assert_eq!(cli_with(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli_with(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(cli_with(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(cli_with(3, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_calc() {
        let args = vec![
            "elixr", "calc", "--amount", "100", "--strength", "3", "--pg", "30", "--vg", "70",
            "-f", "TFA Apple=5", "--flavor", "TFA Pear: 2%",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Calc(calc) = cli.command else {
            panic!("expected calc command");
        };
        assert!((calc.amount - 100.0).abs() < f64::EPSILON);
        assert_eq!(calc.flavors.len(), 2);
        assert_eq!(calc.flavors[1].name, "TFA Pear");
        assert_eq!(calc.format, OutputFormat::Plain);
        assert!(calc.save.is_none());
    }

    #[test]
    fn test_parse_calc_rejects_bad_flavor() {
        let args = vec![
            "elixr", "calc", "--amount", "100", "--pg", "30", "--vg", "70", "-f", "Apple",
        ];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_parse_calc_with_save_and_format() {
        let args = vec![
            "elixr", "calc", "-a", "10", "--pg", "50", "--vg", "50", "--save", "Plain Base",
            "--format", "json",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Calc(calc) = cli.command else {
            panic!("expected calc command");
        };
        assert_eq!(calc.save.as_deref(), Some("Plain Base"));
        assert_eq!(calc.format, OutputFormat::Json);
        assert!(calc.strength.abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_recipe_calc() {
        let args = vec!["elixr", "recipe", "calc", "Custard", "--amount", "30"];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Recipe(RecipeCommand::Calc { name, amount, .. }) = cli.command else {
            panic!("expected recipe calc command");
        };
        assert_eq!(name, "Custard");
        assert_eq!(amount, Some(30.0));
    }

    #[test]
    fn test_parse_flavor_add() {
        let args = vec!["elixr", "flavor", "add", "Custom Mint", "0.95"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(cli.command, Command::Flavor(FlavorCommand::Add { .. })));
    }

    #[test]
    fn test_parse_with_config() {
        let args = vec!["elixr", "-c", "/custom/config.toml", "recipe", "list"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_with_verbose_after_subcommand() {
        let args = vec!["elixr", "flavor", "list", "-vv"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
