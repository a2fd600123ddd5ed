//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::calculator::{parse_flavor_share, FlavorShare, MixInput};

/// Calculate command arguments.
#[derive(Debug, Args)]
pub struct CalcCommand {
    /// Amount to make in ml
    #[arg(short, long)]
    pub amount: f64,

    /// Desired final nicotine strength in mg/ml
    #[arg(short, long, default_value = "0")]
    pub strength: f64,

    /// PG percentage
    #[arg(long)]
    pub pg: f64,

    /// VG percentage
    #[arg(long)]
    pub vg: f64,

    /// Flavor as "NAME=PERCENT" or "NAME: PERCENT%" (repeatable)
    #[arg(short, long = "flavor", value_name = "FLAVOR", value_parser = parse_flavor_arg)]
    pub flavors: Vec<FlavorShare>,

    /// Save the inputs as a recipe under this name
    #[arg(long, value_name = "NAME")]
    pub save: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

impl CalcCommand {
    /// Calculator inputs from the command-line arguments.
    #[must_use]
    pub fn to_input(&self) -> MixInput {
        MixInput {
            amount_ml: self.amount,
            strength: self.strength,
            pg_percent: self.pg,
            vg_percent: self.vg,
            flavors: self.flavors.clone(),
        }
    }
}

/// Recipe management commands.
#[derive(Debug, Subcommand)]
pub enum RecipeCommand {
    /// List saved recipes
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show a saved recipe's inputs
    Show {
        /// Recipe name
        name: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Calculate a saved recipe
    Calc {
        /// Recipe name
        name: String,

        /// Make this many ml instead of the saved amount
        #[arg(short, long)]
        amount: Option<f64>,

        /// Output format
        #[arg(long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },

    /// Delete a saved recipe
    Delete {
        /// Recipe name
        name: String,
    },

    /// Copy recipe files from a directory, keeping existing recipes
    Import {
        /// Directory containing `*.json` recipe files
        dir: PathBuf,
    },
}

/// Flavor weight table commands.
#[derive(Debug, Subcommand)]
pub enum FlavorCommand {
    /// List known flavors and their weights
    List {
        /// Only show flavors whose name contains this text
        #[arg(short, long)]
        filter: Option<String>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Add a flavor or change its weight
    Add {
        /// Flavor name
        name: String,

        /// Specific gravity (e.g. 1.04)
        weight: f64,
    },

    /// Show the weight used for a flavor
    Get {
        /// Flavor name
        name: String,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for calculation results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One "name: mass g" line per component
    #[default]
    Plain,
    /// Table with volumes, masses and totals
    Table,
    /// JSON output
    Json,
}

fn parse_flavor_arg(value: &str) -> Result<FlavorShare, String> {
    parse_flavor_share(value).map_err(|e| e.to_string())
}
