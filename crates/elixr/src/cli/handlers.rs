//! Command handlers.
//!
//! Every command writes its results to `out`. Confirmations for side effects
//! that accompany a result (such as `calc --save`) go to `status` so they
//! never mix with JSON output. Failures are returned to the caller, which
//! reports them as a single `error: ...` line.

use std::io::Write;
use std::path::PathBuf;

use tracing::debug;

use super::{CalcCommand, Cli, Command, ConfigCommand, FlavorCommand, OutputFormat, RecipeCommand};
use crate::calculator::{calculate, MixInput};
use crate::config::Config;
use crate::error::Result;
use crate::flavors::FlavorTable;
use crate::recipe::Recipe;
use crate::report;
use crate::store::RecipeStore;

/// Run a parsed command line.
///
/// `config path` and `config validate` do not need a working configuration,
/// so they run before it is loaded. Everything else loads the configuration
/// from `cli.config` (or the default location) first.
///
/// # Errors
///
/// Returns the first error hit by the command, including an invalid
/// configuration file.
pub fn execute(cli: &Cli, out: &mut dyn Write, status: &mut dyn Write) -> Result<()> {
    match &cli.command {
        Command::Config(cmd) => handle_config(cmd, cli.config.clone(), out),
        command => {
            let config = Config::load_from(cli.config.clone())?;
            run(command, &config, out, status)
        }
    }
}

/// Run a command against an already loaded configuration.
///
/// # Errors
///
/// Returns the first error hit by the command.
pub fn run(
    command: &Command,
    config: &Config,
    out: &mut dyn Write,
    status: &mut dyn Write,
) -> Result<()> {
    match command {
        Command::Calc(cmd) => handle_calc(config, cmd, out, status),
        Command::Recipe(cmd) => handle_recipe(config, cmd, out),
        Command::Flavor(cmd) => handle_flavor(config, cmd, out),
        Command::Config(ConfigCommand::Show { json }) => show_config(config, *json, out),
        Command::Config(cmd) => handle_config(cmd, None, out),
    }
}

fn open_store(config: &Config) -> Result<RecipeStore> {
    RecipeStore::open_with_flavor_file(config.data_dir(), &config.storage.flavor_weights_file)
}

fn write_mix(
    config: &Config,
    store: &RecipeStore,
    input: &MixInput,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<()> {
    let table = FlavorTable::load(store.flavor_weights_path())?;
    let result = calculate(input, &table, &config.mix_settings())?;
    let precision = config.output.precision;

    match format {
        OutputFormat::Plain => write!(out, "{}", report::render_plain(&result, precision))?,
        OutputFormat::Table => write!(out, "{}", report::render_table(&result, precision))?,
        OutputFormat::Json => writeln!(out, "{}", report::render_json(&result)?)?,
    }
    Ok(())
}

fn handle_calc(
    config: &Config,
    cmd: &CalcCommand,
    out: &mut dyn Write,
    status: &mut dyn Write,
) -> Result<()> {
    let store = open_store(config)?;
    let input = cmd.to_input();
    // Only mixes that calculate are saved
    write_mix(config, &store, &input, cmd.format, out)?;

    if let Some(name) = &cmd.save {
        let saved = store.save(name, &Recipe::from_input(&input))?;
        writeln!(status, "Recipe '{saved}' saved.")?;
    }
    Ok(())
}

fn handle_recipe(config: &Config, cmd: &RecipeCommand, out: &mut dyn Write) -> Result<()> {
    let store = open_store(config)?;

    match cmd {
        RecipeCommand::List { json } => {
            let entries = store.entries()?;
            if *json {
                let list: Vec<_> = entries
                    .iter()
                    .map(|e| {
                        serde_json::json!({
                            "name": e.name,
                            "modified": e.modified.map(|t| t.to_rfc3339()),
                        })
                    })
                    .collect();
                writeln!(out, "{}", serde_json::to_string_pretty(&list)?)?;
            } else if entries.is_empty() {
                writeln!(out, "No saved recipes in {}", store.dir().display())?;
            } else {
                let width = entries.iter().map(|e| e.name.chars().count()).max().unwrap_or(0);
                for entry in &entries {
                    match entry.modified {
                        Some(t) => {
                            let modified = t.format("%Y-%m-%d %H:%M");
                            writeln!(out, "{:<width$}  {modified}", entry.name)?;
                        }
                        None => writeln!(out, "{}", entry.name)?,
                    }
                }
            }
        }
        RecipeCommand::Show { name, json } => {
            let recipe = store.load(name)?;
            if *json {
                writeln!(out, "{}", serde_json::to_string_pretty(&recipe)?)?;
            } else {
                writeln!(out, "Recipe:    {}", name.trim())?;
                writeln!(out, "Amount:    {} ml", recipe.amount)?;
                writeln!(out, "Strength:  {} mg/ml", recipe.strength)?;
                writeln!(out, "PG:        {}%", recipe.pg)?;
                writeln!(out, "VG:        {}%", recipe.vg)?;
                if recipe.flavors.is_empty() {
                    writeln!(out, "Flavors:   none")?;
                } else {
                    writeln!(out, "Flavors:")?;
                    for flavor in &recipe.flavors {
                        writeln!(out, "  {}: {}%", flavor.name, flavor.percent)?;
                    }
                }
            }
        }
        RecipeCommand::Calc {
            name,
            amount,
            format,
        } => {
            let mut input = store.load(name)?.to_input();
            if let Some(amount) = *amount {
                debug!("Scaling '{}' from {} ml to {} ml", name, input.amount_ml, amount);
                input.amount_ml = amount;
            }
            write_mix(config, &store, &input, *format, out)?;
        }
        RecipeCommand::Delete { name } => {
            store.delete(name)?;
            writeln!(out, "Recipe '{}' removed.", name.trim())?;
        }
        RecipeCommand::Import { dir } => {
            let copied = store.seed_from(dir)?;
            writeln!(out, "Imported {copied} recipe(s) from {}", dir.display())?;
        }
    }
    Ok(())
}

fn handle_flavor(config: &Config, cmd: &FlavorCommand, out: &mut dyn Write) -> Result<()> {
    let store = open_store(config)?;
    let mut table = FlavorTable::load(store.flavor_weights_path())?;

    match cmd {
        FlavorCommand::List { filter, json } => {
            let matches: Vec<(&str, f64)> =
                table.matching(filter.as_deref().unwrap_or_default()).collect();
            if *json {
                let map: serde_json::Map<String, serde_json::Value> = matches
                    .iter()
                    .map(|(name, weight)| ((*name).to_string(), serde_json::json!(weight)))
                    .collect();
                writeln!(out, "{}", serde_json::to_string_pretty(&map)?)?;
            } else {
                let width = matches.iter().map(|(n, _)| n.chars().count()).max().unwrap_or(0);
                for (name, weight) in &matches {
                    writeln!(out, "{name:<width$}  {weight:.4}")?;
                }
            }
        }
        FlavorCommand::Add { name, weight } => {
            let previous = table.insert(name, *weight)?;
            table.save(store.flavor_weights_path())?;
            match previous {
                Some(old) => {
                    writeln!(out, "Updated flavor: {} ({old} -> {weight})", name.trim())?;
                }
                None => writeln!(out, "Added flavor: {}", name.trim())?,
            }
        }
        FlavorCommand::Get { name } => match table.get(name.trim()) {
            Some(weight) => writeln!(out, "{}: {weight}", name.trim())?,
            None => writeln!(
                out,
                "{}: {} (not in table, default)",
                name.trim(),
                config.mixing.default_flavor_weight
            )?,
        },
    }
    Ok(())
}

fn handle_config(
    cmd: &ConfigCommand,
    config_path: Option<PathBuf>,
    out: &mut dyn Write,
) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(config_path)?;
            show_config(&config, *json, out)
        }
        ConfigCommand::Path => {
            let path = config_path.unwrap_or_else(Config::default_config_path);
            writeln!(out, "{}", path.display())?;
            Ok(())
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .clone()
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            if !path.is_file() {
                writeln!(out, "No configuration file at {}; defaults apply.", path.display())?;
            }
            Config::load_from(Some(path.clone()))?;
            writeln!(out, "Configuration at {} is valid.", path.display())?;
            Ok(())
        }
    }
}

fn show_config(config: &Config, json: bool, out: &mut dyn Write) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(config)?)?;
        return Ok(());
    }

    writeln!(out, "Current Configuration")?;
    writeln!(out, "=====================")?;
    writeln!(out)?;
    writeln!(out, "[Storage]")?;
    writeln!(out, "  Data directory:     {}", config.data_dir().display())?;
    writeln!(out, "  Flavor table:       {}", config.flavor_weights_path().display())?;
    writeln!(out)?;
    writeln!(out, "[Mixing]")?;
    writeln!(out, "  Nicotine base:      {} mg/ml", config.mixing.nicotine_base_strength)?;
    writeln!(out, "  Nicotine density:   {} g/ml", config.mixing.nicotine_density)?;
    writeln!(out, "  VG density:         {} g/ml", config.mixing.vg_density)?;
    writeln!(out, "  PG density:         {} g/ml", config.mixing.pg_density)?;
    writeln!(out, "  Default flavor SG:  {}", config.mixing.default_flavor_weight)?;
    writeln!(out)?;
    writeln!(out, "[Output]")?;
    writeln!(out, "  Precision:          {}", config.output.precision)?;
    Ok(())
}
