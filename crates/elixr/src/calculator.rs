//! E-liquid mixing arithmetic.
//!
//! Converts a target volume, nicotine strength, PG/VG split and a list of
//! flavor percentages into the volume and mass of every component. Nicotine
//! comes out of the VG share and flavors come out of the PG share:
//!
//! ```text
//! nicotine_volume = strength / base_strength * amount
//! flavor_volume   = sum(flavor_pct / 100 * amount)
//! vg_volume       = vg_pct / 100 * amount - nicotine_volume
//! pg_volume       = pg_pct / 100 * amount - flavor_volume
//! mass(x)         = volume(x) * density(x)
//! flavor_mass(f)  = flavor_pct(f) / 100 * amount * specific_gravity(f)
//! ```

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::error::{Error, Result};
use crate::flavors::{FlavorTable, DEFAULT_FLAVOR_WEIGHT};

/// Negative remainders smaller than this are float noise and clamp to zero.
const VOLUME_TOLERANCE_ML: f64 = 1e-9;

/// A flavor and its share of the final volume, in percent (5.0 = 5%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlavorShare {
    /// Flavor name, as listed in the flavor table.
    pub name: String,
    /// Volume percentage of the finished liquid.
    pub percent: f64,
}

impl FlavorShare {
    /// Create a new flavor share.
    #[must_use]
    pub fn new(name: impl Into<String>, percent: f64) -> Self {
        Self {
            name: name.into(),
            percent,
        }
    }
}

/// Calculator inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixInput {
    /// Volume to make, in ml.
    pub amount_ml: f64,
    /// Target nicotine strength, in mg/ml.
    pub strength: f64,
    /// PG share of the finished liquid, in percent.
    pub pg_percent: f64,
    /// VG share of the finished liquid, in percent.
    pub vg_percent: f64,
    /// Flavors in the order they were added.
    #[serde(default)]
    pub flavors: Vec<FlavorShare>,
}

/// Densities of the base liquids in g/ml.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Densities {
    /// Nicotine base.
    pub nicotine: f64,
    /// Vegetable glycerin.
    pub vg: f64,
    /// Propylene glycol.
    pub pg: f64,
}

impl Default for Densities {
    fn default() -> Self {
        Self {
            nicotine: 1.261,
            vg: 1.261,
            pg: 1.036,
        }
    }
}

/// Constants the calculator works with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MixSettings {
    /// Concentration of the nicotine base in mg/ml.
    pub nicotine_base_strength: f64,
    /// Base liquid densities.
    pub densities: Densities,
    /// Specific gravity for flavors missing from the table.
    pub default_flavor_weight: f64,
}

impl Default for MixSettings {
    fn default() -> Self {
        Self {
            nicotine_base_strength: 100.0,
            densities: Densities::default(),
            default_flavor_weight: DEFAULT_FLAVOR_WEIGHT,
        }
    }
}

/// Volume and mass of one ingredient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Display name ("Nicotine", "VG", "PG" or the flavor name).
    pub name: String,
    /// Volume in ml.
    pub volume_ml: f64,
    /// Mass in grams.
    pub mass_g: f64,
}

impl Component {
    fn new(name: impl Into<String>, volume_ml: f64, density: f64) -> Self {
        let name = name.into();
        let mass_g = volume_ml * density;
        trace!("{}: {} ml x {} = {} g", name, volume_ml, density, mass_g);
        Self {
            name,
            volume_ml,
            mass_g,
        }
    }
}

/// Calculator output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixResult {
    /// Nicotine base.
    pub nicotine: Component,
    /// Vegetable glycerin.
    pub vg: Component,
    /// Propylene glycol.
    pub pg: Component,
    /// One entry per distinct flavor, in input order.
    pub flavors: Vec<Component>,
}

impl MixResult {
    /// All components: nicotine, VG, PG, then flavors.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        [&self.nicotine, &self.vg, &self.pg]
            .into_iter()
            .chain(self.flavors.iter())
    }

    /// Sum of all component volumes in ml.
    #[must_use]
    pub fn total_volume_ml(&self) -> f64 {
        self.components().map(|c| c.volume_ml).sum()
    }

    /// Sum of all component masses in grams.
    #[must_use]
    pub fn total_mass_g(&self) -> f64 {
        self.components().map(|c| c.mass_g).sum()
    }
}

/// Work out component volumes and masses for a mix.
///
/// Flavor specific gravities come from `table`; unknown flavors use
/// `settings.default_flavor_weight`. Flavors listed more than once are merged
/// into the first occurrence.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for non-finite or out-of-range inputs and
/// [`Error::InsufficientBase`] when nicotine or flavors need more liquid than
/// the VG or PG share provides.
pub fn calculate(
    input: &MixInput,
    table: &FlavorTable,
    settings: &MixSettings,
) -> Result<MixResult> {
    validate(input)?;

    let amount = input.amount_ml;
    let flavors = merge_duplicates(&input.flavors);

    if ((input.pg_percent + input.vg_percent) - 100.0).abs() > VOLUME_TOLERANCE_ML {
        warn!(
            "PG ({}%) and VG ({}%) add up to {}%, not 100%",
            input.pg_percent,
            input.vg_percent,
            input.pg_percent + input.vg_percent
        );
    }

    let nicotine_volume = input.strength / settings.nicotine_base_strength * amount;
    let flavor_volume: f64 = flavors.iter().map(|f| f.percent / 100.0 * amount).sum();

    let vg_volume = remainder("VG", input.vg_percent / 100.0 * amount - nicotine_volume)?;
    let pg_volume = remainder("PG", input.pg_percent / 100.0 * amount - flavor_volume)?;

    let densities = settings.densities;
    let flavor_components = flavors
        .iter()
        .map(|f| {
            let gravity = table.weight_or(&f.name, settings.default_flavor_weight);
            Component::new(f.name.clone(), f.percent / 100.0 * amount, gravity)
        })
        .collect();

    Ok(MixResult {
        nicotine: Component::new("Nicotine", nicotine_volume, densities.nicotine),
        vg: Component::new("VG", vg_volume, densities.vg),
        pg: Component::new("PG", pg_volume, densities.pg),
        flavors: flavor_components,
    })
}

/// Parse a flavor list entry such as `TFA Apple: 5%` or `TFA Apple=5`.
///
/// The separator is the last `:` or `=` in the entry, so flavor names may
/// themselves contain either character.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] when the entry has no separator, an empty
/// name, or a percentage that is not a number.
pub fn parse_flavor_share(entry: &str) -> Result<FlavorShare> {
    let Some(split) = entry.rfind([':', '=']) else {
        return Err(Error::invalid_input(
            "flavor",
            format!("expected 'NAME: PERCENT%' or 'NAME=PERCENT', got '{entry}'"),
        ));
    };

    let name = entry[..split].trim();
    if name.is_empty() {
        return Err(Error::invalid_input("flavor", format!("missing name in '{entry}'")));
    }

    let percent = parse_percent(&entry[split + 1..]).ok_or_else(|| {
        Error::invalid_input("flavor", format!("bad percentage in '{entry}'"))
    })?;

    Ok(FlavorShare::new(name, percent))
}

/// Parse a percentage with an optional `%` suffix.
pub(crate) fn parse_percent(text: &str) -> Option<f64> {
    let text = text.trim();
    let text = text.strip_suffix('%').unwrap_or(text).trim();
    text.parse().ok()
}

fn validate(input: &MixInput) -> Result<()> {
    check_finite("amount", input.amount_ml)?;
    if input.amount_ml <= 0.0 {
        return Err(Error::invalid_input("amount", "must be greater than 0"));
    }

    check_finite("strength", input.strength)?;
    if input.strength < 0.0 {
        return Err(Error::invalid_input("strength", "must not be negative"));
    }

    check_percent("PG", input.pg_percent)?;
    check_percent("VG", input.vg_percent)?;

    for flavor in &input.flavors {
        if flavor.name.trim().is_empty() {
            return Err(Error::invalid_input("flavor name", "must not be empty"));
        }
        check_percent(&format!("percentage for '{}'", flavor.name), flavor.percent)?;
    }

    Ok(())
}

fn check_finite(field: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::invalid_input(field, format!("must be a number (got {value})")))
    }
}

fn check_percent(field: &str, value: f64) -> Result<()> {
    check_finite(field, value)?;
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::invalid_input(
            field,
            format!("must be between 0 and 100 (got {value})"),
        ))
    }
}

fn remainder(base: &'static str, volume: f64) -> Result<f64> {
    if volume >= 0.0 {
        Ok(volume)
    } else if volume > -VOLUME_TOLERANCE_ML {
        Ok(0.0)
    } else {
        Err(Error::InsufficientBase {
            base,
            shortfall_ml: -volume,
        })
    }
}

/// Trim flavor names and sum repeated ones into their first occurrence.
pub(crate) fn merge_duplicates(flavors: &[FlavorShare]) -> Vec<FlavorShare> {
    let mut merged: Vec<FlavorShare> = Vec::with_capacity(flavors.len());
    for flavor in flavors {
        let name = flavor.name.trim();
        match merged.iter_mut().find(|f| f.name == name) {
            Some(existing) => existing.percent += flavor.percent,
            None => merged.push(FlavorShare::new(name, flavor.percent)),
        }
    }
    merged
}
