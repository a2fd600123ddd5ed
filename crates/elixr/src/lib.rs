//! `elixr` - E-liquid mixing calculator
//!
//! This library converts a target volume, nicotine strength, PG/VG ratio and
//! flavor percentages into component masses for mixing by weight, and stores
//! named recipes and the flavor specific-gravity table as JSON files.
//!
//! ```
//! use elixr::{calculate, FlavorShare, FlavorTable, MixInput, MixSettings};
//!
//! let input = MixInput {
//!     amount_ml: 100.0,
//!     strength: 3.0,
//!     pg_percent: 30.0,
//!     vg_percent: 70.0,
//!     flavors: vec![FlavorShare::new("TFA Apple", 5.0)],
//! };
//! let result = calculate(&input, &FlavorTable::builtin(), &MixSettings::default()).unwrap();
//! assert!((result.pg.volume_ml - 25.0).abs() < 1e-9);
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod calculator;
pub mod cli;
pub mod config;
pub mod error;
pub mod flavors;
pub mod logging;
pub mod recipe;
pub mod report;
pub mod store;

pub use calculator::{
    calculate, Component, Densities, FlavorShare, MixInput, MixResult, MixSettings,
};
pub use config::Config;
pub use error::{Error, Result};
pub use flavors::FlavorTable;
pub use logging::init_logging;
pub use recipe::Recipe;
pub use store::{RecipeEntry, RecipeStore};
