//! Flavor specific-gravity table.
//!
//! Flavor concentrates are measured by volume but mixed by weight on a scale,
//! so every flavor carries a weight factor (its specific gravity). The table
//! is persisted as a flat JSON object `{"<flavor name>": <weight>}` next to
//! the recipe files.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Weight factor for flavors missing from the table.
pub const DEFAULT_FLAVOR_WEIGHT: f64 = 1.000;

/// Catalog shipped with the application, used until a table is saved.
const BUILTIN_CATALOG: &[(&str, f64)] = &[
    ("TFA Almond Amaretto", 1.0290),
    ("TFA Apple", 1.0406),
    ("TFA Apricot", 1.045),
    ("TFA Banana Cream", 1.020),
    ("TFA Bananas Foster", 1.030),
    ("TFA Bavarian Cream", 1.0681),
    ("TFA Belgian Waffle", 1.057),
    ("TFA Berry Crunch", 1.000),
    ("TFA Bitter Nut", 1.000),
    ("TFA Black Honey", 1.000),
    ("TFA Blueberry Extra", 1.052),
    ("TFA Blueberry Wild", 1.0283),
    ("TFA Brown Sugar", 1.066),
    ("TFA Butter", 1.033),
    ("TFA Butterscotch", 1.039),
    ("TFA Caramel", 1.054),
    ("TFA Cheesecake Graham Crust", 1.042),
    ("TFA Cinnamon", 0.9728),
    ("TFA Cinnamon Danish", 1.053),
    ("TFA Circus Cotton Candy", 1.069),
    ("TFA Creme De Menthe", 0.945),
    ("TFA Dairy Milk", 1.029),
    ("TFA Dragonfruit", 1.024),
    ("TFA French Vanilla Deluxe", 1.014),
    ("TFA Gingerbread Cookie", 1.051),
    ("TFA Graham Cracker", 1.059),
    ("TFA Grape Candy", 1.026),
    ("TFA Grape Juice", 1.041),
    ("TFA Green Tea", 1.034),
    ("TFA Honeysuckle", 1.1562),
    ("TFA Juicy Peach", 1.0349),
    ("TFA Kentucky Bourbon", 1.029),
    ("TFA Key Lime", 1.027),
    ("TFA Koolada", 1.0519),
    ("TFA Lemonade Cookie", 1.000),
    ("TFA Malted Milk", 1.048),
    ("TFA Maple", 0.908),
    ("TFA Marshmallow", 1.042),
    ("Menthol", 0.9403),
    ("TFA Passionfruit", 1.053),
    ("TFA Pear", 1.029),
    ("TFA Pie Crust", 1.052),
    ("TFA Phillipine Mango", 1.033),
    ("TFA Popcorn", 1.042),
    ("TFA Raspberry Sweet", 1.0399),
    ("TFA Red Type", 1.033),
    ("TFA Rice Crunchies", 1.000),
    ("TFA Ripe Banana", 0.939),
    ("TFA Smooth", 1.046),
    ("TFA Spearmint", 0.960),
    ("TFA Strawberries and Cream", 1.047),
    ("TFA Sweet Cream", 1.040),
    ("TFA Sweetener", 1.056),
    ("TFA Tabanon", 1.000),
    ("TFA Toasted Almond", 1.0397),
    ("TFA Toasted Marshmallow", 1.0924),
    ("TFA Turkish", 1.052),
    ("TFA Vanilla Bean Ice Cream", 1.0623),
    ("TFA Vanilla Cupcake", 1.0623),
    ("TFA Vanilla Custard", 1.0484),
    ("TFA Whipped Cream", 1.0441),
    ("TFA Wintergreen", 1.0519),
    ("CAP Blue Raspberry Cotton Candy", 1.048),
    ("CAP Cool Mint", 1.045),
    ("CAP Double Apple", 1.000),
    ("CAP Golden Pineapple", 1.0408),
    ("CAP Green Apple", 0.918),
    ("CAP Grenadine", 1.000),
    ("CAP Italian Lemon Sicily", 1.000),
    ("CAP Jelly Candy", 1.000),
    ("CAP Juicy Orange", 1.000),
    ("CAP New York Cheesecake", 1.0284),
    ("CAP Peppermint", 1.035),
    ("CAP Raspberry", 1.033),
    ("CAP Sweet Mango", 1.032),
    ("CAP Sweet Strawberry", 1.0044),
    ("CAP Sweet Watermelon", 1.027),
    ("CAP Yellow Peach", 0.870),
    ("LA Watermelon", 1.000),
    ("NF Cookie Dough", 1.000),
    ("FA Cookie", 1.0530),
    ("FA Meringue", 1.053),
    ("FA Vienna Cream", 1.0364),
];

/// Mapping of flavor name to specific gravity, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlavorTable {
    weights: BTreeMap<String, f64>,
}

impl FlavorTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in catalog of common concentrates.
    #[must_use]
    pub fn builtin() -> Self {
        let weights = BUILTIN_CATALOG
            .iter()
            .map(|(name, weight)| ((*name).to_string(), *weight))
            .collect();
        Self { weights }
    }

    /// Load a table from a JSON file.
    ///
    /// Falls back to [`FlavorTable::builtin`] when the file does not exist,
    /// does not hold a JSON object of numbers, or holds a weight that is not a
    /// finite positive number.
    ///
    /// # Errors
    ///
    /// Returns an error only if the file exists but cannot be read.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No flavor table at {}, using built-in catalog", path.display());
                return Ok(Self::builtin());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Self>(&content) {
            Ok(table) => match table.weights.iter().find(|(_, w)| check_weight(**w).is_err()) {
                Some((name, weight)) => {
                    warn!(
                        "Ignoring flavor table at {}: '{}' has weight {}; using built-in catalog",
                        path.display(),
                        name,
                        weight
                    );
                    Ok(Self::builtin())
                }
                None => {
                    debug!("Loaded {} flavors from {}", table.len(), path.display());
                    Ok(table)
                }
            },
            Err(e) => {
                warn!(
                    "Ignoring unreadable flavor table at {}: {}; using built-in catalog",
                    path.display(),
                    e
                );
                Ok(Self::builtin())
            }
        }
    }

    /// Write the table as pretty-printed JSON, keys sorted.
    ///
    /// Creates parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!("Saved {} flavors to {}", self.len(), path.display());
        Ok(())
    }

    /// Add a flavor or replace its weight.
    ///
    /// The name is trimmed. Returns the previous weight, if any.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for an empty name or a weight that is
    /// not a finite positive number.
    pub fn insert(&mut self, name: &str, weight: f64) -> Result<Option<f64>> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::invalid_input("flavor name", "must not be empty"));
        }
        check_weight(weight)?;
        Ok(self.weights.insert(name.to_string(), weight))
    }

    /// Get the stored weight for a flavor.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.weights.get(name).copied()
    }

    /// Weight of a flavor, or [`DEFAULT_FLAVOR_WEIGHT`] when unknown.
    #[must_use]
    pub fn weight_of(&self, name: &str) -> f64 {
        self.weight_or(name, DEFAULT_FLAVOR_WEIGHT)
    }

    /// Weight of a flavor, or `default` when unknown.
    #[must_use]
    pub fn weight_or(&self, name: &str, default: f64) -> f64 {
        self.get(name).unwrap_or(default)
    }

    /// Flavors whose name contains `query`, ignoring case.
    ///
    /// An empty query matches everything.
    pub fn matching<'a>(&'a self, query: &str) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        let needle = query.trim().to_lowercase();
        self.iter()
            .filter(move |(name, _)| name.to_lowercase().contains(&needle))
    }

    /// Iterate over `(name, weight)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(name, weight)| (name.as_str(), *weight))
    }

    /// Number of flavors in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Check if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

fn check_weight(weight: f64) -> Result<()> {
    if weight.is_finite() && weight > 0.0 {
        Ok(())
    } else {
        Err(Error::invalid_input(
            "flavor weight",
            format!("must be a positive number (got {weight})"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let table = FlavorTable::builtin();
        assert_eq!(table.len(), BUILTIN_CATALOG.len());
        assert_eq!(table.get("TFA Apple"), Some(1.0406));
        assert_eq!(table.get("TFA Bavarian Cream"), Some(1.0681));
        assert_eq!(table.get("Menthol"), Some(0.9403));
        assert_eq!(table.get("FA Vienna Cream"), Some(1.0364));
    }

    #[test]
    fn test_weight_of_unknown_defaults_to_one() {
        let table = FlavorTable::builtin();
        assert!((table.weight_of("Homemade Mystery") - 1.0).abs() < f64::EPSILON);
        assert!((table.weight_or("Homemade Mystery", 1.02) - 1.02).abs() < f64::EPSILON);
    }

    #[test]
    fn test_insert_trims_and_replaces() {
        let mut table = FlavorTable::new();
        assert_eq!(table.insert("  FW Butterscotch ", 1.04).unwrap(), None);
        assert_eq!(table.get("FW Butterscotch"), Some(1.04));

        assert_eq!(table.insert("FW Butterscotch", 1.05).unwrap(), Some(1.04));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_insert_rejects_bad_input() {
        let mut table = FlavorTable::new();
        assert!(table.insert("   ", 1.0).unwrap_err().is_input_error());
        assert!(table.insert("X", 0.0).unwrap_err().is_input_error());
        assert!(table.insert("X", -1.0).unwrap_err().is_input_error());
        assert!(table.insert("X", f64::NAN).unwrap_err().is_input_error());
        assert!(table.is_empty());
    }

    #[test]
    fn test_matching_is_case_insensitive_substring() {
        let table = FlavorTable::builtin();
        let names: Vec<&str> = table.matching("vanilla").map(|(name, _)| name).collect();

        assert!(names.contains(&"TFA Vanilla Custard"));
        assert!(names.contains(&"TFA French Vanilla Deluxe"));
        assert!(names.iter().all(|n| n.to_lowercase().contains("vanilla")));
    }

    #[test]
    fn test_matching_empty_query_returns_all() {
        let table = FlavorTable::builtin();
        assert_eq!(table.matching("").count(), table.len());
    }

    #[test]
    fn test_load_missing_file_uses_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let table = FlavorTable::load(dir.path().join("flavor_weights.json")).unwrap();
        assert_eq!(table, FlavorTable::builtin());
    }

    #[test]
    fn test_load_corrupt_file_uses_builtin() {
        crate::logging::init_test_logging();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flavor_weights.json");
        std::fs::write(&path, "{ not json").unwrap();

        let table = FlavorTable::load(&path).unwrap();
        assert_eq!(table, FlavorTable::builtin());
    }

    #[test]
    fn test_load_rejects_non_positive_weights() {
        crate::logging::init_test_logging();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flavor_weights.json");

        for content in [
            r#"{"TFA Apple": 1.0406, "Custom Mint": -1.0}"#,
            r#"{"Custom Mint": 0}"#,
        ] {
            std::fs::write(&path, content).unwrap();
            let table = FlavorTable::load(&path).unwrap();
            assert_eq!(table, FlavorTable::builtin());
            assert_eq!(table.get("Custom Mint"), None);
        }
    }

    #[test]
    fn test_load_file_written_by_hand() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flavor_weights.json");
        std::fs::write(&path, r#"{"TFA Apple": 1.0406, "Custom Mint": 0.95}"#).unwrap();

        let table = FlavorTable::load(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("Custom Mint"), Some(0.95));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("flavor_weights.json");

        let mut table = FlavorTable::builtin();
        table.insert("Custom Mint", 0.95).unwrap();
        table.save(&path).unwrap();

        let loaded = FlavorTable::load(&path).unwrap();
        assert_eq!(loaded, table);
    }

    #[test]
    fn test_save_writes_sorted_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flavor_weights.json");

        let mut table = FlavorTable::new();
        table.insert("Zesty Lime", 1.01).unwrap();
        table.insert("Apple", 1.04).unwrap();
        table.save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let apple = content.find("Apple").unwrap();
        let lime = content.find("Zesty Lime").unwrap();
        assert!(apple < lime);
    }
}
