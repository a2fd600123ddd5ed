//! Saved recipe model.
//!
//! A recipe is the set of calculator inputs stored under a name. On disk it is
//! a small JSON object:
//!
//! ```json
//! {
//!     "amount": 100.0,
//!     "strength": 3.0,
//!     "pg": 30.0,
//!     "vg": 70.0,
//!     "flavors": { "TFA Apple": 5.0, "TFA Pear": 2.0 }
//! }
//! ```
//!
//! Reading is deliberately forgiving so files written by older releases still
//! load: numbers may be quoted, `pg_percentage`/`vg_percentage` stand in for
//! `pg`/`vg`, and flavor percentages may carry a `%` suffix.

use serde::{Deserialize, Serialize};

use crate::calculator::{merge_duplicates, FlavorShare, MixInput};

/// Named calculator inputs as persisted in the recipe store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Volume to make, in ml.
    #[serde(deserialize_with = "lenient::number")]
    pub amount: f64,
    /// Nicotine strength, in mg/ml.
    #[serde(deserialize_with = "lenient::number")]
    pub strength: f64,
    /// PG percentage.
    #[serde(alias = "pg_percentage", deserialize_with = "lenient::number")]
    pub pg: f64,
    /// VG percentage.
    #[serde(alias = "vg_percentage", deserialize_with = "lenient::number")]
    pub vg: f64,
    /// Flavors in list order, stored as a `{name: percent}` object.
    #[serde(default, with = "flavor_map")]
    pub flavors: Vec<FlavorShare>,
}

impl Recipe {
    /// Capture calculator inputs as a recipe.
    ///
    /// Flavor names are trimmed and repeated names are summed, so each flavor
    /// is one key in the saved object.
    #[must_use]
    pub fn from_input(input: &MixInput) -> Self {
        Self {
            amount: input.amount_ml,
            strength: input.strength,
            pg: input.pg_percent,
            vg: input.vg_percent,
            flavors: merge_duplicates(&input.flavors),
        }
    }

    /// Turn the recipe back into calculator inputs.
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

impl From<&MixInput> for Recipe {
    fn from(input: &MixInput) -> Self {
        Self::from_input(input)
    }
}

mod lenient {
    use serde::{de, Deserialize, Deserializer};

    use crate::calculator::parse_percent;

    #[derive(Deserialize)]
    #[serde(untagged)]
    pub(super) enum NumberOrText {
        Number(f64),
        Text(String),
    }

    impl NumberOrText {
        pub(super) fn into_number<E: de::Error>(self) -> Result<f64, E> {
            match self {
                Self::Number(n) => Ok(n),
                Self::Text(text) => parse_percent(&text)
                    .ok_or_else(|| E::custom(format!("expected a number, got '{text}'"))),
            }
        }
    }

    pub(super) fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        NumberOrText::deserialize(deserializer)?.into_number()
    }
}

mod flavor_map {
    use std::fmt;

    use serde::de::{MapAccess, Visitor};
    use serde::{Deserializer, Serializer};

    use super::lenient::NumberOrText;
    use crate::calculator::{merge_duplicates, FlavorShare};

    // JSON object keys must be unique
    pub(super) fn serialize<S>(flavors: &[FlavorShare], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let merged = merge_duplicates(flavors);
        serializer.collect_map(merged.iter().map(|f| (&f.name, f.percent)))
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Vec<FlavorShare>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(FlavorMapVisitor)
    }

    struct FlavorMapVisitor;

    impl<'de> Visitor<'de> for FlavorMapVisitor {
        type Value = Vec<FlavorShare>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an object mapping flavor names to percentages")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut flavors = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, value)) = map.next_entry::<String, NumberOrText>()? {
                flavors.push(FlavorShare::new(name, value.into_number::<A::Error>()?));
            }
            Ok(flavors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Recipe {
        Recipe {
            amount: 100.0,
            strength: 3.0,
            pg: 30.0,
            vg: 70.0,
            flavors: vec![
                FlavorShare::new("TFA Pear", 2.0),
                FlavorShare::new("TFA Apple", 5.0),
            ],
        }
    }

    #[test]
    fn test_serialize_shape() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "amount": 100.0,
                "strength": 3.0,
                "pg": 30.0,
                "vg": 70.0,
                "flavors": { "TFA Pear": 2.0, "TFA Apple": 5.0 }
            })
        );
    }

    #[test]
    fn test_flavor_order_survives_round_trip() {
        let json = serde_json::to_string_pretty(&sample()).unwrap();
        assert!(json.find("TFA Pear").unwrap() < json.find("TFA Apple").unwrap());

        let parsed: Recipe = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn test_reads_quoted_numbers() {
        let json = r#"{
            "amount": "100",
            "strength": "3",
            "pg": "30",
            "vg": "70",
            "flavors": { "TFA Pear": 2.0, "TFA Apple": 5.0 }
        }"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert_eq!(recipe, sample());
    }

    #[test]
    fn test_reads_percentage_field_names_and_suffixes() {
        let json = r#"{
            "amount": "100",
            "strength": "3",
            "pg_percentage": "30",
            "vg_percentage": "70",
            "flavors": { "TFA Pear": "2.0%", "TFA Apple": "5.000%" }
        }"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert_eq!(recipe, sample());
    }

    #[test]
    fn test_missing_flavors_is_empty() {
        let json = r#"{"amount": 30, "strength": 0, "pg": 50, "vg": 50}"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert!(recipe.flavors.is_empty());
    }

    #[test]
    fn test_rejects_non_numeric_amount() {
        let json = r#"{"amount": "lots", "strength": 0, "pg": 50, "vg": 50}"#;
        let err = serde_json::from_str::<Recipe>(json).unwrap_err();
        assert!(err.to_string().contains("lots"));
    }

    #[test]
    fn test_rejects_missing_field() {
        let json = r#"{"amount": 30, "pg": 50, "vg": 50}"#;
        assert!(serde_json::from_str::<Recipe>(json).is_err());
    }

    #[test]
    fn test_input_conversion() {
        let recipe = sample();
        let input = recipe.to_input();
        assert!((input.amount_ml - 100.0).abs() < f64::EPSILON);
        assert!((input.vg_percent - 70.0).abs() < f64::EPSILON);
        assert_eq!(input.flavors.len(), 2);

        assert_eq!(Recipe::from(&input), recipe);
    }

    #[test]
    fn test_from_input_merges_repeated_flavors() {
        let mut input = sample().to_input();
        input.flavors = vec![
            FlavorShare::new("TFA Apple", 2.0),
            FlavorShare::new("TFA Pear", 1.0),
            FlavorShare::new(" TFA Apple ", 3.0),
        ];

        let recipe = Recipe::from_input(&input);
        assert_eq!(
            recipe.flavors,
            vec![
                FlavorShare::new("TFA Apple", 5.0),
                FlavorShare::new("TFA Pear", 1.0),
            ]
        );
    }

    #[test]
    fn test_serialize_writes_each_flavor_once() {
        let mut recipe = sample();
        recipe.flavors.push(FlavorShare::new("TFA Pear", 1.5));

        let json = serde_json::to_string(&recipe).unwrap();
        assert_eq!(json.matches("TFA Pear").count(), 1);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            value["flavors"],
            serde_json::json!({ "TFA Pear": 3.5, "TFA Apple": 5.0 })
        );
    }
}
