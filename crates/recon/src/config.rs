use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::model::Ring;

// ---------------------------------------------------------------------------
// Library schema
// ---------------------------------------------------------------------------

/// Named-field view of the scan library CSV.
///
/// Every column is addressed by header name and checked once when the file
/// is loaded, so a reordered export cannot shift values between fields.
///
/// The default quantity columns are the headers of the reference scan
/// export. The ring carbon charge columns are not: older exports leave them
/// unnamed or name them per program, so the defaults
/// (`"A ring carbon 1 Hirschfeld charge"`, ...) only match libraries written
/// with that convention. Override `[schema.charges.ring_a]` and
/// `[schema.charges.ring_b]` for anything else; a mismatch fails the load
/// with `MissingColumn` naming the first absent header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibrarySchema {
    /// Row-index column. `None` means the first column, whatever its header.
    pub index_column: Option<String>,
    pub substituent_a: String,
    pub substituent_b: String,
    pub quantities: Vec<QuantitySpec>,
    pub charges: ChargeSchema,
}

impl Default for LibrarySchema {
    fn default() -> Self {
        Self {
            index_column: None,
            substituent_a: "A ring substitution ID".into(),
            substituent_b: "B ring substitution ID".into(),
            quantities: default_quantities(),
            charges: ChargeSchema::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Quantities
// ---------------------------------------------------------------------------

/// One measured quantity, recorded once per bridge (A- and B-oriented).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantitySpec {
    /// Stable key used by reports and figures.
    pub key: String,
    /// Human name used in logs and errors.
    pub name: String,
    pub column_a: String,
    pub column_b: String,
}

impl QuantitySpec {
    pub fn new(key: &str, name: &str, column_a: &str, column_b: &str) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            column_a: column_a.into(),
            column_b: column_b.into(),
        }
    }

    pub fn column(&self, ring: Ring) -> &str {
        match ring {
            Ring::A => &self.column_a,
            Ring::B => &self.column_b,
        }
    }
}

fn default_quantities() -> Vec<QuantitySpec> {
    vec![
        QuantitySpec::new(
            "activation_energy",
            "Activation energy",
            "Activation energy - bridge A",
            "Activation energy - bridge B",
        ),
        QuantitySpec::new(
            "second_minimum",
            "Second minimum",
            "Second minimum - bridge A",
            "Second minimum - bridge B",
        ),
        // Header spelling follows the scan export.
        QuantitySpec::new(
            "oh_length",
            "Starting O-H length",
            "Ring A starting lenght",
            "Ring B starting lenght",
        ),
        QuantitySpec::new(
            "n_charge",
            "Bridge nitrogen charge",
            "Bridge A nitrogen charge",
            "Bridge B nitrogen charge",
        ),
        QuantitySpec::new(
            "o_charge",
            "Oxygen charge",
            "Bridge A oxygen charge",
            "Bridge B oxygen charge",
        ),
        QuantitySpec::new(
            "c5_charge",
            "Carbon 5 charge",
            "A ring carbon 5 Hirschfeld charge",
            "B ring carbon 5 Hirschfeld charge",
        ),
        QuantitySpec::new(
            "connector_c_charge",
            "Connector carbon charge",
            "Connector carbon A Mulliken charge",
            "Connector carbon B Mulliken charge",
        ),
        QuantitySpec::new(
            "no_distance",
            "Starting O-N length",
            "Bridge A nitrogen - oxygen distance",
            "Bridge B nitrogen - oxygen distance",
        ),
        QuantitySpec::new(
            "nc_distance",
            "Starting C1-N length",
            "Bridge A nitrogen - carbon 1 distance",
            "Bridge B nitrogen - carbon 1 distance",
        ),
        QuantitySpec::new(
            "co_distance",
            "Starting O-C4 length",
            "Bridge A carbon 4  - oxygen distance",
            "Bridge B carbon 4  - oxygen distance",
        ),
    ]
}

// ---------------------------------------------------------------------------
// Charge descriptor columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargeSchema {
    pub ring_a: ChargeColumns,
    pub ring_b: ChargeColumns,
}

impl ChargeSchema {
    pub fn ring(&self, ring: Ring) -> &ChargeColumns {
        match ring {
            Ring::A => &self.ring_a,
            Ring::B => &self.ring_b,
        }
    }
}

impl Default for ChargeSchema {
    fn default() -> Self {
        Self {
            ring_a: ChargeColumns::for_ring(Ring::A),
            ring_b: ChargeColumns::for_ring(Ring::B),
        }
    }
}

/// The nine per-atom charge columns of one ring and its bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeColumns {
    pub c1: String,
    pub c2: String,
    pub c3: String,
    pub c4: String,
    pub c5: String,
    pub c6: String,
    pub c_nr: String,
    pub n: String,
    pub o: String,
}

impl ChargeColumns {
    /// Default names. The carbon headers follow the quantity columns'
    /// wording and must be overridden for exports that label them otherwise.
    fn for_ring(ring: Ring) -> Self {
        let carbon = |n: &str| format!("{ring} ring carbon {n} Hirschfeld charge");
        Self {
            c1: carbon("1"),
            c2: carbon("2"),
            c3: carbon("3"),
            c4: carbon("4"),
            c5: carbon("5"),
            c6: carbon("6"),
            c_nr: carbon("NR"),
            n: format!("Bridge {ring} nitrogen charge"),
            o: format!("Bridge {ring} oxygen charge"),
        }
    }

    /// Column names in descriptor order (C1..C6, C_NR, N, O).
    pub fn names(&self) -> [&str; 9] {
        [
            &self.c1, &self.c2, &self.c3, &self.c4, &self.c5, &self.c6, &self.c_nr, &self.n,
            &self.o,
        ]
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl LibrarySchema {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let schema: LibrarySchema =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.substituent_a.trim().is_empty() || self.substituent_b.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "substituent column names must not be empty".into(),
            ));
        }
        if self.substituent_a == self.substituent_b {
            return Err(ReconError::ConfigValidation(format!(
                "ring A and ring B substituents both read from '{}'",
                self.substituent_a
            )));
        }

        let mut keys = HashSet::new();
        for q in &self.quantities {
            if q.key.trim().is_empty() {
                return Err(ReconError::ConfigValidation("quantity key must not be empty".into()));
            }
            if !keys.insert(q.key.as_str()) {
                return Err(ReconError::ConfigValidation(format!(
                    "duplicate quantity key '{}'",
                    q.key
                )));
            }
            if q.column_a.trim().is_empty() || q.column_b.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "quantity '{}': value columns must not be empty",
                    q.key
                )));
            }
        }

        for ring in [Ring::A, Ring::B] {
            if let Some(empty) = self.charges.ring(ring).names().iter().position(|n| n.trim().is_empty()) {
                return Err(ReconError::ConfigValidation(format!(
                    "ring {ring} charge column #{} must not be empty",
                    empty + 1
                )));
            }
        }

        Ok(())
    }

    pub fn quantity(&self, key: &str) -> Option<&QuantitySpec> {
        self.quantities.iter().find(|q| q.key == key)
    }

    /// Every numeric column the loader must extract, deduplicated, in
    /// declaration order.
    pub fn value_columns(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut columns = Vec::new();
        let quantity_columns = self
            .quantities
            .iter()
            .flat_map(|q| [q.column_a.as_str(), q.column_b.as_str()]);
        let charge_columns = self
            .charges
            .ring_a
            .names()
            .into_iter()
            .chain(self.charges.ring_b.names());
        for column in quantity_columns.chain(charge_columns) {
            if seen.insert(column) {
                columns.push(column);
            }
        }
        columns
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schema_is_valid() {
        let schema = LibrarySchema::default();
        schema.validate().unwrap();
        assert_eq!(schema.quantities.len(), 10);
        assert_eq!(schema.charges.ring_b.c5, "B ring carbon 5 Hirschfeld charge");
        assert_eq!(schema.charges.ring_a.n, "Bridge A nitrogen charge");
    }

    #[test]
    fn value_columns_are_deduplicated() {
        let schema = LibrarySchema::default();
        let columns = schema.value_columns();
        // c5 / N / O charge columns are shared by a quantity and a charge block
        let c5 = columns
            .iter()
            .filter(|c| **c == "A ring carbon 5 Hirschfeld charge")
            .count();
        assert_eq!(c5, 1);
        assert_eq!(columns.len(), 20 + 18 - 6);
    }

    #[test]
    fn parse_overrides_quantities() {
        let input = r#"
substituent_a = "SubA"
substituent_b = "SubB"

[[quantities]]
key = "energy"
name = "Energy"
column_a = "EA"
column_b = "EB"
"#;
        let schema = LibrarySchema::from_toml(input).unwrap();
        assert_eq!(schema.quantities.len(), 1);
        assert_eq!(schema.quantity("energy").unwrap().column(Ring::B), "EB");
        // untouched sections keep their defaults
        assert_eq!(schema.charges, ChargeSchema::default());
    }

    #[test]
    fn charge_block_names_can_be_overridden() {
        let input = r#"
[charges.ring_a]
c1 = "q(C1) A"
c2 = "q(C2) A"
c3 = "q(C3) A"
c4 = "q(C4) A"
c5 = "q(C5) A"
c6 = "q(C6) A"
c_nr = "q(CNR) A"
n = "q(N) A"
o = "q(O) A"
"#;
        let schema = LibrarySchema::from_toml(input).unwrap();
        assert_eq!(schema.charges.ring_a.names()[0], "q(C1) A");
        assert_eq!(schema.charges.ring_a.c_nr, "q(CNR) A");
        assert_eq!(schema.charges.ring_b, ChargeColumns::for_ring(Ring::B));
        assert!(schema.value_columns().contains(&"q(O) A"));
        assert!(!schema.value_columns().contains(&"A ring carbon 1 Hirschfeld charge"));
    }

    #[test]
    fn reject_duplicate_keys() {
        let input = r#"
[[quantities]]
key = "energy"
name = "Energy"
column_a = "EA"
column_b = "EB"

[[quantities]]
key = "energy"
name = "Energy again"
column_a = "EA2"
column_b = "EB2"
"#;
        let err = LibrarySchema::from_toml(input).unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
    }

    #[test]
    fn reject_same_substituent_column() {
        let input = r#"
substituent_a = "Sub"
substituent_b = "Sub"
"#;
        assert!(LibrarySchema::from_toml(input).is_err());
    }
}
