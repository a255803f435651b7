use std::fmt;

use crate::model::Substituent;

#[derive(Debug, Clone, PartialEq)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Schema validation error (duplicate quantity key, empty column name, etc.).
    ConfigValidation(String),
    /// Column named by the schema is absent from the input header.
    MissingColumn { column: String },
    /// CSV framing error (ragged rows, bad quoting).
    Csv(String),
    /// A record that cannot be used. Reported and skipped by callers, never fatal.
    MalformedRecord { index: String, reason: String },
    /// The unsubstituted × unsubstituted reference cell is absent.
    MissingBaseline { quantity: String },
    /// A substituent pair has no value in either orientation.
    UnresolvedCell {
        quantity: String,
        row: Substituent,
        column: Substituent,
    },
    /// Cellwise combination of matrices built over different substituent sets.
    KeyMismatch { left: String, right: String },
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "schema parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "schema validation error: {msg}"),
            Self::MissingColumn { column } => write!(f, "missing column '{column}'"),
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
            Self::MalformedRecord { index, reason } => {
                write!(f, "record '{index}': {reason}")
            }
            Self::MissingBaseline { quantity } => write!(
                f,
                "{quantity}: no value for the unsubstituted (None × None) reference compound"
            ),
            Self::UnresolvedCell { quantity, row, column } => write!(
                f,
                "{quantity}: no value for pair ({row}, {column}) in either ring orientation"
            ),
            Self::KeyMismatch { left, right } => write!(
                f,
                "cannot combine '{left}' with '{right}': substituent sets differ"
            ),
        }
    }
}

impl std::error::Error for ReconError {}
