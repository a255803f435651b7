use std::collections::HashMap;
use std::fmt;

use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Substituent
// ---------------------------------------------------------------------------

const BASELINE_MARKER: &str = "None";

/// A chemical group on one ring position, used as both row and column key.
///
/// The unsubstituted baseline orders before every named group; named groups
/// order by identifier. Identifiers encode the ring position as a `_<digit>`
/// suffix (`NO2_3` is NO2 in position 3).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Substituent {
    Unsubstituted,
    Group(String),
}

impl Substituent {
    /// Parse a raw identifier cell.
    ///
    /// `None` and `None,None` (one marker per substitutable position) both
    /// mean unsubstituted. Any other spelling of the marker is rejected so a
    /// typo cannot silently become a distinct substituent.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err("blank substituent identifier".into());
        }

        let tokens: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        if tokens.iter().any(|t| t.is_empty()) {
            return Err(format!("empty token in substituent identifier '{trimmed}'"));
        }
        if tokens.iter().all(|t| *t == BASELINE_MARKER) {
            return Ok(Self::Unsubstituted);
        }
        if let Some(bad) = tokens
            .iter()
            .find(|t| t.eq_ignore_ascii_case(BASELINE_MARKER) && **t != BASELINE_MARKER)
        {
            return Err(format!(
                "non-canonical unsubstituted marker '{bad}' in '{trimmed}'"
            ));
        }

        Ok(Self::Group(trimmed.to_string()))
    }

    pub fn group(id: impl Into<String>) -> Self {
        Self::Group(id.into())
    }

    pub fn is_baseline(&self) -> bool {
        matches!(self, Self::Unsubstituted)
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Unsubstituted => BASELINE_MARKER,
            Self::Group(id) => id,
        }
    }

    /// Human title: `NO2_3` → `NO2 in position 3`. Identifiers without a
    /// position suffix are returned unchanged.
    pub fn title(&self) -> String {
        if let Self::Group(id) = self {
            if let Some((group, position)) = id.rsplit_once('_') {
                if !group.is_empty()
                    && !position.is_empty()
                    && position.chars().all(|c| c.is_ascii_digit())
                {
                    return format!("{group} in position {position}");
                }
            }
        }
        self.id().to_string()
    }

    /// Identifier made safe for use inside a file name.
    pub fn file_stem(&self) -> String {
        self.id()
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' => '-',
                other => other,
            })
            .collect()
    }
}

impl fmt::Display for Substituent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl Serialize for Substituent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

// ---------------------------------------------------------------------------
// Ring
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Ring {
    A,
    B,
}

impl fmt::Display for Ring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One compound of the scan library.
///
/// `values` holds every numeric column the schema asked for. A `None` value
/// means the cell was empty in the input; there is no in-band sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRecord {
    pub index: String,
    pub ring_a: Substituent,
    pub ring_b: Substituent,
    pub values: HashMap<String, Option<f64>>,
}

impl ScanRecord {
    pub fn substituent(&self, ring: Ring) -> &Substituent {
        match ring {
            Ring::A => &self.ring_a,
            Ring::B => &self.ring_b,
        }
    }

    /// Value of a numeric column, `None` when the column was not loaded or
    /// the cell was empty.
    pub fn value(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied().flatten()
    }

    pub fn is_baseline(&self) -> bool {
        self.ring_a.is_baseline() && self.ring_b.is_baseline()
    }
}

/// A record dropped at load time, kept for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRecord {
    pub index: String,
    pub reason: String,
}

/// The loaded dataset. Records are in ascending row-index order.
#[derive(Debug, Clone, Default)]
pub struct Library {
    pub records: Vec<ScanRecord>,
    pub rejected: Vec<RejectedRecord>,
}

impl Library {
    pub fn has_baseline(&self) -> bool {
        self.records.iter().any(ScanRecord::is_baseline)
    }
}
