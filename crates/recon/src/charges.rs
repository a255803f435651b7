use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::config::{ChargeColumns, ChargeSchema};
use crate::error::ReconError;
use crate::model::{RejectedRecord, Ring, ScanRecord, Substituent};

// ---------------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------------

/// The nine atoms whose partial charge is tracked per ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Descriptor {
    C1,
    C2,
    C3,
    C4,
    C5,
    C6,
    /// Generic ring carbon next to the bridge.
    CNr,
    N,
    O,
}

impl Descriptor {
    pub const ALL: [Descriptor; 9] = [
        Self::C1,
        Self::C2,
        Self::C3,
        Self::C4,
        Self::C5,
        Self::C6,
        Self::CNr,
        Self::N,
        Self::O,
    ];

    /// Label used in diagram text (`C1`, ..., `C`, `N`, `O`).
    pub fn label(self) -> &'static str {
        match self {
            Self::C1 => "C1",
            Self::C2 => "C2",
            Self::C3 => "C3",
            Self::C4 => "C4",
            Self::C5 => "C5",
            Self::C6 => "C6",
            Self::CNr => "C",
            Self::N => "N",
            Self::O => "O",
        }
    }

    /// Single-glyph marker drawn inside a scheme atom.
    pub fn marker(self) -> &'static str {
        match self {
            Self::C1 => "1",
            Self::C2 => "2",
            Self::C3 => "3",
            Self::C4 => "4",
            Self::C5 => "5",
            Self::C6 => "6",
            other => other.label(),
        }
    }

    /// Column header in tabular exports.
    pub fn header(self) -> &'static str {
        match self {
            Self::CNr => "C_NR",
            other => other.label(),
        }
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|d| *d == self).unwrap_or(0)
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

// ---------------------------------------------------------------------------
// Profiles and rows
// ---------------------------------------------------------------------------

/// Partial charges of one ring, in descriptor order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChargeProfile([f64; 9]);

impl ChargeProfile {
    pub fn new(values: [f64; 9]) -> Self {
        Self(values)
    }

    pub fn get(&self, descriptor: Descriptor) -> f64 {
        self.0[descriptor.position()]
    }

    /// Per-descriptor difference `self − reference`.
    pub fn delta(&self, reference: &ChargeProfile) -> ChargeProfile {
        let mut out = [0.0; 9];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.0[i] - reference.0[i];
        }
        ChargeProfile(out)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Descriptor, f64)> + '_ {
        Descriptor::ALL.iter().copied().zip(self.0.iter().copied())
    }

    fn read(record: &ScanRecord, columns: &ChargeColumns) -> Result<Self, String> {
        let mut values = [0.0; 9];
        for (slot, name) in values.iter_mut().zip(columns.names()) {
            *slot = record
                .value(name)
                .ok_or_else(|| format!("charge column '{name}' has no value"))?;
        }
        Ok(Self(values))
    }
}

/// One mono-substituted compound (or the baseline) with the charges of the
/// ring that carries its substituent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargeRow {
    pub substituent: Substituent,
    /// Ring the substituent sits on; `A` for the baseline row.
    pub ring: Ring,
    /// Row index of the source record.
    pub index: String,
    pub charges: ChargeProfile,
}

/// Charge profiles keyed by substituent, baseline row first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargeTable {
    rows: Vec<ChargeRow>,
    /// Qualifying records dropped because their charge block was incomplete.
    pub rejected: Vec<RejectedRecord>,
}

impl ChargeTable {
    pub fn baseline(&self) -> &ChargeRow {
        &self.rows[0]
    }

    /// Every row, baseline first, then the substituted rows in source order.
    pub fn rows(&self) -> &[ChargeRow] {
        &self.rows
    }

    pub fn substituted(&self) -> &[ChargeRow] {
        &self.rows[1..]
    }

    pub fn get(&self, substituent: &Substituent) -> Option<&ChargeRow> {
        self.rows.iter().find(|r| &r.substituent == substituent)
    }

    /// Charges of `row` relative to the baseline compound.
    pub fn deltas(&self, row: &ChargeRow) -> ChargeProfile {
        row.charges.delta(&self.baseline().charges)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Collect the charge profile of every mono-substituted compound.
///
/// The block is read from the ring carrying the substituent: ring A when
/// ring B is unsubstituted, ring B otherwise. The baseline compound reads
/// the ring A block. Disubstituted compounds are skipped. When a substituent
/// appears mono-substituted on both rings the first record in index order
/// is kept.
pub fn build_charge_table(
    records: &[ScanRecord],
    schema: &ChargeSchema,
) -> Result<ChargeTable, ReconError> {
    let mut baseline: Option<ChargeRow> = None;
    let mut rows = Vec::new();
    let mut seen = BTreeSet::new();
    let mut rejected = Vec::new();

    for record in records {
        let (substituent, ring) = match (&record.ring_a, &record.ring_b) {
            (Substituent::Unsubstituted, Substituent::Unsubstituted) => {
                (Substituent::Unsubstituted, Ring::A)
            }
            (sub, Substituent::Unsubstituted) => (sub.clone(), Ring::A),
            (Substituent::Unsubstituted, sub) => (sub.clone(), Ring::B),
            (a, b) => {
                log::debug!("charge table: record '{}' ({a}, {b}) is disubstituted", record.index);
                continue;
            }
        };

        if (substituent.is_baseline() && baseline.is_some()) || seen.contains(&substituent) {
            log::debug!(
                "charge table: record '{}' repeats substituent {substituent}, keeping the first",
                record.index
            );
            continue;
        }

        let charges = match ChargeProfile::read(record, schema.ring(ring)) {
            Ok(c) => c,
            Err(reason) => {
                let err = ReconError::MalformedRecord {
                    index: record.index.clone(),
                    reason: reason.clone(),
                };
                log::warn!("charge table: skipping {err}");
                rejected.push(RejectedRecord { index: record.index.clone(), reason });
                continue;
            }
        };

        let row = ChargeRow { substituent, ring, index: record.index.clone(), charges };
        if row.substituent.is_baseline() {
            baseline = Some(row);
        } else {
            seen.insert(row.substituent.clone());
            rows.push(row);
        }
    }

    let Some(baseline) = baseline else {
        return Err(ReconError::MissingBaseline { quantity: "charge table".into() });
    };
    rows.insert(0, baseline);

    log::debug!("charge table: {} substituents plus baseline", rows.len() - 1);
    Ok(ChargeTable { rows, rejected })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn schema() -> ChargeSchema {
        let columns = |ring: &str| ChargeColumns {
            c1: format!("{ring}1"),
            c2: format!("{ring}2"),
            c3: format!("{ring}3"),
            c4: format!("{ring}4"),
            c5: format!("{ring}5"),
            c6: format!("{ring}6"),
            c_nr: format!("{ring}NR"),
            n: format!("{ring}N"),
            o: format!("{ring}O"),
        };
        ChargeSchema { ring_a: columns("a"), ring_b: columns("b") }
    }

    /// Ring A charges are all `a`, ring B charges all `b`.
    fn rec(index: &str, sub_a: &str, sub_b: &str, a: Option<f64>, b: f64) -> ScanRecord {
        let mut values = HashMap::new();
        for d in ["1", "2", "3", "4", "5", "6", "NR", "N", "O"] {
            values.insert(format!("a{d}"), a);
            values.insert(format!("b{d}"), Some(b));
        }
        ScanRecord {
            index: index.into(),
            ring_a: Substituent::parse(sub_a).unwrap(),
            ring_b: Substituent::parse(sub_b).unwrap(),
            values,
        }
    }

    #[test]
    fn mono_substituted_reads_substituted_ring() {
        let records = vec![
            rec("0", "None", "None", Some(0.10), 0.20),
            rec("1", "NO2_3", "None", Some(0.15), 0.30),
            rec("2", "None", "OH_4", Some(0.50), 0.05),
        ];
        let table = build_charge_table(&records, &schema()).unwrap();
        assert_eq!(table.len(), 3);
        assert!(table.baseline().substituent.is_baseline());
        assert_eq!(table.baseline().charges.get(Descriptor::C1), 0.10);

        let no2 = table.get(&Substituent::group("NO2_3")).unwrap();
        assert_eq!(no2.ring, Ring::A);
        assert_eq!(no2.charges.get(Descriptor::O), 0.15);

        let oh = table.get(&Substituent::group("OH_4")).unwrap();
        assert_eq!(oh.ring, Ring::B);
        assert_eq!(oh.charges.get(Descriptor::CNr), 0.05);
    }

    #[test]
    fn disubstituted_rows_are_excluded() {
        let records = vec![
            rec("0", "None", "None", Some(0.1), 0.1),
            rec("1", "NO2_3", "OH_4", Some(0.2), 0.2),
        ];
        let table = build_charge_table(&records, &schema()).unwrap();
        assert!(table.substituted().is_empty());
    }

    #[test]
    fn mirror_duplicate_keeps_first() {
        let records = vec![
            rec("0", "None", "None", Some(0.1), 0.1),
            rec("1", "None", "NO2_3", Some(0.9), 0.4),
            rec("2", "NO2_3", "None", Some(0.3), 0.9),
        ];
        let table = build_charge_table(&records, &schema()).unwrap();
        assert_eq!(table.substituted().len(), 1);
        let row = &table.substituted()[0];
        assert_eq!(row.index, "1");
        assert_eq!(row.ring, Ring::B);
        assert_eq!(row.charges.get(Descriptor::N), 0.4);
    }

    #[test]
    fn incomplete_block_is_rejected() {
        let records = vec![
            rec("0", "None", "None", Some(0.1), 0.1),
            rec("1", "NO2_3", "None", None, 0.2),
        ];
        let table = build_charge_table(&records, &schema()).unwrap();
        assert!(table.substituted().is_empty());
        assert_eq!(table.rejected.len(), 1);
        assert_eq!(table.rejected[0].index, "1");
        assert!(table.rejected[0].reason.contains("a1"));
    }

    #[test]
    fn baseline_is_required() {
        let records = vec![rec("1", "NO2_3", "None", Some(0.2), 0.2)];
        let err = build_charge_table(&records, &schema()).unwrap_err();
        assert_eq!(err, ReconError::MissingBaseline { quantity: "charge table".into() });
    }

    #[test]
    fn deltas_are_relative_to_baseline() {
        let records = vec![
            rec("0", "None", "None", Some(0.100), 0.0),
            rec("1", "Cl_2", "None", Some(0.125), 0.0),
        ];
        let table = build_charge_table(&records, &schema()).unwrap();
        let delta = table.deltas(&table.substituted()[0]);
        for (_, d) in delta.iter() {
            assert!((d - 0.025).abs() < 1e-12);
        }
        assert_eq!(table.deltas(table.baseline()).get(Descriptor::O), 0.0);
    }

    #[test]
    fn descriptor_labels() {
        assert_eq!(Descriptor::CNr.label(), "C");
        assert_eq!(Descriptor::CNr.header(), "C_NR");
        assert_eq!(Descriptor::C4.marker(), "4");
        assert_eq!(Descriptor::O.marker(), "O");
    }
}
