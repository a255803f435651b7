use std::collections::{BTreeMap, BTreeSet};

use crate::model::{ScanRecord, Substituent};

/// Sparse pivot of one value column, keyed (substituent on A, substituent on B).
///
/// Unmeasured combinations are absent keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrientedTable {
    cells: BTreeMap<Substituent, BTreeMap<Substituent, f64>>,
}

impl OrientedTable {
    pub fn get(&self, ring_a: &Substituent, ring_b: &Substituent) -> Option<f64> {
        self.cells.get(ring_a)?.get(ring_b).copied()
    }

    pub fn len(&self) -> usize {
        self.cells.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Pivot records on (ring A, ring B) using `column` as the value.
///
/// Records are expected in row-index order; when two records describe the
/// same pair the first measured value wins.
pub fn pivot(records: &[ScanRecord], column: &str) -> OrientedTable {
    let mut table = OrientedTable::default();

    for record in records {
        let Some(value) = record.value(column) else {
            continue;
        };
        let row = table.cells.entry(record.ring_a.clone()).or_default();
        if row.contains_key(&record.ring_b) {
            log::debug!(
                "'{column}': duplicate pair ({}, {}) in record '{}' ignored",
                record.ring_a,
                record.ring_b,
                record.index
            );
            continue;
        }
        row.insert(record.ring_b.clone(), value);
    }

    table
}

/// Every substituent seen on either ring, ascending (baseline first).
pub fn observed_substituents(records: &[ScanRecord]) -> Vec<Substituent> {
    records
        .iter()
        .flat_map(|r| [&r.ring_a, &r.ring_b])
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
