use crate::aggregate::{observed_substituents, pivot};
use crate::config::QuantitySpec;
use crate::error::ReconError;
use crate::matrix::{ReconciledMatrix, RowOrder};
use crate::model::{Ring, ScanRecord, Substituent};

/// Reconcile one quantity into its canonical ring-A-oriented matrix.
///
/// Rows are the substituent on ring A (proximal), columns the substituent on
/// ring B (distal), ascending. Equivalent to
/// `reconcile_oriented(records, quantity, Ring::A)`.
pub fn reconcile(
    records: &[ScanRecord],
    quantity: &QuantitySpec,
) -> Result<ReconciledMatrix, ReconError> {
    reconcile_oriented(records, quantity, Ring::A)
}

/// Reconcile one quantity, returning the view oriented from `orientation`.
///
/// Both oriented tables are pivoted from the records. Cell (i, j) of the A
/// view is the A-oriented value for (i, j), else the B-oriented value for
/// the mirrored pair (j, i): ring A and ring B are the two halves of the same
/// symmetric molecule, so (i, j) seen from bridge A is (j, i) seen from
/// bridge B. The B view resolves the other way round against the completed
/// A view and lists its rows in descending order.
///
/// A pair measured in neither orientation is an error, as is a missing
/// unsubstituted reference compound.
pub fn reconcile_oriented(
    records: &[ScanRecord],
    quantity: &QuantitySpec,
    orientation: Ring,
) -> Result<ReconciledMatrix, ReconError> {
    if !records.iter().any(ScanRecord::is_baseline) {
        return Err(ReconError::MissingBaseline { quantity: quantity.name.clone() });
    }

    let table_a = pivot(records, &quantity.column_a);
    let table_b = pivot(records, &quantity.column_b);
    let keys = observed_substituents(records);

    let resolved_a = mirror_fill(&quantity.name, &keys, |row, column| {
        table_a.get(row, column).or_else(|| table_b.get(column, row))
    })?;
    log::debug!(
        "{}: {} of {} cells measured from ring A, rest mirrored from ring B",
        quantity.name,
        table_a.len(),
        keys.len() * keys.len()
    );

    match orientation {
        Ring::A => ReconciledMatrix::from_dense(
            quantity.name.clone(),
            keys,
            resolved_a,
            RowOrder::Ascending,
        ),
        Ring::B => {
            let completed_a = ReconciledMatrix::from_dense(
                quantity.name.clone(),
                keys.clone(),
                resolved_a,
                RowOrder::Ascending,
            )?;
            let resolved_b = mirror_fill(&quantity.name, &keys, |row, column| {
                table_b.get(row, column).or_else(|| completed_a.get(column, row))
            })?;
            ReconciledMatrix::from_dense(
                quantity.name.clone(),
                keys,
                resolved_b,
                RowOrder::Descending,
            )
        }
    }
}

/// Resolve every (row, column) pair over `keys` with `lookup`, row-major in
/// key order.
fn mirror_fill(
    quantity: &str,
    keys: &[Substituent],
    lookup: impl Fn(&Substituent, &Substituent) -> Option<f64>,
) -> Result<Vec<f64>, ReconError> {
    let mut values = Vec::with_capacity(keys.len() * keys.len());
    for row in keys {
        for column in keys {
            match lookup(row, column) {
                Some(v) => values.push(v),
                None if row.is_baseline() && column.is_baseline() => {
                    return Err(ReconError::MissingBaseline { quantity: quantity.into() });
                }
                None => {
                    return Err(ReconError::UnresolvedCell {
                        quantity: quantity.into(),
                        row: row.clone(),
                        column: column.clone(),
                    });
                }
            }
        }
    }
    Ok(values)
}

/// Cells of the full matrix that `column` does not measure directly and
/// reconciliation has to take from the mirrored orientation.
pub fn mirrored_cell_count(records: &[ScanRecord], column: &str) -> usize {
    let table = pivot(records, column);
    let n = observed_substituents(records).len();
    n * n - table.len()
}
