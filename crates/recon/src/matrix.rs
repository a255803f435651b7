use serde::Serialize;

use crate::error::ReconError;
use crate::model::Substituent;

/// Display order of matrix rows. Columns are always ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowOrder {
    Ascending,
    Descending,
}

/// A complete substituent × substituent table for one quantity.
///
/// Rows and columns share one ascending key list; every cell holds a value.
/// The unsubstituted × unsubstituted cell is guaranteed to exist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledMatrix {
    quantity: String,
    keys: Vec<Substituent>,
    order: RowOrder,
    /// Row-major in key order, `keys.len()²` entries.
    values: Vec<f64>,
    baseline: f64,
}

impl ReconciledMatrix {
    /// Build from dense row-major values over `keys`.
    ///
    /// `keys` must be strictly ascending and contain the baseline.
    pub fn from_dense(
        quantity: impl Into<String>,
        keys: Vec<Substituent>,
        values: Vec<f64>,
        order: RowOrder,
    ) -> Result<Self, ReconError> {
        let quantity = quantity.into();
        if values.len() != keys.len() * keys.len() {
            return Err(ReconError::ConfigValidation(format!(
                "{quantity}: {} values for {} substituents",
                values.len(),
                keys.len()
            )));
        }
        if keys.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ReconError::ConfigValidation(format!(
                "{quantity}: substituent keys must be unique and ascending"
            )));
        }
        // Ascending keys put the baseline, when present, at position 0.
        let baseline = match keys.first() {
            Some(Substituent::Unsubstituted) => values[0],
            _ => return Err(ReconError::MissingBaseline { quantity }),
        };

        Ok(Self { quantity, keys, order, values, baseline })
    }

    pub fn quantity(&self) -> &str {
        &self.quantity
    }

    pub fn order(&self) -> RowOrder {
        self.order
    }

    /// Number of substituents (rows = columns).
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Value of the unsubstituted reference compound.
    pub fn baseline(&self) -> f64 {
        self.baseline
    }

    /// Row keys in display order.
    pub fn rows(&self) -> Vec<&Substituent> {
        match self.order {
            RowOrder::Ascending => self.keys.iter().collect(),
            RowOrder::Descending => self.keys.iter().rev().collect(),
        }
    }

    /// Column keys, ascending.
    pub fn columns(&self) -> &[Substituent] {
        &self.keys
    }

    pub fn get(&self, row: &Substituent, column: &Substituent) -> Option<f64> {
        let r = self.position(row)?;
        let c = self.position(column)?;
        Some(self.values[r * self.keys.len() + c])
    }

    /// Values of one row, in column order.
    pub fn row_values(&self, row: &Substituent) -> Option<&[f64]> {
        let n = self.keys.len();
        let r = self.position(row)?;
        Some(&self.values[r * n..(r + 1) * n])
    }

    /// Values of one column, in row display order.
    pub fn column_values(&self, column: &Substituent) -> Option<Vec<f64>> {
        let n = self.keys.len();
        let c = self.position(column)?;
        let mut values: Vec<f64> = (0..n).map(|r| self.values[r * n + c]).collect();
        if self.order == RowOrder::Descending {
            values.reverse();
        }
        Some(values)
    }

    /// Smallest and largest value over all cells.
    pub fn value_range(&self) -> (f64, f64) {
        self.values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }

    /// Swap rows and columns, keeping the display order.
    pub fn transpose(&self) -> Self {
        let n = self.keys.len();
        let values = (0..n)
            .flat_map(|r| (0..n).map(move |c| (c, r)))
            .map(|(r, c)| self.values[r * n + c])
            .collect();
        Self {
            quantity: self.quantity.clone(),
            keys: self.keys.clone(),
            order: self.order,
            values,
            baseline: self.baseline,
        }
    }

    /// Same matrix with rows displayed in `order`.
    pub fn with_order(mut self, order: RowOrder) -> Self {
        self.order = order;
        self
    }

    /// Combine two matrices over the same substituents cell by cell.
    pub fn zip_with(
        &self,
        other: &ReconciledMatrix,
        quantity: impl Into<String>,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<Self, ReconError> {
        if self.keys != other.keys {
            return Err(ReconError::KeyMismatch {
                left: self.quantity.clone(),
                right: other.quantity.clone(),
            });
        }
        let values: Vec<f64> = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(&a, &b)| f(a, b))
            .collect();
        Ok(Self {
            quantity: quantity.into(),
            keys: self.keys.clone(),
            order: self.order,
            baseline: values[0],
            values,
        })
    }

    fn position(&self, key: &Substituent) -> Option<usize> {
        self.keys.binary_search(key).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> Vec<Substituent> {
        vec![Substituent::Unsubstituted, Substituent::group("Cl_2"), Substituent::group("NO2_3")]
    }

    fn matrix(order: RowOrder) -> ReconciledMatrix {
        let values = vec![
            1.0, 2.0, 3.0, //
            4.0, 5.0, 6.0, //
            7.0, 8.0, 9.0,
        ];
        ReconciledMatrix::from_dense("Q", keys(), values, order).unwrap()
    }

    #[test]
    fn lookup_by_key() {
        let m = matrix(RowOrder::Ascending);
        assert_eq!(m.baseline(), 1.0);
        assert_eq!(m.get(&Substituent::group("Cl_2"), &Substituent::group("NO2_3")), Some(6.0));
        assert_eq!(m.get(&Substituent::group("OH_4"), &Substituent::Unsubstituted), None);
        assert_eq!(m.row_values(&Substituent::group("NO2_3")).unwrap(), &[7.0, 8.0, 9.0]);
    }

    #[test]
    fn descending_rows_reverse_display_only() {
        let m = matrix(RowOrder::Descending);
        assert_eq!(m.rows()[0], &Substituent::group("NO2_3"));
        assert_eq!(m.columns()[0], Substituent::Unsubstituted);
        assert_eq!(m.column_values(&Substituent::Unsubstituted).unwrap(), vec![7.0, 4.0, 1.0]);
        assert_eq!(m.get(&Substituent::group("Cl_2"), &Substituent::Unsubstituted), Some(4.0));
    }

    #[test]
    fn transpose_swaps_cells() {
        let m = matrix(RowOrder::Ascending).transpose();
        assert_eq!(m.get(&Substituent::group("NO2_3"), &Substituent::group("Cl_2")), Some(6.0));
        assert_eq!(m.baseline(), 1.0);
    }

    #[test]
    fn zip_requires_same_keys() {
        let a = matrix(RowOrder::Ascending);
        let diff = a.zip_with(&a, "zero", |x, y| x - y).unwrap();
        assert_eq!(diff.value_range(), (0.0, 0.0));
        assert_eq!(diff.quantity(), "zero");

        let other = ReconciledMatrix::from_dense(
            "R",
            vec![Substituent::Unsubstituted],
            vec![1.0],
            RowOrder::Ascending,
        )
        .unwrap();
        assert!(matches!(a.zip_with(&other, "x", |x, _| x), Err(ReconError::KeyMismatch { .. })));
    }

    #[test]
    fn from_dense_requires_baseline() {
        let err = ReconciledMatrix::from_dense(
            "Q",
            vec![Substituent::group("Cl_2")],
            vec![1.0],
            RowOrder::Ascending,
        )
        .unwrap_err();
        assert_eq!(err, ReconError::MissingBaseline { quantity: "Q".into() });
    }
}
