//! Indexed table lookups.

use super::Propagator;
use crate::{Contradiction, Store, VarId};

/// `result = table[index]`.
///
/// Index values that fall outside the table, or whose entry lies outside the
/// bounds of `result`, are removed; `result` is bounded by the entries that
/// remain reachable.
#[derive(Debug, Clone)]
pub struct Element {
    index: VarId,
    table: Vec<i64>,
    result: VarId,
}

impl Element {
    /// Link `result` to `table[index]`.
    #[must_use]
    pub const fn new(index: VarId, table: Vec<i64>, result: VarId) -> Self {
        Self {
            index,
            table,
            result,
        }
    }

    fn entry(&self, index: i64) -> Option<i64> {
        usize::try_from(index)
            .ok()
            .and_then(|slot| self.table.get(slot))
            .copied()
    }
}

impl Propagator for Element {
    fn variables(&self) -> Vec<VarId> {
        vec![self.index, self.result]
    }

    fn propagate(&self, store: &mut Store) -> Result<(), Contradiction> {
        let (low, high) = (store.min(self.result), store.max(self.result));
        let mut support = Bounds::default();
        let mut unsupported = Vec::new();
        for candidate in store.domain(self.index) {
            match self.entry(candidate) {
                Some(value) if low <= value && value <= high => support.include(value),
                _ => unsupported.push(candidate),
            }
        }
        for candidate in unsupported {
            store.remove(self.index, candidate)?;
        }
        support.restrict(store, self.result)
    }
}

/// `result = table[row][col]`.
///
/// When `row` and `col` are the same variable only diagonal entries are
/// considered.
#[derive(Debug, Clone)]
pub struct Element2d {
    row: VarId,
    col: VarId,
    table: Vec<Vec<i64>>,
    result: VarId,
}

impl Element2d {
    /// Link `result` to `table[row][col]`.
    #[must_use]
    pub const fn new(row: VarId, col: VarId, table: Vec<Vec<i64>>, result: VarId) -> Self {
        Self {
            row,
            col,
            table,
            result,
        }
    }

    fn entry(&self, row: i64, col: i64) -> Option<i64> {
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        self.table.get(row)?.get(col).copied()
    }
}

impl Propagator for Element2d {
    fn variables(&self) -> Vec<VarId> {
        vec![self.row, self.col, self.result]
    }

    fn propagate(&self, store: &mut Store) -> Result<(), Contradiction> {
        let (low, high) = (store.min(self.result), store.max(self.result));
        let rows: Vec<i64> = store.domain(self.row).iter().collect();
        let cols: Vec<i64> = store.domain(self.col).iter().collect();
        let diagonal = self.row == self.col;

        let mut support = Bounds::default();
        let mut row_supported = vec![false; rows.len()];
        let mut col_supported = vec![false; cols.len()];
        for (row_slot, &row) in rows.iter().enumerate() {
            for (col_slot, &col) in cols.iter().enumerate() {
                if diagonal && row != col {
                    continue;
                }
                let Some(value) = self.entry(row, col) else {
                    continue;
                };
                if low <= value && value <= high {
                    support.include(value);
                    if let Some(flag) = row_supported.get_mut(row_slot) {
                        *flag = true;
                    }
                    if let Some(flag) = col_supported.get_mut(col_slot) {
                        *flag = true;
                    }
                }
            }
        }

        for (row, supported) in rows.into_iter().zip(row_supported) {
            if !supported {
                store.remove(self.row, row)?;
            }
        }
        if !diagonal {
            for (col, supported) in cols.into_iter().zip(col_supported) {
                if !supported {
                    store.remove(self.col, col)?;
                }
            }
        }
        support.restrict(store, self.result)
    }
}

/// Running minimum and maximum of supported values.
#[derive(Debug, Clone, Copy)]
struct Bounds {
    low: i64,
    high: i64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            low: i64::MAX,
            high: i64::MIN,
        }
    }
}

impl Bounds {
    fn include(&mut self, value: i64) {
        self.low = self.low.min(value);
        self.high = self.high.max(value);
    }

    fn restrict(self, store: &mut Store, var: VarId) -> Result<(), Contradiction> {
        if self.low > self.high {
            return Err(Contradiction);
        }
        store.set_min(var, self.low)?;
        store.set_max(var, self.high)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Model;
    use rstest::rstest;

    #[rstest]
    fn element_bounds_result_and_prunes_index() {
        let mut model = Model::new();
        let index = model.enum_var("i", 0, 4).expect("domain");
        let result = model.int_var("r", 0, 25).expect("domain");
        let mut store = model.root().clone();
        Element::new(index, vec![10, 30, 20, 5], result)
            .propagate(&mut store)
            .expect("consistent");
        assert_eq!((store.min(result), store.max(result)), (5, 20));
        let left: Vec<_> = store.domain(index).iter().collect();
        assert_eq!(left, vec![0, 2, 3]);
    }

    #[rstest]
    fn element_fixes_result_for_fixed_index() {
        let mut model = Model::new();
        let index = model.enum_var("i", 2, 2).expect("domain");
        let result = model.int_var("r", 0, 100).expect("domain");
        let mut store = model.root().clone();
        Element::new(index, vec![1, 2, 3], result)
            .propagate(&mut store)
            .expect("consistent");
        assert_eq!(store.value(result), Some(3));
    }

    #[rstest]
    fn element_2d_prunes_unsupported_rows() {
        let mut model = Model::new();
        let row = model.enum_var("row", 0, 2).expect("domain");
        let col = model.enum_var("col", 1, 1).expect("domain");
        let result = model.int_var("r", 0, 4).expect("domain");
        let table = vec![vec![0, 2, 9], vec![3, 0, 4], vec![7, 5, 0]];
        let mut store = model.root().clone();
        Element2d::new(row, col, table, result)
            .propagate(&mut store)
            .expect("consistent");
        let rows: Vec<_> = store.domain(row).iter().collect();
        assert_eq!(rows, vec![0, 1]);
        assert_eq!((store.min(result), store.max(result)), (0, 2));
    }

    #[rstest]
    fn element_2d_on_one_variable_reads_the_diagonal() {
        let mut model = Model::new();
        let node = model.enum_var("x", 0, 1).expect("domain");
        let result = model.int_var("r", 0, 100).expect("domain");
        let table = vec![vec![7, 1], vec![1, 9]];
        let mut store = model.root().clone();
        Element2d::new(node, node, table, result)
            .propagate(&mut store)
            .expect("consistent");
        assert_eq!((store.min(result), store.max(result)), (7, 9));
    }

    #[rstest]
    fn element_2d_without_support_contradicts() {
        let mut model = Model::new();
        let row = model.enum_var("row", 0, 1).expect("domain");
        let col = model.enum_var("col", 0, 1).expect("domain");
        let result = model.int_var("r", 50, 60).expect("domain");
        let mut store = model.root().clone();
        let outcome = Element2d::new(row, col, vec![vec![1, 2], vec![3, 4]], result)
            .propagate(&mut store);
        assert_eq!(outcome, Err(Contradiction));
    }
}
