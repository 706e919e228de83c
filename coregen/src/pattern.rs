//! Row patterns, and the states they stand for.

use keccakf::state::{get_slice_from_row, row_coordinates, row_position};
use keccakf::{RowValue, SliceValue};

/// An active row: a nonzero value at row `y` of slice `z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActiveRow {
    pub y: usize,
    pub z: usize,
    pub value: RowValue,
}

/// A set of active rows, sorted by row position (slice first, then row).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowPattern {
    rows: Vec<ActiveRow>,
}

impl RowPattern {
    /// Pair up sorted distinct row positions with their nonzero values.
    pub(crate) fn from_positions(positions: &[usize], values: &[RowValue]) -> Self {
        debug_assert_eq!(positions.len(), values.len());
        let rows = positions
            .iter()
            .zip(values.iter())
            .map(|(&position, &value)| {
                let (y, z) = row_coordinates(position);
                ActiveRow { y, z, value }
            })
            .collect();
        Self { rows }
    }

    #[inline]
    pub fn rows(&self) -> &[ActiveRow] {
        &self.rows
    }

    #[inline]
    pub fn nr_rows(&self) -> usize {
        self.rows.len()
    }

    /// Row positions (`5*z + y`) of the active rows, in increasing order.
    pub fn positions(&self) -> Vec<usize> {
        self.rows.iter().map(|row| row_position(row.y, row.z)).collect()
    }

    /// The state which is zero everywhere except at the rows of this pattern.
    ///
    /// Panics if a row lies outside a state of `lane_size` slices.
    pub fn to_state(&self, lane_size: usize) -> Vec<SliceValue> {
        let mut state = vec![0; lane_size];
        for row in self.rows.iter() {
            state[row.z] |= get_slice_from_row(row.value, row.y);
        }
        state
    }
}
