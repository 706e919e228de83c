//! Slice-wise representation of a Keccak-f state.
//!
//! A state is a sequence of `lane_size` slices. A slice holds the 25 bits sharing the same `z`
//! coordinate, with bit `x + 5*y` holding the bit at column `x` of row `y`. A row is the group of
//! 5 bits of a slice sharing the same `y`, and is the unit the nonlinear layer χ acts upon.

/// The 25 bits of a slice.
pub type SliceValue = u32;
/// The 5 bits of a row.
pub type RowValue = u8;

/// Number of rows (and of columns) in a slice.
pub const ROWS_PER_SLICE: usize = 5;
/// Number of distinct row values, the zero row included.
pub const ROW_VALUES: usize = 32;

const ROW_MASK: SliceValue = 0x1f;
/// One bit in every row at `x = 0`. Multiplying a row value with it copies the row into all rows.
const ROW_BROADCAST: SliceValue = 0x0108421;

/// Extract row `y` of `slice`.
#[inline]
pub fn get_row(slice: SliceValue, y: usize) -> RowValue {
    ((slice >> (ROWS_PER_SLICE * y)) & ROW_MASK) as RowValue
}

/// The slice with `row` at row `y` and zero elsewhere.
#[inline]
pub fn get_slice_from_row(row: RowValue, y: usize) -> SliceValue {
    (SliceValue::from(row) & ROW_MASK) << (ROWS_PER_SLICE * y)
}

/// The slice with `row` copied into all five rows.
#[inline]
pub fn broadcast_row(row: RowValue) -> SliceValue {
    (SliceValue::from(row) & ROW_MASK) * ROW_BROADCAST
}

/// XOR of the five rows of a slice, i.e. the parities of its five columns.
#[inline]
pub fn column_parity(slice: SliceValue) -> RowValue {
    get_row(slice ^ (slice >> 5) ^ (slice >> 10) ^ (slice >> 15) ^ (slice >> 20), 0)
}

/// Cyclic shift of a row by `offset` positions along x (bit `x` moves to `x + offset`).
#[inline]
pub fn rotate_row(row: RowValue, offset: usize) -> RowValue {
    let offset = offset % ROWS_PER_SLICE;
    let row = row & (ROW_MASK as RowValue);
    if offset == 0 {
        row
    } else {
        ((row << offset) | (row >> (ROWS_PER_SLICE - offset))) & (ROW_MASK as RowValue)
    }
}

/// Number of nonzero rows in a slice.
#[inline]
pub fn nr_active_rows_in_slice(slice: SliceValue) -> usize {
    (0..ROWS_PER_SLICE).filter(|&y| get_row(slice, y) != 0).count()
}

/// Number of nonzero rows in a state.
pub fn nr_active_rows(state: &[SliceValue]) -> usize {
    state.iter().map(|&slice| nr_active_rows_in_slice(slice)).sum()
}

/// Number of set bits in a state.
pub fn hamming_weight(state: &[SliceValue]) -> u32 {
    state.iter().map(|slice| slice.count_ones()).sum()
}

#[inline]
pub fn is_zero(state: &[SliceValue]) -> bool {
    state.iter().all(|&slice| slice == 0)
}

/// Translate a state by `dz` positions along z: slice `z` moves to `z + dz`.
pub fn translate_state(state: &[SliceValue], dz: usize) -> Vec<SliceValue> {
    let lane_size = state.len();
    let mut out = vec![0; lane_size];
    for (z, &slice) in state.iter().enumerate() {
        out[(z + dz) % lane_size] = slice;
    }
    out
}

/// Row positions are numbered `5*z + y`, which orders them by slice first.
#[inline]
pub fn row_position(y: usize, z: usize) -> usize {
    ROWS_PER_SLICE * z + y
}

/// `(y, z)` of a row position.
#[inline]
pub fn row_coordinates(position: usize) -> (usize, usize) {
    (position % ROWS_PER_SLICE, position / ROWS_PER_SLICE)
}

/// The position a row moves to when the state is translated by `dz` along z.
#[inline]
pub fn translate_position(position: usize, dz: usize, lane_size: usize) -> usize {
    let (y, z) = row_coordinates(position);
    row_position(y, (z + dz) % lane_size)
}

/// Parity of the bitwise AND of two states. Used to pair a linear map with its transpose.
pub fn dot_product(left: &[SliceValue], right: &[SliceValue]) -> bool {
    left.iter()
        .zip(right.iter())
        .map(|(l, r)| (l & r).count_ones())
        .sum::<u32>()
        % 2
        == 1
}
