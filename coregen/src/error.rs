use thiserror::Error;

use keccakf::RowValue;

use crate::filter::Side;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreGenError {
    /// Generating more than a handful of rows is impractical, at one side at least.
    #[error("at least one of the row bounds must be at most {limit}, got {at_a} at A and {at_b} at B")]
    RowBoundsOutOfRange { at_a: usize, at_b: usize, limit: usize },

    #[error("at least one of the weight bounds must be at most {limit}, got {at_a} at A and {at_b} at B")]
    WeightBoundsOutOfRange { at_a: u32, at_b: u32, limit: u32 },

    #[error("cannot generate from side {side} with a bound of {bound}, the limit is {limit}")]
    StartingBoundOutOfRange { side: Side, bound: u32, limit: u32 },

    /// A weight-bounded enumeration needs every active row to cost something.
    #[error("row {row:#04x} is active but has zero cost")]
    ZeroRowCost { row: RowValue },

    #[error("the linear layer returned a state of {found} slices, expected {expected}")]
    StateLength { expected: usize, found: usize },

    #[error("the linear layer is not invertible as expected: the pair built from side {side} does not map back")]
    PairingMismatch { side: Side },
}
