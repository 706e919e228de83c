use thiserror::Error;

use crate::propagation::DCorLC;
use crate::state::RowValue;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeccakFError {
    #[error("Keccak-f is not defined for width {0}, expected one of 25, 50, 100, 200, 400, 800 or 1600")]
    UnsupportedWidth(usize),

    /// The map induced on the column parity plane must be invertible for θ to be.
    #[error("the column parity map of {0} is singular")]
    SingularParityMap(&'static str),

    /// χ tables are expected to have affine compatible sets of uniform weight.
    #[error("the {model} propagation table of χ is irregular at row {row:#04x}")]
    IrregularRowTable { model: DCorLC, row: RowValue },
}
