//! # Keccak-f round propagation
//!
//! The building blocks needed to search for differential and linear trail cores of Keccak-f:
//!
//! * [`state`]: the slice-wise state representation and row helpers,
//! * [`permutation`]: the linear layer λ of Keccak-f\[25..1600\], its inverse and its transpose,
//! * [`propagation`]: weights of states through χ, and the [`LinearLayer`]/[`WeightOracle`]
//!     traits trail-core generators are written against,
//! * [`trail`]: the [`TrailCore`] produced by such generators,
//! * [`progress`]: progress reporting hooks.

pub mod algebra;
pub mod permutation;
pub mod progress;
pub mod propagation;
pub mod state;
pub mod trail;

mod error;

pub use error::KeccakFError;
pub use permutation::KeccakF;
pub use propagation::{DCorLC, KeccakFPropagation, LinearLayer, RowTable, WeightOracle};
pub use state::{RowValue, SliceValue};
pub use trail::TrailCore;
