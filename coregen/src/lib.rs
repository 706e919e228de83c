//! # Trail-core generation from row patterns
//!
//! Generates all two-round trail cores of Keccak-f (or of any round described through a
//! [`keccakf::LinearLayer`] and a [`keccakf::WeightOracle`]) with few active rows or a low weight
//! at one side of the linear layer.
//!
//! * [`catalog`]: canonical row patterns, one per class of translations along z,
//! * [`filter`]: pairing a pattern with its image across λ, and checking the bounds,
//! * [`generator`]: the searches themselves, sequential or on rayon's thread pool,
//! * [`fetcher`]: where the trail cores found end up.
//!
//! ```no_run
//! use coregen::{TrailCoreRows, TrailCounter};
//! use keccakf::{DCorLC, KeccakF, KeccakFPropagation};
//!
//! let propagation = KeccakFPropagation::new(KeccakF::new(1600)?, DCorLC::Differential)?;
//! let mut counter = TrailCounter::new();
//! TrailCoreRows::for_propagation(&propagation)
//!     .generate_trail_cores_based_on_rows(&mut counter, 2, 2, 16)?;
//! println!("{:?}", counter.per_weight());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod catalog;
pub mod fetcher;
pub mod filter;
pub mod generator;
pub mod pattern;

mod error;

pub use catalog::{Budget, RowPatternCatalog};
pub use error::CoreGenError;
pub use fetcher::{Flow, TrailCounter, TrailFetcher};
pub use filter::{BoundCheck, Side};
pub use generator::{
    SearchStats, TrailCoreRows, MAX_STARTING_ROWS, MAX_STARTING_WEIGHT, SETS_PER_CHUNK,
};
pub use pattern::{ActiveRow, RowPattern};
