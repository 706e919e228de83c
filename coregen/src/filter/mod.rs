//! Pairing a generated half-state with its other half across λ, and keeping the pair only if it
//! stays within the bounds of the search.

use std::fmt;

use tracing::warn;

use keccakf::progress::StyledProgressBar;
use keccakf::state::{is_zero, nr_active_rows};
use keccakf::{LinearLayer, SliceValue, TrailCore, WeightOracle};

use crate::error::CoreGenError;
use crate::fetcher::{Flow, TrailFetcher};

/// The two sides of a trail core: A before λ, B after λ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    A,
    B,
}

impl Side {
    #[inline]
    pub fn other(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Side::A => write!(f, "A"),
            Side::B => write!(f, "B"),
        }
    }
}

/// The per-side bounds a trail core must satisfy, besides the bound on its total weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundCheck {
    RowCount {
        max_nr_rows_at_a: usize,
        max_nr_rows_at_b: usize,
    },
    /// Side A is bounded by its minimum reverse weight, as its exact weight depends on the
    /// preceding round.
    Weight {
        max_min_rev_weight_at_a: u32,
        max_weight_at_b: u32,
    },
}

/// What happened to a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Rejected,
    /// Handed to the fetcher, which answered with the given flow.
    Accepted(Flow),
}

pub struct CandidateFilter<'a, L, W> {
    layer: &'a L,
    oracle: &'a W,
    bounds: BoundCheck,
    max_weight: u32,
}

impl<'a, L, W> CandidateFilter<'a, L, W>
where
    L: LinearLayer,
    W: WeightOracle,
{
    pub fn new(layer: &'a L, oracle: &'a W, bounds: BoundCheck, max_weight: u32) -> Self {
        Self {
            layer,
            oracle,
            bounds,
            max_weight,
        }
    }

    #[inline]
    pub fn bounds(&self) -> BoundCheck {
        self.bounds
    }

    #[inline]
    pub fn max_weight(&self) -> u32 {
        self.max_weight
    }

    /// Complete `state`, a state at `side`, into a trail core and check it against the bounds.
    ///
    /// Returns Ok(None) if the core is out of bounds, or if the state at the other side is zero
    /// (which only a broken linear layer produces for a nonzero `state`).
    pub fn evaluate(
        &self,
        state: Vec<SliceValue>,
        side: Side,
    ) -> Result<Option<TrailCore>, CoreGenError> {
        let lane_size = self.layer.lane_size();
        check_length(&state, lane_size)?;
        let paired = match side {
            Side::A => self.layer.direct(&state),
            Side::B => self.layer.reverse(&state),
        };
        check_length(&paired, lane_size)?;
        if is_zero(&paired) {
            warn!(
                "Skipping a pattern at side {}: the state at side {} is zero",
                side,
                side.other()
            );
            return Ok(None);
        }

        let (state_a, state_b) = match side {
            Side::A => (state, paired),
            Side::B => (paired, state),
        };

        let min_rev_weight_a;
        let weight_b;
        match self.bounds {
            BoundCheck::RowCount {
                max_nr_rows_at_a,
                max_nr_rows_at_b,
            } => {
                if nr_active_rows(&state_a) > max_nr_rows_at_a
                    || nr_active_rows(&state_b) > max_nr_rows_at_b
                {
                    return Ok(None);
                }
                min_rev_weight_a = self.oracle.min_reverse_weight(&state_a);
                weight_b = self.oracle.weight(&state_b);
            }
            BoundCheck::Weight {
                max_min_rev_weight_at_a,
                max_weight_at_b,
            } => {
                min_rev_weight_a = self.oracle.min_reverse_weight(&state_a);
                if min_rev_weight_a > max_min_rev_weight_at_a {
                    return Ok(None);
                }
                weight_b = self.oracle.weight(&state_b);
                if weight_b > max_weight_at_b {
                    return Ok(None);
                }
            }
        }
        if min_rev_weight_a + weight_b > self.max_weight {
            return Ok(None);
        }

        // The pair must also hold in the direction it was not built in.
        let consistent = match side {
            Side::A => self.layer.reverse(&state_b) == state_a,
            Side::B => self.layer.direct(&state_a) == state_b,
        };
        if !consistent {
            return Err(CoreGenError::PairingMismatch { side });
        }

        Ok(Some(TrailCore::new(
            state_a,
            min_rev_weight_a,
            state_b,
            weight_b,
        )))
    }

    /// Evaluate a candidate, and hand it to `fetcher` if it is accepted. `pb` advances by one
    /// either way.
    pub fn process<T, P>(
        &self,
        state: Vec<SliceValue>,
        side: Side,
        fetcher: &mut T,
        pb: &P,
    ) -> Result<Outcome, CoreGenError>
    where
        T: TrailFetcher,
        P: StyledProgressBar,
    {
        let verdict = self.evaluate(state, side);
        pb.inc(1);
        Ok(match verdict? {
            None => Outcome::Rejected,
            Some(core) => Outcome::Accepted(fetcher.fetch_trail(core)),
        })
    }
}

fn check_length(state: &[SliceValue], lane_size: usize) -> Result<(), CoreGenError> {
    if state.len() == lane_size {
        Ok(())
    } else {
        Err(CoreGenError::StateLength {
            expected: lane_size,
            found: state.len(),
        })
    }
}

#[cfg(test)]
mod test;
