//! Two-round trail cores.

use std::fmt;

use crate::state::*;

/// A pair of states (A, B) with B = λ(A), each with its weight contribution.
///
/// The contribution of A is its minimum reverse weight, as the exact weight depends on the
/// round preceding A. The contribution of B is its (exact) weight.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrailCore {
    state_a: Vec<SliceValue>,
    min_rev_weight_a: u32,
    state_b: Vec<SliceValue>,
    weight_b: u32,
}

impl TrailCore {
    pub fn new(
        state_a: Vec<SliceValue>,
        min_rev_weight_a: u32,
        state_b: Vec<SliceValue>,
        weight_b: u32,
    ) -> Self {
        debug_assert_eq!(
            state_a.len(),
            state_b.len(),
            "Both states of a trail core must have the same lane size"
        );
        Self {
            state_a,
            min_rev_weight_a,
            state_b,
            weight_b,
        }
    }

    #[inline]
    pub fn state_a(&self) -> &[SliceValue] {
        &self.state_a
    }

    #[inline]
    pub fn state_b(&self) -> &[SliceValue] {
        &self.state_b
    }

    #[inline]
    pub fn min_rev_weight_a(&self) -> u32 {
        self.min_rev_weight_a
    }

    #[inline]
    pub fn weight_b(&self) -> u32 {
        self.weight_b
    }

    /// Weight of the core, i.e. the min. rev. weight at A plus the weight at B.
    #[inline]
    pub fn weight(&self) -> u32 {
        self.min_rev_weight_a + self.weight_b
    }

    #[inline]
    pub fn lane_size(&self) -> usize {
        self.state_a.len()
    }

    /// The same core, translated by `dz` along z. Weights are unaffected.
    pub fn translated(&self, dz: usize) -> TrailCore {
        TrailCore {
            state_a: translate_state(&self.state_a, dz),
            min_rev_weight_a: self.min_rev_weight_a,
            state_b: translate_state(&self.state_b, dz),
            weight_b: self.weight_b,
        }
    }
}

impl fmt::Display for TrailCore {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "Trail core of weight {} (A: {} rows, min. rev. weight {}; B: {} rows, weight {})",
            self.weight(),
            nr_active_rows(&self.state_a),
            self.min_rev_weight_a,
            nr_active_rows(&self.state_b),
            self.weight_b,
        )?;
        writeln!(f, "  A: {}", DisplayState(&self.state_a))?;
        write!(f, "  B: {}", DisplayState(&self.state_b))
    }
}

/// Lists the active rows of a state as `y,z:value` items.
pub struct DisplayState<'a>(pub &'a [SliceValue]);

impl fmt::Display for DisplayState<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for (z, &slice) in self.0.iter().enumerate() {
            for y in 0..ROWS_PER_SLICE {
                let row = get_row(slice, y);
                if row == 0 {
                    continue;
                }
                if !first {
                    write!(f, " ")?;
                }
                write!(f, "{},{}:{:02x}", y, z, row)?;
                first = false;
            }
        }
        if first {
            write!(f, "(zero)")?;
        }
        Ok(())
    }
}
