//! # Propagation of differences and linear masks through a Keccak-f round
//!
//! ## Description
//! The generators in this workspace only see a round through two collaborators:
//! * a [`LinearLayer`], mapping the state at A (before λ) to the state at B (after λ) and back,
//! * a [`WeightOracle`], giving the weight of the state at B (input of χ) and the minimum reverse
//!     weight of the state at A (output of the previous χ).
//!
//! [`KeccakFPropagation`] implements both for Keccak-f, in either of the two propagation models.
//!
//! ## Differential and linear model
//! For differential cryptanalysis (DC), differences cross the round forwards and the linear layer
//! is λ. The weight of a row difference `d` at the input of χ is `log2` of the number of output
//! differences it can propagate to (they are all equally likely).
//!
//! For linear cryptanalysis (LC), masks are followed through the round backwards: the mask after
//! λ is mapped to the mask before λ by λᵀ, so the linear layer seen by the generators is λᵀ. The
//! weight of a row mask `u` at the output of χ is `-log2(c²)`, `c` being the (uniform in absolute
//! value) correlation with any of the input masks `u` is correlated with.
//!
//! In both models, the minimum reverse weight of a row value `a` at A is the smallest weight of a
//! row value at B of the previous round that can propagate to `a`. It is a lower bound on what `a`
//! contributes once the previous round is known.

use std::fmt;

use crate::error::KeccakFError;
use crate::permutation::KeccakF;
use crate::state::*;

/// Selects differential or linear cryptanalysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DCorLC {
    Differential,
    Linear,
}

impl fmt::Display for DCorLC {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DCorLC::Differential => write!(f, "differential"),
            DCorLC::Linear => write!(f, "linear"),
        }
    }
}

/// Maps states across the linear layer of one round.
///
/// Implementations must be total, mutually inverse and commute with translations along z.
pub trait LinearLayer {
    /// Number of slices of the states this layer works on.
    fn lane_size(&self) -> usize;
    /// From the state at A to the state at B.
    fn direct(&self, state_at_a: &[SliceValue]) -> Vec<SliceValue>;
    /// From the state at B to the state at A.
    fn reverse(&self, state_at_b: &[SliceValue]) -> Vec<SliceValue>;
}

/// Weights of states on either side of the nonlinear layer.
///
/// Weights are row-additive, so implementations only have to provide the row-level values.
pub trait WeightOracle {
    fn row_weight(&self, row: RowValue) -> u32;
    fn row_min_reverse_weight(&self, row: RowValue) -> u32;

    /// Weight of a state at B.
    fn weight(&self, state: &[SliceValue]) -> u32 {
        sum_over_rows(state, |row| self.row_weight(row))
    }

    /// Minimum reverse weight of a state at A.
    fn min_reverse_weight(&self, state: &[SliceValue]) -> u32 {
        sum_over_rows(state, |row| self.row_min_reverse_weight(row))
    }
}

fn sum_over_rows<F>(state: &[SliceValue], row_cost: F) -> u32
where
    F: Fn(RowValue) -> u32,
{
    let mut total = 0;
    for &slice in state.iter().filter(|&&slice| slice != 0) {
        for y in 0..ROWS_PER_SLICE {
            let row = get_row(slice, y);
            if row != 0 {
                total += row_cost(row);
            }
        }
    }
    total
}

/// χ applied to a single row: b[x] = a[x] ^ (!a[x+1] & a[x+2]).
#[inline]
pub fn chi_row(a: RowValue) -> RowValue {
    let a = a & 0x1f;
    let not_a = !a & 0x1f;
    a ^ (rotate_row(not_a, 4) & rotate_row(a, 3))
}

/// Row-level propagation table of χ, in one of the two models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowTable {
    model: DCorLC,
    weights: [u32; ROW_VALUES],
    min_reverse_weights: [u32; ROW_VALUES],
    /// For each row value at B, the row values it is compatible with at the other side of χ.
    compatible: Vec<Vec<RowValue>>,
}

impl RowTable {
    pub fn new(model: DCorLC) -> Result<Self, KeccakFError> {
        match model {
            DCorLC::Differential => Self::differential(),
            DCorLC::Linear => Self::linear(),
        }
    }

    /// Build the DC table from the difference distribution of χ.
    fn differential() -> Result<Self, KeccakFError> {
        let mut weights = [0; ROW_VALUES];
        let mut compatible = Vec::with_capacity(ROW_VALUES);

        for d in 0..ROW_VALUES as RowValue {
            let mut outputs = [false; ROW_VALUES];
            for x in 0..ROW_VALUES as RowValue {
                outputs[(chi_row(x) ^ chi_row(x ^ d)) as usize] = true;
            }
            let outputs: Vec<RowValue> = (0..ROW_VALUES as RowValue)
                .filter(|&b| outputs[b as usize])
                .collect();
            weights[d as usize] = log2_exact(outputs.len() as u32).ok_or(
                KeccakFError::IrregularRowTable {
                    model: DCorLC::Differential,
                    row: d,
                },
            )?;
            compatible.push(outputs);
        }

        Ok(Self::with_reverse_weights(DCorLC::Differential, weights, compatible))
    }

    /// Build the LC table from the correlation matrix of χ, output masks being the "B" side.
    fn linear() -> Result<Self, KeccakFError> {
        let mut weights = [0; ROW_VALUES];
        let mut compatible = Vec::with_capacity(ROW_VALUES);

        for u in 0..ROW_VALUES as RowValue {
            let mut magnitude = None;
            let mut inputs = Vec::new();
            for v in 0..ROW_VALUES as RowValue {
                // 32 times the correlation between v.x and u.χ(x)
                let sum: i32 = (0..ROW_VALUES as RowValue)
                    .map(|x| {
                        if ((v & x).count_ones() + (u & chi_row(x)).count_ones()) % 2 == 0 {
                            1
                        } else {
                            -1
                        }
                    })
                    .sum();
                if sum == 0 {
                    continue;
                }
                let irregular = KeccakFError::IrregularRowTable {
                    model: DCorLC::Linear,
                    row: u,
                };
                match magnitude {
                    None => magnitude = Some(sum.abs() as u32),
                    Some(m) if m == sum.abs() as u32 => {}
                    Some(_) => return Err(irregular),
                }
                inputs.push(v);
            }
            let log_magnitude = magnitude
                .and_then(log2_exact)
                .filter(|&l| l <= 5)
                .ok_or(KeccakFError::IrregularRowTable {
                    model: DCorLC::Linear,
                    row: u,
                })?;
            // c = 2^(log_magnitude - 5), weight = -log2(c^2)
            weights[u as usize] = 2 * (5 - log_magnitude);
            compatible.push(inputs);
        }

        Ok(Self::with_reverse_weights(DCorLC::Linear, weights, compatible))
    }

    fn with_reverse_weights(
        model: DCorLC,
        weights: [u32; ROW_VALUES],
        compatible: Vec<Vec<RowValue>>,
    ) -> Self {
        let mut min_reverse_weights = [u32::MAX; ROW_VALUES];
        for (b, others) in compatible.iter().enumerate() {
            for &a in others {
                let entry = &mut min_reverse_weights[a as usize];
                *entry = (*entry).min(weights[b]);
            }
        }
        Self {
            model,
            weights,
            min_reverse_weights,
            compatible,
        }
    }

    #[inline]
    pub fn model(&self) -> DCorLC {
        self.model
    }

    #[inline]
    pub fn weight(&self, row: RowValue) -> u32 {
        self.weights[(row & 0x1f) as usize]
    }

    #[inline]
    pub fn min_reverse_weight(&self, row: RowValue) -> u32 {
        self.min_reverse_weights[(row & 0x1f) as usize]
    }

    /// The row values `row` (at B) is compatible with at the other side of χ.
    pub fn compatible(&self, row: RowValue) -> &[RowValue] {
        &self.compatible[(row & 0x1f) as usize]
    }
}

fn log2_exact(n: u32) -> Option<u32> {
    if n.is_power_of_two() {
        Some(n.trailing_zeros())
    } else {
        None
    }
}

/// Propagation of differences or masks through a Keccak-f round.
#[derive(Debug, Clone)]
pub struct KeccakFPropagation {
    keccakf: KeccakF,
    table: RowTable,
}

impl KeccakFPropagation {
    pub fn new(keccakf: KeccakF, model: DCorLC) -> Result<Self, KeccakFError> {
        Ok(Self {
            keccakf,
            table: RowTable::new(model)?,
        })
    }

    #[inline]
    pub fn model(&self) -> DCorLC {
        self.table.model()
    }

    #[inline]
    pub fn keccakf(&self) -> &KeccakF {
        &self.keccakf
    }

    #[inline]
    pub fn table(&self) -> &RowTable {
        &self.table
    }
}

impl LinearLayer for KeccakFPropagation {
    fn lane_size(&self) -> usize {
        self.keccakf.lane_size()
    }

    fn direct(&self, state_at_a: &[SliceValue]) -> Vec<SliceValue> {
        match self.model() {
            DCorLC::Differential => self.keccakf.lambda(state_at_a),
            DCorLC::Linear => self.keccakf.transposed_lambda(state_at_a),
        }
    }

    fn reverse(&self, state_at_b: &[SliceValue]) -> Vec<SliceValue> {
        match self.model() {
            DCorLC::Differential => self.keccakf.inverse_lambda(state_at_b),
            DCorLC::Linear => self.keccakf.inverse_transposed_lambda(state_at_b),
        }
    }
}

impl WeightOracle for KeccakFPropagation {
    fn row_weight(&self, row: RowValue) -> u32 {
        self.table.weight(row)
    }

    fn row_min_reverse_weight(&self, row: RowValue) -> u32 {
        self.table.min_reverse_weight(row)
    }
}
