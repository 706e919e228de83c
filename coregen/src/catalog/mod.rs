//! # Row-pattern catalog
//!
//! ## Description
//! Enumerates the nonzero patterns of active rows of a state, exhaustively up to translation
//! along z. The linear layer and the weights are invariant under such translations, so one
//! pattern per translation class is enough for the trail-core search. Callers who need the full
//! set re-expand the results with [`keccakf::state::translate_state`].
//!
//! ## Canonical representative
//! A row position is `5*z + y`. A pattern with `k` active rows is a sorted list of `k` positions,
//! with a nonzero row value per position. The translates of a pattern are ordered by
//! (positions, then values), both compared lexicographically, and the smallest one is the
//! canonical representative. As a consequence the first active row of a canonical pattern always
//! lies in slice 0.
//!
//! The catalog walks the position sets starting in slice 0 and keeps those that are the smallest
//! of their translates. Only position sets that are mapped onto themselves by some translation
//! (which requires the rows to be spread periodically along z) need their values checked too.
//!
//! ## Budgets
//! * [`Budget::Rows`]: up to a given number of rows, each taking any nonzero value.
//! * [`Budget::Weight`]: rows get a cost (typically their weight or minimum reverse weight) and
//!     the total cost is bounded. Values are tried by increasing cost, which lets the enumeration
//!     skip every assignment beyond the bound at once.

use std::cmp::Ordering;
use std::iter;
use std::sync::Arc;

use itertools::{Either, Itertools};

use keccakf::state::{translate_position, ROWS_PER_SLICE, ROW_VALUES};
use keccakf::RowValue;

use crate::error::CoreGenError;
use crate::pattern::RowPattern;

/// What the catalog is allowed to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Budget {
    /// From 1 up to this many active rows.
    Rows(usize),
    /// Active rows whose costs sum up to at most `max`. `costs` is indexed by row value.
    Weight { max: u32, costs: [u32; ROW_VALUES] },
}

/// The values a single active row can take, and what they cost.
#[derive(Debug)]
struct ValueDomain {
    /// Nonzero row values, sorted by increasing cost.
    candidates: Vec<RowValue>,
    costs: [u32; ROW_VALUES],
    max_cost: Option<u32>,
}

impl ValueDomain {
    #[inline]
    fn cost(&self, indices: &[usize]) -> u32 {
        indices
            .iter()
            .map(|&i| self.costs[self.candidates[i] as usize])
            .sum()
    }

    #[inline]
    fn fits(&self, indices: &[usize]) -> bool {
        match self.max_cost {
            None => true,
            Some(max) => self.cost(indices) <= max,
        }
    }

    /// Number of assignments of `nr_rows` rows within budget, translations not taken into account.
    fn nr_assignments(&self, nr_rows: usize) -> u64 {
        let max = match self.max_cost {
            None => return (self.candidates.len() as u64).pow(nr_rows as u32),
            Some(max) => max,
        };
        let max_row_cost = self
            .candidates
            .iter()
            .map(|&row| self.costs[row as usize])
            .max()
            .unwrap_or(0);
        let max = max.min(max_row_cost.saturating_mul(nr_rows as u32)) as usize;

        // ways[c]: number of assignments of the rows so far with total cost c
        let mut ways = vec![0u64; max + 1];
        ways[0] = 1;
        for _ in 0..nr_rows {
            let mut next = vec![0u64; max + 1];
            for (cost, &count) in ways.iter().enumerate() {
                if count == 0 {
                    continue;
                }
                for &row in self.candidates.iter() {
                    let total = cost + self.costs[row as usize] as usize;
                    if total <= max {
                        next[total] += count;
                    }
                }
            }
            ways = next;
        }
        ways.iter().sum()
    }
}

/// Generates canonical row patterns for states of `lane_size` slices.
#[derive(Debug, Clone)]
pub struct RowPatternCatalog {
    lane_size: usize,
    max_rows: usize,
    domain: Arc<ValueDomain>,
}

impl RowPatternCatalog {
    pub fn new(lane_size: usize, budget: Budget) -> Result<Self, CoreGenError> {
        assert!(lane_size > 0, "A state has at least one slice");
        let nr_positions = ROWS_PER_SLICE * lane_size;
        let mut candidates: Vec<RowValue> = (1..ROW_VALUES as RowValue).collect();

        let (max_rows, costs, max_cost) = match budget {
            Budget::Rows(max_rows) => (max_rows, [0; ROW_VALUES], None),
            Budget::Weight { max, costs } => {
                if let Some(&row) = candidates.iter().find(|&&row| costs[row as usize] == 0) {
                    return Err(CoreGenError::ZeroRowCost { row });
                }
                candidates.sort_by_key(|&row| (costs[row as usize], row));
                let min_cost = costs[candidates[0] as usize];
                ((max / min_cost) as usize, costs, Some(max))
            }
        };

        Ok(Self {
            lane_size,
            max_rows: max_rows.min(nr_positions),
            domain: Arc::new(ValueDomain {
                candidates,
                costs,
                max_cost,
            }),
        })
    }

    #[inline]
    pub fn lane_size(&self) -> usize {
        self.lane_size
    }

    /// The largest number of active rows a generated pattern can have.
    #[inline]
    pub fn max_rows(&self) -> usize {
        self.max_rows
    }

    /// All position sets of canonical patterns, by increasing number of rows.
    pub fn position_sets(&self) -> Box<dyn Iterator<Item = PositionSet>> {
        let lane_size = self.lane_size;
        let nr_positions = ROWS_PER_SLICE * lane_size;

        Box::new(
            (1..=self.max_rows)
                .flat_map(move |nr_rows| {
                    (0..ROWS_PER_SLICE).flat_map(move |first| {
                        let others = if nr_rows == 1 {
                            Either::Left(iter::once(Vec::new()))
                        } else {
                            Either::Right(((first + 1)..nr_positions).combinations(nr_rows - 1))
                        };
                        others.map(move |others| {
                            let mut positions = Vec::with_capacity(nr_rows);
                            positions.push(first);
                            positions.extend(others);
                            positions
                        })
                    })
                })
                .filter_map(move |positions| PositionSet::canonical(positions, lane_size)),
        )
    }

    /// The canonical patterns whose active rows are at `set`.
    pub fn patterns_in(&self, set: PositionSet) -> PatternsInSet {
        PatternsInSet::new(self.domain.clone(), set)
    }

    pub fn iter(&self) -> RowPatterns {
        RowPatterns {
            domain: self.domain.clone(),
            sets: self.position_sets(),
            current: None,
        }
    }

    /// The number of patterns [`Self::iter`] yields, without building them.
    pub fn count_patterns(&self) -> u64 {
        self.position_sets()
            .map(|set| {
                if set.is_symmetric() {
                    self.patterns_in(set).count() as u64
                } else {
                    self.domain.nr_assignments(set.nr_rows())
                }
            })
            .sum()
    }
}

impl<'a> IntoIterator for &'a RowPatternCatalog {
    type Item = RowPattern;
    type IntoIter = RowPatterns;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Sorted row positions which are the smallest among their translates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionSet {
    positions: Vec<usize>,
    /// One entry per nontrivial translation mapping the set onto itself: entry `i` is the index
    /// of the row landing on `positions[i]`.
    symmetries: Vec<Vec<usize>>,
}

impl PositionSet {
    /// Returns None if some translate of `positions` is smaller.
    fn canonical(positions: Vec<usize>, lane_size: usize) -> Option<Self> {
        let mut symmetries = Vec::new();
        for dz in 1..lane_size {
            let mut translated: Vec<usize> = positions
                .iter()
                .map(|&p| translate_position(p, dz, lane_size))
                .collect();
            translated.sort_unstable();

            match translated.cmp(&positions) {
                Ordering::Less => return None,
                Ordering::Greater => {}
                Ordering::Equal => {
                    let back = lane_size - dz;
                    let sources = positions
                        .iter()
                        .map(|&p| positions.binary_search(&translate_position(p, back, lane_size)))
                        .collect::<Result<Vec<usize>, usize>>()
                        .ok()?;
                    symmetries.push(sources);
                }
            }
        }
        Some(Self {
            positions,
            symmetries,
        })
    }

    #[inline]
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    #[inline]
    pub fn nr_rows(&self) -> usize {
        self.positions.len()
    }

    /// True if a nontrivial translation maps the set onto itself.
    #[inline]
    pub fn is_symmetric(&self) -> bool {
        !self.symmetries.is_empty()
    }

    /// True if `values` at these positions form a canonical pattern.
    fn accepts(&self, values: &[RowValue]) -> bool {
        self.symmetries.iter().all(|sources| {
            values.iter().cmp(sources.iter().map(|&j| &values[j])) != Ordering::Greater
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    Fresh,
    Running,
    Done,
}

/// Iterator over the canonical patterns sharing one position set.
#[derive(Debug)]
pub struct PatternsInSet {
    domain: Arc<ValueDomain>,
    set: PositionSet,
    /// Index into the candidate values, per row. Works like an odometer.
    indices: Vec<usize>,
    cursor: Cursor,
}

impl PatternsInSet {
    fn new(domain: Arc<ValueDomain>, set: PositionSet) -> Self {
        let indices = vec![0; set.nr_rows()];
        Self {
            domain,
            set,
            indices,
            cursor: Cursor::Fresh,
        }
    }

    #[inline]
    pub fn position_set(&self) -> &PositionSet {
        &self.set
    }

    /// Move to the next assignment within budget. Returns false when exhausted.
    fn advance(&mut self) -> bool {
        match self.cursor {
            Cursor::Done => return false,
            Cursor::Fresh => {
                self.cursor = if self.domain.fits(&self.indices) {
                    Cursor::Running
                } else {
                    Cursor::Done
                };
                return self.cursor == Cursor::Running;
            }
            Cursor::Running => {}
        }

        // Candidates are sorted by cost, so once a row overshoots the budget (with all rows after
        // it at their cheapest), every larger value for it does as well: carry to the previous row.
        let nr_candidates = self.domain.candidates.len();
        let mut i = self.indices.len();
        while i > 0 {
            i -= 1;
            self.indices[i] += 1;
            for index in self.indices[i + 1..].iter_mut() {
                *index = 0;
            }
            if self.indices[i] < nr_candidates && self.domain.fits(&self.indices) {
                return true;
            }
        }
        self.cursor = Cursor::Done;
        false
    }

    fn values(&self) -> Vec<RowValue> {
        self.indices
            .iter()
            .map(|&i| self.domain.candidates[i])
            .collect()
    }
}

impl Iterator for PatternsInSet {
    type Item = RowPattern;

    fn next(&mut self) -> Option<Self::Item> {
        while self.advance() {
            let values = self.values();
            if self.set.accepts(&values) {
                return Some(RowPattern::from_positions(&self.set.positions, &values));
            }
        }
        None
    }
}

/// Lazy iterator over all canonical patterns of a catalog.
pub struct RowPatterns {
    domain: Arc<ValueDomain>,
    sets: Box<dyn Iterator<Item = PositionSet>>,
    current: Option<PatternsInSet>,
}

impl Iterator for RowPatterns {
    type Item = RowPattern;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(pattern) = self.current.as_mut().and_then(|current| current.next()) {
                return Some(pattern);
            }
            let set = self.sets.next()?;
            self.current = Some(PatternsInSet::new(self.domain.clone(), set));
        }
    }
}

#[cfg(test)]
mod test;
