//! # Two-round trail-core generation
//!
//! ## Description
//! A two-round trail core is a pair of states (A, B) with B = λ(A), the weight of which is the
//! minimum reverse weight of A plus the weight of B. [`TrailCoreRows`] finds all cores within given
//! bounds, up to translation along z, by enumerating the states at one side of λ, and completing
//! and filtering each of them.
//!
//! The side the enumeration starts from must have a small bound: the number of patterns grows
//! steeply with the number of active rows (or the weight) allowed. The other side can be bounded
//! loosely, as it is only checked.
//!
//! ## Parallelism
//! The `par_` variants spread the work over rayon's thread pool, one position set per task, in
//! chunks of [`SETS_PER_CHUNK`] sets. The cores found are handed to the fetcher from the calling
//! thread after each chunk, in the same order as the sequential search would.

use itertools::Itertools;
use rayon::prelude::*;
use tracing::{debug, info};

use keccakf::progress::{NoProgress, PPFactory, StyledProgressBar};
use keccakf::state::ROW_VALUES;
use keccakf::{KeccakFPropagation, LinearLayer, RowValue, SliceValue, TrailCore, WeightOracle};

use crate::catalog::{Budget, PositionSet, RowPatternCatalog};
use crate::error::CoreGenError;
use crate::fetcher::{Flow, TrailFetcher};
use crate::filter::{BoundCheck, CandidateFilter, Outcome, Side};

/// The largest number of active rows the enumeration can start from.
pub const MAX_STARTING_ROWS: usize = 3;
/// The largest weight bound the enumeration can start from.
pub const MAX_STARTING_WEIGHT: u32 = 7;
/// Number of position sets the parallel search hands to rayon at once.
pub const SETS_PER_CHUNK: usize = 64;

/// How a search went.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Number of patterns paired and checked.
    pub candidates: u64,
    /// Number of trail cores handed to the fetcher.
    pub emitted: u64,
    /// True if the fetcher ended the search early.
    pub stopped: bool,
}

/// Generates two-round trail cores from row patterns at one side of the linear layer.
pub struct TrailCoreRows<'a, L, W, F = NoProgress> {
    layer: &'a L,
    oracle: &'a W,
    progress: F,
}

impl<'a, L, W> TrailCoreRows<'a, L, W, NoProgress>
where
    L: LinearLayer,
    W: WeightOracle,
{
    pub fn new(layer: &'a L, oracle: &'a W) -> Self {
        Self {
            layer,
            oracle,
            progress: NoProgress,
        }
    }
}

impl<'a> TrailCoreRows<'a, KeccakFPropagation, KeccakFPropagation, NoProgress> {
    /// A generator for Keccak-f, in the model of `propagation`.
    pub fn for_propagation(propagation: &'a KeccakFPropagation) -> Self {
        Self::new(propagation, propagation)
    }
}

impl<'a, L, W, F> TrailCoreRows<'a, L, W, F>
where
    L: LinearLayer,
    W: WeightOracle,
    F: PPFactory,
{
    /// Report the progress of every search through progress bars from `progress`.
    pub fn with_progress<G: PPFactory>(self, progress: G) -> TrailCoreRows<'a, L, W, G> {
        TrailCoreRows {
            layer: self.layer,
            oracle: self.oracle,
            progress,
        }
    }

    #[inline]
    pub fn lane_size(&self) -> usize {
        self.layer.lane_size()
    }

    /// Hand to `fetcher` every trail core with at most `max_nr_rows_at_a` active rows at A, at most
    /// `max_nr_rows_at_b` active rows at B and a weight of at most `max_weight`.
    ///
    /// The search starts from the side with the smallest bound (A on ties), which must be at most
    /// [`MAX_STARTING_ROWS`].
    pub fn generate_trail_cores_based_on_rows<T: TrailFetcher>(
        &self,
        fetcher: &mut T,
        max_nr_rows_at_a: usize,
        max_nr_rows_at_b: usize,
        max_weight: u32,
    ) -> Result<SearchStats, CoreGenError> {
        let side = Self::side_for_rows(max_nr_rows_at_a, max_nr_rows_at_b)?;
        self.generate_trail_cores_based_on_rows_from(
            side,
            fetcher,
            max_nr_rows_at_a,
            max_nr_rows_at_b,
            max_weight,
        )
    }

    /// As [`Self::generate_trail_cores_based_on_rows`], enumerating the patterns at `side`.
    pub fn generate_trail_cores_based_on_rows_from<T: TrailFetcher>(
        &self,
        side: Side,
        fetcher: &mut T,
        max_nr_rows_at_a: usize,
        max_nr_rows_at_b: usize,
        max_weight: u32,
    ) -> Result<SearchStats, CoreGenError> {
        let catalog = self.rows_catalog(side, max_nr_rows_at_a, max_nr_rows_at_b)?;
        let filter = CandidateFilter::new(
            self.layer,
            self.oracle,
            BoundCheck::RowCount {
                max_nr_rows_at_a,
                max_nr_rows_at_b,
            },
            max_weight,
        );
        self.search(&catalog, &filter, side, fetcher)
    }

    /// Hand to `fetcher` every trail core with a minimum reverse weight of at most
    /// `max_min_rev_weight_at_a` at A, a weight of at most `max_weight_at_b` at B and a total
    /// weight of at most `max_weight`.
    ///
    /// The search starts from the side with the smallest bound (A on ties), which must be at most
    /// [`MAX_STARTING_WEIGHT`].
    pub fn generate_trail_cores_up_to_given_weight<T: TrailFetcher>(
        &self,
        fetcher: &mut T,
        max_min_rev_weight_at_a: u32,
        max_weight_at_b: u32,
        max_weight: u32,
    ) -> Result<SearchStats, CoreGenError> {
        let side = Self::side_for_weights(max_min_rev_weight_at_a, max_weight_at_b)?;
        self.generate_trail_cores_up_to_given_weight_from(
            side,
            fetcher,
            max_min_rev_weight_at_a,
            max_weight_at_b,
            max_weight,
        )
    }

    /// As [`Self::generate_trail_cores_up_to_given_weight`], enumerating the patterns at `side`.
    pub fn generate_trail_cores_up_to_given_weight_from<T: TrailFetcher>(
        &self,
        side: Side,
        fetcher: &mut T,
        max_min_rev_weight_at_a: u32,
        max_weight_at_b: u32,
        max_weight: u32,
    ) -> Result<SearchStats, CoreGenError> {
        let catalog = self.weight_catalog(side, max_min_rev_weight_at_a, max_weight_at_b)?;
        let filter = CandidateFilter::new(
            self.layer,
            self.oracle,
            BoundCheck::Weight {
                max_min_rev_weight_at_a,
                max_weight_at_b,
            },
            max_weight,
        );
        self.search(&catalog, &filter, side, fetcher)
    }

    /// Check a single candidate against the row bounds: `state` is the state at `side`. Returns
    /// what the fetcher answered if the candidate was accepted.
    pub fn filter_generated_trail_cores<T: TrailFetcher>(
        &self,
        fetcher: &mut T,
        state: Vec<SliceValue>,
        side: Side,
        max_nr_rows_at_a: usize,
        max_nr_rows_at_b: usize,
        max_weight: u32,
    ) -> Result<Option<Flow>, CoreGenError> {
        let bounds = BoundCheck::RowCount {
            max_nr_rows_at_a,
            max_nr_rows_at_b,
        };
        self.filter_one(fetcher, state, side, bounds, max_weight)
    }

    /// Check a single candidate against the weight bounds: `state` is the state at `side`.
    /// Returns what the fetcher answered if the candidate was accepted.
    pub fn filter_generated_trail_cores_up_to_given_weight<T: TrailFetcher>(
        &self,
        fetcher: &mut T,
        state: Vec<SliceValue>,
        side: Side,
        max_min_rev_weight_at_a: u32,
        max_weight_at_b: u32,
        max_weight: u32,
    ) -> Result<Option<Flow>, CoreGenError> {
        let bounds = BoundCheck::Weight {
            max_min_rev_weight_at_a,
            max_weight_at_b,
        };
        self.filter_one(fetcher, state, side, bounds, max_weight)
    }

    fn filter_one<T: TrailFetcher>(
        &self,
        fetcher: &mut T,
        state: Vec<SliceValue>,
        side: Side,
        bounds: BoundCheck,
        max_weight: u32,
    ) -> Result<Option<Flow>, CoreGenError> {
        let filter = CandidateFilter::new(self.layer, self.oracle, bounds, max_weight);
        match filter.evaluate(state, side)? {
            None => Ok(None),
            Some(core) => Ok(Some(fetcher.fetch_trail(core))),
        }
    }

    fn side_for_rows(
        max_nr_rows_at_a: usize,
        max_nr_rows_at_b: usize,
    ) -> Result<Side, CoreGenError> {
        if max_nr_rows_at_a.min(max_nr_rows_at_b) > MAX_STARTING_ROWS {
            return Err(CoreGenError::RowBoundsOutOfRange {
                at_a: max_nr_rows_at_a,
                at_b: max_nr_rows_at_b,
                limit: MAX_STARTING_ROWS,
            });
        }
        Ok(if max_nr_rows_at_a <= max_nr_rows_at_b {
            Side::A
        } else {
            Side::B
        })
    }

    fn side_for_weights(
        max_min_rev_weight_at_a: u32,
        max_weight_at_b: u32,
    ) -> Result<Side, CoreGenError> {
        if max_min_rev_weight_at_a.min(max_weight_at_b) > MAX_STARTING_WEIGHT {
            return Err(CoreGenError::WeightBoundsOutOfRange {
                at_a: max_min_rev_weight_at_a,
                at_b: max_weight_at_b,
                limit: MAX_STARTING_WEIGHT,
            });
        }
        Ok(if max_min_rev_weight_at_a <= max_weight_at_b {
            Side::A
        } else {
            Side::B
        })
    }

    fn rows_catalog(
        &self,
        side: Side,
        max_nr_rows_at_a: usize,
        max_nr_rows_at_b: usize,
    ) -> Result<RowPatternCatalog, CoreGenError> {
        let bound = match side {
            Side::A => max_nr_rows_at_a,
            Side::B => max_nr_rows_at_b,
        };
        if bound > MAX_STARTING_ROWS {
            return Err(CoreGenError::StartingBoundOutOfRange {
                side,
                bound: bound as u32,
                limit: MAX_STARTING_ROWS as u32,
            });
        }
        RowPatternCatalog::new(self.lane_size(), Budget::Rows(bound))
    }

    /// Patterns at A are priced by their minimum reverse weight, patterns at B by their weight.
    fn weight_catalog(
        &self,
        side: Side,
        max_min_rev_weight_at_a: u32,
        max_weight_at_b: u32,
    ) -> Result<RowPatternCatalog, CoreGenError> {
        let bound = match side {
            Side::A => max_min_rev_weight_at_a,
            Side::B => max_weight_at_b,
        };
        if bound > MAX_STARTING_WEIGHT {
            return Err(CoreGenError::StartingBoundOutOfRange {
                side,
                bound,
                limit: MAX_STARTING_WEIGHT,
            });
        }
        let mut costs = [0; ROW_VALUES];
        for row in 1..ROW_VALUES as RowValue {
            costs[row as usize] = match side {
                Side::A => self.oracle.row_min_reverse_weight(row),
                Side::B => self.oracle.row_weight(row),
            };
        }
        RowPatternCatalog::new(self.lane_size(), Budget::Weight { max: bound, costs })
    }

    fn search<T: TrailFetcher>(
        &self,
        catalog: &RowPatternCatalog,
        filter: &CandidateFilter<L, W>,
        side: Side,
        fetcher: &mut T,
    ) -> Result<SearchStats, CoreGenError> {
        debug!(
            "Generating trail cores from side {} ({:?}, max. weight {}), lane size {}",
            side,
            filter.bounds(),
            filter.max_weight(),
            catalog.lane_size()
        );
        let pb = self.progress.new_progress_bar(catalog.count_patterns());
        pb.set_message(&format!("Patterns at {}", side));

        let lane_size = catalog.lane_size();
        let mut stats = SearchStats::default();
        for pattern in catalog.iter() {
            stats.candidates += 1;
            let state = pattern.to_state(lane_size);
            if let Outcome::Accepted(flow) = filter.process(state, side, fetcher, &pb)? {
                stats.emitted += 1;
                if flow == Flow::Stop {
                    stats.stopped = true;
                    break;
                }
            }
        }

        Self::finish(&pb, &stats);
        Ok(stats)
    }

    fn finish(pb: &F::ProgressBar, stats: &SearchStats) {
        pb.finish_with_message(&format!(
            "{} trail cores out of {} candidates",
            stats.emitted, stats.candidates
        ));
        info!(
            "Search done: {} candidates, {} trail cores{}",
            stats.candidates,
            stats.emitted,
            if stats.stopped { ", stopped early" } else { "" }
        );
    }
}

impl<'a, L, W, F> TrailCoreRows<'a, L, W, F>
where
    L: LinearLayer + Sync,
    W: WeightOracle + Sync,
    F: PPFactory,
{
    /// As [`Self::generate_trail_cores_based_on_rows`], on all threads of rayon's pool.
    pub fn par_generate_trail_cores_based_on_rows<T: TrailFetcher>(
        &self,
        fetcher: &mut T,
        max_nr_rows_at_a: usize,
        max_nr_rows_at_b: usize,
        max_weight: u32,
    ) -> Result<SearchStats, CoreGenError> {
        let side = Self::side_for_rows(max_nr_rows_at_a, max_nr_rows_at_b)?;
        self.par_generate_trail_cores_based_on_rows_from(
            side,
            fetcher,
            max_nr_rows_at_a,
            max_nr_rows_at_b,
            max_weight,
        )
    }

    pub fn par_generate_trail_cores_based_on_rows_from<T: TrailFetcher>(
        &self,
        side: Side,
        fetcher: &mut T,
        max_nr_rows_at_a: usize,
        max_nr_rows_at_b: usize,
        max_weight: u32,
    ) -> Result<SearchStats, CoreGenError> {
        let catalog = self.rows_catalog(side, max_nr_rows_at_a, max_nr_rows_at_b)?;
        let filter = CandidateFilter::new(
            self.layer,
            self.oracle,
            BoundCheck::RowCount {
                max_nr_rows_at_a,
                max_nr_rows_at_b,
            },
            max_weight,
        );
        self.par_search(&catalog, &filter, side, fetcher)
    }

    /// As [`Self::generate_trail_cores_up_to_given_weight`], on all threads of rayon's pool.
    pub fn par_generate_trail_cores_up_to_given_weight<T: TrailFetcher>(
        &self,
        fetcher: &mut T,
        max_min_rev_weight_at_a: u32,
        max_weight_at_b: u32,
        max_weight: u32,
    ) -> Result<SearchStats, CoreGenError> {
        let side = Self::side_for_weights(max_min_rev_weight_at_a, max_weight_at_b)?;
        self.par_generate_trail_cores_up_to_given_weight_from(
            side,
            fetcher,
            max_min_rev_weight_at_a,
            max_weight_at_b,
            max_weight,
        )
    }

    pub fn par_generate_trail_cores_up_to_given_weight_from<T: TrailFetcher>(
        &self,
        side: Side,
        fetcher: &mut T,
        max_min_rev_weight_at_a: u32,
        max_weight_at_b: u32,
        max_weight: u32,
    ) -> Result<SearchStats, CoreGenError> {
        let catalog = self.weight_catalog(side, max_min_rev_weight_at_a, max_weight_at_b)?;
        let filter = CandidateFilter::new(
            self.layer,
            self.oracle,
            BoundCheck::Weight {
                max_min_rev_weight_at_a,
                max_weight_at_b,
            },
            max_weight,
        );
        self.par_search(&catalog, &filter, side, fetcher)
    }

    /// Position sets are searched [`SETS_PER_CHUNK`] at a time, each of them to the end. The cores
    /// of a chunk are handed to `fetcher` before the next chunk starts, so a stop skips the
    /// remaining chunks, and at most one chunk of cores is held in memory.
    fn par_search<T: TrailFetcher>(
        &self,
        catalog: &RowPatternCatalog,
        filter: &CandidateFilter<L, W>,
        side: Side,
        fetcher: &mut T,
    ) -> Result<SearchStats, CoreGenError> {
        debug!(
            "Generating trail cores from side {} ({:?}, max. weight {}), lane size {}, \
             {} position sets at a time",
            side,
            filter.bounds(),
            filter.max_weight(),
            catalog.lane_size(),
            SETS_PER_CHUNK
        );
        let pb = self.progress.new_progress_bar(catalog.count_patterns());
        pb.set_message(&format!("Patterns at {}", side));

        let lane_size = catalog.lane_size();
        let mut stats = SearchStats::default();
        let chunks = catalog.position_sets().chunks(SETS_PER_CHUNK);
        'chunks: for chunk in &chunks {
            let sets: Vec<PositionSet> = chunk.collect();
            let batches: Vec<Result<(u64, Vec<TrailCore>), CoreGenError>> = sets
                .into_par_iter()
                .map_with(pb.clone(), |pb, set| -> Result<(u64, Vec<TrailCore>), CoreGenError> {
                    let mut accepted: Vec<TrailCore> = Vec::new();
                    let mut candidates = 0;
                    for pattern in catalog.patterns_in(set) {
                        candidates += 1;
                        let state = pattern.to_state(lane_size);
                        filter.process(state, side, &mut accepted, &*pb)?;
                    }
                    Ok((candidates, accepted))
                })
                .collect();

            for batch in batches {
                let (candidates, cores) = batch?;
                stats.candidates += candidates;
                for core in cores {
                    stats.emitted += 1;
                    if fetcher.fetch_trail(core) == Flow::Stop {
                        stats.stopped = true;
                        break 'chunks;
                    }
                }
            }
        }

        Self::finish(&pb, &stats);
        Ok(stats)
    }
}
