//! Runs one trail-core search as described by a [`Setup`], and collects what it finds.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;
use tracing::debug;

use coregen::{CoreGenError, Flow, SearchStats, TrailCoreRows, TrailCounter, TrailFetcher};
use keccakf::progress::PPFactory;
use keccakf::{DCorLC, KeccakF, KeccakFError, KeccakFPropagation, TrailCore};

use crate::search::progress::Progress;

pub mod progress;

/// The bounds of a search, per side of λ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchBounds {
    Rows { at_a: usize, at_b: usize },
    /// A is bounded by its minimum reverse weight, B by its weight.
    Weight { min_rev_at_a: u32, at_b: u32 },
}

impl fmt::Display for SearchBounds {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SearchBounds::Rows { at_a, at_b } => {
                write!(f, "at most {} rows at A, {} rows at B", at_a, at_b)
            }
            SearchBounds::Weight { min_rev_at_a, at_b } => write!(
                f,
                "min. rev. weight at most {} at A, weight at most {} at B",
                min_rev_at_a, at_b
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Setup {
    width: usize,
    model: DCorLC,
    bounds: SearchBounds,
    max_weight: u32,
    parallel: bool,
    limit: Option<u64>,
    print_cores: bool,
    silent_mode: bool,
}

impl Setup {
    pub fn new(
        width: usize,
        model: DCorLC,
        bounds: SearchBounds,
        max_weight: u32,
        parallel: bool,
        limit: Option<u64>,
        print_cores: bool,
        silent_mode: bool,
    ) -> Self {
        Self {
            width,
            model,
            bounds,
            max_weight,
            parallel,
            limit,
            print_cores,
            silent_mode,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn model(&self) -> DCorLC {
        self.model
    }

    #[inline]
    pub fn bounds(&self) -> SearchBounds {
        self.bounds
    }

    #[inline]
    pub fn max_weight(&self) -> u32 {
        self.max_weight
    }

    #[inline]
    pub fn parallel(&self) -> bool {
        self.parallel
    }

    /// Stop after this many trail cores.
    #[inline]
    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    #[inline]
    pub fn print_cores(&self) -> bool {
        self.print_cores
    }

    /// Hides the progress bars if set.
    #[inline]
    pub fn silent_mode(&self) -> bool {
        self.silent_mode
    }
}

impl fmt::Display for Setup {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Keccak-f[{}], {} trail cores with {}, total weight at most {}",
            self.width, self.model, self.bounds, self.max_weight
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error(transparent)]
    KeccakF(#[from] KeccakFError),
    #[error(transparent)]
    CoreGen(#[from] CoreGenError),
}

/// What a search found.
#[derive(Debug, Clone)]
pub struct Report {
    stats: SearchStats,
    counter: TrailCounter,
    cores: Vec<TrailCore>,
}

impl Report {
    #[inline]
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Number of trail cores found, per weight.
    #[inline]
    pub fn per_weight(&self) -> &BTreeMap<u32, u64> {
        self.counter.per_weight()
    }

    #[inline]
    pub fn total(&self) -> u64 {
        self.counter.total()
    }

    /// The trail cores themselves, if the setup asked to print them.
    #[inline]
    pub fn cores(&self) -> &[TrailCore] {
        &self.cores
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for core in self.cores.iter() {
            writeln!(f, "{}", core)?;
        }
        writeln!(
            f,
            "{} trail cores out of {} candidates{}",
            self.total(),
            self.stats.candidates,
            if self.stats.stopped { " (stopped early)" } else { "" }
        )?;
        for (weight, count) in self.per_weight().iter() {
            writeln!(f, "  weight {:>3}: {}", weight, count)?;
        }
        Ok(())
    }
}

/// Counts every trail core, and keeps them if asked to.
struct Collector {
    counter: TrailCounter,
    cores: Option<Vec<TrailCore>>,
}

impl TrailFetcher for Collector {
    fn fetch_trail(&mut self, trail: TrailCore) -> Flow {
        if let Some(cores) = self.cores.as_mut() {
            cores.push(trail.clone());
        }
        self.counter.fetch_trail(trail)
    }
}

pub fn run(setup: &Setup) -> Result<Report, SearchError> {
    let propagation = KeccakFPropagation::new(KeccakF::new(setup.width())?, setup.model())?;
    debug!("Running search: {}", setup);

    let progress = Progress::new(setup.silent_mode());
    let generator = TrailCoreRows::for_propagation(&propagation).with_progress(progress);
    let mut collector = Collector {
        counter: match setup.limit() {
            Some(limit) => TrailCounter::with_limit(limit),
            None => TrailCounter::new(),
        },
        cores: if setup.print_cores() { Some(Vec::new()) } else { None },
    };

    let stats = search(&generator, setup, &mut collector)?;
    Ok(Report {
        stats,
        counter: collector.counter,
        cores: collector.cores.unwrap_or_default(),
    })
}

fn search<F: PPFactory>(
    generator: &TrailCoreRows<KeccakFPropagation, KeccakFPropagation, F>,
    setup: &Setup,
    collector: &mut Collector,
) -> Result<SearchStats, CoreGenError> {
    let max_weight = setup.max_weight();
    match (setup.bounds(), setup.parallel()) {
        (SearchBounds::Rows { at_a, at_b }, false) => {
            generator.generate_trail_cores_based_on_rows(collector, at_a, at_b, max_weight)
        }
        (SearchBounds::Rows { at_a, at_b }, true) => {
            generator.par_generate_trail_cores_based_on_rows(collector, at_a, at_b, max_weight)
        }
        (SearchBounds::Weight { min_rev_at_a, at_b }, false) => generator
            .generate_trail_cores_up_to_given_weight(collector, min_rev_at_a, at_b, max_weight),
        (SearchBounds::Weight { min_rev_at_a, at_b }, true) => generator
            .par_generate_trail_cores_up_to_given_weight(collector, min_rev_at_a, at_b, max_weight),
    }
}

#[cfg(test)]
mod test;
