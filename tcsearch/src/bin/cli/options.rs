use structopt::StructOpt;

use keccakf::DCorLC;
use tcsearch::search::{SearchBounds, Setup};

#[derive(Clone, StructOpt)]
#[structopt(
name = "tcsearch",
about = "Generates two-round differential or linear trail cores of Keccak-f."
)]
pub enum Options {
    #[structopt(name = "rows")]
    /// Trail cores with few active rows at A and B.
    Rows {
        #[structopt(short = "a", long = "rows-a")]
        /// Maximum number of active rows at A (before λ).
        max_nr_rows_at_a: usize,

        #[structopt(short = "b", long = "rows-b")]
        /// Maximum number of active rows at B (after λ).
        max_nr_rows_at_b: usize,

        #[structopt(flatten)]
        common: Common,
    },

    #[structopt(name = "weight")]
    /// Trail cores with a low weight at A and B.
    Weight {
        #[structopt(short = "a", long = "min-rev-weight-a")]
        /// Maximum minimum reverse weight at A (before λ).
        max_min_rev_weight_at_a: u32,

        #[structopt(short = "b", long = "weight-b")]
        /// Maximum weight at B (after λ).
        max_weight_at_b: u32,

        #[structopt(flatten)]
        common: Common,
    },
}

#[derive(Clone, StructOpt)]
pub struct Common {
    #[structopt(short = "w", long = "width", default_value = "1600")]
    /// Width of the permutation: 25, 50, 100, 200, 400, 800 or 1600.
    width: usize,

    #[structopt(short = "m", long = "max-weight")]
    /// Maximum weight of a trail core.
    max_weight: u32,

    #[structopt(short = "l")]
    /// Will search for linear trail cores if set, differential ones otherwise.
    linear: bool,

    #[structopt(long = "parallel")]
    /// Will use all cores if set.
    parallel: bool,

    #[structopt(short = "n", long = "limit")]
    /// Stops after this many trail cores.
    limit: Option<u64>,

    #[structopt(short = "p", long = "print")]
    /// Will print every trail core found if set, not only the counts.
    print_cores: bool,

    #[structopt(short = "s")]
    /// Will hide the progress bar if set.
    silent_mode: bool,

    #[structopt(short = "v")]
    /// Will log the progress of the search to stderr if set.
    pub verbose: bool,
}

impl Options {
    pub fn common(&self) -> &Common {
        match self {
            Options::Rows { common, .. } | Options::Weight { common, .. } => common,
        }
    }

    pub fn to_setup(&self) -> Setup {
        let bounds = match *self {
            Options::Rows {
                max_nr_rows_at_a,
                max_nr_rows_at_b,
                ..
            } => SearchBounds::Rows {
                at_a: max_nr_rows_at_a,
                at_b: max_nr_rows_at_b,
            },
            Options::Weight {
                max_min_rev_weight_at_a,
                max_weight_at_b,
                ..
            } => SearchBounds::Weight {
                min_rev_at_a: max_min_rev_weight_at_a,
                at_b: max_weight_at_b,
            },
        };
        let common = self.common();
        let model = if common.linear {
            DCorLC::Linear
        } else {
            DCorLC::Differential
        };

        Setup::new(
            common.width,
            model,
            bounds,
            common.max_weight,
            common.parallel,
            common.limit,
            common.print_cores,
            common.silent_mode,
        )
    }
}
