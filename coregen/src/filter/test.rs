use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use keccakf::state::{get_slice_from_row, translate_state};
use keccakf::RowValue;

use crate::catalog::{Budget, RowPatternCatalog};

use super::*;

/// A "linear layer" which moves everything one slice up, and weights which count bits.
struct Shift {
    lane_size: usize,
}

impl LinearLayer for Shift {
    fn lane_size(&self) -> usize {
        self.lane_size
    }

    fn direct(&self, state_at_a: &[SliceValue]) -> Vec<SliceValue> {
        translate_state(state_at_a, 1)
    }

    fn reverse(&self, state_at_b: &[SliceValue]) -> Vec<SliceValue> {
        translate_state(state_at_b, self.lane_size - 1)
    }
}

impl WeightOracle for Shift {
    fn row_weight(&self, row: RowValue) -> u32 {
        row.count_ones()
    }

    fn row_min_reverse_weight(&self, row: RowValue) -> u32 {
        row.count_ones()
    }
}

/// Goes forward like [`Shift`], but does not come back.
struct OneWay;

impl LinearLayer for OneWay {
    fn lane_size(&self) -> usize {
        4
    }

    fn direct(&self, state_at_a: &[SliceValue]) -> Vec<SliceValue> {
        translate_state(state_at_a, 1)
    }

    fn reverse(&self, state_at_b: &[SliceValue]) -> Vec<SliceValue> {
        state_at_b.to_vec()
    }
}

/// Returns states of the wrong size, or zero states.
enum Broken {
    TooLong,
    Zero,
}

impl LinearLayer for Broken {
    fn lane_size(&self) -> usize {
        4
    }

    fn direct(&self, state_at_a: &[SliceValue]) -> Vec<SliceValue> {
        match self {
            Broken::TooLong => vec![1; state_at_a.len() + 1],
            Broken::Zero => vec![0; state_at_a.len()],
        }
    }

    fn reverse(&self, state_at_b: &[SliceValue]) -> Vec<SliceValue> {
        self.direct(state_at_b)
    }
}

#[derive(Clone, Default)]
struct Ticks(Arc<AtomicU64>);

impl Ticks {
    fn count(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

impl StyledProgressBar for Ticks {
    fn inc(&self, delta: u64) {
        self.0.fetch_add(delta, Ordering::SeqCst);
    }
    fn set_message(&self, _msg: &str) {}
    fn finish_with_message(&self, _msg: &str) {}
    fn finish_and_clear(&self) {}
    fn println(&self, _msg: &str) {}
}

fn single_row(value: RowValue, y: usize, z: usize, lane_size: usize) -> Vec<SliceValue> {
    let mut state = vec![0; lane_size];
    state[z] = get_slice_from_row(value, y);
    state
}

const ONE_ROW_EACH: BoundCheck = BoundCheck::RowCount {
    max_nr_rows_at_a: 1,
    max_nr_rows_at_b: 1,
};

#[test]
fn pairs_from_either_side() {
    let shift = Shift { lane_size: 4 };
    let filter = CandidateFilter::new(&shift, &shift, ONE_ROW_EACH, 4);

    let core = filter
        .evaluate(single_row(0x03, 2, 0, 4), Side::A)
        .unwrap()
        .unwrap();
    assert_eq!(core.state_a(), single_row(0x03, 2, 0, 4).as_slice());
    assert_eq!(core.state_b(), single_row(0x03, 2, 1, 4).as_slice());
    assert_eq!(core.min_rev_weight_a(), 2);
    assert_eq!(core.weight_b(), 2);

    let from_b = filter
        .evaluate(single_row(0x03, 2, 1, 4), Side::B)
        .unwrap()
        .unwrap();
    assert_eq!(from_b, core);
}

#[test]
fn total_weight_is_bounded() {
    let shift = Shift { lane_size: 4 };
    let filter = CandidateFilter::new(&shift, &shift, ONE_ROW_EACH, 3);
    assert_eq!(filter.evaluate(single_row(0x03, 0, 0, 4), Side::A), Ok(None));
    assert!(filter
        .evaluate(single_row(0x10, 0, 0, 4), Side::A)
        .unwrap()
        .is_some());
}

#[test]
fn row_counts_are_bounded() {
    let shift = Shift { lane_size: 4 };
    let filter = CandidateFilter::new(&shift, &shift, ONE_ROW_EACH, 100);
    let mut two_rows = single_row(0x01, 0, 0, 4);
    two_rows[2] |= get_slice_from_row(0x01, 3);
    assert_eq!(filter.evaluate(two_rows.clone(), Side::A), Ok(None));
    assert_eq!(filter.evaluate(two_rows, Side::B), Ok(None));
}

#[test]
fn weights_are_bounded_per_side() {
    let shift = Shift { lane_size: 4 };
    let bounds = BoundCheck::Weight {
        max_min_rev_weight_at_a: 1,
        max_weight_at_b: 5,
    };
    let filter = CandidateFilter::new(&shift, &shift, bounds, 10);
    assert_eq!(filter.evaluate(single_row(0x03, 4, 3, 4), Side::A), Ok(None));
    let core = filter
        .evaluate(single_row(0x08, 4, 3, 4), Side::A)
        .unwrap()
        .unwrap();
    assert_eq!(core.weight(), 2);
    assert_eq!(core.state_b(), single_row(0x08, 4, 0, 4).as_slice());

    let bounds = BoundCheck::Weight {
        max_min_rev_weight_at_a: 5,
        max_weight_at_b: 1,
    };
    let filter = CandidateFilter::new(&shift, &shift, bounds, 10);
    assert_eq!(filter.evaluate(single_row(0x03, 4, 3, 4), Side::B), Ok(None));
}

#[test]
fn single_rows_through_a_shift() {
    // A single row of Hamming weight h gives a core of weight 2h
    let shift = Shift { lane_size: 4 };
    let filter = CandidateFilter::new(&shift, &shift, ONE_ROW_EACH, 4);
    let catalog = RowPatternCatalog::new(4, Budget::Rows(1)).unwrap();

    let ticks = Ticks::default();
    let mut cores: Vec<TrailCore> = Vec::new();
    for pattern in catalog.iter() {
        filter
            .process(pattern.to_state(4), Side::A, &mut cores, &ticks)
            .unwrap();
    }
    assert_eq!(ticks.count(), 155);
    assert_eq!(cores.len(), 5 * 15);
    assert!(cores.iter().all(|core| core.weight() <= 4));
}

#[test]
fn process_reports_outcome() {
    let shift = Shift { lane_size: 2 };
    let filter = CandidateFilter::new(&shift, &shift, ONE_ROW_EACH, 2);
    let ticks = Ticks::default();
    let mut cores: Vec<TrailCore> = Vec::new();

    let outcome = filter.process(single_row(0x1f, 0, 0, 2), Side::A, &mut cores, &ticks);
    assert_eq!(outcome, Ok(Outcome::Rejected));
    let outcome = filter.process(single_row(0x04, 0, 0, 2), Side::A, &mut cores, &ticks);
    assert_eq!(outcome, Ok(Outcome::Accepted(Flow::Continue)));
    assert_eq!(ticks.count(), 2);
    assert_eq!(cores.len(), 1);
}

#[test]
fn broken_inverse_is_reported() {
    let shift = Shift { lane_size: 4 };
    let filter = CandidateFilter::new(&OneWay, &shift, ONE_ROW_EACH, 10);
    assert_eq!(
        filter.evaluate(single_row(0x01, 1, 1, 4), Side::A),
        Err(CoreGenError::PairingMismatch { side: Side::A })
    );
}

#[test]
fn wrong_lengths_are_reported() {
    let shift = Shift { lane_size: 4 };
    let filter = CandidateFilter::new(&Broken::TooLong, &shift, ONE_ROW_EACH, 10);
    assert_eq!(
        filter.evaluate(single_row(0x01, 1, 1, 4), Side::B),
        Err(CoreGenError::StateLength { expected: 4, found: 5 })
    );

    let filter = CandidateFilter::new(&shift, &shift, ONE_ROW_EACH, 10);
    assert_eq!(
        filter.evaluate(vec![1, 0], Side::A),
        Err(CoreGenError::StateLength { expected: 4, found: 2 })
    );
}

#[test]
fn zero_pairs_are_skipped() {
    let shift = Shift { lane_size: 4 };
    let filter = CandidateFilter::new(&Broken::Zero, &shift, ONE_ROW_EACH, 10);
    assert_eq!(filter.evaluate(single_row(0x01, 1, 1, 4), Side::A), Ok(None));
    assert_eq!(Side::A.other(), Side::B);
    assert_eq!(format!("{}", Side::B), "B");
}
