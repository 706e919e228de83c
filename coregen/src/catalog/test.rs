use std::collections::HashSet;
use std::hash::BuildHasherDefault;

use ahash::AHasher;
use itertools::Itertools;

use keccakf::state::{get_slice_from_row, nr_active_rows, translate_state};
use keccakf::{DCorLC, RowTable, SliceValue};

use super::*;

type StateSet = HashSet<Vec<SliceValue>, BuildHasherDefault<AHasher>>;

fn dc_weights() -> [u32; ROW_VALUES] {
    let table = RowTable::new(DCorLC::Differential).unwrap();
    let mut costs = [0; ROW_VALUES];
    for row in 0..ROW_VALUES as RowValue {
        costs[row as usize] = table.weight(row);
    }
    costs
}

fn pattern_cost(pattern: &RowPattern, costs: &[u32; ROW_VALUES]) -> u32 {
    pattern
        .rows()
        .iter()
        .map(|row| costs[row.value as usize])
        .sum()
}

/// Every state with 1 up to `max_rows` active rows, translations included.
fn all_states(lane_size: usize, max_rows: usize) -> Vec<Vec<SliceValue>> {
    let mut states = Vec::new();
    for nr_rows in 1..=max_rows {
        for positions in (0..ROWS_PER_SLICE * lane_size).combinations(nr_rows) {
            let all_values = (0..nr_rows).map(|_| 1..ROW_VALUES as RowValue);
            for values in all_values.multi_cartesian_product() {
                states.push(RowPattern::from_positions(&positions, &values).to_state(lane_size));
            }
        }
    }
    states
}

/// Expand every pattern of `catalog` to its translation class, and check the classes are disjoint
/// and cover exactly `expected`.
fn assert_covers_exactly(catalog: &RowPatternCatalog, expected: &[Vec<SliceValue>]) {
    let lane_size = catalog.lane_size();
    let mut covered = StateSet::default();
    for pattern in catalog.iter() {
        let state = pattern.to_state(lane_size);
        let class: StateSet = (0..lane_size).map(|dz| translate_state(&state, dz)).collect();
        for translate in class {
            assert!(
                covered.insert(translate),
                "{:?} shares its class with another pattern",
                pattern
            );
        }
    }
    assert_eq!(covered.len(), expected.len());
    for state in expected.iter() {
        assert!(covered.contains(state), "{:?} not covered", state);
    }
}

#[test]
fn single_rows() {
    for &lane_size in [1, 2, 4, 64].iter() {
        let catalog = RowPatternCatalog::new(lane_size, Budget::Rows(1)).unwrap();
        let patterns: Vec<RowPattern> = catalog.iter().collect();
        assert_eq!(patterns.len(), 155);
        assert_eq!(catalog.count_patterns(), 155);
        assert!(patterns.iter().all(|p| p.nr_rows() == 1 && p.rows()[0].z == 0));
    }
}

#[test]
fn pattern_counts() {
    let expected = [(4, 2, 45880), (2, 2, 21855), (1, 3, 307675)];
    for &(lane_size, max_rows, count) in expected.iter() {
        let catalog = RowPatternCatalog::new(lane_size, Budget::Rows(max_rows)).unwrap();
        assert_eq!(catalog.count_patterns(), count, "lane size {}, {} rows", lane_size, max_rows);
        assert_eq!(catalog.iter().count() as u64, count);
    }

    let catalog = RowPatternCatalog::new(2, Budget::Rows(3)).unwrap();
    assert_eq!(catalog.count_patterns(), 1809315);
}

#[test]
fn first_row_is_in_slice_zero() {
    let catalog = RowPatternCatalog::new(8, Budget::Rows(2)).unwrap();
    for pattern in catalog.iter().step_by(97) {
        assert_eq!(pattern.rows()[0].z, 0);
        let positions = pattern.positions();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(pattern.rows().iter().all(|row| row.value != 0 && row.value < 32));
    }
}

#[test]
fn one_pattern_per_translation_class() {
    for &(lane_size, max_rows) in [(2, 2), (4, 2), (1, 3)].iter() {
        let catalog = RowPatternCatalog::new(lane_size, Budget::Rows(max_rows)).unwrap();
        assert_covers_exactly(&catalog, &all_states(lane_size, max_rows));
    }
}

#[test]
fn one_pattern_per_translation_class_within_weight() {
    let costs = dc_weights();
    let catalog = RowPatternCatalog::new(4, Budget::Weight { max: 5, costs }).unwrap();
    assert_eq!(catalog.max_rows(), 2);

    let table = RowTable::new(DCorLC::Differential).unwrap();
    let expected: Vec<Vec<SliceValue>> = all_states(4, 2)
        .into_iter()
        .filter(|state| {
            let cost: u32 = state
                .iter()
                .flat_map(|&slice| {
                    (0..ROWS_PER_SLICE).map(move |y| keccakf::state::get_row(slice, y))
                })
                .map(|row| table.weight(row))
                .sum();
            cost <= 5
        })
        .collect();
    assert_covers_exactly(&catalog, &expected);
}

#[test]
fn weight_budget_is_respected() {
    let costs = dc_weights();
    let catalog = RowPatternCatalog::new(4, Budget::Weight { max: 7, costs }).unwrap();
    assert_eq!(catalog.max_rows(), 3);

    let mut count = 0;
    let mut most_rows = 0;
    for pattern in catalog.iter() {
        assert!(pattern_cost(&pattern, &costs) <= 7);
        most_rows = most_rows.max(pattern.nr_rows());
        count += 1;
    }
    assert_eq!(most_rows, 3);
    assert_eq!(catalog.count_patterns(), count);
}

#[test]
fn values_come_by_increasing_cost() {
    let costs = dc_weights();
    let catalog = RowPatternCatalog::new(1, Budget::Weight { max: 4, costs }).unwrap();
    let single_rows: Vec<u32> = catalog
        .iter()
        .take_while(|p| p.nr_rows() == 1 && p.rows()[0].y == 0)
        .map(|p| pattern_cost(&p, &costs))
        .collect();
    assert_eq!(single_rows.len(), 31);
    assert!(single_rows.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn symmetric_position_set() {
    // Rows at (y, z) = (0, 0) and (0, 1) in a state of two slices: swapped by a translation
    let set = PositionSet::canonical(vec![0, 5], 2).unwrap();
    assert!(set.is_symmetric());
    assert_eq!(set.positions(), &[0, 5]);
    // (0, 1) and (0, 2) is a translate of the above
    assert!(PositionSet::canonical(vec![5, 10], 4).is_none());
    assert!(!PositionSet::canonical(vec![0, 5], 4).unwrap().is_symmetric());

    let catalog = RowPatternCatalog::new(2, Budget::Rows(2)).unwrap();
    let patterns: Vec<RowPattern> = catalog.patterns_in(set).collect();
    assert_eq!(patterns.len(), 31 * 32 / 2);
    assert!(patterns
        .iter()
        .all(|p| p.rows()[0].value <= p.rows()[1].value));

    // A pattern equal to its own translate
    let fixed = RowPattern::from_positions(&[0, 5], &[0x03, 0x03]).to_state(2);
    assert_eq!(translate_state(&fixed, 1), fixed);
    assert!(patterns.iter().any(|p| p.to_state(2) == fixed));
}

#[test]
fn periodic_patterns_at_larger_lane_size() {
    // A row every 4 slices out of 16 is invariant under translations by 4, 8 and 12.
    let state: Vec<SliceValue> = (0..16)
        .map(|z| if z % 4 == 0 { get_slice_from_row(0x05, 3) } else { 0 })
        .collect();
    assert_eq!(nr_active_rows(&state), 4);

    let set = PositionSet::canonical(vec![3, 23, 43, 63], 16).unwrap();
    assert_eq!(set.symmetries.len(), 3);
    assert!(set.accepts(&[0x05; 4]));
    assert!(set.accepts(&[0x01, 0x02, 0x01, 0x02]));
    assert!(!set.accepts(&[0x02, 0x01, 0x02, 0x01]));
    assert!(!set.accepts(&[0x01, 0x02, 0x03, 0x01]));
}

#[test]
fn zero_cost_is_an_error() {
    let mut costs = dc_weights();
    costs[0x11] = 0;
    assert_eq!(
        RowPatternCatalog::new(4, Budget::Weight { max: 8, costs }).unwrap_err(),
        CoreGenError::ZeroRowCost { row: 0x11 }
    );
}

#[test]
fn empty_budgets() {
    let catalog = RowPatternCatalog::new(4, Budget::Rows(0)).unwrap();
    assert_eq!(catalog.iter().count(), 0);
    let budget = Budget::Weight {
        max: 1,
        costs: dc_weights(),
    };
    let catalog = RowPatternCatalog::new(4, budget).unwrap();
    assert_eq!(catalog.count_patterns(), 0);
    assert_eq!(catalog.iter().next(), None);
}
