use keccakf::progress::StyledProgressBar;

use super::*;

fn quiet_setup(width: usize, model: DCorLC, bounds: SearchBounds, max_weight: u32) -> Setup {
    Setup::new(width, model, bounds, max_weight, false, None, false, true)
}

#[test]
fn rows_search() {
    let bounds = SearchBounds::Rows { at_a: 2, at_b: 4 };
    let setup = quiet_setup(100, DCorLC::Differential, bounds, 14);
    let report = run(&setup).unwrap();
    assert_eq!(report.total(), 150);
    assert_eq!(report.stats().emitted, 150);
    assert_eq!(report.per_weight().keys().copied().collect::<Vec<u32>>(), vec![8, 11, 12]);
    assert!(report.cores().is_empty());
}

#[test]
fn weight_search_in_parallel() {
    let setup = Setup::new(
        100,
        DCorLC::Linear,
        SearchBounds::Weight { min_rev_at_a: 4, at_b: 4 },
        8,
        true,
        None,
        true,
        true,
    );
    let report = run(&setup).unwrap();
    assert_eq!(report.total(), 50);
    assert_eq!(report.cores().len(), 50);
    assert!(report.cores().iter().all(|core| core.weight() == 8));

    let printed = format!("{}", report);
    assert!(printed.contains("50 trail cores out of"));
    assert!(printed.contains("weight   8: 50"));
}

#[test]
fn limit_stops_the_search() {
    let setup = Setup::new(
        25,
        DCorLC::Differential,
        SearchBounds::Rows { at_a: 3, at_b: 3 },
        12,
        false,
        Some(5),
        false,
        true,
    );
    let report = run(&setup).unwrap();
    assert_eq!(report.total(), 5);
    assert!(report.stats().stopped);
    assert!(format!("{}", report).contains("(stopped early)"));
}

#[test]
fn errors() {
    let setup = quiet_setup(30, DCorLC::Differential, SearchBounds::Rows { at_a: 1, at_b: 1 }, 8);
    assert_eq!(
        run(&setup).unwrap_err(),
        SearchError::KeccakF(KeccakFError::UnsupportedWidth(30))
    );

    let bounds = SearchBounds::Weight {
        min_rev_at_a: 8,
        at_b: 9,
    };
    let setup = quiet_setup(100, DCorLC::Linear, bounds, 20);
    assert_eq!(
        run(&setup).unwrap_err(),
        SearchError::CoreGen(CoreGenError::WeightBoundsOutOfRange {
            at_a: 8,
            at_b: 9,
            limit: 7
        })
    );
}

#[test]
fn describes_itself() {
    let setup = quiet_setup(1600, DCorLC::Linear, SearchBounds::Rows { at_a: 2, at_b: 3 }, 30);
    assert_eq!(
        format!("{}", setup),
        "Keccak-f[1600], linear trail cores with at most 2 rows at A, 3 rows at B, total weight \
         at most 30"
    );
}

#[test]
fn hidden_progress_still_counts() {
    let pb = Progress::new(true).new_progress_bar(10);
    pb.inc(3);
    pb.set_message("counting");
    assert_eq!(pb.position(), 3);
    pb.finish_and_clear();
    assert!(pb.is_finished());
}
