//! Property-based tests for the storage invariants.

use proptest::prelude::*;

use plotstore::{Point, Timeseries};

#[derive(Debug, Clone)]
enum Op {
    Push(f64, f64),
    PushUnsorted(f64, f64),
    Pop,
    Set(usize, f64),
    Sort,
}

fn sample_value() -> impl Strategy<Value = f64> {
    prop_oneof![
        -1.0e6..1.0e6,
        Just(f64::NAN),
        Just(f64::INFINITY),
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (sample_value(), sample_value()).prop_map(|(x, y)| Op::Push(x, y)),
        (sample_value(), sample_value()).prop_map(|(x, y)| Op::PushUnsorted(x, y)),
        Just(Op::Pop),
        (0usize..4096, sample_value()).prop_map(|(i, y)| Op::Set(i, y)),
        Just(Op::Sort),
    ]
}

proptest! {
    /// Timestamp and value streams never drift apart, whatever the
    /// operation mix.
    #[test]
    fn streams_keep_equal_length(ops in proptest::collection::vec(op_strategy(), 0..200)) {
        let mut series: Timeseries<f64> = Timeseries::new();
        for op in ops {
            match op {
                Op::Push(x, y) => { series.push_back(Point::new(x, y)); }
                Op::PushUnsorted(x, y) => { series.push_unsorted(Point::new(x, y)); }
                Op::Pop => { series.pop_front(); }
                Op::Set(i, y) => { series.data_mut().set_value(i, y); }
                Op::Sort => series.sort(),
            }
            prop_assert_eq!(
                series.data().timestamps().len(),
                series.data().values().len()
            );
        }
    }

    /// Ordered insertion keeps timestamps non-decreasing for any
    /// arrival order.
    #[test]
    fn push_back_repairs_any_arrival_order(xs in proptest::collection::vec(-1.0e6f64..1.0e6, 0..300)) {
        let mut series = Timeseries::new();
        for x in xs {
            series.push_back(Point::new(x, 0.0));
        }
        let stored: Vec<f64> = series.iter().map(|p| p.x).collect();
        for pair in stored.windows(2) {
            prop_assert!(pair[0] <= pair[1], "out of order: {} > {}", pair[0], pair[1]);
        }
    }

    /// The lazily cached X range always matches a full rescan.
    #[test]
    fn range_x_matches_rescan(
        xs in proptest::collection::vec(-1.0e6f64..1.0e6, 1..300),
        pops in 0usize..100,
    ) {
        let mut series = Timeseries::new();
        for x in &xs {
            series.push_back(Point::new(*x, 1.0));
        }
        for _ in 0..pops {
            series.pop_front();
        }
        let expected_min = series.iter().map(|p| p.x).fold(f64::MAX, f64::min);
        let expected_max = series.iter().map(|p| p.x).fold(-f64::MAX, f64::max);
        match series.range_x() {
            Some(range) => {
                prop_assert_eq!(range.min, expected_min);
                prop_assert_eq!(range.max, expected_max);
            }
            None => prop_assert!(series.is_empty()),
        }
    }

    /// Bulk unsorted load plus one sort agrees with ordered insertion.
    #[test]
    fn sort_agrees_with_ordered_insertion(xs in proptest::collection::vec(-1.0e6f64..1.0e6, 0..200)) {
        let mut ordered = Timeseries::new();
        let mut bulk = Timeseries::new();
        for x in &xs {
            ordered.push_back(Point::new(*x, *x));
            bulk.push_unsorted(Point::new(*x, *x));
        }
        bulk.sort();

        prop_assert_eq!(ordered.len(), bulk.len());
        let a: Vec<f64> = ordered.iter().map(|p| p.x).collect();
        let b: Vec<f64> = bulk.iter().map(|p| p.x).collect();
        prop_assert_eq!(a, b);
    }
}
