//! End-to-end engine scenarios.

use std::sync::Arc;

use plotstore::{CHUNK_CAPACITY, DataSet, PlotSeries, Point, Range, Timeseries};

#[test]
fn out_of_order_feed_ends_up_sorted() {
    let mut series = Timeseries::new();
    series.push_back(Point::new(0.0, 1.0));
    series.push_back(Point::new(2.0, 1.0));
    series.push_back(Point::new(1.0, 1.0));

    let points: Vec<Point<f64>> = series.iter().collect();
    assert_eq!(
        points,
        vec![
            Point::new(0.0, 1.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 1.0),
        ]
    );
    assert_eq!(series.range_x(), Some(Range::new(0.0, 2.0)));
    assert_eq!(series.range_y(), Some(Range::new(1.0, 1.0)));
}

#[test]
fn constant_run_round_trips_through_compression() {
    let mut series = Timeseries::new();
    for i in 0..2000 {
        series.push_back(Point::new(i as f64, 7.5));
    }
    // The first value chunk sealed as a constant run.
    assert!(series.data().values().chunk_handle(0).unwrap().is_compressed());
    for i in 0..2000 {
        assert_eq!(series.at(i).map(|p| p.y), Some(7.5), "index {i}");
    }

    // Writing one interior value must decompress, not corrupt.
    assert_eq!(series.data_mut().set_value(500, -1.0), Some(7.5));
    for i in 0..2000 {
        let expected = if i == 500 { -1.0 } else { 7.5 };
        assert_eq!(series.at(i).map(|p| p.y), Some(expected), "index {i}");
    }
    assert_eq!(series.range_y(), Some(Range::new(-1.0, 7.5)));
}

#[test]
fn cloned_series_survives_source_mutation() {
    let mut source = Timeseries::new();
    for i in 0..(CHUNK_CAPACITY + 100) {
        source.push_back(Point::new(i as f64, i as f64));
    }
    let snapshot = source.data().clone_points();
    assert!(snapshot.shares_timestamps_with(source.data()));

    // Mutate a chunk that the snapshot shares.
    source.data_mut().set_value(10, 999.0);
    for _ in 0..50 {
        source.pop_front();
    }

    assert_eq!(snapshot.at(10), Some(Point::new(10.0, 10.0)));
    assert_eq!(snapshot.at(0), Some(Point::new(0.0, 0.0)));
    assert_eq!(snapshot.len(), CHUNK_CAPACITY + 100);
}

#[test]
fn sliding_window_keeps_recent_span() {
    let mut series = Timeseries::new();
    series.set_maximum_range_x(10.0);
    for x in 0..=20 {
        series.push_back(Point::new(x as f64, x as f64));
    }
    let range = series.range_x().unwrap();
    assert!(range.span() <= 10.0);
    assert_eq!(range.max, 20.0);
    assert!(series.len() >= 2);
}

#[test]
fn range_stays_clean_until_an_extreme_leaves() {
    let mut series = PlotSeries::new();
    for x in [1.0, 5.0, 3.0, 8.0, 9.0] {
        series.push_back(Point::new(x, 0.0));
    }
    assert_eq!(series.range_x(), Some(Range::new(1.0, 9.0)));

    // Removing the tracked minimum forces the recompute path.
    let popped = series.pop_front().unwrap();
    assert_eq!(popped.x, 1.0);
    assert_eq!(series.range_x(), Some(Range::new(3.0, 9.0)));
}

#[test]
fn common_clock_ingestion_dedupes_timestamp_chunks() {
    let mut dataset = DataSet::new();
    for i in 0..=CHUNK_CAPACITY {
        dataset.push_sample("motor.rpm", i as f64, 1.0);
        dataset.push_sample("motor.temp", i as f64, 40.0);
    }

    let rpm = dataset.get_numeric("motor.rpm").unwrap();
    let temp = dataset.get_numeric("motor.temp").unwrap();
    assert!(rpm.data().shares_timestamps_with(temp.data()));
    assert_eq!(dataset.registry().len(), 1);

    let handle = rpm.data().timestamps().chunk_handle(0).unwrap();
    assert_eq!(Arc::strong_count(handle), 3);

    // Either series can evict without corrupting the other.
    dataset.get_numeric_mut("motor.rpm").unwrap().pop_front();
    let rpm = dataset.get_numeric("motor.rpm").unwrap();
    let temp = dataset.get_numeric("motor.temp").unwrap();
    assert_eq!(rpm.at(0).unwrap().x, 1.0);
    assert_eq!(temp.at(0).unwrap().x, 0.0);
    assert_eq!(temp.len(), CHUNK_CAPACITY + 1);
}

#[test]
fn nan_samples_vanish_silently() {
    let mut dataset = DataSet::new();
    assert!(!dataset.push_sample("s", f64::NAN, 1.0));
    assert!(!dataset.push_sample("s", 0.0, f64::NEG_INFINITY));
    assert!(dataset.push_sample("s", 0.0, 1.0));
    assert_eq!(dataset.get_numeric("s").unwrap().len(), 1);
}

#[test]
fn string_feed_interned_and_ordered() {
    let mut dataset = DataSet::new();
    let mode = "closed-loop velocity control active";
    dataset.push_string_sample("mode", 1.0, mode);
    dataset.push_string_sample("mode", 0.0, "init");
    dataset.push_string_sample("mode", 2.0, mode);
    dataset.push_string_sample("mode", 3.0, "");

    let series = dataset.get_string("mode").unwrap();
    assert_eq!(series.len(), 3);
    assert_eq!(series.at(0).unwrap().y.as_str(), "init");
    assert_eq!(series.at(1).unwrap().y.as_str(), mode);
    assert_eq!(series.interned_count(), 1);
    assert_eq!(series.y_from_x(1.9).unwrap().as_str(), mode);
}
