//! End-to-end contract tests for the detector facade, driven through
//! the scripted stub module.

use adla_detect::{
    DetectError, Detection, DetectorConfig, DetectorState, NpuDetector, RawDetection,
    StubModule, MAX_DETECTIONS, RESULT_CAPACITY,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn config() -> DetectorConfig {
    DetectorConfig::new("/models/det.adla", 4, 4)
}

fn tensor() -> Vec<u8> {
    vec![0u8; 4 * 4 * 3]
}

fn record(score: f32, class: f32) -> RawDetection {
    RawDetection {
        ymin: 0.1,
        xmin: 0.2,
        ymax: 0.5,
        xmax: 0.6,
        score,
        object_class: class,
    }
}

#[test]
fn detect_always_returns_exactly_max_detections_rows() {
    init_logging();
    for scripted in [0usize, 1, 5, 25] {
        let records: Vec<RawDetection> =
            (0..scripted).map(|i| record(0.9, i as f32)).collect();
        let module = StubModule::new().with_records(records);
        let mut detector = NpuDetector::open(&config(), Box::new(module)).unwrap();

        let out = detector.detect(&tensor());
        assert_eq!(out.table.rows().len(), MAX_DETECTIONS);
    }
}

#[test]
fn zero_reported_records_yield_all_zero_rows() {
    init_logging();
    let mut detector =
        NpuDetector::open(&config(), Box::new(StubModule::new())).unwrap();

    let out = detector.detect(&tensor());
    assert!(out.table.rows().iter().all(Detection::is_zero));
    assert!(out.diagnostic.is_none());
}

#[test]
fn decoding_stops_at_first_sub_threshold_score() {
    init_logging();
    // Scores [0.9, 0.6, 0.3, 0.8] with threshold 0.4: the trailing 0.8
    // would pass on its own but is dropped by the truncation contract.
    let module = StubModule::new().with_records(vec![
        record(0.9, 1.0),
        record(0.6, 2.0),
        record(0.3, 3.0),
        record(0.8, 4.0),
    ]);
    let mut detector = NpuDetector::open(&config(), Box::new(module)).unwrap();

    let out = detector.detect(&tensor());
    assert_eq!(out.table.accepted(), 2);
    assert_eq!(out.table.rows()[0].class_id, 1.0);
    assert_eq!(out.table.rows()[1].class_id, 2.0);
    assert!(out.table.rows()[2].is_zero());
}

#[test]
fn never_accepts_more_than_max_detections() {
    init_logging();
    let records: Vec<RawDetection> = (0..25).map(|i| record(0.9, i as f32)).collect();
    let module = StubModule::new().with_records(records);
    let mut detector = NpuDetector::open(&config(), Box::new(module)).unwrap();

    let out = detector.detect(&tensor());
    assert_eq!(out.table.accepted(), MAX_DETECTIONS);
}

#[test]
fn oversized_reported_count_is_clamped() {
    init_logging();
    // Backend claims capacity + 5 valid slots; only two real records
    // exist. No out-of-bounds read, and only the real records decode.
    let module = StubModule::new()
        .with_records(vec![record(0.9, 1.0), record(0.8, 2.0)])
        .with_reported_count((RESULT_CAPACITY + 5) as u32);
    let mut detector = NpuDetector::open(&config(), Box::new(module)).unwrap();

    let out = detector.detect(&tensor());
    assert_eq!(out.table.accepted(), 2);
}

#[test]
fn wrong_extension_fails_without_touching_the_loader() {
    init_logging();
    let cfg = DetectorConfig::new("/models/det.onnx", 4, 4);
    let module = Box::new(StubModule::failing_load("must never be reached"));

    let err = NpuDetector::open(&cfg, module).unwrap_err();
    assert!(matches!(err, DetectError::UnsupportedFormat { .. }));
}

#[test]
fn load_failure_leaves_detector_not_ready_but_callable() {
    init_logging();
    let module = StubModule::failing_load("simulated dlopen failure");
    let mut detector = NpuDetector::open(&config(), Box::new(module)).unwrap();

    assert_eq!(detector.state(), DetectorState::NotReady);

    // detect must not fault in the degraded state.
    let out = detector.detect(&tensor());
    assert!(out.table.is_empty());
    assert!(matches!(
        out.diagnostic,
        Some(DetectError::BackendUnavailable { .. })
    ));
}

#[test]
fn record_round_trips_without_reordering_or_scaling() {
    init_logging();
    let module = StubModule::new().with_records(vec![RawDetection {
        ymin: 0.1,
        xmin: 0.2,
        ymax: 0.5,
        xmax: 0.6,
        score: 0.95,
        object_class: 3.0,
    }]);
    let mut detector = NpuDetector::open(&config(), Box::new(module)).unwrap();

    let out = detector.detect(&tensor());
    let row = out.table.rows()[0];
    assert_eq!(row.class_id, 3.0);
    assert_eq!(row.score, 0.95);
    assert_eq!(row.ymin, 0.1);
    assert_eq!(row.xmin, 0.2);
    assert_eq!(row.ymax, 0.5);
    assert_eq!(row.xmax, 0.6);
}

#[test]
fn table_shape_is_stable_across_repeated_calls() {
    init_logging();
    let module = StubModule::new().with_records(vec![record(0.9, 1.0)]);
    let mut detector = NpuDetector::open(&config(), Box::new(module)).unwrap();

    let first = detector.detect(&tensor());
    let second = detector.detect(&tensor());
    assert_eq!(first.table.rows().len(), second.table.rows().len());
    assert_eq!(first.table, second.table);
}
