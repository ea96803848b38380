use approx::assert_abs_diff_eq;
use sensor_models::locate;
use tracker_core::output::round_up;
use tracker_core::{IngestOutcome, Pipeline, PipelineConfig, PositionUpdate, TrackIndex};

fn unfiltered(baseline: f64) -> PipelineConfig {
    PipelineConfig {
        anchor_baseline: baseline,
        left_anchor: "83".into(),
        right_anchor: "84".into(),
        use_kalman: false,
        use_rolling: false,
        ..Default::default()
    }
}

#[test]
fn two_records_give_exact_trilateration() {
    let mut pipeline = Pipeline::new(unfiltered(5.0)).unwrap();
    let mut out: Vec<PositionUpdate> = Vec::new();

    pipeline.ingest("83,4.0,AA:BB", &mut out);
    assert!(out.is_empty());
    pipeline.ingest("84,3.0,AA:BB", &mut out);
    assert_eq!(out.len(), 1);

    // left range feeds the far anchor, right range the origin anchor
    let expected = locate(4.0, 3.0, 5.0);
    let update = &out[0];
    assert_eq!(update.track, TrackIndex(0));
    assert_eq!(update.identifier, "AA:BB");
    assert_eq!(update.x, round_up(expected.x, 2));
    assert_eq!(update.y, round_up(expected.y, 2));
    assert_eq!(update.x, 1.8);
    assert_eq!(update.y, 2.4);
    assert_abs_diff_eq!(update.left_range, 4.0, epsilon = 1e-12);
    assert_abs_diff_eq!(update.right_range, 3.0, epsilon = 1e-12);
}

#[test]
fn filtered_pipeline_settles_on_static_tag() {
    let cfg = PipelineConfig {
        rolling_window: 5,
        position_decimals: 6,
        ..unfiltered(5.0)
    };
    let mut pipeline = Pipeline::new(PipelineConfig {
        use_kalman: true,
        use_rolling: true,
        ..cfg
    })
    .unwrap();

    let mut last = None;
    let mut sink = |u: &PositionUpdate| last = Some((u.x, u.y));
    for _ in 0..200 {
        pipeline.ingest("83,4.0,T", &mut sink);
        pipeline.ingest("84,3.0,T", &mut sink);
    }
    let (x, y) = last.unwrap();
    assert_abs_diff_eq!(x, 1.8, epsilon = 1e-3);
    assert_abs_diff_eq!(y, 2.4, epsilon = 1e-3);
}

#[test]
fn many_tags_keep_first_seen_indices() {
    let mut pipeline = Pipeline::new(unfiltered(5.0)).unwrap();
    let mut out: Vec<PositionUpdate> = Vec::new();
    let ids = ["c", "a", "b"];
    for id in ids {
        pipeline.ingest(&format!("83,4.0,{id}"), &mut out);
    }
    for id in ids.iter().rev() {
        let outcome = pipeline.ingest(&format!("84,3.0,{id}"), &mut out);
        assert!(matches!(outcome, IngestOutcome::Emitted(_)));
    }
    let order: Vec<usize> = out.iter().map(|u| u.track.0).collect();
    assert_eq!(order, vec![2, 1, 0]);
    assert_eq!(pipeline.stats.new_tracks, 3);
    assert_eq!(pipeline.stats.emitted, 3);
}

#[test]
fn config_file_round_trip() {
    let dir = std::env::temp_dir().join(format!("uwb-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("pipeline.json");
    let cfg = unfiltered(6.5);
    std::fs::write(&path, serde_json::to_string_pretty(&cfg).unwrap()).unwrap();
    let loaded = PipelineConfig::from_json_file(&path).unwrap();
    assert_eq!(loaded, cfg);
    std::fs::remove_dir_all(&dir).ok();
}
