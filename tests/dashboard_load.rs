//! End-to-end loading: artifacts on disk through to the dashboard view.

use std::fs;
use std::path::Path;

use border_forecast::dashboard::{load_dashboard, DashboardView, Layout};
use border_forecast::event::EventKind;
use border_forecast::fetch::{prediction_path, ArtifactFetcher, DirSource, METADATA_PATH};
use border_forecast::outlier::Direction;
use chrono::{Duration, FixedOffset, Utc};
use serde_json::{json, Value};
use tempfile::TempDir;

const STEPS: usize = 10;

fn write(root: &Path, rel: &str, body: &Value) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body.to_string()).unwrap();
}

fn write_metadata(root: &Path, event_type: i64, start_offset_days: i64, end_offset_days: i64) {
    let jst = FixedOffset::east_opt(9 * 3600).unwrap();
    let now = Utc::now().with_timezone(&jst);
    write(
        root,
        METADATA_PATH,
        &json!({
            "EventId": 312,
            "EventName": "Test Event",
            "EventType": event_type,
            "StartAt": (now + Duration::days(start_offset_days)).to_rfc3339(),
            "EndAt": (now + Duration::days(end_offset_days)).to_rfc3339(),
        }),
    );
}

/// Target rises 1000 per step; one neighbor is the target times
/// `neighbor_factor`, the optional short neighbor is resampled and scaled.
fn write_prediction(root: &Path, subject_id: u32, border: u32, neighbor_factor: f64, with_short: bool) {
    let raw: Vec<f64> = (0..STEPS).map(|i| 1000.0 * (i + 1) as f64).collect();
    let neighbor: Vec<f64> = raw.iter().map(|v| v * neighbor_factor).collect();
    let mut neighbors = json!({
        "298": {"name": "Earlier Event", "id": 298, "raw_length": STEPS, "curve": neighbor}
    });
    if with_short {
        neighbors["280"] = json!({"name": "Short Event", "id": 280, "raw_length": 5,
                                  "curve": [0.0, 100.0, 200.0, 300.0, 400.0]});
    }
    write(
        root,
        &prediction_path(subject_id, border),
        &json!({
            "event_id": 312,
            "subject_id": subject_id,
            "border": border,
            "last_known_step_index": 4,
            "raw_target": raw,
            "normalized_target": raw,
            "neighbors": neighbors,
            "intervals": {
                "4": {"p75": [4900.0, 5100.0], "p90": [4800.0, 5200.0]},
                "9": {"p75": [9000.0, 11000.0], "p90": [8500.0, 11500.0]}
            }
        }),
    );
}

fn fetcher(dir: &TempDir) -> ArtifactFetcher<DirSource> {
    ArtifactFetcher::new(Box::new(DirSource::new(dir.path())))
}

#[tokio::test]
async fn test_standard_event_shows_two_tabs() {
    let dir = TempDir::new().unwrap();
    write_metadata(dir.path(), 3, -2, 5);
    write_prediction(dir.path(), 0, 100, 0.9, true);
    write_prediction(dir.path(), 0, 2500, 0.9, true);

    let view = load_dashboard(&fetcher(&dir), &Utc::now()).await;
    assert_eq!(view.layout(), Layout::TwoTab);
    assert_eq!(view.tab_labels(), vec!["Rank 100", "Rank 2500"]);

    let DashboardView::Standard { event, tabs } = &view else {
        panic!("expected standard layout");
    };
    assert_eq!(event.name, "Test Event");
    assert_eq!(tabs.len(), 2);

    let rank100 = tabs[0].series.as_ref().unwrap();
    assert_eq!(rank100.len(), STEPS);
    // the short neighbor is resampled onto this event's length
    assert_eq!(rank100.neighbors["280"].curve.len(), STEPS);
    assert!(rank100.bands.is_some());

    let summaries = view.summaries();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].label, "Event");
    assert_eq!(summaries[0].latest_observed, Some(5000.0));
    assert_eq!(summaries[0].final_prediction, Some(10000.0));
    // one neighbor below the target, the scaled short one above it
    assert!(!summaries[0].outlier.is_outlier);
}

#[tokio::test]
async fn test_missing_tab_artifact_leaves_tab_empty() {
    let dir = TempDir::new().unwrap();
    write_metadata(dir.path(), 11, -1, 6);
    write_prediction(dir.path(), 0, 2500, 0.9, true);

    let view = load_dashboard(&fetcher(&dir), &Utc::now()).await;
    let DashboardView::Standard { tabs, .. } = view else {
        panic!("expected standard layout");
    };
    assert!(tabs[0].series.is_none());
    assert!(tabs[1].series.is_some());
}

#[tokio::test]
async fn test_per_subject_event_omits_failed_subjects() {
    let dir = TempDir::new().unwrap();
    write_metadata(dir.path(), 5, -3, 4);
    write_prediction(dir.path(), 1, 100, 0.9, true);
    write_prediction(dir.path(), 2, 100, 0.9, true);
    write_prediction(dir.path(), 7, 1000, 0.9, true);
    write(dir.path(), &prediction_path(3, 100), &json!({"broken": true}));

    let f = fetcher(&dir);
    let set = f.fetch_all(EventKind::PerSubjectMultiBorder, Some(7.0)).await;
    assert_eq!(set.loaded(), 3);
    assert_eq!(set.omitted.len(), 52 * 2 - 3);
    assert!(set.get(100, 1).is_some());
    assert!(set.get(1000, 7).is_some());
    assert!(set.get(100, 3).is_none());

    let view = load_dashboard(&f, &Utc::now()).await;
    assert_eq!(view.layout(), Layout::PerSubject);
    assert_eq!(view.tab_labels(), vec!["Rank 100", "Rank 1000"]);
    let DashboardView::PerSubject { groups, .. } = &view else {
        panic!("expected per-subject layout");
    };
    assert_eq!(groups[0].subjects.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(groups[1].subjects.len(), 1);
}

#[tokio::test]
async fn test_high_target_is_flagged() {
    let dir = TempDir::new().unwrap();
    write_metadata(dir.path(), 3, -2, 5);
    write_prediction(dir.path(), 0, 100, 0.5, false);
    write_prediction(dir.path(), 0, 2500, 2.0, false);

    let summaries = load_dashboard(&fetcher(&dir), &Utc::now()).await.summaries();
    assert_eq!(summaries[0].outlier.direction, Some(Direction::High));
    assert_eq!(summaries[1].outlier.direction, Some(Direction::Low));
    assert_eq!(summaries[0].outlier.checked_indices, 3);
}

#[tokio::test]
async fn test_missing_metadata_shows_placeholder() {
    let dir = TempDir::new().unwrap();
    let view = load_dashboard(&fetcher(&dir), &Utc::now()).await;
    assert_eq!(view.layout(), Layout::Placeholder);
    assert!(view.series().is_empty());
    assert!(view.tab_labels().is_empty());
}

#[tokio::test]
async fn test_unknown_event_type_shows_placeholder() {
    let dir = TempDir::new().unwrap();
    write_metadata(dir.path(), 99, -2, 5);
    write_prediction(dir.path(), 0, 100, 0.9, true);
    let view = load_dashboard(&fetcher(&dir), &Utc::now()).await;
    let DashboardView::NoActiveEvent { reason } = view else {
        panic!("expected placeholder");
    };
    assert!(reason.contains("99"));
}

#[tokio::test]
async fn test_finished_event_shows_placeholder() {
    let dir = TempDir::new().unwrap();
    write_metadata(dir.path(), 3, -9, -2);
    write_prediction(dir.path(), 0, 100, 0.9, true);
    let view = load_dashboard(&fetcher(&dir), &Utc::now()).await;
    assert_eq!(view.layout(), Layout::Placeholder);
}
