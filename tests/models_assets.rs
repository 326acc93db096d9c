mod support;

use std::sync::Arc;

use dagma::{AssetKey, Definitions, PipelineError, Resources};
use serde_json::json;
use tracking::{RunId, StubTracker, TrackingError};

#[tokio::test]
async fn train_job_with_stub_override() {
    let tmp = tempfile::tempdir().unwrap();
    let config = support::offline_config(tmp.path());
    let tracker = Arc::new(StubTracker::with_tracking_uri(Some("file://stub".into())));
    let resources = Resources::from_config(&config)
        .unwrap()
        .with_tracker(tracker.clone());
    let defs = Definitions::new(resources);

    let run = defs.materialize_job("run_models_train_job").await.unwrap();
    assert!(run.success());

    let payload = run.output_for("train_model_stub").unwrap();
    assert_eq!(payload["status"], json!("ok"));
    assert_eq!(payload["run_id"], json!("run-1"));

    let tracked = tracker.run(&RunId::from("run-1")).unwrap();
    assert!(!tracked.active);
    assert_eq!(tracked.params["n_estimators"], json!(10));
    assert_eq!(tracked.metrics["rmse"], 0.123);
    assert_eq!(tracked.artifacts.len(), 1);
    assert!(tracked.artifacts[0].starts_with(tmp.path().join("artifacts")));
}

#[tokio::test]
async fn repeated_runs_get_sequential_ids() {
    let tmp = tempfile::tempdir().unwrap();
    let config = support::offline_config(tmp.path());
    let tracker = Arc::new(StubTracker::new());
    let defs = Definitions::new(
        Resources::from_config(&config)
            .unwrap()
            .with_tracker(tracker.clone()),
    );

    for expected in ["run-1", "run-2"] {
        let run = defs.materialize(&[AssetKey::TrainModelStub]).await.unwrap();
        assert_eq!(run.output_for("train_model_stub").unwrap()["run_id"], json!(expected));
    }
    assert_eq!(tracker.runs().len(), 2);
    assert!(tracker.active_run().is_none());
}

#[tokio::test]
async fn unbound_tracking_server_fails_the_asset() {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = support::offline_config(tmp.path());
    config.tracking.use_tracking = true;
    config.tracking.tracking_uri = None;
    let defs = support::definitions(&config);

    let run = defs
        .materialize(&[AssetKey::RawNumbers, AssetKey::TrainModelStub])
        .await
        .unwrap();

    assert!(!run.success());
    let (asset, err) = run.failure().unwrap();
    assert_eq!(asset, AssetKey::TrainModelStub);
    assert!(matches!(
        err,
        PipelineError::Tracking(TrackingError::ClientUnavailable(_))
    ));
    // Assets before the failure keep their outputs.
    assert_eq!(run.output_for("raw_numbers"), Some(&json!([1, 2, 3])));
    assert!(run.into_result().is_err());
}
