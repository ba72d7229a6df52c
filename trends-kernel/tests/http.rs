use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;
use trends_devkit::fixtures::flat;
use trends_devkit::FleetFixture;
use trends_kernel::http::{build_router, AppState};

fn router(fleet: &FleetFixture) -> Router {
    build_router(AppState::new(fleet.orchestrator()))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_health_is_plain_ok() {
    let fleet = FleetFixture::new(&["ld"]);
    let response = router(&fleet)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
    // pas de passage de scoring
    assert!(fleet.gateway.calls().is_empty());
}

#[tokio::test]
async fn test_summary_document() {
    let fleet = FleetFixture::new(&["ld", "hk"])
        .with_cluster("ld", &[("esx1", vec![100.0, 100.0])])
        .with_cluster("hk", &[("esx2", flat(10.0, 10))]);

    let (status, body) = get(router(&fleet), "/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["cluster_states"],
        serde_json::json!([":red_circle: *LD*", ":large_green_circle: *HK*"])
    );
    assert!(body.get("failures").is_none());
}

#[tokio::test]
async fn test_trends_document() {
    let fleet = FleetFixture::new(&["hk"]).with_cluster("hk", &[("esx2", flat(12.5, 10))]);

    let (status, body) = get(router(&fleet), "/trends").await;
    assert_eq!(status, StatusCode::OK);

    let clusters = body["clusters"].as_array().unwrap();
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0]["status_emoji"], ":large_green_circle:");
    assert_eq!(clusters[0]["cluster_name"], "HK");
    let message = clusters[0]["cluster_message"].as_str().unwrap();
    assert!(message.ends_with("*12.50%*."));
}

#[tokio::test]
async fn test_partial_run_is_ok_with_failures() {
    let fleet = FleetFixture::new(&["sg3", "hk"])
        .without_hosts("sg3")
        .with_cluster("hk", &[("esx2", flat(10.0, 10))]);

    let (status, body) = get(router(&fleet), "/trends").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["clusters"].as_array().unwrap().len(), 1);
    assert_eq!(body["failures"][0]["cluster"], "SG3");
    assert_eq!(body["failures"][0]["error"], "no_hosts_found");
    assert_eq!(body["failures"][0]["message"], "no hosts found for sg3 cluster");
}

#[tokio::test]
async fn test_all_clusters_failed_is_bad_gateway() {
    let fleet = FleetFixture::new(&["sg3", "mi"]).without_hosts("sg3");
    // "mi" n'est pas scripté: erreur backend

    let (status, body) = get(router(&fleet), "/summary").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["cluster_states"].as_array().unwrap().is_empty());
    assert_eq!(body["failures"].as_array().unwrap().len(), 2);
    assert_eq!(body["failures"][1]["error"], "backend_query_failed");
}

#[tokio::test]
async fn test_system_health_tracks_runs() {
    let fleet = FleetFixture::new(&["sg3", "hk"])
        .without_hosts("sg3")
        .with_cluster("hk", &[("esx2", flat(10.0, 10))]);
    let app = router(&fleet);

    let (_, before) = get(app.clone(), "/system/health").await;
    assert_eq!(before["runs_total"], 0);
    assert!(before["last_run_at"].is_null());

    get(app.clone(), "/summary").await;

    let (status, after) = get(app, "/system/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(after["runs_total"], 1);
    assert_eq!(after["runs_partial"], 1);
    assert_eq!(after["last_run_scored"], 1);
    assert_eq!(after["last_run_failed"], serde_json::json!(["sg3"]));
    assert!(after["last_run_at"].is_string());
}
