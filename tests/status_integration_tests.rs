use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::get,
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use mmrates_backend::handlers::status::health;

/// The liveness endpoint needs no database or upstream access.
fn build_health_router() -> Router {
    Router::new().route("/health", get(health))
}

#[tokio::test]
async fn test_health_reports_ok_with_timestamp() {
    let app = build_health_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["ok"], true);
    let time = json["time"].as_str().expect("time present");
    assert!(
        chrono::DateTime::parse_from_rfc3339(time).is_ok(),
        "time should be RFC 3339, got {time}"
    );
}
