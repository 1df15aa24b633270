use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::get,
    Router,
};
use serde_json::Value as JsonValue;
use talentgate_backend::error::{Error, Result};
use tower::ServiceExt;

async fn locked() -> Result<&'static str> {
    Err(Error::AccountLocked)
}

async fn duplicate() -> Result<&'static str> {
    Err(Error::DuplicateApplication)
}

async fn gone() -> Result<&'static str> {
    Err(Error::DeadlinePassed)
}

fn app() -> Router {
    Router::new()
        .route("/health", get(talentgate_backend::routes::health::health))
        .route("/locked", get(locked))
        .route("/duplicate", get(duplicate))
        .route("/gone", get(gone))
}

async fn body_json(response: axum::response::Response) -> JsonValue {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn health_answers_ok() {
    let res = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn errors_reach_the_wire_as_the_fixed_envelope() {
    let res = app()
        .oneshot(Request::builder().uri("/locked").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::LOCKED);
    let body = body_json(res).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "account_locked");
    assert!(body["message"].as_str().unwrap().contains("locked"));

    let res = app()
        .oneshot(Request::builder().uri("/duplicate").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = body_json(res).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "duplicate_application");

    let res = app()
        .oneshot(Request::builder().uri("/gone").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::GONE);
    let body = body_json(res).await;
    assert_eq!(body["error"], "deadline_passed");
}
