use auction_market::config::AppConfig;
use auction_market::database::DatabaseManager;
use auction_market::handlers;
use auction_market::state::AppState;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Router wired to a lazy pool: requests that are rejected before touching
/// the database (routing, auth, validation) can be exercised without one.
fn test_app() -> axum::Router {
    let config = AppConfig {
        database_url: "postgres://localhost/auction_market_unused".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        jwt_secret: "integration-test-secret-32-chars!".to_string(),
        upload_dir: "target/test-uploads".into(),
        admin_email: "admin@auction.com".to_string(),
        admin_password: "admin123".to_string(),
    };
    let db = DatabaseManager::connect_lazy(&config.database_url).expect("lazy pool");
    handlers::router(AppState::new(Arc::new(db), Arc::new(config)))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn unknown_route_is_404() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/definitely-not-a-route")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn protected_route_without_token_is_401() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/notifications")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn garbage_bearer_token_is_401() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/close-ended")
                .header(header::AUTHORIZATION, "Bearer not-a-real-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_bearer_authorization_is_401() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/bid")
                .header(header::AUTHORIZATION, "Basic dXNlcjpwdw==")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"auction_id": 1, "amount": 1001}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_with_short_password_is_rejected() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({
                        "username": "alice",
                        "email": "alice@example.com",
                        "password": "abc",
                        "role": "buyer"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION");
}

#[tokio::test]
async fn nobody_registers_as_admin() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({
                        "username": "mallory",
                        "email": "mallory@example.com",
                        "password": "hunter22",
                        "role": "admin"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION");
}
