use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::{Duration, Utc};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};

use folio_api::config::ApiConfig;
use folio_api::infra::mail::{LogMailer, MailTransport};
use folio_api::router::build_router;
use folio_api::state::AppState;
use folio_api::usecase::session::issue_session_token;
use folio_core::config::Config;

use crate::helpers::{TEST_JWT_SECRET, test_user};

fn server(extra: &[(&str, &str)]) -> TestServer {
    let mut vars = vec![
        ("DATABASE_URL".to_owned(), "postgres://localhost/folio".to_owned()),
        ("JWT_SECRET".to_owned(), TEST_JWT_SECRET.to_owned()),
        ("CONTACT_EMAIL".to_owned(), "hello@example.com".to_owned()),
        ("CONTACT_LOCATION".to_owned(), "Kraków".to_owned()),
    ];
    vars.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));
    let config = ApiConfig::from_iter(vars).unwrap();
    let state = AppState::new(
        DatabaseConnection::Disconnected,
        config,
        MailTransport::Log(LogMailer),
    );
    TestServer::new(build_router(state)).unwrap()
}

#[tokio::test]
async fn should_report_liveness_without_store() {
    let response = server(&[]).get("/health/live").await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "ok");
}

#[tokio::test]
async fn should_report_unavailable_when_store_unreachable() {
    let server = server(&[]);

    for path in ["/health", "/health/ready"] {
        let response = server.get(path).await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        let body = response.json::<Value>();
        assert_eq!(body["status"], "unavailable");
        assert_eq!(body["database"], "down");
    }
}

#[tokio::test]
async fn should_stamp_request_id() {
    let response = server(&[]).get("/health/live").await;

    let id = response.headers()["x-request-id"].to_str().unwrap().to_owned();
    assert!(uuid::Uuid::parse_str(&id).is_ok());
}

#[tokio::test]
async fn should_reject_secure_contact_without_token() {
    let response = server(&[]).get("/secure/contact").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["kind"], "INVALID_TOKEN");
}

#[tokio::test]
async fn should_reject_secure_contact_with_foreign_token() {
    let (token, _) = issue_session_token(
        &test_user(),
        "another-secret-another-secret-0000",
        Duration::hours(1),
    )
    .unwrap();

    let response = server(&[])
        .get("/secure/contact")
        .authorization_bearer(token)
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_serve_contact_info_to_signed_in_visitor() {
    let (token, expires_at) =
        issue_session_token(&test_user(), TEST_JWT_SECRET, Duration::hours(1)).unwrap();
    assert!(expires_at > Utc::now());

    let response = server(&[])
        .get("/secure/contact")
        .authorization_bearer(token)
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["email"], "hello@example.com");
    assert_eq!(body["location"], "Kraków");
    assert!(body.get("phone").is_none());
}

#[tokio::test]
async fn should_return_validation_error_body() {
    let response = server(&[])
        .post("/auth/request-code")
        .json(&json!({ "email": "not-an-email" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["kind"], "VALIDATION");
    assert_eq!(body["message"], "Nieprawidłowy adres e-mail.");
}

#[tokio::test]
async fn should_map_missing_body_field_to_validation() {
    let response = server(&[])
        .post("/auth/verify")
        .json(&json!({ "email": "a@b.com" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["kind"], "VALIDATION");
    assert_eq!(body["message"], "Nieprawidłowe dane żądania.");
}

#[tokio::test]
async fn should_map_unparseable_bodies_to_validation() {
    let server = server(&[]);

    let broken = server
        .post("/contact")
        .text("{\"name\": ")
        .content_type("application/json")
        .await;
    broken.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(broken.json::<Value>()["kind"], "VALIDATION");

    let plain = server.post("/users").text("email=a@b.com").await;
    plain.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(plain.json::<Value>()["kind"], "VALIDATION");
}

#[tokio::test]
async fn should_rate_limit_write_endpoints() {
    let server = server(&[("RATE_LIMIT_MAX_REQUESTS", "2")]);
    let request = json!({ "email": "bad", "code": "123456" });

    for _ in 0..2 {
        server
            .post("/auth/verify")
            .json(&request)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
    let limited = server.post("/auth/verify").json(&request).await;

    limited.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(limited.json::<Value>()["kind"], "RATE_LIMITED");
    assert!(limited.headers().contains_key("retry-after"));

    // Other paths keep their own window.
    server
        .post("/contact")
        .json(&json!({ "name": "", "email": "a@example.com", "message": "hi" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
