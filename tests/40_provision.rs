//! Provisioning endpoints end to end: bridge server in a child process,
//! mock platform served in-process, wired together via BASE_URL.

mod common;

use std::time::Duration;

use anyhow::Result;
use axum::http::StatusCode as AxStatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use reqwest::StatusCode;
use serde_json::json;

async fn serve_mock(router: Router) -> Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("mock platform");
    });
    Ok(format!("http://{}", addr))
}

async fn spawn_bridge(base_url: &str) -> Result<common::TestServer> {
    let server = common::TestServer::spawn_with_env(&[
        ("BASE_URL", base_url),
        ("ADMIN_USERNAME", "admin"),
        ("ADMIN_PASSWORD", "secret"),
    ])?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

fn user_payload() -> serde_json::Value {
    json!({
        "username": "jdoe",
        "active": true,
        "email": "jdoe@example.com",
        "password": "s3cret",
        "first_name": "Jane",
        "last_name": "Doe",
        "roles": [3]
    })
}

#[tokio::test]
async fn create_user_is_forwarded_and_upstream_body_echoed() -> Result<()> {
    let mock = Router::new()
        .route(
            "/api/v1/security/login",
            post(|| async { Json(json!({"access_token": "test-token"})) }),
        )
        .route(
            "/api/v1/security/csrf_token/",
            get(|| async { Json(json!({"result": "csrf-token"})) }),
        )
        .route(
            "/api/v1/security/users/",
            post(|| async { (AxStatusCode::CREATED, Json(json!({"id": 42}))) }),
        );
    let base_url = serve_mock(mock).await?;
    let bridge = spawn_bridge(&base_url).await?;

    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/create/user", bridge.base_url))
        .json(&user_payload())
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["status"], "success");
    assert_eq!(body["response"]["id"], 42);
    Ok(())
}

#[tokio::test]
async fn failed_upstream_login_maps_to_502_auth_error() -> Result<()> {
    let mock = Router::new().route(
        "/api/v1/security/login",
        post(|| async {
            (
                AxStatusCode::UNAUTHORIZED,
                Json(json!({"message": "Not authorized"})),
            )
        }),
    );
    let base_url = serve_mock(mock).await?;
    let bridge = spawn_bridge(&base_url).await?;

    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/create/user", bridge.base_url))
        .json(&user_payload())
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "UPSTREAM_AUTH_ERROR");
    assert_eq!(body["upstream_status"], 401);
    assert_eq!(body["upstream_body"]["message"], "Not authorized");
    Ok(())
}

#[tokio::test]
async fn rejected_database_creation_maps_to_502_request_error() -> Result<()> {
    let mock = Router::new()
        .route(
            "/api/v1/security/login",
            post(|| async { Json(json!({"access_token": "test-token"})) }),
        )
        .route(
            "/api/v1/database/",
            post(|| async {
                (
                    AxStatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({"message": {"sqlalchemy_uri": ["Invalid connection string"]}})),
                )
            }),
        );
    let base_url = serve_mock(mock).await?;
    let bridge = spawn_bridge(&base_url).await?;

    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/create/database", bridge.base_url))
        .json(&json!({
            "database_name": "examples",
            "driver": "psycopg2",
            "engine": "postgresql",
            "sqlalchemy_uri": "not-a-uri"
        }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "UPSTREAM_REQUEST_ERROR");
    assert_eq!(body["upstream_status"], 422);
    Ok(())
}
