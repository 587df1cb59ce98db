//! GoTrue client and primary-session refresh against an in-process mock auth
//! server bound to an ephemeral localhost port.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use teamdash::error::ProviderError;
use teamdash::gate::{CookieSnapshot, GateDecision, RequestSnapshot, SessionRefresher};
use teamdash::identity::{GoTrueProvider, IdentityProvider, PrimarySessionConfig, ProviderSessionRefresher};

const API_KEY: &str = "anon-test-key";

async fn mock_user(headers: HeaderMap) -> Response {
    if headers.get("apikey").and_then(|v| v.to_str().ok()) != Some(API_KEY) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "no api key"}))).into_response();
    }
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default();
    match bearer {
        "good-access" => Json(json!({"id": "u-1", "email": "lead@example.com", "role": "authenticated"})).into_response(),
        "garbled" => (StatusCode::OK, "not json").into_response(),
        "boom" => (StatusCode::INTERNAL_SERVER_ERROR, "upstream down").into_response(),
        _ => (StatusCode::UNAUTHORIZED, Json(json!({"message": "invalid JWT"}))).into_response(),
    }
}

async fn mock_token(Query(q): Query<HashMap<String, String>>, Json(body): Json<Value>) -> Response {
    if q.get("grant_type").map(String::as_str) != Some("refresh_token") {
        return (StatusCode::BAD_REQUEST, "unsupported grant").into_response();
    }
    match body.get("refresh_token").and_then(|v| v.as_str()) {
        Some("good-refresh") => Json(json!({
            "access_token": "rotated-access",
            "token_type": "bearer",
            "expires_in": 1800,
            "expires_at": 1900000000,
            "refresh_token": "rotated-refresh",
            "user": {"id": "u-1"}
        }))
        .into_response(),
        Some("flaky") => (StatusCode::BAD_GATEWAY, "gateway").into_response(),
        _ => (StatusCode::BAD_REQUEST, Json(json!({"error": "invalid_grant"}))).into_response(),
    }
}

async fn start_mock() -> (JoinHandle<()>, String) {
    let app = Router::new()
        .route("/auth/v1/user", get(mock_user))
        .route("/auth/v1/token", post(mock_token));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind 127.0.0.1:0");
    let addr = listener.local_addr().expect("local addr");
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("mock auth server error: {e:?}");
        }
    });
    (handle, format!("http://{addr}"))
}

fn provider(base: &str) -> GoTrueProvider {
    GoTrueProvider::new(base, API_KEY, Duration::from_secs(2)).expect("client")
}

fn req(path: &str, cookies: &[(&str, &str)]) -> RequestSnapshot {
    RequestSnapshot::new(path, CookieSnapshot::from_pairs(cookies.iter().copied()))
}

#[tokio::test]
async fn get_user_maps_statuses() {
    let (handle, base) = start_mock().await;
    let p = provider(&base);

    let user = p.get_user("good-access").await.unwrap().expect("user");
    assert_eq!(user.id, "u-1");
    assert_eq!(user.email.as_deref(), Some("lead@example.com"));

    assert!(p.get_user("expired").await.unwrap().is_none());
    assert!(matches!(p.get_user("boom").await, Err(ProviderError::UnexpectedStatus { status: 500, .. })));
    assert!(matches!(p.get_user("garbled").await, Err(ProviderError::Malformed(_))));

    let wrong_key = GoTrueProvider::new(&base, "other", Duration::from_secs(2)).unwrap();
    assert!(wrong_key.get_user("good-access").await.unwrap().is_none());
    handle.abort();
}

#[tokio::test]
async fn refresh_session_maps_statuses() {
    let (handle, base) = start_mock().await;
    let p = provider(&base);

    let pair = p.refresh_session("good-refresh").await.unwrap();
    assert_eq!(pair.access_token, "rotated-access");
    assert_eq!(pair.refresh_token, "rotated-refresh");
    assert_eq!(pair.expires_in, Some(1800));

    assert!(matches!(p.refresh_session("revoked").await, Err(ProviderError::Rejected(_))));
    assert!(matches!(p.refresh_session("flaky").await, Err(ProviderError::UnexpectedStatus { status: 502, .. })));
    handle.abort();
}

#[tokio::test]
async fn refresher_rotates_expired_session_end_to_end() {
    let (handle, base) = start_mock().await;
    let r = ProviderSessionRefresher::new(Arc::new(provider(&base)), PrimarySessionConfig::default());

    let out = r.refresh(&req("/dashboard", &[("sb-access-token", "expired"), ("sb-refresh-token", "good-refresh")])).await;
    assert!(out.is_pass());
    let cookies = out.set_cookies();
    assert_eq!(cookies[0].value, "rotated-access");
    assert_eq!(cookies[0].max_age, Some(1800));
    assert_eq!(cookies[1].value, "rotated-refresh");

    let out = r.refresh(&req("/dashboard", &[("sb-access-token", "good-access")])).await;
    assert_eq!(out, GateDecision::pass());

    let out = r.refresh(&req("/dashboard", &[("sb-refresh-token", "revoked")])).await;
    assert_eq!(out.location(), Some("/login"));
    assert!(out.set_cookies().iter().all(|c| c.is_removal()));
    handle.abort();
}

#[tokio::test]
async fn unreachable_provider_redirects_without_clearing() {
    // Reserve a port and release it so nothing is listening there.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let p = provider(&format!("http://127.0.0.1:{port}"));
    assert!(matches!(p.get_user("any").await, Err(ProviderError::Transport(_))));

    let r = ProviderSessionRefresher::new(Arc::new(p), PrimarySessionConfig::default());
    let out = r.refresh(&req("/teams", &[("sb-access-token", "a"), ("sb-refresh-token", "b")])).await;
    assert_eq!(out, GateDecision::redirect("/login"));
}
