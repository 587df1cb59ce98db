//!
//! teamdash HTTP server
//! --------------------
//! Axum router for the dashboard with the authorization gate installed as a
//! middleware layer in front of every route.
//!
//! Responsibilities:
//! - Exclusion filter for framework assets and images, checked before the gate.
//! - Dual-session gate: executive marker cookie or primary session refresh.
//! - Executive login/logout, which issue and clear the marker cookie.
//! - Placeholder dashboard and login pages.

use std::sync::Arc;

use anyhow::Context;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{middleware, Router};
use tracing::info;

use crate::config::ServerConfig;
use crate::gate::{AuthorizationGate, ExclusionFilter, ExecutiveZone, SessionRefresher};
use crate::identity::{GoTrueProvider, ProviderSessionRefresher};

pub mod executive;
pub mod gatekeeper;

/// Shared server state injected into the gate middleware and handlers.
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<AuthorizationGate>,
    pub exclusions: Arc<ExclusionFilter>,
    pub executive: Arc<executive::ExecutiveLogin>,
}

impl AppState {
    pub fn new(cfg: &ServerConfig, refresher: Arc<dyn SessionRefresher>) -> anyhow::Result<Self> {
        let exclusions = ExclusionFilter::standard().context("While compiling the gate exclusion pattern")?;
        let gate = AuthorizationGate::new(cfg.executive.clone(), refresher);
        let executive = executive::ExecutiveLogin {
            zone: cfg.executive.clone(),
            passcode_hash: cfg.executive_passcode_hash.clone(),
            ttl_secs: cfg.executive_session_ttl_secs,
            secure_cookies: cfg.secure_cookies,
        };
        Ok(Self { gate: Arc::new(gate), exclusions: Arc::new(exclusions), executive: Arc::new(executive) })
    }

    pub fn executive_zone(&self) -> &ExecutiveZone {
        self.gate.executive_zone()
    }
}

/// All routes, wrapped by the gate. Every request, including unmatched ones,
/// passes through `gatekeeper::authorize` first.
pub fn router(state: AppState) -> Router {
    let zone = state.executive_zone().clone();
    let namespace = zone.namespace.trim_end_matches('/').to_string();
    Router::new()
        .route("/", get(dashboard_page))
        .route("/dashboard", get(dashboard_page))
        .route("/login", get(login_page))
        .route(&zone.login_path, get(executive::login_page).post(executive::login))
        .route(&format!("{namespace}/logout"), post(executive::logout))
        .route(&namespace, get(executive::home_page))
        .route(&format!("{namespace}/{{*rest}}"), get(executive::home_page))
        .layer(middleware::from_fn_with_state(state.clone(), gatekeeper::authorize))
        .with_state(state)
}

/// Build the provider-backed gate from configuration and serve until shutdown.
pub async fn run(cfg: ServerConfig) -> anyhow::Result<()> {
    info!(target: "startup", "teamdash starting: {}", cfg.redacted_summary());

    let provider = GoTrueProvider::new(&cfg.auth_url, &cfg.auth_anon_key, cfg.auth_timeout)
        .with_context(|| format!("While building identity provider client for {}", cfg.auth_url))?;
    let refresher = ProviderSessionRefresher::new(Arc::new(provider), cfg.primary.clone());
    let state = AppState::new(&cfg, Arc::new(refresher))?;
    if cfg.executive_passcode_hash.is_none() {
        tracing::warn!("TEAMDASH_EXECUTIVE_PASSCODE_HASH unset; executive login disabled");
    }

    let app = router(state);
    let addr = cfg.listen_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Starting server on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn dashboard_page() -> Html<&'static str> {
    Html("<!doctype html><title>Team dashboard</title><h1>Team dashboard</h1>")
}

async fn login_page() -> Html<&'static str> {
    Html("<!doctype html><title>Sign in</title><h1>Sign in</h1>")
}
