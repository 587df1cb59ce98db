//! Executive login flow: the only place the marker cookie is issued or cleared.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use tracing::{info, warn};

use super::gatekeeper::append_set_cookies;
use super::AppState;
use crate::error::{AppError, AppResult};
use crate::gate::{ExecutiveZone, SameSite, SetCookie};
use crate::security;

const LOGIN_FORM: &str = "<!doctype html><title>Executive view</title><h1>Executive view</h1>\
<form method=\"post\"><input type=\"password\" name=\"passcode\" autofocus><button>Enter</button></form>";

const LOGIN_FORM_FAILED: &str = "<!doctype html><title>Executive view</title><h1>Executive view</h1>\
<p>Incorrect passcode.</p>\
<form method=\"post\"><input type=\"password\" name=\"passcode\" autofocus><button>Enter</button></form>";

#[derive(Debug, Clone)]
pub struct ExecutiveLogin {
    pub zone: ExecutiveZone,
    /// Argon2 PHC hash; `None` disables the login.
    pub passcode_hash: Option<String>,
    pub ttl_secs: i64,
    pub secure_cookies: bool,
}

impl ExecutiveLogin {
    fn cookie_path(&self) -> &str {
        self.zone.namespace.trim_end_matches('/')
    }

    pub fn marker_cookie(&self, token: String) -> SetCookie {
        SetCookie::new(&self.zone.marker_cookie, token)
            .path(self.cookie_path())
            .max_age(self.ttl_secs)
            .secure(self.secure_cookies)
            .same_site(SameSite::Lax)
    }

    pub fn clear_marker(&self) -> SetCookie {
        SetCookie::removal(&self.zone.marker_cookie, self.cookie_path())
            .secure(self.secure_cookies)
            .same_site(SameSite::Lax)
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    passcode: String,
}

pub async fn login_page() -> Html<&'static str> {
    Html(LOGIN_FORM)
}

pub async fn home_page() -> Html<&'static str> {
    Html("<!doctype html><title>Executive view</title><h1>Executive view</h1>")
}

pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> AppResult<Response> {
    let login = state.executive.clone();
    let Some(hash) = login.passcode_hash.clone() else {
        return Err(AppError::unavailable("executive_login_disabled", "executive login is not configured"));
    };
    if form.passcode.is_empty() {
        return Err(AppError::user("missing_passcode", "passcode is required"));
    }
    // Argon2 verification is CPU-bound.
    let ok = tokio::task::spawn_blocking(move || security::verify_password(&hash, &form.passcode))
        .await
        .map_err(|e| AppError::internal("verify_failed", e.to_string()))?;
    if !ok {
        warn!(target: "executive", "executive login rejected");
        return Ok((StatusCode::UNAUTHORIZED, Html(LOGIN_FORM_FAILED)).into_response());
    }

    let token = security::session_token()?;
    let mut resp = Redirect::to(login.cookie_path()).into_response();
    append_set_cookies(resp.headers_mut(), &[login.marker_cookie(token)]);
    info!(target: "executive", "executive session issued");
    Ok(resp)
}

pub async fn logout(State(state): State<AppState>) -> Response {
    let login = &state.executive;
    let mut resp = Redirect::to(&login.zone.login_path).into_response();
    append_set_cookies(resp.headers_mut(), &[login.clear_marker()]);
    resp
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login() -> ExecutiveLogin {
        ExecutiveLogin { zone: ExecutiveZone::default(), passcode_hash: None, ttl_secs: 3600, secure_cookies: true }
    }

    #[test]
    fn marker_cookie_is_scoped_to_namespace() {
        let c = login().marker_cookie("tok".into());
        assert_eq!(c.name, "executive_session");
        assert_eq!(c.path, "/executive-view");
        assert_eq!(c.max_age, Some(3600));
        assert!(c.http_only && c.secure);
        assert!(!c.is_removal());
    }

    #[test]
    fn clear_marker_matches_issue_path() {
        let l = login();
        let c = l.clear_marker();
        assert!(c.is_removal());
        assert_eq!(c.path, l.marker_cookie("x".into()).path);
    }
}
