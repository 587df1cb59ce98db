use axum::http::HeaderMap;

use super::cookies::{CookieSnapshot, SetCookie};

/// What the gate sees of an inbound request: its path and a cookie snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSnapshot {
    pub path: String,
    pub cookies: CookieSnapshot,
}

impl RequestSnapshot {
    pub fn new(path: impl Into<String>, cookies: CookieSnapshot) -> Self {
        Self { path: path.into(), cookies }
    }

    pub fn from_parts(path: &str, headers: &HeaderMap) -> Self {
        Self { path: path.to_string(), cookies: CookieSnapshot::from_headers(headers) }
    }
}

/// Terminal action for one request. Cookie mutations travel with the decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Pass { set_cookies: Vec<SetCookie> },
    Redirect { location: String, set_cookies: Vec<SetCookie> },
}

impl GateDecision {
    pub fn pass() -> Self {
        GateDecision::Pass { set_cookies: Vec::new() }
    }

    pub fn pass_with(set_cookies: Vec<SetCookie>) -> Self {
        GateDecision::Pass { set_cookies }
    }

    pub fn redirect(location: impl Into<String>) -> Self {
        GateDecision::Redirect { location: location.into(), set_cookies: Vec::new() }
    }

    pub fn redirect_with(location: impl Into<String>, set_cookies: Vec<SetCookie>) -> Self {
        GateDecision::Redirect { location: location.into(), set_cookies }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, GateDecision::Pass { .. })
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            GateDecision::Redirect { location, .. } => Some(location.as_str()),
            GateDecision::Pass { .. } => None,
        }
    }

    pub fn set_cookies(&self) -> &[SetCookie] {
        match self {
            GateDecision::Pass { set_cookies } | GateDecision::Redirect { set_cookies, .. } => set_cookies,
        }
    }
}
