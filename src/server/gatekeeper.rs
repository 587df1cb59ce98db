use axum::body::Body;
use axum::extract::State;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::{debug, warn, Instrument};
use uuid::Uuid;

use super::AppState;
use crate::gate::{GateDecision, RequestSnapshot, SetCookie};

/// Gate middleware: excluded paths go straight to the route; everything else is
/// classified and either forwarded or redirected.
pub async fn authorize(State(state): State<AppState>, req: Request<Body>, next: Next) -> Response {
    let path = req.uri().path().to_string();
    if state.exclusions.is_excluded(&path) {
        debug!(target: "gate", %path, "excluded from gate");
        return next.run(req).await;
    }
    let span = tracing::info_span!("request", id = %Uuid::new_v4(), method = %req.method(), %path);
    async move {
        let snapshot = RequestSnapshot::from_parts(&path, req.headers());
        let decision = state.gate.evaluate(&snapshot).await;
        apply(decision, &snapshot, req, next).await
    }
    .instrument(span)
    .await
}

async fn apply(decision: GateDecision, snapshot: &RequestSnapshot, mut req: Request<Body>, next: Next) -> Response {
    match decision {
        GateDecision::Redirect { location, set_cookies } => {
            let mut resp = Redirect::temporary(&location).into_response();
            append_set_cookies(resp.headers_mut(), &set_cookies);
            resp
        }
        GateDecision::Pass { set_cookies } => {
            if !set_cookies.is_empty() {
                // Handlers downstream see the refreshed session.
                let merged = snapshot.cookies.with_updates(&set_cookies);
                let headers = req.headers_mut();
                headers.remove(COOKIE);
                if let Some(v) = merged.to_header_value() {
                    headers.insert(COOKIE, v);
                }
            }
            let mut resp = next.run(req).await;
            append_set_cookies(resp.headers_mut(), &set_cookies);
            resp
        }
    }
}

pub(crate) fn append_set_cookies(headers: &mut HeaderMap, cookies: &[SetCookie]) {
    for c in cookies {
        match c.to_header_value() {
            Some(v) => {
                headers.append(SET_COOKIE, v);
            }
            None => warn!(target: "gate", cookie = %c.name, "dropping cookie with invalid header characters"),
        }
    }
}
