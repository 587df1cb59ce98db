use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, warn};

use super::provider::{IdentityProvider, TokenPair};
use crate::error::ProviderError;
use crate::gate::{within_namespace, GateDecision, RefreshOutcome, RequestSnapshot, SessionRefresher, SetCookie};

pub const ACCESS_TOKEN_COOKIE: &str = "sb-access-token";
pub const REFRESH_TOKEN_COOKIE: &str = "sb-refresh-token";
pub const DEFAULT_LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimarySessionConfig {
    pub access_cookie: String,
    pub refresh_cookie: String,
    /// Where visitors without a primary session are sent.
    pub login_path: String,
    /// Default-zone path namespaces reachable without a session.
    pub public_prefixes: Vec<String>,
    pub refresh_ttl_secs: i64,
    pub secure_cookies: bool,
}

impl Default for PrimarySessionConfig {
    fn default() -> Self {
        Self {
            access_cookie: ACCESS_TOKEN_COOKIE.to_string(),
            refresh_cookie: REFRESH_TOKEN_COOKIE.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            public_prefixes: vec!["/login".to_string(), "/auth".to_string()],
            refresh_ttl_secs: 60 * 60 * 24 * 30,
            secure_cookies: true,
        }
    }
}

impl PrimarySessionConfig {
    pub fn is_public(&self, path: &str) -> bool {
        self.public_prefixes.iter().any(|p| within_namespace(path, p))
    }
}

/// Primary session refresh backed by an identity provider.
///
/// Validates the access token, falls back to a refresh-token exchange, and
/// re-issues both cookies when the exchange succeeds. Cookies the provider
/// rejected are cleared; a transport failure leaves them alone.
pub struct ProviderSessionRefresher<P> {
    provider: Arc<P>,
    cfg: PrimarySessionConfig,
}

impl<P: IdentityProvider> ProviderSessionRefresher<P> {
    pub fn new(provider: Arc<P>, cfg: PrimarySessionConfig) -> Self {
        Self { provider, cfg }
    }

    fn session_cookies(&self, pair: &TokenPair) -> Vec<SetCookie> {
        vec![
            SetCookie::new(&self.cfg.access_cookie, &pair.access_token)
                .max_age(pair.access_max_age(Utc::now()))
                .secure(self.cfg.secure_cookies),
            SetCookie::new(&self.cfg.refresh_cookie, &pair.refresh_token)
                .max_age(self.cfg.refresh_ttl_secs)
                .secure(self.cfg.secure_cookies),
        ]
    }

    fn clear(&self, name: &str) -> SetCookie {
        SetCookie::removal(name, "/").secure(self.cfg.secure_cookies)
    }
}

#[async_trait]
impl<P: IdentityProvider + 'static> SessionRefresher for ProviderSessionRefresher<P> {
    async fn refresh(&self, req: &RequestSnapshot) -> RefreshOutcome {
        let mut stale: Vec<SetCookie> = Vec::new();

        if let Some(token) = req.cookies.non_empty(&self.cfg.access_cookie) {
            match self.provider.get_user(token).await {
                Ok(Some(user)) => {
                    debug!(target: "session", user_id = %user.id, path = %req.path, "primary session valid");
                    return GateDecision::pass();
                }
                Ok(None) => {
                    debug!(target: "session", path = %req.path, "access token rejected");
                    stale.push(self.clear(&self.cfg.access_cookie));
                }
                Err(e) => warn!(target: "session", error = %e, "identity provider user lookup failed"),
            }
        }

        if let Some(token) = req.cookies.non_empty(&self.cfg.refresh_cookie) {
            match self.provider.refresh_session(token).await {
                Ok(pair) => {
                    debug!(target: "session", path = %req.path, "primary session refreshed");
                    return GateDecision::pass_with(self.session_cookies(&pair));
                }
                Err(ProviderError::Rejected(reason)) => {
                    debug!(target: "session", %reason, "refresh token rejected");
                    if !stale.iter().any(|c| c.name == self.cfg.access_cookie) && req.cookies.contains(&self.cfg.access_cookie) {
                        stale.push(self.clear(&self.cfg.access_cookie));
                    }
                    stale.push(self.clear(&self.cfg.refresh_cookie));
                }
                Err(e) => warn!(target: "session", error = %e, "identity provider refresh failed"),
            }
        }

        if self.cfg.is_public(&req.path) {
            return GateDecision::pass_with(stale);
        }
        info!(target: "session", path = %req.path, "no primary session, redirecting to login");
        GateDecision::redirect_with(self.cfg.login_path.clone(), stale)
    }
}
