use std::sync::Arc;

use tracing::{debug, info};

use super::decision::{GateDecision, RequestSnapshot};
use super::delegate::SessionRefresher;
use super::rules::{RuleSet, Zone};

pub const EXECUTIVE_NAMESPACE: &str = "/executive-view";
pub const EXECUTIVE_LOGIN_PATH: &str = "/executive-view/login";
pub const EXECUTIVE_SESSION_COOKIE: &str = "executive_session";

/// Restricted zone settings: where it lives, its public login page, and the
/// name of the marker cookie that admits a visitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutiveZone {
    pub namespace: String,
    pub login_path: String,
    pub marker_cookie: String,
}

impl Default for ExecutiveZone {
    fn default() -> Self {
        Self {
            namespace: EXECUTIVE_NAMESPACE.to_string(),
            login_path: EXECUTIVE_LOGIN_PATH.to_string(),
            marker_cookie: EXECUTIVE_SESSION_COOKIE.to_string(),
        }
    }
}

/// Per-request authorization gate.
///
/// Stateless: every call classifies the path against the rule set and runs
/// exactly one zone branch. The restricted zone only checks that the marker
/// cookie is present and non-empty; its value is never inspected. The default
/// zone returns the delegate's outcome unchanged.
#[derive(Clone)]
pub struct AuthorizationGate {
    zone: ExecutiveZone,
    rules: RuleSet,
    refresher: Arc<dyn SessionRefresher>,
}

impl AuthorizationGate {
    pub fn new(zone: ExecutiveZone, refresher: Arc<dyn SessionRefresher>) -> Self {
        let rules = RuleSet::restricted(&zone.namespace, &zone.login_path);
        Self { zone, rules, refresher }
    }

    pub fn executive_zone(&self) -> &ExecutiveZone {
        &self.zone
    }

    pub fn classify(&self, path: &str) -> Zone {
        self.rules.classify(path)
    }

    pub async fn evaluate(&self, req: &RequestSnapshot) -> GateDecision {
        let zone = self.classify(&req.path);
        debug!(target: "gate", path = %req.path, ?zone, "classified request");
        match zone {
            Zone::PublicLogin => GateDecision::pass(),
            Zone::RestrictedZone => {
                if req.cookies.non_empty(&self.zone.marker_cookie).is_some() {
                    GateDecision::pass()
                } else {
                    info!(target: "gate", path = %req.path, "no executive session, redirecting to login");
                    GateDecision::redirect(self.zone.login_path.clone())
                }
            }
            Zone::DefaultZone => self.refresher.refresh(req).await,
        }
    }
}

impl std::fmt::Debug for AuthorizationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationGate").field("zone", &self.zone).field("rules", &self.rules).finish_non_exhaustive()
    }
}
