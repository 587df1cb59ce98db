//! Request authorization gate for the dashboard.
//! Keep the public surface thin and split implementation across sub-modules.

mod authorizer;
mod cookies;
mod decision;
mod delegate;
mod paths;
mod rules;

pub use authorizer::{AuthorizationGate, ExecutiveZone, EXECUTIVE_LOGIN_PATH, EXECUTIVE_NAMESPACE, EXECUTIVE_SESSION_COOKIE};
pub use cookies::{CookieSnapshot, SameSite, SetCookie};
pub use decision::{GateDecision, RequestSnapshot};
pub use delegate::{RefreshOutcome, SessionRefresher};
pub use paths::{ExclusionFilter, DEFAULT_EXCLUDED_EXTENSIONS, DEFAULT_EXCLUDED_PREFIXES};
pub use rules::{within_namespace, PathMatcher, RuleSet, Zone, ZoneRule};
