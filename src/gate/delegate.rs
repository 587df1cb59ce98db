use async_trait::async_trait;

use super::decision::{GateDecision, RequestSnapshot};

/// Result of a primary-session refresh: pass (with any re-issued cookies) or
/// the delegate's own redirect.
pub type RefreshOutcome = GateDecision;

/// The primary session-refresh procedure the default zone delegates to.
///
/// Infallible at this seam: implementations fold provider failures into a
/// redirect (or a pass on their own public paths).
#[async_trait]
pub trait SessionRefresher: Send + Sync {
    async fn refresh(&self, req: &RequestSnapshot) -> RefreshOutcome;
}
