//! Ordered path classification.
//!
//! A `RuleSet` is a list of (matcher, zone) pairs evaluated first-match-wins and
//! always terminated by a catch-all, so every path lands in exactly one zone.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    /// Public entry point of the restricted zone; never session-checked.
    PublicLogin,
    /// Restricted namespace guarded by the marker cookie.
    RestrictedZone,
    /// Everything else, guarded by the primary session.
    DefaultZone,
}

/// True when `path` is `ns` itself or lies below it on a segment boundary.
pub fn within_namespace(path: &str, ns: &str) -> bool {
    let ns = ns.trim_end_matches('/');
    path == ns || path.strip_prefix(ns).is_some_and(|rest| rest.starts_with('/'))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMatcher {
    Exact(String),
    /// The namespace root itself or anything below it (`/ns`, `/ns/...`).
    Namespace(String),
    Any,
}

impl PathMatcher {
    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathMatcher::Exact(p) => path == p,
            PathMatcher::Namespace(ns) => within_namespace(path, ns),
            PathMatcher::Any => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneRule {
    pub matcher: PathMatcher,
    pub zone: Zone,
}

impl ZoneRule {
    pub fn new(matcher: PathMatcher, zone: Zone) -> Self {
        Self { matcher, zone }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<ZoneRule>,
}

impl RuleSet {
    /// Build from explicit rules; a catch-all `DefaultZone` rule is appended
    /// unless the list already ends with one.
    pub fn new(mut rules: Vec<ZoneRule>) -> Self {
        if !matches!(rules.last(), Some(ZoneRule { matcher: PathMatcher::Any, .. })) {
            rules.push(ZoneRule::new(PathMatcher::Any, Zone::DefaultZone));
        }
        Self { rules }
    }

    /// Login page first, then its namespace, then the default zone.
    pub fn restricted(namespace: &str, login_path: &str) -> Self {
        Self::new(vec![
            ZoneRule::new(PathMatcher::Exact(login_path.to_string()), Zone::PublicLogin),
            ZoneRule::new(PathMatcher::Namespace(namespace.to_string()), Zone::RestrictedZone),
        ])
    }

    pub fn classify(&self, path: &str) -> Zone {
        self.rules
            .iter()
            .find(|r| r.matcher.matches(path))
            .map(|r| r.zone)
            .unwrap_or(Zone::DefaultZone)
    }

    pub fn rules(&self) -> &[ZoneRule] {
        &self.rules
    }
}
