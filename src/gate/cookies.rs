use axum::http::header::COOKIE;
use axum::http::{HeaderMap, HeaderValue};

/// Read-only view of the cookies a request carried.
///
/// Parsed once from every `Cookie` header; lookups are exact-name matches and
/// the first occurrence of a name wins. Each pair keeps its original wire text
/// so untouched cookies are forwarded byte-for-byte.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieSnapshot {
    pairs: Vec<CookiePair>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CookiePair {
    name: String,
    /// Decoded value used for lookups.
    value: String,
    /// `name=value` exactly as received, or encoded when set locally.
    raw: String,
}

impl CookiePair {
    fn encoded(name: &str, value: &str) -> Self {
        Self { name: name.to_string(), value: value.to_string(), raw: format!("{}={}", name, urlencoding::encode(value)) }
    }
}

impl CookieSnapshot {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut pairs = Vec::new();
        for value in headers.get_all(COOKIE).iter() {
            let Ok(s) = value.to_str() else { continue };
            pairs.extend(parse_cookie_header(s));
        }
        Self { pairs }
    }

    pub fn from_pairs<I, K, V>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let pairs = iter
            .into_iter()
            .map(|(k, v)| CookiePair::encoded(&k.into(), &v.into()))
            .collect();
        Self { pairs }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs.iter().find(|p| p.name == name).map(|p| p.value.as_str())
    }

    /// Value of `name` if present and non-empty.
    pub fn non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.is_empty())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|p| (p.name.as_str(), p.value.as_str()))
    }

    /// Snapshot with `updates` applied: replaced values keep their position,
    /// removal cookies drop the name, new names are appended. Only the updated
    /// names are re-encoded.
    pub fn with_updates(&self, updates: &[SetCookie]) -> Self {
        let mut pairs = self.pairs.clone();
        for c in updates {
            if c.is_removal() {
                pairs.retain(|p| p.name != c.name);
            } else if let Some(slot) = pairs.iter_mut().find(|p| p.name == c.name) {
                *slot = CookiePair::encoded(&c.name, &c.value);
            } else {
                pairs.push(CookiePair::encoded(&c.name, &c.value));
            }
        }
        Self { pairs }
    }

    /// Render as a single `Cookie` request header value.
    pub fn to_header_value(&self) -> Option<HeaderValue> {
        if self.pairs.is_empty() { return None; }
        let joined = self.pairs.iter().map(|p| p.raw.as_str()).collect::<Vec<_>>().join("; ");
        HeaderValue::from_str(&joined).ok()
    }
}

fn parse_cookie_header(s: &str) -> Vec<CookiePair> {
    let mut out = Vec::new();
    for part in s.split(';') {
        let p = part.trim();
        let Some(eq) = p.find('=') else { continue };
        let (k, v) = p.split_at(eq);
        let k = k.trim();
        if k.is_empty() { continue; }
        let raw = v[1..].trim().trim_matches('"');
        let value = urlencoding::decode(raw).map(|c| c.into_owned()).unwrap_or_else(|_| raw.to_string());
        out.push(CookiePair { name: k.to_string(), value, raw: p.to_string() });
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// A cookie mutation to send back in a `Set-Cookie` response header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub max_age: Option<i64>,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
}

impl SetCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: "/".to_string(),
            max_age: None,
            http_only: true,
            secure: true,
            same_site: SameSite::Lax,
        }
    }

    /// Cookie that tells the browser to drop `name` at `path`.
    pub fn removal(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self { path: path.into(), max_age: Some(0), ..Self::new(name, "") }
    }

    pub fn path(mut self, path: impl Into<String>) -> Self { self.path = path.into(); self }
    pub fn max_age(mut self, secs: i64) -> Self { self.max_age = Some(secs.max(0)); self }
    pub fn secure(mut self, secure: bool) -> Self { self.secure = secure; self }
    pub fn same_site(mut self, same_site: SameSite) -> Self { self.same_site = same_site; self }

    pub fn is_removal(&self) -> bool {
        self.max_age == Some(0)
    }

    pub fn header_string(&self) -> String {
        let mut s = format!("{}={}; Path={}", self.name, urlencoding::encode(&self.value), self.path);
        if let Some(age) = self.max_age {
            s.push_str(&format!("; Max-Age={}", age));
            if age == 0 {
                s.push_str("; Expires=Thu, 01 Jan 1970 00:00:00 GMT");
            }
        }
        if self.http_only { s.push_str("; HttpOnly"); }
        if self.secure { s.push_str("; Secure"); }
        s.push_str("; SameSite=");
        s.push_str(self.same_site.as_str());
        s
    }

    pub fn to_header_value(&self) -> Option<HeaderValue> {
        HeaderValue::from_str(&self.header_string()).ok()
    }
}
