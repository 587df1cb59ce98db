//! Paths the gate never sees.
//!
//! Framework assets, the favicon and common image files are served straight
//! through; the routing layer checks this filter before invoking the gate.

use regex::Regex;

pub const DEFAULT_EXCLUDED_PREFIXES: &[&str] = &["/_next/static", "/_next/image", "/favicon.ico"];
pub const DEFAULT_EXCLUDED_EXTENSIONS: &[&str] = &["svg", "png", "jpg", "jpeg", "gif", "webp"];

#[derive(Debug, Clone)]
pub struct ExclusionFilter {
    pattern: Regex,
}

impl ExclusionFilter {
    pub fn new(prefixes: &[&str], extensions: &[&str]) -> Result<Self, regex::Error> {
        let mut alts: Vec<String> = prefixes.iter().map(|p| format!("^{}", regex::escape(p))).collect();
        if !extensions.is_empty() {
            let exts = extensions.iter().map(|e| regex::escape(e)).collect::<Vec<_>>().join("|");
            alts.push(format!(r"\.(?:{})$", exts));
        }
        // An empty alternation would match everything.
        let source = if alts.is_empty() { "$.^".to_string() } else { alts.join("|") };
        Ok(Self { pattern: Regex::new(&source)? })
    }

    /// Framework asset namespaces, the favicon and common image extensions.
    pub fn standard() -> Result<Self, regex::Error> {
        Self::new(DEFAULT_EXCLUDED_PREFIXES, DEFAULT_EXCLUDED_EXTENSIONS)
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.pattern.is_match(path)
    }
}
