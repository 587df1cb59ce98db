//! Server configuration from environment variables, with CLI flags overriding
//! the listen port. Parsing goes through a lookup function so tests do not have
//! to touch the process environment.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::gate::ExecutiveZone;
use crate::identity::PrimarySessionConfig;
use crate::security;

pub const DEFAULT_HTTP_PORT: u16 = 3000;
pub const DEFAULT_AUTH_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_EXECUTIVE_SESSION_TTL_SECS: i64 = 8 * 60 * 60;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: IpAddr,
    pub http_port: u16,
    pub auth_url: String,
    pub auth_anon_key: String,
    pub auth_timeout: Duration,
    pub executive: ExecutiveZone,
    /// Argon2 PHC hash of the executive passcode; executive login is disabled when unset.
    pub executive_passcode_hash: Option<String>,
    pub executive_session_ttl_secs: i64,
    pub primary: PrimarySessionConfig,
    pub secure_cookies: bool,
}

impl ServerConfig {
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let auth_url = required(&lookup, "TEAMDASH_AUTH_URL")?;
        let auth_anon_key = required(&lookup, "TEAMDASH_AUTH_ANON_KEY")?;

        let bind = match lookup("TEAMDASH_BIND") {
            Some(v) => v.trim().parse::<IpAddr>().map_err(|e| AppError::config("invalid_env", format!("TEAMDASH_BIND={v}: {e}")))?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };
        let http_port = parse_num(&lookup, "TEAMDASH_HTTP_PORT")?.unwrap_or(DEFAULT_HTTP_PORT);
        let timeout_ms = parse_num(&lookup, "TEAMDASH_AUTH_TIMEOUT_MS")?.unwrap_or(DEFAULT_AUTH_TIMEOUT_MS);
        let ttl = parse_num(&lookup, "TEAMDASH_EXECUTIVE_SESSION_TTL_SECS")?.unwrap_or(DEFAULT_EXECUTIVE_SESSION_TTL_SECS);
        if ttl <= 0 {
            return Err(AppError::config("invalid_env", "TEAMDASH_EXECUTIVE_SESSION_TTL_SECS must be positive"));
        }
        let secure_cookies = parse_bool(&lookup, "TEAMDASH_SECURE_COOKIES")?.unwrap_or(true);

        let executive_passcode_hash = lookup("TEAMDASH_EXECUTIVE_PASSCODE_HASH")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        if let Some(h) = &executive_passcode_hash {
            if !security::is_valid_phc(h) {
                return Err(AppError::config("invalid_env", "TEAMDASH_EXECUTIVE_PASSCODE_HASH is not an Argon2 PHC string"));
            }
        }

        let mut primary = PrimarySessionConfig { secure_cookies, ..Default::default() };
        if let Some(p) = lookup("TEAMDASH_LOGIN_PATH").map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            if !p.starts_with('/') {
                return Err(AppError::config("invalid_env", format!("TEAMDASH_LOGIN_PATH must start with '/': {}", p)));
            }
            let old = std::mem::replace(&mut primary.login_path, p.clone());
            primary.public_prefixes.retain(|x| x != &old);
            primary.public_prefixes.push(p);
        }

        Ok(Self {
            bind,
            http_port,
            auth_url,
            auth_anon_key,
            auth_timeout: Duration::from_millis(timeout_ms),
            executive: ExecutiveZone::default(),
            executive_passcode_hash,
            executive_session_ttl_secs: ttl,
            primary,
            secure_cookies,
        })
    }

    /// Apply `--port N` / `--bind ADDR` from the command line.
    pub fn apply_args(&mut self, args: &[String]) {
        if let Some(p) = parse_port_arg(args, "--port") {
            self.http_port = p;
        }
        if let Some(a) = flag_value(args, "--bind").and_then(|v| v.parse::<IpAddr>().ok()) {
            self.bind = a;
        }
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.http_port)
    }

    /// One-line summary for the startup log; secrets are never printed.
    pub fn redacted_summary(&self) -> String {
        format!(
            "listen={} auth_url={} auth_timeout_ms={} login_path={} executive_login={} executive_ttl_secs={} secure_cookies={}",
            self.listen_addr(),
            self.auth_url,
            self.auth_timeout.as_millis(),
            self.primary.login_path,
            if self.executive_passcode_hash.is_some() { "enabled" } else { "disabled" },
            self.executive_session_ttl_secs,
            self.secure_cookies,
        )
    }
}

fn required<F: Fn(&str) -> Option<String>>(lookup: &F, name: &str) -> AppResult<String> {
    match lookup(name).map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::config("missing_env", format!("{name} is not set"))),
    }
}

fn parse_num<F, T>(lookup: &F, name: &str) -> AppResult<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(v) => v.trim().parse::<T>().map(Some).map_err(|e| AppError::config("invalid_env", format!("{name}={v}: {e}"))),
        None => Ok(None),
    }
}

fn parse_bool<F: Fn(&str) -> Option<String>>(lookup: &F, name: &str) -> AppResult<Option<bool>> {
    let Some(v) = lookup(name) else { return Ok(None) };
    match v.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(AppError::config("invalid_env", format!("{name}={v}: expected a boolean"))),
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    let i = args.iter().position(|a| a == flag)?;
    args.get(i + 1).map(|s| s.as_str())
}

fn parse_port_arg(args: &[String], flag: &str) -> Option<u16> {
    flag_value(args, flag)?.parse::<u16>().ok()
}

pub fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    const BASE: &[(&str, &str)] = &[("TEAMDASH_AUTH_URL", "https://auth.example.com"), ("TEAMDASH_AUTH_ANON_KEY", "anon")];

    #[test]
    fn defaults_apply() {
        let cfg = ServerConfig::from_lookup(lookup(BASE)).unwrap();
        assert_eq!(cfg.http_port, DEFAULT_HTTP_PORT);
        assert_eq!(cfg.listen_addr().to_string(), "0.0.0.0:3000");
        assert_eq!(cfg.auth_timeout, Duration::from_millis(DEFAULT_AUTH_TIMEOUT_MS));
        assert_eq!(cfg.executive.login_path, "/executive-view/login");
        assert_eq!(cfg.executive.marker_cookie, "executive_session");
        assert_eq!(cfg.primary.login_path, "/login");
        assert!(cfg.executive_passcode_hash.is_none());
        assert!(cfg.secure_cookies);
    }

    #[test]
    fn missing_provider_settings_fail() {
        let err = ServerConfig::from_lookup(lookup(&[("TEAMDASH_AUTH_URL", "x")])).unwrap_err();
        assert_eq!(err.code_str(), "missing_env");
        assert!(err.message().contains("TEAMDASH_AUTH_ANON_KEY"));

        let err = ServerConfig::from_lookup(lookup(&[("TEAMDASH_AUTH_URL", "  "), ("TEAMDASH_AUTH_ANON_KEY", "k")])).unwrap_err();
        assert!(err.message().contains("TEAMDASH_AUTH_URL"));
    }

    #[test]
    fn typed_values_are_validated() {
        let mut pairs = BASE.to_vec();
        pairs.push(("TEAMDASH_HTTP_PORT", "eighty"));
        let err = ServerConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert_eq!(err.code_str(), "invalid_env");

        let mut pairs = BASE.to_vec();
        pairs.push(("TEAMDASH_SECURE_COOKIES", "maybe"));
        assert!(ServerConfig::from_lookup(lookup(&pairs)).is_err());

        let mut pairs = BASE.to_vec();
        pairs.push(("TEAMDASH_EXECUTIVE_PASSCODE_HASH", "plaintext"));
        assert!(ServerConfig::from_lookup(lookup(&pairs)).is_err());

        let mut pairs = BASE.to_vec();
        pairs.push(("TEAMDASH_EXECUTIVE_SESSION_TTL_SECS", "0"));
        assert!(ServerConfig::from_lookup(lookup(&pairs)).is_err());

        let mut pairs = BASE.to_vec();
        pairs.push(("TEAMDASH_LOGIN_PATH", "sign-in"));
        let err = ServerConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert_eq!(err.code_str(), "invalid_env");
    }

    #[test]
    fn overrides_apply() {
        let hash = security::hash_password("pw").unwrap();
        let mut pairs: Vec<(&str, &str)> = BASE.to_vec();
        pairs.extend([
            ("TEAMDASH_HTTP_PORT", "8080"),
            ("TEAMDASH_BIND", "127.0.0.1"),
            ("TEAMDASH_SECURE_COOKIES", "off"),
            ("TEAMDASH_LOGIN_PATH", "/sign-in"),
            ("TEAMDASH_EXECUTIVE_PASSCODE_HASH", hash.as_str()),
        ]);
        let cfg = ServerConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(cfg.listen_addr().to_string(), "127.0.0.1:8080");
        assert!(!cfg.secure_cookies);
        assert!(!cfg.primary.secure_cookies);
        assert_eq!(cfg.primary.login_path, "/sign-in");
        assert!(cfg.primary.is_public("/sign-in"));
        assert!(cfg.primary.is_public("/auth/callback"));
        assert!(!cfg.primary.is_public("/login"));
        assert!(cfg.redacted_summary().contains("executive_login=enabled"));
        assert!(!cfg.redacted_summary().contains(&hash));
        assert!(!cfg.redacted_summary().contains("anon"));
    }

    #[test]
    fn cli_args_override_port() {
        let mut cfg = ServerConfig::from_lookup(lookup(BASE)).unwrap();
        let args: Vec<String> = ["teamdash", "--port", "4000", "--bind", "::1"].iter().map(|s| s.to_string()).collect();
        cfg.apply_args(&args);
        assert_eq!(cfg.http_port, 4000);
        assert_eq!(cfg.listen_addr().to_string(), "[::1]:4000");

        let bad: Vec<String> = ["teamdash", "--port"].iter().map(|s| s.to_string()).collect();
        cfg.apply_args(&bad);
        assert_eq!(cfg.http_port, 4000);
        assert!(has_flag(&args, "--port"));
    }
}
