use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Access tokens without an expiry hint are assumed to live this long.
const DEFAULT_ACCESS_TTL_SECS: i64 = 60 * 60;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Fresh credentials returned by a refresh-token exchange.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Unix seconds.
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub user: Option<ProviderUser>,
}

impl TokenPair {
    /// Seconds the access token stays valid, as seen from `now`.
    pub fn access_max_age(&self, now: DateTime<Utc>) -> i64 {
        if let Some(secs) = self.expires_in {
            return secs.max(0);
        }
        if let Some(at) = self.expires_at {
            return (at - now.timestamp()).max(0);
        }
        DEFAULT_ACCESS_TTL_SECS
    }
}

/// The primary identity provider, as the session refresher needs it.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// `Ok(None)` when the provider rejects the access token.
    async fn get_user(&self, access_token: &str) -> Result<Option<ProviderUser>, ProviderError>;

    async fn refresh_session(&self, refresh_token: &str) -> Result<TokenPair, ProviderError>;
}

/// GoTrue-compatible auth API client (`/auth/v1/user`, `/auth/v1/token`).
#[derive(Debug, Clone)]
pub struct GoTrueProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GoTrueProvider {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl IdentityProvider for GoTrueProvider {
    async fn get_user(&self, access_token: &str) -> Result<Option<ProviderUser>, ProviderError> {
        let resp = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        let status = resp.status();
        if status.is_success() {
            let user = resp.json::<ProviderUser>().await.map_err(|e| ProviderError::Malformed(e.to_string()))?;
            return Ok(Some(user));
        }
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            _ => Err(ProviderError::UnexpectedStatus { status: status.as_u16(), body: resp.text().await.unwrap_or_default() }),
        }
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<TokenPair, ProviderError> {
        let resp = self
            .client
            .post(format!("{}/auth/v1/token?grant_type=refresh_token", self.base_url))
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        let status = resp.status();
        if status.is_success() {
            return resp.json::<TokenPair>().await.map_err(|e| ProviderError::Malformed(e.to_string()));
        }
        let body = resp.text().await.unwrap_or_default();
        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ProviderError::Rejected(body)),
            _ => Err(ProviderError::UnexpectedStatus { status: status.as_u16(), body }),
        }
    }
}
