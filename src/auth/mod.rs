//! IAM token acquisition and caching.
//!
//! The token manager owns the only shared mutable state in the process:
//! one cached token and its expiry instant. Every outbound ECS call asks
//! it for a valid token; a round trip to the identity service happens
//! only when the cache is empty or stale.

use crate::config::Config;
use chrono::{DateTime, Utc};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

/// Response header carrying the issued token.
const SUBJECT_TOKEN_HEADER: &str = "X-Subject-Token";

/// Token acquisition errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("identity service rejected credentials (status {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("identity response is missing the X-Subject-Token header")]
    MissingToken,

    #[error("identity request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// A token value plus the instant after which it is no longer trusted.
#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        self.expires_at > Utc::now()
    }
}

/// Caches one IAM token for the process lifetime, replacing it whole
/// whenever it is absent or expired.
pub struct TokenManager {
    config: Arc<Config>,
    client: Client,
    cached: RwLock<Option<CachedToken>>,
}

impl TokenManager {
    pub fn new(config: Arc<Config>, client: Client) -> Self {
        Self {
            config,
            client,
            cached: RwLock::new(None),
        }
    }

    /// Return a valid token, authenticating against IAM only when the
    /// cached one is absent or past its expiry.
    pub async fn get_token(&self) -> Result<String, AuthError> {
        if let Some(token) = self.cached.read().await.as_ref() {
            if token.is_valid() {
                return Ok(token.value.clone());
            }
        }

        // Renewal path. The write lock serializes concurrent renewals;
        // re-check under it so late arrivals reuse the fresh token.
        let mut cached = self.cached.write().await;
        if let Some(token) = cached.as_ref() {
            if token.is_valid() {
                return Ok(token.value.clone());
            }
        }

        let token = self.authenticate().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    /// Request a fresh token from the identity endpoint using the
    /// access-key/secret-key method scoped to the configured project.
    async fn authenticate(&self) -> Result<CachedToken, AuthError> {
        let url = format!("{}/v3/auth/tokens", self.config.iam_endpoint);
        let body = json!({
            "auth": {
                "identity": {
                    "methods": ["hw_ak_sk"],
                    "hw_ak_sk": {
                        "access": { "key": self.config.access_key },
                        "secret": { "key": self.config.secret_key.expose_secret() }
                    }
                },
                "scope": { "project": { "id": self.config.project_id } }
            }
        });

        let response = self.client.post(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let value = response
            .headers()
            .get(SUBJECT_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .ok_or(AuthError::MissingToken)?;

        let expires_at = Utc::now() + self.config.token_validity;
        debug!(%expires_at, "issued new IAM token");

        Ok(CachedToken { value, expires_at })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_future_expiry_is_valid() {
        let token = CachedToken {
            value: "T1".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
        };
        assert!(token.is_valid());
    }

    #[test]
    fn test_past_expiry_is_invalid() {
        let token = CachedToken {
            value: "T1".to_string(),
            expires_at: Utc::now() - Duration::seconds(1),
        };
        assert!(!token.is_valid());
    }
}
