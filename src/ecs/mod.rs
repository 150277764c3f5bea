//! ECS resource operations.
//!
//! Each operation is one HTTP call against the compute endpoint with a
//! token from the [`TokenManager`] attached as `X-Auth-Token`. Read
//! operations decode into typed payloads and render them as
//! pretty-printed JSON; action operations return a short confirmation
//! string since the API body carries nothing useful on success.

mod types;

pub use types::*;

use crate::auth::{AuthError, TokenManager};
use crate::config::Config;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Request header carrying the IAM token on compute calls.
const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Compute API errors
#[derive(Error, Debug)]
pub enum EcsError {
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("ECS API returned status {status}: {body}")]
    Downstream { status: u16, body: String },

    #[error("ECS request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to decode ECS response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Client for the ECS compute endpoints of one project.
pub struct EcsClient {
    config: Arc<Config>,
    client: Client,
    tokens: Arc<TokenManager>,
}

impl EcsClient {
    pub fn new(config: Arc<Config>, client: Client, tokens: Arc<TokenManager>) -> Self {
        Self {
            config,
            client,
            tokens,
        }
    }

    /// List all servers in the project with full detail.
    pub async fn list_servers(&self) -> Result<String, EcsError> {
        let response: ServerListResponse = self.get_json("/detail").await?;
        Ok(serde_json::to_string_pretty(&response.servers)?)
    }

    /// Get details of a single server.
    pub async fn get_server(&self, server_id: &str) -> Result<String, EcsError> {
        let response: ServerDetailResponse = self.get_json(&format!("/{}", server_id)).await?;
        Ok(serde_json::to_string_pretty(&response.server)?)
    }

    /// Start a stopped server.
    pub async fn start_server(&self, server_id: &str) -> Result<String, EcsError> {
        self.post_action(&ServerAction::start(server_id)).await?;
        Ok(format!("Server {} start initiated", server_id))
    }

    /// Stop a running server.
    pub async fn stop_server(&self, server_id: &str) -> Result<String, EcsError> {
        self.post_action(&ServerAction::stop(server_id)).await?;
        Ok(format!("Server {} stop initiated", server_id))
    }

    /// Reboot a server, gracefully or by power cycle.
    pub async fn reboot_server(
        &self,
        server_id: &str,
        reboot_type: RebootType,
    ) -> Result<String, EcsError> {
        self.post_action(&ServerAction::reboot(server_id, reboot_type))
            .await?;
        Ok(format!("Server {} {} reboot initiated", server_id, reboot_type))
    }

    /// List available instance flavors.
    pub async fn list_flavors(&self) -> Result<String, EcsError> {
        let response: FlavorListResponse = self.get_json("/flavors").await?;
        Ok(serde_json::to_string_pretty(&response.flavors)?)
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/v1/{}/cloudservers{}",
            self.config.ecs_endpoint, self.config.project_id, path
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, EcsError> {
        let token = self.tokens.get_token().await?;
        let url = self.url(path);
        debug!(%url, "GET");

        let response = self
            .client
            .get(&url)
            .header(AUTH_TOKEN_HEADER, token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EcsError::Downstream {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn post_action(&self, action: &ServerAction) -> Result<(), EcsError> {
        let token = self.tokens.get_token().await?;
        let url = self.url("/action");
        debug!(%url, ?action, "POST");

        let response = self
            .client
            .post(&url)
            .header(AUTH_TOKEN_HEADER, token)
            .json(action)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EcsError::Downstream {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
