//! Configuration for the OTC MCP server.
//!
//! All identity parameters come from the process environment, read once at
//! startup. Missing values become empty strings; the identity service
//! rejects them naturally on the first call.

use chrono::Duration;
use secrecy::SecretString;
use std::env;
use std::time::Duration as StdDuration;

/// Region used when `OTC_REGION` is unset.
const DEFAULT_REGION: &str = "eu-de";

/// Default token validity window in hours. Deliberately shorter than the
/// real IAM token lifetime (24h) so renewal happens before the service
/// starts rejecting the token.
const DEFAULT_TOKEN_VALIDITY_HOURS: i64 = 23;

/// Request timeout applied to every outbound HTTP call.
pub const HTTP_TIMEOUT: StdDuration = StdDuration::from_secs(30);

/// Identity and endpoint configuration, immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct Config {
    /// IAM access key (`OTC_ACCESS_KEY`).
    pub access_key: String,
    /// IAM secret key (`OTC_SECRET_KEY`).
    pub secret_key: SecretString,
    /// Project to scope tokens and compute calls to (`OTC_PROJECT_ID`).
    pub project_id: String,
    /// OTC region code (`OTC_REGION`).
    pub region: String,
    /// Identity service base URL.
    pub iam_endpoint: String,
    /// Compute service base URL.
    pub ecs_endpoint: String,
    /// How long a freshly issued token is treated as valid.
    pub token_validity: Duration,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        let region = env::var("OTC_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string());

        let iam_endpoint = env::var("OTC_IAM_ENDPOINT")
            .unwrap_or_else(|_| format!("https://iam.{}.otc.t-systems.com", region));
        let ecs_endpoint = env::var("OTC_ECS_ENDPOINT")
            .unwrap_or_else(|_| format!("https://ecs.{}.otc.t-systems.com", region));

        let validity_hours = env::var("OTC_TOKEN_VALIDITY_HOURS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(DEFAULT_TOKEN_VALIDITY_HOURS);

        Self {
            access_key: env::var("OTC_ACCESS_KEY").unwrap_or_default(),
            secret_key: SecretString::from(env::var("OTC_SECRET_KEY").unwrap_or_default()),
            project_id: env::var("OTC_PROJECT_ID").unwrap_or_default(),
            region,
            iam_endpoint,
            ecs_endpoint,
            token_validity: Duration::hours(validity_hours),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        // Env vars are process-global; build the config from a snapshot
        // to keep tests independent of each other.
        let get = |name: &str| -> Option<String> {
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        };

        let region = get("OTC_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string());
        Config {
            access_key: get("OTC_ACCESS_KEY").unwrap_or_default(),
            secret_key: SecretString::from(get("OTC_SECRET_KEY").unwrap_or_default()),
            project_id: get("OTC_PROJECT_ID").unwrap_or_default(),
            iam_endpoint: format!("https://iam.{}.otc.t-systems.com", region),
            ecs_endpoint: format!("https://ecs.{}.otc.t-systems.com", region),
            region,
            token_validity: Duration::hours(DEFAULT_TOKEN_VALIDITY_HOURS),
        }
    }

    #[test]
    fn test_default_region_endpoints() {
        let config = config_from(&[("OTC_ACCESS_KEY", "AK"), ("OTC_SECRET_KEY", "SK")]);

        assert_eq!(config.region, "eu-de");
        assert_eq!(config.iam_endpoint, "https://iam.eu-de.otc.t-systems.com");
        assert_eq!(config.ecs_endpoint, "https://ecs.eu-de.otc.t-systems.com");
        assert_eq!(config.secret_key.expose_secret(), "SK");
    }

    #[test]
    fn test_custom_region_endpoints() {
        let config = config_from(&[("OTC_REGION", "eu-nl")]);

        assert_eq!(config.iam_endpoint, "https://iam.eu-nl.otc.t-systems.com");
        assert_eq!(config.ecs_endpoint, "https://ecs.eu-nl.otc.t-systems.com");
    }

    #[test]
    fn test_missing_credentials_become_empty() {
        let config = config_from(&[]);

        assert!(config.access_key.is_empty());
        assert!(config.project_id.is_empty());
    }

    #[test]
    fn test_secret_key_is_redacted_in_debug() {
        let config = config_from(&[("OTC_SECRET_KEY", "super-secret")]);
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
    }
}
