//! Typed ECS API payloads.
//!
//! Declared fields cover what the tools care about; everything else the
//! API returns is kept verbatim through the flattened `extra` map.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A cloud server as returned by the detail endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An instance flavor (machine type).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flavor {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// vCPU count; the API reports this as a string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcpus: Option<String>,
    /// Memory in MB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ram: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Envelope of `GET /cloudservers/detail`.
#[derive(Debug, Deserialize)]
pub struct ServerListResponse {
    pub servers: Vec<Server>,
}

/// Envelope of `GET /cloudservers/{id}`.
#[derive(Debug, Deserialize)]
pub struct ServerDetailResponse {
    pub server: Server,
}

/// Envelope of `GET /cloudservers/flavors`.
#[derive(Debug, Deserialize)]
pub struct FlavorListResponse {
    pub flavors: Vec<Flavor>,
}

/// Server reference inside an action body.
#[derive(Debug, Clone, Serialize)]
pub struct ServerRef {
    pub id: String,
}

/// Reboot kind accepted by the action endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RebootType {
    /// Graceful OS-level restart.
    #[default]
    Soft,
    /// Power-cycle the instance.
    Hard,
}

impl fmt::Display for RebootType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RebootType::Soft => write!(f, "SOFT"),
            RebootType::Hard => write!(f, "HARD"),
        }
    }
}

/// Body for `POST /cloudservers/action`. External tagging produces the
/// action envelopes the API expects, e.g. `{"os-start":{"servers":[..]}}`.
#[derive(Debug, Clone, Serialize)]
pub enum ServerAction {
    #[serde(rename = "os-start")]
    Start { servers: Vec<ServerRef> },
    #[serde(rename = "os-stop")]
    Stop { servers: Vec<ServerRef> },
    #[serde(rename = "reboot")]
    Reboot {
        r#type: RebootType,
        servers: Vec<ServerRef>,
    },
}

impl ServerAction {
    pub fn start(server_id: &str) -> Self {
        ServerAction::Start {
            servers: vec![ServerRef {
                id: server_id.to_string(),
            }],
        }
    }

    pub fn stop(server_id: &str) -> Self {
        ServerAction::Stop {
            servers: vec![ServerRef {
                id: server_id.to_string(),
            }],
        }
    }

    pub fn reboot(server_id: &str, reboot_type: RebootType) -> Self {
        ServerAction::Reboot {
            r#type: reboot_type,
            servers: vec![ServerRef {
                id: server_id.to_string(),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_start_action_envelope() {
        let body = serde_json::to_value(ServerAction::start("s1")).unwrap();
        assert_eq!(body, json!({"os-start": {"servers": [{"id": "s1"}]}}));
    }

    #[test]
    fn test_stop_action_envelope() {
        let body = serde_json::to_value(ServerAction::stop("s1")).unwrap();
        assert_eq!(body, json!({"os-stop": {"servers": [{"id": "s1"}]}}));
    }

    #[test]
    fn test_reboot_action_envelope() {
        let body = serde_json::to_value(ServerAction::reboot("s1", RebootType::Hard)).unwrap();
        assert_eq!(
            body,
            json!({"reboot": {"type": "HARD", "servers": [{"id": "s1"}]}})
        );
    }

    #[test]
    fn test_reboot_type_default_is_soft() {
        assert_eq!(RebootType::default(), RebootType::Soft);
    }

    #[test]
    fn test_reboot_type_rejects_unknown_values() {
        let result: Result<RebootType, _> = serde_json::from_value(json!("WARM"));
        assert!(result.is_err());
    }

    #[test]
    fn test_server_keeps_unknown_fields() {
        let server: Server = serde_json::from_value(json!({
            "id": "s1",
            "status": "ACTIVE",
            "flavor": {"id": "s2.large.2"}
        }))
        .unwrap();

        assert_eq!(server.id, "s1");
        assert!(server.extra.contains_key("flavor"));

        let rendered = serde_json::to_string_pretty(&server).unwrap();
        assert!(rendered.contains("s2.large.2"));
    }
}
