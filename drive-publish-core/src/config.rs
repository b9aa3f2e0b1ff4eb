use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const DEFAULT_LOGIN_BASE: &str = "https://login.microsoftonline.com";
pub const DEFAULT_GRAPH_BASE: &str = "https://graph.microsoft.com/v1.0";
pub const GRAPH_DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Base URLs of the identity provider and the Graph API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEndpoints {
    #[serde(default = "default_login_base")]
    pub login_base: String,
    #[serde(default = "default_graph_base")]
    pub graph_base: String,
}

fn default_login_base() -> String {
    DEFAULT_LOGIN_BASE.to_string()
}

fn default_graph_base() -> String {
    DEFAULT_GRAPH_BASE.to_string()
}

impl Default for GraphEndpoints {
    fn default() -> Self {
        Self {
            login_base: default_login_base(),
            graph_base: default_graph_base(),
        }
    }
}

impl GraphEndpoints {
    pub(crate) fn token_url(&self, tenant_id: &str) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.login_base.trim_end_matches('/'),
            tenant_id
        )
    }

    pub(crate) fn drive_url(&self, user_id: &str) -> String {
        format!(
            "{}/users/{}/drive",
            self.graph_base.trim_end_matches('/'),
            user_id
        )
    }
}

/// HTTP client settings. Every request is bounded by `timeout`.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub endpoints: GraphEndpoints,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            endpoints: GraphEndpoints::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

impl ClientSettings {
    pub fn trace_loaded(&self) {
        info!(
            login_base = %self.endpoints.login_base,
            graph_base = %self.endpoints.graph_base,
            timeout_secs = self.timeout.as_secs(),
            "Loaded client settings"
        );
        debug!(?self, "Client settings (full debug)");
    }
}
