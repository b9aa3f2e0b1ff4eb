//! `load_config`: reads the static YAML publish config and merges in the
//! secrets and overrides that come from the environment.
//!
//! # Environment
//! - `TENANT_ID`, `CLIENT_ID`, `CLIENT_SECRET`, `USER_ID`: required
//! - `REMOTE_PATH`: optional, replaces `remote_path` from the file
//! - `VERSION`: fills `{version}` placeholders unless `--release-version` is given
//!
//! # Errors
//! All errors are `anyhow::Error` with enough context to fix the config
//! without reading the source.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Result};
use drive_publish_core::config::{
    ClientSettings, GraphEndpoints, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS,
};
use drive_publish_core::credential::Identity;
use drive_publish_core::publish::PublishSettings;
use drive_publish_core::remote_path::RemotePath;
use drive_publish_core::transfer::DEFAULT_CHUNK_SIZE;
use serde::Deserialize;
use tracing::{error, info, warn};

const VERSION_PLACEHOLDER: &str = "{version}";

/// Fully merged configuration for one CLI invocation.
#[derive(Debug)]
pub struct CliConfig {
    pub identity: Identity,
    pub publish: PublishSettings,
    pub client: ClientSettings,
    pub files: Vec<PathBuf>,
    pub share: bool,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    remote_path: String,
    #[serde(default)]
    files: Vec<String>,
    #[serde(default = "default_chunk_size")]
    chunk_size: u64,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
    #[serde(default = "default_share")]
    share: bool,
    #[serde(default)]
    endpoints: GraphEndpoints,
}

fn default_chunk_size() -> u64 {
    DEFAULT_CHUNK_SIZE
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_share() -> bool {
    true
}

/// Loads `path`, expanding `{version}` with `release_version` (or `VERSION`
/// from the environment when `None`).
pub fn load_config<P: AsRef<Path>>(path: P, release_version: Option<&str>) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            bail!("Failed to read config file {:?}: {}", path_ref, e);
        }
    };

    let raw: RawConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            bail!("Failed to parse config YAML: {e}");
        }
    };

    let version = match release_version {
        Some(v) => Some(v.to_string()),
        None => optional_env("VERSION"),
    };

    let remote_template = match optional_env("REMOTE_PATH") {
        Some(from_env) => {
            info!(remote_path = %from_env, "REMOTE_PATH from environment overrides config");
            from_env
        }
        None => raw.remote_path,
    };
    let remote_folder = RemotePath::parse(&expand_version(&remote_template, version.as_deref())?);
    if remote_folder.is_root() {
        warn!("remote_path is empty, files will be uploaded to the drive root");
    }

    let files = raw
        .files
        .iter()
        .map(|f| expand_version(f, version.as_deref()).map(PathBuf::from))
        .collect::<Result<Vec<_>>>()?;
    if files.is_empty() {
        warn!(config_path = ?path_ref, "No files configured for upload");
    }

    if raw.chunk_size == 0 {
        error!("chunk_size must be greater than zero");
        bail!("Invalid chunk_size: must be greater than zero");
    }
    if raw.chunk_size % (320 * 1024) != 0 {
        warn!(
            chunk_size = raw.chunk_size,
            "chunk_size is not a multiple of 320 KiB; the provider may reject chunks"
        );
    }

    if raw.timeout_secs == 0 {
        error!("timeout_secs must be greater than zero");
        bail!("Invalid timeout_secs: must be greater than zero");
    }

    let identity = Identity {
        tenant_id: required_env("TENANT_ID")?,
        client_id: required_env("CLIENT_ID")?,
        client_secret: required_env("CLIENT_SECRET")?,
        user_id: required_env("USER_ID")?,
    };

    let client = ClientSettings {
        endpoints: raw.endpoints,
        timeout: Duration::from_secs(raw.timeout_secs),
        connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS.min(raw.timeout_secs)),
    };

    info!(
        remote_folder = %remote_folder,
        files = files.len(),
        chunk_size = raw.chunk_size,
        share = raw.share,
        "Config loaded and merged successfully"
    );

    Ok(CliConfig {
        identity,
        publish: PublishSettings {
            remote_folder,
            chunk_size: raw.chunk_size,
        },
        client,
        files,
        share: raw.share,
    })
}

fn expand_version(template: &str, version: Option<&str>) -> Result<String> {
    if !template.contains(VERSION_PLACEHOLDER) {
        return Ok(template.to_string());
    }
    match version {
        Some(v) => Ok(template.replace(VERSION_PLACEHOLDER, v)),
        None => {
            error!(template, "Version placeholder used but no version given");
            bail!(
                "'{template}' uses {VERSION_PLACEHOLDER} but no version was given (pass --release-version or set VERSION)"
            );
        }
    }
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn required_env(name: &str) -> Result<String> {
    match optional_env(name) {
        Some(value) => Ok(value),
        None => {
            error!(var = name, "Required environment variable not set");
            bail!("{name} environment variable not set");
        }
    }
}
