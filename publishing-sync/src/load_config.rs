/// `load_config` module: Loads a static YAML config and injects bearer tokens from the environment.
///
/// This is the only place where the YAML file is parsed and turned into typed endpoints.
///
/// # Responsibilities
/// - Parse the YAML file into intermediate serde structs
/// - Validate service base URLs
/// - Inject bearer tokens from env vars (`PUBLISHING_API_BEARER_TOKEN`,
///   `ASSET_MANAGER_BEARER_TOKEN`, `TAXONOMY_BEARER_TOKEN`), falling back to the
///   development defaults when unset
///
/// # Errors
/// All errors use `anyhow::Error` and are surfaced at the CLI boundary.
use anyhow::{Context, Result};
use publishing_sync_core::jobs::DEFAULT_MAX_ATTEMPTS;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};
use url::Url;

use crate::http::ServiceEndpoint;

pub const DEFAULT_PUBLISHING_API_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Deserialize)]
pub struct EndpointSection {
    pub url: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct QueueSection {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for QueueSection {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    publishing_api: EndpointSection,
    asset_manager: EndpointSection,
    taxonomy: EndpointSection,
    #[serde(default)]
    queue: QueueSection,
}

/// Fully resolved configuration, secrets included.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub publishing_api: ServiceEndpoint,
    pub asset_manager: ServiceEndpoint,
    pub taxonomy: ServiceEndpoint,
    pub max_attempts: u32,
}

fn token_from_env(var: &str, default: &str) -> String {
    match std::env::var(var) {
        Ok(token) if !token.trim().is_empty() => {
            info!(var, "Bearer token found in env");
            token
        }
        _ => {
            info!(var, "Bearer token not set, using development default");
            default.to_string()
        }
    }
}

fn endpoint(
    name: &str,
    section: EndpointSection,
    token_var: &str,
    default_token: &str,
    default_timeout: Option<u64>,
) -> Result<ServiceEndpoint> {
    let base_url = Url::parse(&section.url).map_err(|e| {
        error!(error = ?e, service = name, url = %section.url, "Invalid service URL in config");
        anyhow::anyhow!("Invalid {name} url {:?}: {e}", section.url)
    })?;
    Ok(ServiceEndpoint {
        base_url,
        bearer_token: token_from_env(token_var, default_token),
        timeout: section
            .timeout_secs
            .or(default_timeout)
            .map(Duration::from_secs),
    })
}

/// Loads a static YAML config file (no secrets) and injects bearer tokens from env vars.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = fs::read_to_string(path_ref)
        .map_err(|e| {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            e
        })
        .with_context(|| format!("Failed to read config file {:?}", path_ref))?;

    let raw: RawConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    let config = AppConfig {
        publishing_api: endpoint(
            "publishing_api",
            raw.publishing_api,
            "PUBLISHING_API_BEARER_TOKEN",
            "example",
            Some(DEFAULT_PUBLISHING_API_TIMEOUT_SECS),
        )?,
        asset_manager: endpoint(
            "asset_manager",
            raw.asset_manager,
            "ASSET_MANAGER_BEARER_TOKEN",
            "12345678",
            None,
        )?,
        taxonomy: endpoint(
            "taxonomy",
            raw.taxonomy,
            "TAXONOMY_BEARER_TOKEN",
            "example",
            None,
        )?,
        max_attempts: raw.queue.max_attempts,
    };

    info!(
        publishing_api = %config.publishing_api.base_url,
        asset_manager = %config.asset_manager.base_url,
        taxonomy = %config.taxonomy.base_url,
        max_attempts = config.max_attempts,
        "Config loaded and merged successfully"
    );
    Ok(config)
}
