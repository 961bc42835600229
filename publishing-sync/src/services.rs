//! Composition root for the external service clients.
//!
//! Every client is built once here from the loaded config and handed out as an
//! `Arc`; components receive the handles they need as parameters.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::asset_manager::AssetManagerClient;
use crate::load_config::AppConfig;
use crate::publishing_api::PublishingApiClient;
use crate::taxonomy_api::TaxonomyClient;

#[derive(Clone)]
pub struct Services {
    pub publishing_api: Arc<PublishingApiClient>,
    pub asset_manager: Arc<AssetManagerClient>,
    pub taxonomy: Arc<TaxonomyClient>,
    pub max_attempts: u32,
}

impl Services {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let publishing_api = PublishingApiClient::new(config.publishing_api.clone())
            .context("Failed to build publishing API client")?;
        let asset_manager = AssetManagerClient::new(config.asset_manager.clone())
            .context("Failed to build asset manager client")?;
        let taxonomy = TaxonomyClient::new(config.taxonomy.clone())
            .context("Failed to build taxonomy client")?;
        tracing::info!("Service clients constructed");

        Ok(Self {
            publishing_api: Arc::new(publishing_api),
            asset_manager: Arc::new(asset_manager),
            taxonomy: Arc::new(taxonomy),
            max_attempts: config.max_attempts,
        })
    }
}
