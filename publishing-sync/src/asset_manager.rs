//! reqwest implementation of [`AssetManager`].

use async_trait::async_trait;
use publishing_sync_core::contract::{AssetManager, AssetResource, AttributeMap, ServiceError};
use reqwest::Client;
use serde::Serialize;
use url::Url;

use crate::http::{send, send_json, ServiceEndpoint};

#[derive(Serialize)]
struct UpdateAssetBody<'a> {
    asset: &'a AttributeMap,
}

pub struct AssetManagerClient {
    client: Client,
    endpoint: ServiceEndpoint,
}

impl AssetManagerClient {
    pub fn new(endpoint: ServiceEndpoint) -> Result<Self, reqwest::Error> {
        let client = endpoint.build_client()?;
        tracing::info!(base_url = %endpoint.base_url, "Initialized asset manager client");
        Ok(Self { client, endpoint })
    }

    fn url_for_segments<'s>(
        &self,
        segments: impl IntoIterator<Item = &'s str>,
    ) -> Result<Url, ServiceError> {
        self.endpoint.url_with_segments(segments).ok_or_else(|| {
            tracing::error!(base_url = %self.endpoint.base_url, "Asset manager base URL cannot carry a path");
            ServiceError::Transport(format!(
                "asset manager base URL {} cannot carry a path",
                self.endpoint.base_url
            ))
        })
    }
}

#[async_trait]
impl AssetManager for AssetManagerClient {
    async fn whitehall_asset(&self, legacy_url_path: &str) -> Result<AssetResource, ServiceError> {
        let segments = std::iter::once("whitehall_assets")
            .chain(legacy_url_path.split('/').filter(|s| !s.is_empty()));
        let url = self.url_for_segments(segments)?;
        tracing::info!(legacy_url_path, url = %url, "Looking up asset by legacy path");
        let request = self
            .client
            .get(url)
            .bearer_auth(&self.endpoint.bearer_token);
        send_json(request, legacy_url_path).await
    }

    async fn update_asset(
        &self,
        asset_id: &str,
        attributes: &AttributeMap,
    ) -> Result<(), ServiceError> {
        let url = self.url_for_segments(["assets", asset_id])?;
        tracing::info!(asset_id, url = %url, "Updating asset");
        let request = self
            .client
            .put(url)
            .bearer_auth(&self.endpoint.bearer_token)
            .json(&UpdateAssetBody { asset: attributes });
        send(request, &format!("asset {asset_id}")).await?;
        Ok(())
    }
}
