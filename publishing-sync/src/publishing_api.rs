//! reqwest implementation of [`PublishingApi`].

use async_trait::async_trait;
use publishing_sync_core::contract::{ExpandedLinks, LinkSet, PublishingApi, ServiceError};
use reqwest::Client;

use crate::http::{send_json, ServiceEndpoint};

pub struct PublishingApiClient {
    client: Client,
    endpoint: ServiceEndpoint,
}

impl PublishingApiClient {
    pub fn new(endpoint: ServiceEndpoint) -> Result<Self, reqwest::Error> {
        let client = endpoint.build_client()?;
        tracing::info!(
            base_url = %endpoint.base_url,
            timeout = ?endpoint.timeout,
            "Initialized publishing API client"
        );
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl PublishingApi for PublishingApiClient {
    async fn get_expanded_links(&self, content_id: &str) -> Result<ExpandedLinks, ServiceError> {
        let url = self
            .endpoint
            .url_for(&format!("/v2/expanded-links/{content_id}"));
        tracing::info!(content_id, url = %url, "Fetching expanded links");
        let request = self
            .client
            .get(&url)
            .bearer_auth(&self.endpoint.bearer_token);
        send_json(request, &format!("expanded links for {content_id}")).await
    }

    async fn get_links(&self, content_id: &str) -> Result<LinkSet, ServiceError> {
        let url = self.endpoint.url_for(&format!("/v2/links/{content_id}"));
        tracing::info!(content_id, url = %url, "Fetching link set");
        let request = self
            .client
            .get(&url)
            .bearer_auth(&self.endpoint.bearer_token);
        send_json(request, &format!("link set for {content_id}")).await
    }
}
