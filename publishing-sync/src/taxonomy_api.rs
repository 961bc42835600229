//! reqwest implementation of [`TaxonomySnapshot`].

use async_trait::async_trait;
use publishing_sync_core::contract::{ServiceError, TaxonomySnapshot};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::http::{send_json, ServiceEndpoint};

/// Request and response body of the batch classification endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ContentIds {
    pub content_ids: Vec<String>,
}

pub struct TaxonomyClient {
    client: Client,
    endpoint: ServiceEndpoint,
}

impl TaxonomyClient {
    pub fn new(endpoint: ServiceEndpoint) -> Result<Self, reqwest::Error> {
        let client = endpoint.build_client()?;
        tracing::info!(base_url = %endpoint.base_url, "Initialized taxonomy client");
        Ok(Self { client, endpoint })
    }

    async fn matching(&self, path: &str, content_ids: &[String]) -> Result<Vec<String>, ServiceError> {
        let url = self.endpoint.url_for(path);
        tracing::info!(url = %url, count = content_ids.len(), "Classifying taxons");
        let request = self
            .client
            .post(&url)
            .bearer_auth(&self.endpoint.bearer_token)
            .json(&ContentIds {
                content_ids: content_ids.to_vec(),
            });
        let matched: ContentIds = send_json(request, path).await?;
        Ok(matched.content_ids)
    }
}

#[async_trait]
impl TaxonomySnapshot for TaxonomyClient {
    async fn matching_against_published_taxons(
        &self,
        content_ids: &[String],
    ) -> Result<Vec<String>, ServiceError> {
        self.matching("/taxonomy/published-taxons", content_ids).await
    }

    async fn matching_against_visible_draft_taxons(
        &self,
        content_ids: &[String],
    ) -> Result<Vec<String>, ServiceError> {
        self.matching("/taxonomy/visible-draft-taxons", content_ids).await
    }
}
