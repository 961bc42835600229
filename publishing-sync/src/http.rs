//! Request plumbing shared by the service clients: auth, status mapping and JSON decoding.

use std::time::Duration;

use publishing_sync_core::contract::ServiceError;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use url::Url;

/// Where a service lives and how to authenticate against it.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceEndpoint {
    pub base_url: Url,
    pub bearer_token: String,
    pub timeout: Option<Duration>,
}

impl ServiceEndpoint {
    /// `path` appended to the base URL, with exactly one slash between them.
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Base URL extended by `segments`, each percent-encoded on its own.
    ///
    /// `None` when the base URL cannot carry a path (e.g. `mailto:`).
    pub fn url_with_segments<'s>(&self, segments: impl IntoIterator<Item = &'s str>) -> Option<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().ok()?;
            path.pop_if_empty().extend(segments);
        }
        Some(url)
    }

    pub fn build_client(&self) -> Result<Client, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }
}

/// Send `request` and turn transport failures and non-2xx statuses into [`ServiceError`]s.
pub(crate) async fn send(request: RequestBuilder, resource: &str) -> Result<Response, ServiceError> {
    let response = request.send().await.map_err(|e| {
        error!(error = ?e, resource, "Request failed before a response arrived");
        ServiceError::Transport(e.to_string())
    })?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        debug!(resource, "Remote returned 404");
        return Err(ServiceError::NotFound {
            resource: resource.to_string(),
        });
    }
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<Failed to decode response body>"));
        error!(status = %status, resource, "Remote returned error. Response body: {body}");
        return Err(ServiceError::Http {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

pub(crate) async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    resource: &str,
) -> Result<T, ServiceError> {
    let response = send(request, resource).await?;
    let text = response
        .text()
        .await
        .map_err(|e| ServiceError::Transport(e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| {
        error!(error = ?e, resource, "Failed to decode response JSON");
        ServiceError::Decode(e.to_string())
    })
}
