//! # contract: interfaces to the external publishing services
//!
//! This module defines the traits the core talks through when it needs the
//! outside world, plus the plain data types those calls exchange:
//!
//! - [`PublishingApi`]: expanded links and link sets for a content item.
//! - [`TaxonomySnapshot`]: batch classification of taxon content ids into
//!   published / visible-draft subsets.
//! - [`AssetManager`]: lookup of an asset by legacy path, and attribute updates.
//!
//! ## Mocking & Testing
//! - Every trait is annotated for `mockall`, so tests (and downstream crates,
//!   through the `test-export-mocks` feature) get `MockPublishingApi`,
//!   `MockTaxonomySnapshot` and `MockAssetManager`.
//!
//! ## Errors
//! - All calls return [`ServiceError`]. A "not found" answer is its own variant
//!   so that callers can recover from absence without string matching.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use mockall::automock;

/// Attribute name to value, as exchanged with the asset manager.
pub type AttributeMap = serde_json::Map<String, serde_json::Value>;

/// Error type shared by all external service calls.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The remote answered 404 for the requested resource.
    #[error("not found: {resource}")]
    NotFound { resource: String },
    /// Any other non-success status.
    #[error("unexpected status {status}: {body}")]
    Http { status: u16, body: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound { .. })
    }
}

/// A taxon as embedded in an expanded-links response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonLink {
    pub content_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub base_path: String,
    #[serde(default)]
    pub links: TaxonLinkRelations,
}

/// Nested links of a taxon; only the parent chain is of interest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxonLinkRelations {
    #[serde(default)]
    pub parent_taxons: Vec<TaxonLink>,
}

/// Response of `GET /v2/expanded-links/:content_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpandedLinks {
    #[serde(default)]
    pub content_id: Option<String>,
    #[serde(default)]
    pub expanded_links: ExpandedLinkSet,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpandedLinkSet {
    #[serde(default)]
    pub taxons: Vec<TaxonLink>,
}

/// Response of `GET /v2/links/:content_id`: bare content ids plus the lock version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkSet {
    #[serde(default)]
    pub links: LinkSetLinks,
    #[serde(default)]
    pub version: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkSetLinks {
    #[serde(default)]
    pub taxons: Vec<String>,
}

/// A remote asset as returned by the asset manager.
///
/// Kept as the raw attribute map: `id` is the asset's self URL and every other
/// key (`draft`, `state`, ...) is compared as-is by the update worker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetResource {
    pub attributes: AttributeMap,
}

impl AssetResource {
    pub fn new(attributes: AttributeMap) -> Self {
        Self { attributes }
    }

    /// The self URL in the `id` field, if present and a string.
    pub fn self_url(&self) -> Option<&str> {
        self.attributes.get("id").and_then(|v| v.as_str())
    }
}

/// Read access to the publishing API's link data.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait PublishingApi: Send + Sync {
    /// Fetch the expanded links (taxons with their parent chains) of a content item.
    async fn get_expanded_links(&self, content_id: &str) -> Result<ExpandedLinks, ServiceError>;

    /// Fetch the un-expanded link set of a content item.
    async fn get_links(&self, content_id: &str) -> Result<LinkSet, ServiceError>;
}

/// Batch classification against the global taxonomy.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait TaxonomySnapshot: Send + Sync {
    /// Return the subset of `content_ids` that are published taxons.
    async fn matching_against_published_taxons(
        &self,
        content_ids: &[String],
    ) -> Result<Vec<String>, ServiceError>;

    /// Return the subset of `content_ids` that are draft taxons visible to editors.
    async fn matching_against_visible_draft_taxons(
        &self,
        content_ids: &[String],
    ) -> Result<Vec<String>, ServiceError>;
}

/// The asset storage service.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait AssetManager: Send + Sync {
    /// Look up the asset stored under a legacy URL path.
    async fn whitehall_asset(&self, legacy_url_path: &str) -> Result<AssetResource, ServiceError>;

    /// Overwrite the given attributes of an asset.
    async fn update_asset(
        &self,
        asset_id: &str,
        attributes: &AttributeMap,
    ) -> Result<(), ServiceError>;
}
