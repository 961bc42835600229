//! Taxonomy tagging state of a content item, as shown to editors.

use tracing::info;

use crate::contract::{PublishingApi, ServiceError, TaxonomySnapshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyTagForm {
    pub content_id: String,
    /// Content ids of the taxons currently linked to the item.
    pub selected_taxons: Vec<String>,
    /// Link set version, used for optimistic locking on write. `None` when no link set exists yet.
    pub previous_version: Option<i64>,
}

impl TaxonomyTagForm {
    /// Load the current taxon links of `content_id`. A missing link set yields an empty form.
    pub async fn load<P>(content_id: &str, publishing_api: &P) -> Result<Self, ServiceError>
    where
        P: PublishingApi + ?Sized,
    {
        match publishing_api.get_links(content_id).await {
            Ok(link_set) => Ok(Self {
                content_id: content_id.to_string(),
                selected_taxons: link_set.links.taxons,
                previous_version: link_set.version,
            }),
            Err(e) if e.is_not_found() => {
                info!(content_id, "[TAXONS] No link set for content item, starting empty");
                Ok(Self {
                    content_id: content_id.to_string(),
                    selected_taxons: Vec::new(),
                    previous_version: None,
                })
            }
            Err(e) => Err(e),
        }
    }

    pub async fn published_taxons<T>(&self, taxonomy: &T) -> Result<Vec<String>, ServiceError>
    where
        T: TaxonomySnapshot + ?Sized,
    {
        if self.selected_taxons.is_empty() {
            return Ok(Vec::new());
        }
        taxonomy
            .matching_against_published_taxons(&self.selected_taxons)
            .await
    }

    pub async fn visible_draft_taxons<T>(&self, taxonomy: &T) -> Result<Vec<String>, ServiceError>
    where
        T: TaxonomySnapshot + ?Sized,
    {
        if self.selected_taxons.is_empty() {
            return Ok(Vec::new());
        }
        taxonomy
            .matching_against_visible_draft_taxons(&self.selected_taxons)
            .await
    }

    /// Selected taxons that are neither published nor visible drafts.
    pub async fn invisible_draft_taxons<T>(&self, taxonomy: &T) -> Result<Vec<String>, ServiceError>
    where
        T: TaxonomySnapshot + ?Sized,
    {
        Ok(self.classify(taxonomy).await?.invisible_draft)
    }

    /// Partition the selected taxons with one call per classification.
    pub async fn classify<T>(&self, taxonomy: &T) -> Result<TagClassification, ServiceError>
    where
        T: TaxonomySnapshot + ?Sized,
    {
        let published = self.published_taxons(taxonomy).await?;
        let visible_draft = self.visible_draft_taxons(taxonomy).await?;
        let invisible_draft = self
            .selected_taxons
            .iter()
            .filter(|id| !published.contains(*id) && !visible_draft.contains(*id))
            .cloned()
            .collect();
        Ok(TagClassification {
            published,
            visible_draft,
            invisible_draft,
        })
    }
}

/// Selected taxons split by visibility, all read from the same pair of calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagClassification {
    pub published: Vec<String>,
    pub visible_draft: Vec<String>,
    pub invisible_draft: Vec<String>,
}
