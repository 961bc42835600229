//! Taxons attached to an edition: tree building and visibility filtering.
//!
//! The publishing API hands back every taxon tagged to a content item with its
//! parent chain expanded inline. [`build_taxon`] turns one such record into a
//! [`Taxon`] with a single owned parent chain, and [`EditionTaxonsFetcher`]
//! keeps only the taxons the taxonomy service reports as published or as
//! visible drafts.
//!
//! # Memoization
//! A fetcher instance fetches links, builds taxons and classifies ids at most
//! once each. Reuse the instance to get a consistent snapshot; build a new one
//! to see fresh remote state.

use std::collections::HashSet;

use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::contract::{PublishingApi, ServiceError, TaxonLink, TaxonomySnapshot};

/// Maximum number of ancestors kept above a taxon.
pub const MAX_TAXON_DEPTH: usize = 32;

/// A node of the subject taxonomy with at most one parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxon {
    pub title: String,
    pub base_path: String,
    pub content_id: String,
    pub parent: Option<Box<Taxon>>,
}

impl Taxon {
    /// Ancestors from the direct parent up to the root.
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors {
            next: self.parent.as_deref(),
        }
    }

    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }

    /// Titles from the root down to this taxon.
    pub fn breadcrumb(&self) -> Vec<&str> {
        let mut titles: Vec<&str> = self.ancestors().map(|t| t.title.as_str()).collect();
        titles.reverse();
        titles.push(&self.title);
        titles
    }
}

pub struct Ancestors<'a> {
    next: Option<&'a Taxon>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Taxon;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent.as_deref();
        Some(current)
    }
}

/// Build a taxon from an expanded link record.
///
/// Only the first entry of `parent_taxons` is followed. Chains longer than
/// [`MAX_TAXON_DEPTH`] are cut at that depth.
pub fn build_taxon(link: &TaxonLink) -> Taxon {
    build_taxon_at_depth(link, 0)
}

fn build_taxon_at_depth(link: &TaxonLink, depth: usize) -> Taxon {
    // A taxon should only have one parent; if upstream lists more, the first wins.
    let parent = match link.links.parent_taxons.first() {
        Some(_) if depth >= MAX_TAXON_DEPTH => {
            warn!(
                content_id = %link.content_id,
                max_depth = MAX_TAXON_DEPTH,
                "[TAXONS] Parent chain exceeds maximum depth, truncating"
            );
            None
        }
        Some(first) => Some(Box::new(build_taxon_at_depth(first, depth + 1))),
        None => None,
    };

    Taxon {
        title: link.title.clone(),
        base_path: link.base_path.clone(),
        content_id: link.content_id.clone(),
        parent,
    }
}

/// Fetches the taxons of one content item and filters them down to the visible ones.
pub struct EditionTaxonsFetcher<'a, P: ?Sized, T: ?Sized> {
    content_id: String,
    publishing_api: &'a P,
    taxonomy: &'a T,
    taxon_links: OnceCell<Vec<TaxonLink>>,
    taxons: OnceCell<Vec<Taxon>>,
    published_ids: OnceCell<HashSet<String>>,
    visible_draft_ids: OnceCell<HashSet<String>>,
}

impl<'a, P, T> EditionTaxonsFetcher<'a, P, T>
where
    P: PublishingApi + ?Sized,
    T: TaxonomySnapshot + ?Sized,
{
    pub fn new(content_id: impl Into<String>, publishing_api: &'a P, taxonomy: &'a T) -> Self {
        Self {
            content_id: content_id.into(),
            publishing_api,
            taxonomy,
            taxon_links: OnceCell::new(),
            taxons: OnceCell::new(),
            published_ids: OnceCell::new(),
            visible_draft_ids: OnceCell::new(),
        }
    }

    pub fn content_id(&self) -> &str {
        &self.content_id
    }

    /// Visible taxons, in the order the publishing API listed them.
    pub async fn fetch(&self) -> Result<Vec<Taxon>, ServiceError> {
        let taxons = self.taxons().await?;
        if taxons.is_empty() {
            debug!(content_id = %self.content_id, "[TAXONS] No taxons tagged, nothing to filter");
            return Ok(Vec::new());
        }

        let published = self.published_taxon_content_ids().await?;
        let visible_drafts = self.visible_draft_taxon_content_ids().await?;

        let visible: Vec<Taxon> = taxons
            .iter()
            .filter(|t| published.contains(&t.content_id) || visible_drafts.contains(&t.content_id))
            .cloned()
            .collect();

        info!(
            content_id = %self.content_id,
            tagged = taxons.len(),
            visible = visible.len(),
            "[TAXONS] Filtered taxons by visibility"
        );
        Ok(visible)
    }

    /// Every tagged taxon, visible or not.
    pub async fn taxons(&self) -> Result<&[Taxon], ServiceError> {
        let taxons = self
            .taxons
            .get_or_try_init(|| async {
                let links = self.taxon_links().await?;
                Ok::<_, ServiceError>(links.iter().map(build_taxon).collect())
            })
            .await?;
        Ok(taxons.as_slice())
    }

    async fn taxon_links(&self) -> Result<&[TaxonLink], ServiceError> {
        let links = self
            .taxon_links
            .get_or_try_init(|| async {
                match self.publishing_api.get_expanded_links(&self.content_id).await {
                    Ok(response) => Ok::<_, ServiceError>(response.expanded_links.taxons),
                    Err(e) if e.is_not_found() => {
                        info!(content_id = %self.content_id, "[TAXONS] No links found for content item");
                        Ok(Vec::new())
                    }
                    Err(e) => Err(e),
                }
            })
            .await?;
        Ok(links.as_slice())
    }

    async fn taxon_content_ids(&self) -> Result<Vec<String>, ServiceError> {
        Ok(self
            .taxon_links()
            .await?
            .iter()
            .map(|link| link.content_id.clone())
            .collect())
    }

    async fn published_taxon_content_ids(&self) -> Result<&HashSet<String>, ServiceError> {
        self.published_ids
            .get_or_try_init(|| async {
                let ids = self.taxon_content_ids().await?;
                let matched = self.taxonomy.matching_against_published_taxons(&ids).await?;
                Ok::<_, ServiceError>(matched.into_iter().collect())
            })
            .await
    }

    async fn visible_draft_taxon_content_ids(&self) -> Result<&HashSet<String>, ServiceError> {
        self.visible_draft_ids
            .get_or_try_init(|| async {
                let ids = self.taxon_content_ids().await?;
                let matched = self
                    .taxonomy
                    .matching_against_visible_draft_taxons(&ids)
                    .await?;
                Ok::<_, ServiceError>(matched.into_iter().collect())
            })
            .await
    }
}
