//! Public listing of publications: published-only views, featuring and policy topic filters.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::edition::EditionState;

pub const NO_MATCHING_PUBLICATIONS: &str = "There are no matching publications.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Nation {
    England,
    NorthernIreland,
    Scotland,
    Wales,
}

impl Nation {
    pub fn name(self) -> &'static str {
        match self {
            Nation::England => "England",
            Nation::NorthernIreland => "Northern Ireland",
            Nation::Scotland => "Scotland",
            Nation::Wales => "Wales",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NationInapplicability {
    pub nation: Nation,
    #[serde(default)]
    pub alternative_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    pub id: u64,
    pub title: String,
    pub state: EditionState,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub publication_date: Option<NaiveDate>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub related_policy_ids: Vec<u64>,
    #[serde(default)]
    pub unique_reference: Option<String>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub research: bool,
    #[serde(default)]
    pub order_url: Option<String>,
    #[serde(default)]
    pub nation_inapplicabilities: Vec<NationInapplicability>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl Publication {
    pub fn formatted_publication_date(&self) -> Option<String> {
        self.publication_date
            .map(|date| date.format("%-d %B %Y").to_string())
    }

    pub fn unique_reference(&self) -> Option<&str> {
        non_blank(&self.unique_reference)
    }

    pub fn isbn(&self) -> Option<&str> {
        non_blank(&self.isbn)
    }

    pub fn order_url(&self) -> Option<&str> {
        non_blank(&self.order_url)
    }

    /// "This publication does not apply to A and B." or `None` when it covers the whole UK.
    pub fn inapplicable_nations_sentence(&self) -> Option<String> {
        let names: Vec<&str> = self
            .nation_inapplicabilities
            .iter()
            .map(|n| n.nation.name())
            .collect();
        let listed = match names.as_slice() {
            [] => return None,
            [only] => only.to_string(),
            [init @ .., last] => format!("{} and {}", init.join(", "), last),
        };
        Some(format!("This publication does not apply to {listed}."))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyTopic {
    pub slug: String,
    pub policy_ids: Vec<u64>,
}

/// Published publications, most recently published first.
pub fn published_publications(publications: &[Publication]) -> Vec<&Publication> {
    let mut published: Vec<&Publication> = publications
        .iter()
        .filter(|p| p.state == EditionState::Published)
        .collect();
    published.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    published
}

pub fn featured_publications(publications: &[Publication]) -> Vec<&Publication> {
    published_publications(publications)
        .into_iter()
        .filter(|p| p.featured)
        .collect()
}

/// Published publications related to any policy of the `+`-separated topic slugs.
pub fn filter_by_policy_topics<'a>(
    publications: &'a [Publication],
    topics: &[PolicyTopic],
    slugs: &str,
) -> Vec<&'a Publication> {
    let wanted: HashSet<&str> = slugs.split('+').map(str::trim).filter(|s| !s.is_empty()).collect();
    let policy_ids: HashSet<u64> = topics
        .iter()
        .filter(|t| wanted.contains(t.slug.as_str()))
        .flat_map(|t| t.policy_ids.iter().copied())
        .collect();

    published_publications(publications)
        .into_iter()
        .filter(|p| p.related_policy_ids.iter().any(|id| policy_ids.contains(id)))
        .collect()
}
