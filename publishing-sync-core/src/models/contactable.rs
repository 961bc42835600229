//! The polymorphic owner of a contact.
//!
//! A contact belongs to exactly one record of several unrelated kinds. The
//! owner is referenced by kind and id, and its display name is resolved
//! through per-kind lookup functions registered on a [`ContactableRegistry`].

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactableKind {
    Organisation,
    WorldwideOffice,
}

impl fmt::Display for ContactableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContactableKind::Organisation => write!(f, "Organisation"),
            ContactableKind::WorldwideOffice => write!(f, "WorldwideOffice"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactableRef {
    pub kind: ContactableKind,
    pub id: u64,
}

impl ContactableRef {
    pub fn organisation(id: u64) -> Self {
        Self {
            kind: ContactableKind::Organisation,
            id,
        }
    }

    pub fn worldwide_office(id: u64) -> Self {
        Self {
            kind: ContactableKind::WorldwideOffice,
            id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganisationNames {
    pub name: String,
    pub acronym: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldwideOfficeNames {
    pub office_title: String,
    pub worldwide_organisation_name: String,
}

type DisplayNameFn = Box<dyn Fn(u64) -> Option<String> + Send + Sync>;

#[derive(Default)]
pub struct ContactableRegistry {
    resolvers: HashMap<ContactableKind, DisplayNameFn>,
}

impl ContactableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the display-name lookup for one kind, replacing any previous one.
    pub fn register<F>(&mut self, kind: ContactableKind, resolver: F) -> &mut Self
    where
        F: Fn(u64) -> Option<String> + Send + Sync + 'static,
    {
        self.resolvers.insert(kind, Box::new(resolver));
        self
    }

    /// Register organisations, shown by acronym when they have one.
    pub fn register_organisations<F>(&mut self, lookup: F) -> &mut Self
    where
        F: Fn(u64) -> Option<OrganisationNames> + Send + Sync + 'static,
    {
        self.register(ContactableKind::Organisation, move |id| {
            lookup(id).map(|org| acronym_or_name(&org.name, org.acronym.as_deref()))
        })
    }

    /// Register worldwide offices, shown by the name of their worldwide organisation.
    pub fn register_worldwide_offices<F>(&mut self, lookup: F) -> &mut Self
    where
        F: Fn(u64) -> Option<WorldwideOfficeNames> + Send + Sync + 'static,
    {
        self.register(ContactableKind::WorldwideOffice, move |id| {
            lookup(id).map(|office| office.worldwide_organisation_name)
        })
    }

    pub fn display_name(&self, contactable: ContactableRef) -> Option<String> {
        self.resolvers
            .get(&contactable.kind)
            .and_then(|resolve| resolve(contactable.id))
    }
}

/// Organisations are shown by acronym when they have one.
pub fn acronym_or_name(name: &str, acronym: Option<&str>) -> String {
    match acronym.map(str::trim) {
        Some(acronym) if !acronym.is_empty() => acronym.to_string(),
        _ => name.to_string(),
    }
}
