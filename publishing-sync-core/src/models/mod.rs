//! Publishing records with their validation rules.
//!
//! These are plain in-memory records: persistence is the caller's concern.
//! Each record exposes `validate()`, which reports every failing field at once
//! through [`ValidationErrors`].

use std::collections::BTreeMap;
use std::fmt;

pub mod contact;
pub mod contactable;
pub mod edition_organisation;

pub use contact::{Contact, ContactNumber, ContactNumberAttributes, ContactType, Country};
pub use contactable::{
    ContactableKind, ContactableRef, ContactableRegistry, OrganisationNames, WorldwideOfficeNames,
};
pub use edition_organisation::EditionOrganisation;

pub const BLANK: &str = "can't be blank";

/// Field name to failure messages, in field order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<&'static str, Vec<String>>,
}

impl ValidationErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn on(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.errors.keys().copied()
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .flat_map(|(field, messages)| messages.iter().map(move |m| format!("{field} {m}")))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

pub(crate) fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |s| s.trim().is_empty())
}
