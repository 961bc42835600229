use serde::{Deserialize, Serialize};

use super::{ValidationErrors, BLANK};

/// Join record between an edition and an organisation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditionOrganisation {
    #[serde(default)]
    pub edition_id: Option<u64>,
    #[serde(default)]
    pub organisation_id: Option<u64>,
    #[serde(default)]
    pub lead: bool,
    #[serde(default)]
    pub lead_ordering: Option<u32>,
}

impl EditionOrganisation {
    pub fn new(edition_id: u64, organisation_id: u64) -> Self {
        Self {
            edition_id: Some(edition_id),
            organisation_id: Some(organisation_id),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if self.edition_id.is_none() {
            errors.add("edition", BLANK);
        }
        if self.organisation_id.is_none() {
            errors.add("organisation", BLANK);
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_edition_and_organisation() {
        let errors = EditionOrganisation::default().validate().unwrap_err();
        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(fields, vec!["edition", "organisation"]);
        assert_eq!(errors.to_string(), "edition can't be blank, organisation can't be blank");
    }

    #[test]
    fn valid_with_both_ids() {
        assert!(EditionOrganisation::new(1, 2).validate().is_ok());
    }
}
