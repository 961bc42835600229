use serde::{Deserialize, Serialize};
use url::Url;

use super::contactable::{ContactableRef, ContactableRegistry};
use super::{is_blank, ValidationErrors, BLANK};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactType {
    Foi,
    General,
    Media,
}

impl ContactType {
    pub const ALL: [ContactType; 3] = [ContactType::Foi, ContactType::General, ContactType::Media];

    pub fn id(self) -> u8 {
        match self {
            ContactType::Foi => 1,
            ContactType::General => 2,
            ContactType::Media => 3,
        }
    }

    pub fn find_by_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.id() == id)
    }

    pub fn name(self) -> &'static str {
        match self {
            ContactType::Foi => "Freedom of Information",
            ContactType::General => "General contact",
            ContactType::Media => "Media enquiries",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub id: u64,
    pub iso2: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactNumber {
    pub id: u64,
    pub label: String,
    pub number: String,
}

/// Nested attributes submitted for one contact number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactNumberAttributes {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub destroy: bool,
}

impl ContactNumberAttributes {
    fn is_all_blank(&self) -> bool {
        self.id.is_none() && !self.destroy && is_blank(&self.label) && is_blank(&self.number)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub contact_type: Option<ContactType>,
    #[serde(default)]
    pub contact_form_url: Option<String>,
    #[serde(default)]
    pub recipient: Option<String>,
    #[serde(default)]
    pub street_address: Option<String>,
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<Country>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub contact_numbers: Vec<ContactNumber>,
    #[serde(default)]
    pub contactable: Option<ContactableRef>,
}

impl Contact {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if is_blank(&self.title) {
            errors.add("title", BLANK);
        }
        if self.contact_type.is_none() {
            errors.add("contact_type", BLANK);
        }
        if let Some(raw) = self.contact_form_url.as_deref().filter(|s| !s.trim().is_empty()) {
            if Url::parse(raw.trim()).is_err() {
                errors.add("contact_form_url", "is not valid");
            }
        }
        if self.has_postal_address() {
            if is_blank(&self.street_address) {
                errors.add("street_address", BLANK);
            }
            if self.country.is_none() {
                errors.add("country_id", BLANK);
            }
        }

        errors.into_result()
    }

    pub fn has_postal_address(&self) -> bool {
        !is_blank(&self.recipient)
            || !is_blank(&self.street_address)
            || !is_blank(&self.locality)
            || !is_blank(&self.region)
            || !is_blank(&self.postal_code)
            || self.country.is_some()
    }

    pub fn country_id(&self) -> Option<u64> {
        self.country.as_ref().map(|c| c.id)
    }

    pub fn country_code(&self) -> Option<&str> {
        self.country.as_ref().map(|c| c.iso2.as_str())
    }

    pub fn country_name(&self) -> Option<&str> {
        self.country.as_ref().map(|c| c.name.as_str())
    }

    pub fn is_foi(&self) -> bool {
        self.contact_type == Some(ContactType::Foi)
    }

    pub fn is_media(&self) -> bool {
        self.contact_type == Some(ContactType::Media)
    }

    pub fn is_general(&self) -> bool {
        self.contact_type == Some(ContactType::General)
    }

    pub fn contactable_name(&self, registry: &ContactableRegistry) -> Option<String> {
        self.contactable
            .and_then(|contactable| registry.display_name(contactable))
    }

    /// Apply nested contact number attributes.
    ///
    /// Entries with every field blank are ignored. An entry with an id updates
    /// (or, with `destroy`, removes) the existing number; one without an id is
    /// added with the next free id.
    pub fn assign_contact_numbers(&mut self, attributes: Vec<ContactNumberAttributes>) {
        for attrs in attributes.into_iter().filter(|a| !a.is_all_blank()) {
            match attrs.id {
                Some(id) if attrs.destroy => self.contact_numbers.retain(|n| n.id != id),
                Some(id) => {
                    if let Some(existing) = self.contact_numbers.iter_mut().find(|n| n.id == id) {
                        if let Some(label) = attrs.label {
                            existing.label = label;
                        }
                        if let Some(number) = attrs.number {
                            existing.number = number;
                        }
                    }
                }
                None if attrs.destroy => {}
                None => {
                    let next_id = self.contact_numbers.iter().map(|n| n.id).max().unwrap_or(0) + 1;
                    self.contact_numbers.push(ContactNumber {
                        id: next_id,
                        label: attrs.label.unwrap_or_default(),
                        number: attrs.number.unwrap_or_default(),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::contactable::{acronym_or_name, ContactableKind};

    fn valid_contact() -> Contact {
        Contact {
            title: Some("Press office".into()),
            contact_type: Some(ContactType::Media),
            ..Contact::default()
        }
    }

    fn uk() -> Country {
        Country {
            id: 44,
            iso2: "GB".into(),
            name: "United Kingdom".into(),
        }
    }

    #[test]
    fn title_and_contact_type_are_required() {
        let errors = Contact::default().validate().unwrap_err();
        assert_eq!(errors.on("title"), &[BLANK.to_string()]);
        assert_eq!(errors.on("contact_type"), &[BLANK.to_string()]);
        assert!(valid_contact().validate().is_ok());
    }

    #[test]
    fn postal_fields_require_street_address_and_country() {
        let contact = Contact {
            locality: Some("London".into()),
            ..valid_contact()
        };
        let errors = contact.validate().unwrap_err();
        assert!(!errors.on("street_address").is_empty());
        assert!(!errors.on("country_id").is_empty());

        let complete = Contact {
            street_address: Some("70 Whitehall".into()),
            country: Some(uk()),
            ..contact
        };
        assert!(complete.validate().is_ok());
        assert_eq!(complete.country_code(), Some("GB"));
        assert_eq!(complete.country_name(), Some("United Kingdom"));
    }

    #[test]
    fn blank_postal_fields_do_not_count_as_an_address() {
        let contact = Contact {
            recipient: Some("  ".into()),
            ..valid_contact()
        };
        assert!(!contact.has_postal_address());
        assert!(contact.validate().is_ok());
    }

    #[test]
    fn contact_form_url_must_be_a_uri_when_given() {
        let bad = Contact {
            contact_form_url: Some("not a url".into()),
            ..valid_contact()
        };
        assert!(!bad.validate().unwrap_err().on("contact_form_url").is_empty());

        let blank = Contact {
            contact_form_url: Some(String::new()),
            ..valid_contact()
        };
        assert!(blank.validate().is_ok());
    }

    #[test]
    fn contact_type_predicates_and_lookup() {
        let contact = valid_contact();
        assert!(contact.is_media());
        assert!(!contact.is_foi());
        assert!(!contact.is_general());
        assert_eq!(ContactType::find_by_id(1), Some(ContactType::Foi));
        assert_eq!(ContactType::find_by_id(9), None);
    }

    #[test]
    fn contactable_name_uses_registry() {
        let mut registry = ContactableRegistry::new();
        registry.register(ContactableKind::Organisation, |_| {
            Some(acronym_or_name("HM Treasury", Some("HMT")))
        });
        let contact = Contact {
            contactable: Some(ContactableRef::organisation(5)),
            ..valid_contact()
        };
        assert_eq!(contact.contactable_name(&registry).as_deref(), Some("HMT"));
        assert_eq!(valid_contact().contactable_name(&registry), None);
    }

    #[test]
    fn nested_contact_numbers_skip_blank_entries_and_honour_destroy() {
        let mut contact = valid_contact();
        contact.assign_contact_numbers(vec![
            ContactNumberAttributes {
                label: Some("Switchboard".into()),
                number: Some("020 7946 0000".into()),
                ..Default::default()
            },
            ContactNumberAttributes {
                label: Some(String::new()),
                number: Some(" ".into()),
                ..Default::default()
            },
        ]);
        assert_eq!(contact.contact_numbers.len(), 1);
        assert_eq!(contact.contact_numbers[0].id, 1);

        contact.assign_contact_numbers(vec![ContactNumberAttributes {
            id: Some(1),
            destroy: true,
            ..Default::default()
        }]);
        assert!(contact.contact_numbers.is_empty());
    }
}
