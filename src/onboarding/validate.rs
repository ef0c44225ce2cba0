//! Form validation for the onboarding screens that collect free text.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use super::model::{EmergencyContact, Gender, UserProfile};
use crate::error::{FieldError, ValidationError};

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern is valid"));

/// Raw input from the personal-info screen.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfoForm {
    pub name: String,
    pub email: String,
    pub date_of_birth: String,
    /// Selected gender option id, if any.
    pub gender: Option<String>,
}

impl PersonalInfoForm {
    /// Validate every field and build a fresh profile from the trimmed values.
    pub fn validate(&self) -> Result<UserProfile, ValidationError> {
        let mut fields = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            fields.push(FieldError::new("name", "Name is required"));
        }

        let email = self.email.trim();
        if email.is_empty() {
            fields.push(FieldError::new("email", "Email is required"));
        } else if !EMAIL.is_match(email) {
            fields.push(FieldError::new("email", "Please enter a valid email address"));
        }

        let date_of_birth = self.date_of_birth.trim();
        if date_of_birth.is_empty() {
            fields.push(FieldError::new("dateOfBirth", "Date of birth is required"));
        }

        let gender = self.gender.as_deref().and_then(Gender::from_id);
        if gender.is_none() {
            fields.push(FieldError::new("gender", "Please select your gender"));
        }

        match gender {
            Some(gender) if fields.is_empty() => Ok(UserProfile::new(
                name,
                Some(email.to_string()),
                date_of_birth,
                gender,
            )),
            _ => Err(ValidationError { fields }),
        }
    }
}

/// One row of the emergency-contacts screen.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDraft {
    pub name: String,
    pub relationship: String,
    pub phone_number: String,
    pub is_primary: bool,
}

/// Validate contact rows. Blank rows are dropped; a row with only a name or
/// only a phone number is an error.
pub fn validate_contacts(drafts: &[ContactDraft]) -> Result<Vec<EmergencyContact>, ValidationError> {
    let mut fields = Vec::new();

    for (index, draft) in drafts.iter().enumerate() {
        let has_name = !draft.name.trim().is_empty();
        let has_phone = !draft.phone_number.trim().is_empty();
        if has_name && !has_phone {
            fields.push(FieldError::new(
                format!("phone-{index}"),
                "Phone number is required",
            ));
        }
        if has_phone && !has_name {
            fields.push(FieldError::new(format!("name-{index}"), "Name is required"));
        }
    }

    if !fields.is_empty() {
        return Err(ValidationError { fields });
    }

    Ok(drafts
        .iter()
        .filter(|d| !d.name.trim().is_empty() && !d.phone_number.trim().is_empty())
        .enumerate()
        .map(|(index, d)| {
            let relationship = d.relationship.trim();
            EmergencyContact {
                id: format!("emergency-{index}"),
                name: d.name.trim().to_string(),
                relationship: if relationship.is_empty() {
                    "Emergency Contact".to_string()
                } else {
                    relationship.to_string()
                },
                phone_number: d.phone_number.trim().to_string(),
                is_primary: d.is_primary,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> PersonalInfoForm {
        PersonalInfoForm {
            name: "  Sam Rivera ".to_string(),
            email: "sam@example.com".to_string(),
            date_of_birth: "1988-02-14".to_string(),
            gender: Some("other".to_string()),
        }
    }

    #[test]
    fn valid_personal_info_builds_profile() {
        let profile = valid_form().validate().unwrap();
        assert_eq!(profile.name, "Sam Rivera");
        assert_eq!(profile.email.as_deref(), Some("sam@example.com"));
        assert_eq!(profile.gender, Gender::Other);
    }

    #[test]
    fn empty_form_reports_every_field() {
        let err = PersonalInfoForm::default().validate().unwrap_err();
        assert_eq!(err.fields.len(), 4);
        assert_eq!(err.message_for("name"), Some("Name is required"));
        assert_eq!(err.message_for("email"), Some("Email is required"));
        assert_eq!(err.message_for("dateOfBirth"), Some("Date of birth is required"));
        assert_eq!(err.message_for("gender"), Some("Please select your gender"));
    }

    #[test]
    fn malformed_email_rejected() {
        let form = PersonalInfoForm {
            email: "sam@example".to_string(),
            ..valid_form()
        };
        let err = form.validate().unwrap_err();
        assert_eq!(
            err.message_for("email"),
            Some("Please enter a valid email address")
        );
        assert_eq!(err.fields.len(), 1);
    }

    #[test]
    fn unknown_gender_rejected() {
        let form = PersonalInfoForm {
            gender: Some("robot".to_string()),
            ..valid_form()
        };
        assert!(form.validate().unwrap_err().message_for("gender").is_some());
    }

    #[test]
    fn contacts_drop_blank_rows_and_default_relationship() {
        let drafts = vec![
            ContactDraft {
                name: "Jo".to_string(),
                phone_number: "555-0100".to_string(),
                is_primary: true,
                ..Default::default()
            },
            ContactDraft::default(),
            ContactDraft {
                name: "Max".to_string(),
                relationship: "Brother".to_string(),
                phone_number: "555-0199".to_string(),
                is_primary: false,
            },
        ];
        let contacts = validate_contacts(&drafts).unwrap();
        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts[0].id, "emergency-0");
        assert_eq!(contacts[0].relationship, "Emergency Contact");
        assert!(contacts[0].is_primary);
        assert_eq!(contacts[1].id, "emergency-1");
        assert_eq!(contacts[1].relationship, "Brother");
    }

    #[test]
    fn half_filled_contacts_rejected() {
        let drafts = vec![
            ContactDraft {
                name: "Jo".to_string(),
                ..Default::default()
            },
            ContactDraft {
                phone_number: "555-0100".to_string(),
                ..Default::default()
            },
        ];
        let err = validate_contacts(&drafts).unwrap_err();
        assert_eq!(err.message_for("phone-0"), Some("Phone number is required"));
        assert_eq!(err.message_for("name-1"), Some("Name is required"));
    }
}
