use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Label used in every user-facing message when no guardian is configured.
pub const GUARDIAN_PLACEHOLDER: &str = "your Guardian";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContactValidationError {
    #[error("guardian name must not be empty")]
    EmptyName,
    #[error("guardian phone number must not be empty")]
    EmptyPhoneNumber,
}

/// The one trusted contact alerted on panic. Both fields are non-empty and trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawGuardianContact")]
pub struct GuardianContact {
    name: String,
    phone_number: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGuardianContact {
    name: String,
    phone_number: String,
}

impl TryFrom<RawGuardianContact> for GuardianContact {
    type Error = ContactValidationError;

    fn try_from(raw: RawGuardianContact) -> Result<Self, Self::Error> {
        Self::new(raw.name, raw.phone_number)
    }
}

impl GuardianContact {
    pub fn new(
        name: impl AsRef<str>,
        phone_number: impl AsRef<str>,
    ) -> Result<Self, ContactValidationError> {
        let name = name.as_ref().trim();
        let phone_number = phone_number.as_ref().trim();
        if name.is_empty() {
            return Err(ContactValidationError::EmptyName);
        }
        if phone_number.is_empty() {
            return Err(ContactValidationError::EmptyPhoneNumber);
        }
        Ok(Self {
            name: name.to_string(),
            phone_number: phone_number.to_string(),
        })
    }

    /// Collaborators report "unset" as a record with empty fields.
    pub fn from_raw(name: &str, phone_number: &str) -> Option<Self> {
        Self::new(name, phone_number).ok()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }
}

pub fn guardian_display_name(contact: Option<&GuardianContact>) -> &str {
    contact.map_or(GUARDIAN_PLACEHOLDER, GuardianContact::name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PanicLogEntry {
    pub timestamp: DateTime<Utc>,
}

impl PanicLogEntry {
    pub fn now() -> Self {
        Self {
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_accepts_contact() {
        let contact = GuardianContact::new("  Asha ", " +91 98765 43210 ").expect("contact");
        assert_eq!(contact.name(), "Asha");
        assert_eq!(contact.phone_number(), "+91 98765 43210");
    }

    #[test]
    fn rejects_blank_fields() {
        assert_eq!(
            GuardianContact::new("   ", "100"),
            Err(ContactValidationError::EmptyName)
        );
        assert_eq!(
            GuardianContact::new("Asha", ""),
            Err(ContactValidationError::EmptyPhoneNumber)
        );
    }

    #[test]
    fn empty_record_reads_as_unset() {
        assert!(GuardianContact::from_raw("", "").is_none());
        assert!(GuardianContact::from_raw("Asha", "").is_none());
    }

    #[test]
    fn display_name_falls_back_to_placeholder() {
        assert_eq!(guardian_display_name(None), "your Guardian");
        let contact = GuardianContact::new("Ravi", "1091").expect("contact");
        assert_eq!(guardian_display_name(Some(&contact)), "Ravi");
    }

    #[test]
    fn deserializing_blank_contact_fails() {
        let raw = serde_json::json!({ "name": "", "phoneNumber": "100" });
        assert!(serde_json::from_value::<GuardianContact>(raw).is_err());
    }

    #[test]
    fn serializes_phone_number_in_camel_case() {
        let contact = GuardianContact::new("Ravi", "1091").expect("contact");
        let json = serde_json::to_value(&contact).expect("json");
        assert_eq!(json["phoneNumber"], "1091");
    }
}
