use serde::{Deserialize, Serialize};

use crate::domain::GuardianContact;

pub fn healthz_route() -> &'static str {
    "/healthz"
}

pub fn guardian_route() -> &'static str {
    "/guardian"
}

pub fn panic_log_route() -> &'static str {
    "/panic-log"
}

/// Wire shape of the guardian record. An unset guardian travels as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardianContactDto {
    pub name: String,
    pub phone_number: String,
}

impl GuardianContactDto {
    pub fn into_contact(self) -> Option<GuardianContact> {
        GuardianContact::from_raw(&self.name, &self.phone_number)
    }
}

impl From<Option<GuardianContact>> for GuardianContactDto {
    fn from(value: Option<GuardianContact>) -> Self {
        match value {
            Some(contact) => Self {
                name: contact.name().to_string(),
                phone_number: contact.phone_number().to_string(),
            },
            None => Self::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveGuardianRequest {
    pub name: String,
    pub phone_number: String,
}

impl From<&GuardianContact> for SaveGuardianRequest {
    fn from(contact: &GuardianContact) -> Self {
        Self {
            name: contact.name().to_string(),
            phone_number: contact.phone_number().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_guardian_round_trips_as_empty_record() {
        let dto = GuardianContactDto::from(None);
        assert_eq!(
            serde_json::to_value(&dto).expect("json"),
            serde_json::json!({ "name": "", "phoneNumber": "" })
        );
        assert!(dto.into_contact().is_none());
    }

    #[test]
    fn configured_guardian_converts_back() {
        let contact = GuardianContact::new("Meera", "1930").expect("contact");
        let dto = GuardianContactDto::from(Some(contact.clone()));
        assert_eq!(dto.into_contact(), Some(contact));
    }
}
