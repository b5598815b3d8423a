use std::{sync::Arc, time::Duration};

use shared::domain::{guardian_display_name, GuardianContact};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::{
    backend::GuardianDirectory,
    error::GuardianSaveError,
    notify::{Notifier, ToastOptions},
};

const VALIDATION_TOAST: Duration = Duration::from_millis(3000);
const SAVE_FAILED_TOAST: Duration = Duration::from_millis(4000);
const SAVED_TOAST: Duration = Duration::from_millis(4000);

pub struct GuardianCache {
    directory: Arc<dyn GuardianDirectory>,
    notifier: Arc<dyn Notifier>,
    snapshot: RwLock<Option<GuardianContact>>,
}

impl GuardianCache {
    pub fn new(directory: Arc<dyn GuardianDirectory>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            directory,
            notifier,
            snapshot: RwLock::new(None),
        }
    }

    /// Reloads from the directory; on failure the previous snapshot is kept.
    pub async fn refresh(&self) -> Option<GuardianContact> {
        match self.directory.get_guardian_contact().await {
            Ok(contact) => {
                let mut snapshot = self.snapshot.write().await;
                *snapshot = contact;
                snapshot.clone()
            }
            Err(err) => {
                warn!(error = %err, "guardian: refresh failed, keeping cached contact");
                self.snapshot.read().await.clone()
            }
        }
    }

    pub async fn snapshot(&self) -> Option<GuardianContact> {
        self.snapshot.read().await.clone()
    }

    pub async fn display_name(&self) -> String {
        guardian_display_name(self.snapshot.read().await.as_ref()).to_string()
    }

    pub async fn save(
        &self,
        name: &str,
        phone_number: &str,
    ) -> Result<GuardianContact, GuardianSaveError> {
        let contact = match GuardianContact::new(name, phone_number) {
            Ok(contact) => contact,
            Err(err) => {
                self.notifier.notify(
                    "Please enter both name and phone number",
                    ToastOptions::error(VALIDATION_TOAST),
                );
                return Err(err.into());
            }
        };

        if let Err(err) = self.directory.save_guardian_contact(&contact).await {
            warn!(error = %err, "guardian: save failed");
            self.notifier.notify(
                "Could not save contact. Please try again.",
                ToastOptions::error(SAVE_FAILED_TOAST),
            );
            return Err(GuardianSaveError::Backend(err.to_string()));
        }

        *self.snapshot.write().await = Some(contact.clone());
        info!("guardian: contact saved");
        self.notifier.notify(
            "Guardian contact saved successfully!",
            ToastOptions::success(SAVED_TOAST),
        );
        Ok(contact)
    }
}

#[cfg(test)]
#[path = "tests/guardian_tests.rs"]
mod tests;
