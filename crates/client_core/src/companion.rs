use std::sync::Arc;

use anyhow::Result;
use shared::domain::PanicLogEntry;
use tracing::info;

use crate::{
    backend::{GuardianDirectory, PanicLedger},
    call::{CallTimer, CallTimerConfig},
    demo::{DemoConfig, DemoOrchestrator},
    guardian::GuardianCache,
    notify::{announce_protection_active, remind_protection, Notifier},
    panic::{PanicConfig, PanicController},
    voice::VoiceAnnouncer,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompanionConfig {
    pub panic: PanicConfig,
    pub call: CallTimerConfig,
    pub demo: DemoConfig,
}

pub struct SafetyCompanion {
    config: CompanionConfig,
    ledger: Arc<dyn PanicLedger>,
    announcer: VoiceAnnouncer,
    notifier: Arc<dyn Notifier>,
    guardian: Arc<GuardianCache>,
    panic: PanicController,
}

impl SafetyCompanion {
    pub fn new(
        config: CompanionConfig,
        directory: Arc<dyn GuardianDirectory>,
        ledger: Arc<dyn PanicLedger>,
        announcer: VoiceAnnouncer,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let guardian = Arc::new(GuardianCache::new(directory, notifier.clone()));
        let panic = PanicController::new(
            config.panic,
            ledger.clone(),
            guardian.clone(),
            announcer.clone(),
            notifier.clone(),
        );
        Self {
            config,
            ledger,
            announcer,
            notifier,
            guardian,
            panic,
        }
    }

    pub async fn start(&self) {
        let contact = self.guardian.refresh().await;
        let notified = announce_protection_active(self.notifier.as_ref());
        info!(
            guardian_configured = contact.is_some(),
            notified,
            speech_available = self.announcer.is_available(),
            "companion: started"
        );
    }

    pub fn remind(&self) -> bool {
        remind_protection(self.notifier.as_ref())
    }

    pub fn guardian(&self) -> &Arc<GuardianCache> {
        &self.guardian
    }

    pub fn panic_controller(&self) -> &PanicController {
        &self.panic
    }

    pub async fn open_call_screen(&self) -> CallTimer {
        CallTimer::open(self.announcer.clone(), self.config.call).await
    }

    pub fn open_demo(&self) -> DemoOrchestrator {
        DemoOrchestrator::open(
            self.config.demo,
            self.announcer.clone(),
            self.notifier.clone(),
            self.guardian.clone(),
        )
    }

    pub async fn panic_history(&self) -> Result<Vec<PanicLogEntry>> {
        self.ledger.get_panic_log().await
    }
}

#[cfg(test)]
#[path = "tests/companion_tests.rs"]
mod tests;
