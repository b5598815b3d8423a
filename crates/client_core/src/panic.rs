use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use shared::domain::guardian_display_name;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    backend::PanicLedger,
    guardian::GuardianCache,
    notify::{Notifier, ToastOptions},
    voice::VoiceAnnouncer,
};

pub const PANIC_SCRIPT: &str =
    "Police will NEVER arrest you over a video call. This is a scam! Stay calm. Help is coming.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanicConfig {
    pub cooldown: Duration,
    pub toast_duration: Duration,
    pub ledger_timeout: Duration,
}

impl Default for PanicConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(8),
            toast_duration: Duration::from_millis(6000),
            ledger_timeout: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanicOutcome {
    Started,
    AlreadyActive,
    /// The screen was closed before the alert went out.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PanicSnapshot {
    pub active: bool,
    pub banner_visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanicEvent {
    AlertStarted,
    AlertSent { guardian: String },
    CooledDown,
}

pub struct PanicController {
    inner: Arc<PanicInner>,
}

struct PanicInner {
    config: PanicConfig,
    ledger: Arc<dyn PanicLedger>,
    guardian: Arc<GuardianCache>,
    announcer: VoiceAnnouncer,
    notifier: Arc<dyn Notifier>,
    state: Mutex<PanicState>,
    events: broadcast::Sender<PanicEvent>,
}

#[derive(Default)]
struct PanicState {
    active: bool,
    banner_visible: bool,
    epoch: u64,
    cooldown_task: Option<JoinHandle<()>>,
}

impl PanicState {
    fn snapshot(&self) -> PanicSnapshot {
        PanicSnapshot {
            active: self.active,
            banner_visible: self.banner_visible,
        }
    }

    fn cancel_cooldown(&mut self) {
        self.epoch += 1;
        if let Some(task) = self.cooldown_task.take() {
            task.abort();
        }
    }
}

impl Drop for PanicInner {
    fn drop(&mut self) {
        self.state.get_mut().cancel_cooldown();
    }
}

impl PanicController {
    pub fn new(
        config: PanicConfig,
        ledger: Arc<dyn PanicLedger>,
        guardian: Arc<GuardianCache>,
        announcer: VoiceAnnouncer,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(PanicInner {
                config,
                ledger,
                guardian,
                announcer,
                notifier,
                state: Mutex::new(PanicState::default()),
                events,
            }),
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<PanicEvent> {
        self.inner.events.subscribe()
    }

    pub async fn snapshot(&self) -> PanicSnapshot {
        self.inner.state.lock().await.snapshot()
    }

    pub async fn is_active(&self) -> bool {
        self.inner.state.lock().await.active
    }

    pub async fn banner_visible(&self) -> bool {
        self.inner.state.lock().await.banner_visible
    }

    /// Runs one alert cycle. Calls made while a cycle is active are no-ops.
    pub async fn activate(&self) -> PanicOutcome {
        let epoch = {
            let mut state = self.inner.state.lock().await;
            if state.active {
                debug!("panic: activation ignored, alert already in progress");
                return PanicOutcome::AlreadyActive;
            }
            state.active = true;
            state.banner_visible = true;
            state.epoch
        };
        let _ = self.inner.events.send(PanicEvent::AlertStarted);

        self.record_activation().await;
        let contact = self.inner.guardian.snapshot().await;
        let guardian = guardian_display_name(contact.as_ref()).to_string();

        let mut state = self.inner.state.lock().await;
        // `close()` ran while the activation was being recorded.
        if state.epoch != epoch || !state.active {
            debug!("panic: screen closed before the alert went out");
            return PanicOutcome::Cancelled;
        }
        self.inner.announcer.speak(PANIC_SCRIPT);
        self.inner.notifier.notify(
            &format!("Alert sent to {guardian}! Mock SMS triggered."),
            ToastOptions::success(self.inner.config.toast_duration),
        );
        info!(guardian_configured = contact.is_some(), "panic: alert sent");
        let _ = self.inner.events.send(PanicEvent::AlertSent { guardian });

        self.schedule_cooldown(&mut state);
        PanicOutcome::Started
    }

    pub async fn close(&self) {
        let mut state = self.inner.state.lock().await;
        state.cancel_cooldown();
        state.active = false;
        state.banner_visible = false;
        self.inner.announcer.cancel_all();
    }

    async fn record_activation(&self) {
        let write = self.inner.ledger.log_panic_activation();
        match tokio::time::timeout(self.inner.config.ledger_timeout, write).await {
            Ok(Ok(())) => debug!("panic: activation recorded"),
            Ok(Err(err)) => warn!(error = %err, "panic: failed to record activation"),
            Err(_) => warn!("panic: recording activation timed out"),
        }
    }

    fn schedule_cooldown(&self, state: &mut PanicState) {
        state.cancel_cooldown();
        let epoch = state.epoch;
        let weak = Arc::downgrade(&self.inner);
        let cooldown = self.inner.config.cooldown;
        state.cooldown_task = Some(tokio::spawn(async move {
            tokio::time::sleep(cooldown).await;
            finish_cooldown(weak, epoch).await;
        }));
    }
}

async fn finish_cooldown(inner: Weak<PanicInner>, epoch: u64) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    let mut state = inner.state.lock().await;
    if state.epoch != epoch {
        return;
    }
    state.cooldown_task = None;
    state.active = false;
    state.banner_visible = false;
    debug!("panic: cool-down elapsed");
    let _ = inner.events.send(PanicEvent::CooledDown);
}

#[cfg(test)]
#[path = "tests/panic_tests.rs"]
mod tests;
