use std::{
    fmt,
    sync::{Arc, Weak},
    time::Duration,
};

use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    error::TransitionError,
    guardian::GuardianCache,
    notify::{Notifier, ToastOptions},
    voice::VoiceAnnouncer,
};

pub const DEMO_CALLER: &str = "CBI Officer - Rajesh Kumar";
pub const DEMO_CALL_LABEL: &str = "Incoming WhatsApp Video Call...";
pub const DEMO_CONNECTING_LABEL: &str = "Connecting call... Sahayak analyzing...";
pub const DEMO_SCRIPT: &str =
    "Warning! This is a scam. The CBI does not arrest people over video calls. Please hang up immediately.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoConfig {
    pub connect_delay: Duration,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            connect_delay: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DemoStage {
    Incoming,
    Intervention,
}

impl DemoStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Incoming => "incoming",
            Self::Intervention => "intervention",
        }
    }
}

impl fmt::Display for DemoStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoOutcome {
    Declined,
    HungUpSafe,
    CalledGuardian,
    Dismissed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoSnapshot {
    pub session_id: Uuid,
    pub stage: DemoStage,
    pub transitioning: bool,
    pub outcome: Option<DemoOutcome>,
}

impl DemoSnapshot {
    pub fn is_closed(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn accepts_input(&self) -> bool {
        !self.transitioning && self.outcome.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoEvent {
    Connecting,
    StageChanged(DemoStage),
    Closed(DemoOutcome),
}

pub struct DemoOrchestrator {
    inner: Arc<DemoInner>,
}

struct DemoInner {
    config: DemoConfig,
    announcer: VoiceAnnouncer,
    notifier: Arc<dyn Notifier>,
    guardian: Arc<GuardianCache>,
    session: Mutex<DemoSession>,
    events: broadcast::Sender<DemoEvent>,
}

struct DemoSession {
    id: Uuid,
    stage: DemoStage,
    transitioning: bool,
    outcome: Option<DemoOutcome>,
    epoch: u64,
    timer: Option<JoinHandle<()>>,
}

impl DemoSession {
    fn snapshot(&self) -> DemoSnapshot {
        DemoSnapshot {
            session_id: self.id,
            stage: self.stage,
            transitioning: self.transitioning,
            outcome: self.outcome,
        }
    }

    fn cancel_timer(&mut self) {
        self.epoch += 1;
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    fn require(&self, stage: DemoStage, action: &'static str) -> Result<(), TransitionError> {
        if self.outcome.is_some() {
            return Err(TransitionError::Closed);
        }
        if self.transitioning {
            return Err(TransitionError::Transitioning);
        }
        if self.stage != stage {
            return Err(TransitionError::InvalidTransition {
                state: self.stage.as_str(),
                action,
            });
        }
        Ok(())
    }
}

impl Drop for DemoInner {
    fn drop(&mut self) {
        self.session.get_mut().cancel_timer();
    }
}

impl DemoInner {
    fn finish(&self, session: &mut DemoSession, outcome: DemoOutcome) -> DemoSnapshot {
        session.cancel_timer();
        session.transitioning = false;
        session.outcome = Some(outcome);
        self.announcer.cancel_all();
        info!(session_id = %session.id, stage = %session.stage, ?outcome, "demo: closed");
        let _ = self.events.send(DemoEvent::Closed(outcome));
        session.snapshot()
    }
}

impl DemoOrchestrator {
    pub fn open(
        config: DemoConfig,
        announcer: VoiceAnnouncer,
        notifier: Arc<dyn Notifier>,
        guardian: Arc<GuardianCache>,
    ) -> Self {
        let (events, _) = broadcast::channel(32);
        let id = Uuid::new_v4();
        debug!(session_id = %id, "demo: opened");
        Self {
            inner: Arc::new(DemoInner {
                config,
                announcer,
                notifier,
                guardian,
                session: Mutex::new(DemoSession {
                    id,
                    stage: DemoStage::Incoming,
                    transitioning: false,
                    outcome: None,
                    epoch: 0,
                    timer: None,
                }),
                events,
            }),
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<DemoEvent> {
        self.inner.events.subscribe()
    }

    pub async fn snapshot(&self) -> DemoSnapshot {
        self.inner.session.lock().await.snapshot()
    }

    pub async fn accept(&self) -> Result<DemoSnapshot, TransitionError> {
        let mut session = self.inner.session.lock().await;
        session.require(DemoStage::Incoming, "accept")?;
        session.cancel_timer();
        session.transitioning = true;

        let epoch = session.epoch;
        let weak = Arc::downgrade(&self.inner);
        let delay = self.inner.config.connect_delay;
        session.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            finish_connecting(weak, epoch).await;
        }));

        debug!(session_id = %session.id, "demo: connecting");
        let _ = self.inner.events.send(DemoEvent::Connecting);
        Ok(session.snapshot())
    }

    pub async fn decline(&self) -> Result<DemoSnapshot, TransitionError> {
        let mut session = self.inner.session.lock().await;
        session.require(DemoStage::Incoming, "decline")?;
        let snapshot = self.inner.finish(&mut session, DemoOutcome::Declined);
        self.inner.notifier.notify(
            "Good choice! Stay safe.",
            ToastOptions::success(Duration::from_millis(3000)),
        );
        Ok(snapshot)
    }

    pub async fn hang_up_safe(&self) -> Result<DemoSnapshot, TransitionError> {
        let mut session = self.inner.session.lock().await;
        session.require(DemoStage::Intervention, "hang up")?;
        let snapshot = self.inner.finish(&mut session, DemoOutcome::HungUpSafe);
        self.inner.notifier.notify(
            "Good choice! Sahayak kept you safe.",
            ToastOptions::success(Duration::from_millis(4000)),
        );
        Ok(snapshot)
    }

    pub async fn call_guardian(&self) -> Result<DemoSnapshot, TransitionError> {
        let mut session = self.inner.session.lock().await;
        session.require(DemoStage::Intervention, "call guardian")?;
        self.inner.announcer.cancel_all();
        let guardian = self.inner.guardian.display_name().await;
        self.inner.notifier.notify(
            &format!("Mock SMS sent to {guardian}: \"I need help, possible scam call!\""),
            ToastOptions::success(Duration::from_millis(5000)),
        );
        Ok(self.inner.finish(&mut session, DemoOutcome::CalledGuardian))
    }

    pub async fn dismiss(&self) -> Result<DemoSnapshot, TransitionError> {
        let mut session = self.inner.session.lock().await;
        if session.outcome.is_some() {
            return Err(TransitionError::Closed);
        }
        Ok(self.inner.finish(&mut session, DemoOutcome::Dismissed))
    }
}

async fn finish_connecting(inner: Weak<DemoInner>, epoch: u64) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    let mut session = inner.session.lock().await;
    if session.epoch != epoch || !session.transitioning || session.outcome.is_some() {
        debug!(session_id = %session.id, "demo: stale connect dropped");
        return;
    }
    session.timer = None;
    session.transitioning = false;
    session.stage = DemoStage::Intervention;
    info!(session_id = %session.id, "demo: intervention");
    inner.announcer.speak(DEMO_SCRIPT);
    let _ = inner.events.send(DemoEvent::StageChanged(DemoStage::Intervention));
}

#[cfg(test)]
#[path = "tests/demo_tests.rs"]
mod tests;
