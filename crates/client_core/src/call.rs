//! Simulated inbound call with a bounded duration and an automatic warning.
//!
//! ```text
//! idle --ring/auto-ring--> incoming --answer--> active --0s/fast-forward--> warning
//!   ^                         |                   |                          |
//!   +--------decline----------+------end call-----+---hang up / dismiss------+
//! ```

use std::{
    fmt,
    sync::{Arc, Weak},
    time::Duration,
};

use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
    time::{interval_at, Instant},
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{error::TransitionError, voice::VoiceAnnouncer};

pub const DEFAULT_CALL_BUDGET_SECS: u32 = 600;
pub const FINAL_STRETCH_SECS: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallTimerConfig {
    pub budget_seconds: u32,
    pub auto_ring_delay: Duration,
    pub tick: Duration,
}

impl Default for CallTimerConfig {
    fn default() -> Self {
        Self {
            budget_seconds: DEFAULT_CALL_BUDGET_SECS,
            auto_ring_delay: Duration::from_millis(1500),
            tick: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallState {
    Idle,
    Incoming,
    Active,
    Warning,
}

impl CallState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Incoming => "incoming",
            Self::Active => "active",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for CallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

pub fn warning_script(budget_seconds: u32) -> String {
    format!(
        "Warning! You have been on this call for {} minutes. Scammers use long calls to confuse you. Hang up now! Real officials do NOT call like this.",
        budget_seconds / 60
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSnapshot {
    pub session_id: Uuid,
    pub state: CallState,
    pub remaining_seconds: u32,
    pub budget_seconds: u32,
}

impl CallSnapshot {
    pub fn call_duration_seconds(&self) -> u32 {
        self.budget_seconds.saturating_sub(self.remaining_seconds)
    }

    pub fn call_duration_label(&self) -> String {
        format_clock(self.call_duration_seconds())
    }

    pub fn time_remaining_label(&self) -> String {
        format_clock(self.remaining_seconds)
    }

    pub fn is_final_stretch(&self) -> bool {
        self.state == CallState::Active && self.remaining_seconds < FINAL_STRETCH_SECS
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallEvent {
    StateChanged { from: CallState, snapshot: CallSnapshot },
    Tick(CallSnapshot),
}

pub struct CallTimer {
    inner: Arc<CallInner>,
}

struct CallInner {
    config: CallTimerConfig,
    announcer: VoiceAnnouncer,
    session: Mutex<CallSession>,
    events: broadcast::Sender<CallEvent>,
}

struct CallSession {
    id: Uuid,
    state: CallState,
    remaining_seconds: u32,
    epoch: u64,
    timer: Option<JoinHandle<()>>,
    closed: bool,
}

impl CallSession {
    fn cancel_timer(&mut self) {
        self.epoch += 1;
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for CallInner {
    fn drop(&mut self) {
        self.session.get_mut().cancel_timer();
    }
}

impl CallInner {
    fn snapshot(&self, session: &CallSession) -> CallSnapshot {
        CallSnapshot {
            session_id: session.id,
            state: session.state,
            remaining_seconds: session.remaining_seconds,
            budget_seconds: self.config.budget_seconds,
        }
    }

    fn set_state(&self, session: &mut CallSession, to: CallState) -> CallSnapshot {
        let from = session.state;
        session.state = to;
        let snapshot = self.snapshot(session);
        info!(
            session_id = %session.id,
            %from,
            %to,
            remaining_seconds = session.remaining_seconds,
            "call: state changed"
        );
        let _ = self.events.send(CallEvent::StateChanged { from, snapshot });
        snapshot
    }

    fn enter_warning(&self, session: &mut CallSession) -> CallSnapshot {
        let snapshot = self.set_state(session, CallState::Warning);
        self.announcer.speak(&warning_script(self.config.budget_seconds));
        snapshot
    }

    fn reset(&self, session: &mut CallSession) -> CallSnapshot {
        session.cancel_timer();
        session.remaining_seconds = self.config.budget_seconds;
        self.announcer.cancel_all();
        self.set_state(session, CallState::Idle)
    }

    fn require(
        session: &CallSession,
        expected: CallState,
        action: &'static str,
    ) -> Result<(), TransitionError> {
        if session.closed {
            return Err(TransitionError::Closed);
        }
        if session.state != expected {
            return Err(TransitionError::InvalidTransition {
                state: session.state.as_str(),
                action,
            });
        }
        Ok(())
    }
}

impl CallTimer {
    /// Entering the call screen. Rings automatically after the configured delay
    /// unless the user has already moved the session out of `idle`.
    pub async fn open(announcer: VoiceAnnouncer, config: CallTimerConfig) -> Self {
        let (events, _) = broadcast::channel(256);
        let inner = Arc::new(CallInner {
            config,
            announcer,
            session: Mutex::new(CallSession {
                id: Uuid::new_v4(),
                state: CallState::Idle,
                remaining_seconds: config.budget_seconds,
                epoch: 0,
                timer: None,
                closed: false,
            }),
            events,
        });

        {
            let mut session = inner.session.lock().await;
            let epoch = session.epoch;
            let weak = Arc::downgrade(&inner);
            session.timer = Some(tokio::spawn(async move {
                tokio::time::sleep(config.auto_ring_delay).await;
                auto_ring(weak, epoch).await;
            }));
            debug!(session_id = %session.id, "call: screen opened");
        }

        Self { inner }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<CallEvent> {
        self.inner.events.subscribe()
    }

    pub async fn snapshot(&self) -> CallSnapshot {
        let session = self.inner.session.lock().await;
        self.inner.snapshot(&session)
    }

    pub async fn ring(&self) -> Result<CallSnapshot, TransitionError> {
        let mut session = self.inner.session.lock().await;
        CallInner::require(&session, CallState::Idle, "ring")?;
        session.cancel_timer();
        Ok(self.inner.set_state(&mut session, CallState::Incoming))
    }

    pub async fn decline(&self) -> Result<CallSnapshot, TransitionError> {
        let mut session = self.inner.session.lock().await;
        CallInner::require(&session, CallState::Incoming, "decline")?;
        session.cancel_timer();
        Ok(self.inner.set_state(&mut session, CallState::Idle))
    }

    pub async fn answer(&self) -> Result<CallSnapshot, TransitionError> {
        let mut session = self.inner.session.lock().await;
        CallInner::require(&session, CallState::Incoming, "answer")?;
        session.cancel_timer();
        session.remaining_seconds = self.inner.config.budget_seconds;

        let epoch = session.epoch;
        let weak = Arc::downgrade(&self.inner);
        let tick = self.inner.config.tick;
        session.timer = Some(tokio::spawn(run_countdown(weak, epoch, tick)));

        Ok(self.inner.set_state(&mut session, CallState::Active))
    }

    /// Demonstration shortcut: stop the countdown and warn immediately.
    pub async fn fast_forward(&self) -> Result<CallSnapshot, TransitionError> {
        let mut session = self.inner.session.lock().await;
        CallInner::require(&session, CallState::Active, "fast forward")?;
        session.cancel_timer();
        Ok(self.inner.enter_warning(&mut session))
    }

    pub async fn end_call(&self) -> Result<CallSnapshot, TransitionError> {
        let mut session = self.inner.session.lock().await;
        CallInner::require(&session, CallState::Active, "end call")?;
        Ok(self.inner.reset(&mut session))
    }

    pub async fn hang_up(&self) -> Result<CallSnapshot, TransitionError> {
        let mut session = self.inner.session.lock().await;
        CallInner::require(&session, CallState::Warning, "hang up")?;
        Ok(self.inner.reset(&mut session))
    }

    /// "I'm safe": leaves the warning without stopping speech, unlike `hang_up`.
    pub async fn dismiss_warning(&self) -> Result<CallSnapshot, TransitionError> {
        let mut session = self.inner.session.lock().await;
        CallInner::require(&session, CallState::Warning, "dismiss warning")?;
        session.cancel_timer();
        Ok(self.inner.set_state(&mut session, CallState::Idle))
    }

    pub async fn reset(&self) -> CallSnapshot {
        let mut session = self.inner.session.lock().await;
        self.inner.reset(&mut session)
    }

    pub async fn close(&self) {
        let mut session = self.inner.session.lock().await;
        if session.closed {
            return;
        }
        self.inner.reset(&mut session);
        session.closed = true;
        debug!(session_id = %session.id, "call: screen closed");
    }
}

async fn auto_ring(inner: Weak<CallInner>, epoch: u64) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    let mut session = inner.session.lock().await;
    if session.epoch != epoch || session.state != CallState::Idle || session.closed {
        debug!(session_id = %session.id, "call: stale auto-ring dropped");
        return;
    }
    session.timer = None;
    inner.set_state(&mut session, CallState::Incoming);
}

async fn run_countdown(inner: Weak<CallInner>, epoch: u64, tick: Duration) {
    let mut interval = interval_at(Instant::now() + tick, tick);
    loop {
        interval.tick().await;
        let Some(strong) = inner.upgrade() else {
            return;
        };
        if !apply_tick(&strong, epoch).await {
            return;
        }
    }
}

async fn apply_tick(inner: &CallInner, epoch: u64) -> bool {
    let mut session = inner.session.lock().await;
    if session.epoch != epoch || session.state != CallState::Active {
        return false;
    }

    session.remaining_seconds = session.remaining_seconds.saturating_sub(1);
    let _ = inner.events.send(CallEvent::Tick(inner.snapshot(&session)));

    if session.remaining_seconds > 0 {
        return true;
    }
    // The countdown ends here; detach our own handle rather than abort it.
    session.timer = None;
    inner.enter_warning(&mut session);
    false
}

#[cfg(test)]
#[path = "tests/call_tests.rs"]
mod tests;
