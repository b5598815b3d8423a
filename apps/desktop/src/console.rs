use client_core::{
    demo::DEMO_CONNECTING_LABEL, CallEvent, CallSnapshot, CallState, DemoEvent, DemoStage,
    NotificationPermission, Notifier, PanicEvent, Severity, ToastOptions,
};
use shared::safety::SCAM_INDICATORS;
use tokio::sync::broadcast::{self, error::RecvError};

/// Toasts and OS notifications rendered as terminal lines.
pub struct ConsoleNotifier {
    permission: NotificationPermission,
}

impl ConsoleNotifier {
    pub fn new(notifications_granted: bool) -> Self {
        let permission = if notifications_granted {
            NotificationPermission::Granted
        } else {
            NotificationPermission::Default
        };
        Self { permission }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str, options: ToastOptions) {
        let marker = match options.severity {
            Severity::Success => "ok",
            Severity::Error => "!!",
            Severity::Info => "--",
        };
        println!("[{marker}] {message}");
    }

    fn show_notification(&self, title: &str, body: &str) {
        println!("** {title}: {body}");
    }

    fn permission(&self) -> NotificationPermission {
        self.permission
    }
}

pub fn describe_call(snapshot: &CallSnapshot) -> String {
    match snapshot.state {
        CallState::Idle => "No active call. Type `ring` to simulate an incoming call.".to_string(),
        CallState::Incoming => "Incoming call: Unknown Number. `answer` or `decline`.".to_string(),
        CallState::Active => {
            let urgency = if snapshot.is_final_stretch() { " (!)" } else { "" };
            format!(
                "On call {} | time remaining {}{urgency}",
                snapshot.call_duration_label(),
                snapshot.time_remaining_label()
            )
        }
        CallState::Warning => {
            "WARNING: this call has gone on too long. `hangup` or `dismiss`.".to_string()
        }
    }
}

pub async fn render_call_events(mut events: broadcast::Receiver<CallEvent>) {
    loop {
        match events.recv().await {
            Ok(CallEvent::StateChanged { snapshot, .. }) => {
                println!("{}", describe_call(&snapshot))
            }
            Ok(CallEvent::Tick(snapshot)) => {
                let remaining = snapshot.remaining_seconds;
                if remaining % 60 == 0 || remaining <= 10 {
                    println!("{}", describe_call(&snapshot));
                }
            }
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }
}

/// Returns once the demo has closed.
pub async fn render_demo_events(mut events: broadcast::Receiver<DemoEvent>) {
    loop {
        match events.recv().await {
            Ok(DemoEvent::Connecting) => println!("{DEMO_CONNECTING_LABEL}"),
            Ok(DemoEvent::StageChanged(DemoStage::Intervention)) => {
                println!("SCAM DETECTED!");
                for indicator in SCAM_INDICATORS {
                    println!("  x {indicator}");
                }
                println!("`safe` to hang up, `guardian` to call your guardian.");
            }
            Ok(DemoEvent::StageChanged(DemoStage::Incoming)) => {}
            Ok(DemoEvent::Closed(outcome)) => {
                println!("demo closed ({outcome:?})");
                break;
            }
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }
}

/// Returns once the cool-down has elapsed.
pub async fn render_panic_events(mut events: broadcast::Receiver<PanicEvent>) {
    loop {
        match events.recv().await {
            Ok(PanicEvent::AlertStarted) => println!("Sending alert..."),
            Ok(PanicEvent::AlertSent { guardian }) => {
                println!("Emergency alert activated! Mock SMS sent to {guardian}.")
            }
            Ok(PanicEvent::CooledDown) => {
                println!("Panic button ready again.");
                break;
            }
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }
}
