pub mod backend;
pub mod call;
pub mod companion;
pub mod demo;
pub mod error;
pub mod guardian;
pub mod notify;
pub mod panic;
pub mod voice;

pub use backend::{GuardianDirectory, HttpBackend, MissingBackend, PanicLedger, StorageBackend};
pub use call::{format_clock, CallEvent, CallSnapshot, CallState, CallTimer, CallTimerConfig};
pub use companion::{CompanionConfig, SafetyCompanion};
pub use demo::{DemoConfig, DemoEvent, DemoOrchestrator, DemoOutcome, DemoSnapshot, DemoStage};
pub use error::{GuardianSaveError, TransitionError};
pub use guardian::GuardianCache;
pub use notify::{NotificationPermission, Notifier, Severity, ToastOptions, TracingNotifier};
pub use panic::{PanicConfig, PanicController, PanicEvent, PanicOutcome, PanicSnapshot};
pub use voice::{SpeechError, SpeechSynthesizer, TracingSynthesizer, Utterance, VoiceAnnouncer};

#[cfg(test)]
pub(crate) mod test_support;
