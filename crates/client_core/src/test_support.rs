use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::domain::{GuardianContact, PanicLogEntry};

use crate::{
    backend::{GuardianDirectory, PanicLedger},
    notify::{NotificationPermission, Notifier, ToastOptions},
    voice::{SpeechError, SpeechSynthesizer, Utterance, VoiceAnnouncer},
};

#[derive(Debug, Clone, PartialEq)]
pub enum SpeechCall {
    Speak(Utterance),
    Cancel,
}

#[derive(Default)]
pub struct RecordingSynthesizer {
    calls: Mutex<Vec<SpeechCall>>,
    fail: bool,
}

impl RecordingSynthesizer {
    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<SpeechCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SpeechCall::Speak(utterance) => Some(utterance.text),
                SpeechCall::Cancel => None,
            })
            .collect()
    }

    pub fn cancel_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, SpeechCall::Cancel))
            .count()
    }

    pub fn last(&self) -> Option<SpeechCall> {
        self.calls().last().cloned()
    }
}

impl SpeechSynthesizer for RecordingSynthesizer {
    fn speak(&self, utterance: &Utterance) -> Result<(), SpeechError> {
        self.calls
            .lock()
            .unwrap()
            .push(SpeechCall::Speak(utterance.clone()));
        if self.fail {
            return Err(SpeechError::Engine("synthetic failure".to_string()));
        }
        Ok(())
    }

    fn cancel(&self) {
        self.calls.lock().unwrap().push(SpeechCall::Cancel);
    }
}

pub fn recording_announcer() -> (Arc<RecordingSynthesizer>, VoiceAnnouncer) {
    let synthesizer = Arc::new(RecordingSynthesizer::default());
    let announcer = VoiceAnnouncer::new(synthesizer.clone());
    (synthesizer, announcer)
}

#[derive(Default)]
pub struct RecordingNotifier {
    permission: NotificationPermission,
    toasts: Mutex<Vec<(String, ToastOptions)>>,
    system: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn with_permission(permission: NotificationPermission) -> Self {
        Self {
            permission,
            ..Self::default()
        }
    }

    pub fn toasts(&self) -> Vec<(String, ToastOptions)> {
        self.toasts.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.toasts().into_iter().map(|(message, _)| message).collect()
    }

    pub fn system_notifications(&self) -> Vec<(String, String)> {
        self.system.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, options: ToastOptions) {
        self.toasts
            .lock()
            .unwrap()
            .push((message.to_string(), options));
    }

    fn show_notification(&self, title: &str, body: &str) {
        self.system
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
    }

    fn permission(&self) -> NotificationPermission {
        self.permission
    }
}

#[derive(Default)]
pub struct FakeBackend {
    pub contact: Mutex<Option<GuardianContact>>,
    pub log: Mutex<Vec<PanicLogEntry>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_ledger: AtomicBool,
    save_calls: AtomicUsize,
    ledger_calls: AtomicUsize,
}

impl FakeBackend {
    pub fn with_guardian(name: &str, phone_number: &str) -> Self {
        Self {
            contact: Mutex::new(GuardianContact::from_raw(name, phone_number)),
            ..Self::default()
        }
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_ledger(&self, fail: bool) {
        self.fail_ledger.store(fail, Ordering::SeqCst);
    }

    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    pub fn ledger_calls(&self) -> usize {
        self.ledger_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GuardianDirectory for FakeBackend {
    async fn get_guardian_contact(&self) -> Result<Option<GuardianContact>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(anyhow!("directory offline"));
        }
        Ok(self.contact.lock().unwrap().clone())
    }

    async fn save_guardian_contact(&self, contact: &GuardianContact) -> Result<()> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(anyhow!("directory offline"));
        }
        *self.contact.lock().unwrap() = Some(contact.clone());
        Ok(())
    }
}

#[async_trait]
impl PanicLedger for FakeBackend {
    async fn log_panic_activation(&self) -> Result<()> {
        self.ledger_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_ledger.load(Ordering::SeqCst) {
            return Err(anyhow!("ledger offline"));
        }
        self.log.lock().unwrap().push(PanicLogEntry::now());
        Ok(())
    }

    async fn get_panic_log(&self) -> Result<Vec<PanicLogEntry>> {
        if self.fail_ledger.load(Ordering::SeqCst) {
            return Err(anyhow!("ledger offline"));
        }
        Ok(self.log.lock().unwrap().clone())
    }
}
