use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

pub const SPEECH_RATE: f32 = 0.8;
pub const SPEECH_LOCALE: &str = "en-IN";
pub const SPEECH_VOLUME: f32 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub rate: f32,
    pub locale: &'static str,
    pub volume: f32,
}

impl Utterance {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            rate: SPEECH_RATE,
            locale: SPEECH_LOCALE,
            volume: SPEECH_VOLUME,
        }
    }
}

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("speech engine unavailable: {0}")]
    Unavailable(String),
    #[error("speech engine failed: {0}")]
    Engine(String),
}

/// Platform speech capability. Implementations must not block the caller.
pub trait SpeechSynthesizer: Send + Sync {
    fn speak(&self, utterance: &Utterance) -> Result<(), SpeechError>;
    fn cancel(&self);
}

pub struct TracingSynthesizer;

impl SpeechSynthesizer for TracingSynthesizer {
    fn speak(&self, utterance: &Utterance) -> Result<(), SpeechError> {
        info!(
            locale = utterance.locale,
            rate = utterance.rate,
            "voice: {}",
            utterance.text
        );
        Ok(())
    }

    fn cancel(&self) {
        debug!("voice: cancel");
    }
}

#[derive(Clone, Default)]
pub struct VoiceAnnouncer {
    synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
}

impl VoiceAnnouncer {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        Self {
            synthesizer: Some(synthesizer),
        }
    }

    pub fn unavailable() -> Self {
        Self { synthesizer: None }
    }

    pub fn is_available(&self) -> bool {
        self.synthesizer.is_some()
    }

    /// Pre-empts whatever is playing, then starts `text`. Failures are swallowed.
    pub fn speak(&self, text: &str) {
        let Some(synthesizer) = &self.synthesizer else {
            debug!("voice: speech unavailable, skipping utterance");
            return;
        };
        synthesizer.cancel();
        if let Err(err) = synthesizer.speak(&Utterance::new(text)) {
            debug!(%err, "voice: utterance skipped");
        }
    }

    pub fn cancel_all(&self) {
        if let Some(synthesizer) = &self.synthesizer {
            synthesizer.cancel();
        }
    }
}

#[cfg(test)]
#[path = "tests/voice_tests.rs"]
mod tests;
