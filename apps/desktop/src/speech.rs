use std::{
    process::{Child, Command, Stdio},
    sync::Mutex,
};

use client_core::{SpeechError, SpeechSynthesizer, Utterance};
use tracing::debug;

const ESPEAK_BASE_WPM: f32 = 175.0;
const ESPEAK_BASE_AMPLITUDE: f32 = 100.0;

/// Speaks through an `espeak-ng` child process. One child at a time.
pub struct EspeakSynthesizer {
    program: String,
    current: Mutex<Option<Child>>,
}

impl EspeakSynthesizer {
    pub fn new() -> Self {
        Self::with_program("espeak-ng")
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            current: Mutex::new(None),
        }
    }

    fn command_args(utterance: &Utterance) -> Vec<String> {
        let voice = utterance
            .locale
            .split('-')
            .next()
            .unwrap_or(utterance.locale)
            .to_ascii_lowercase();
        vec![
            "-v".to_string(),
            voice,
            "-s".to_string(),
            ((ESPEAK_BASE_WPM * utterance.rate).round() as u32).to_string(),
            "-a".to_string(),
            ((ESPEAK_BASE_AMPLITUDE * utterance.volume).round() as u32).to_string(),
            utterance.text.clone(),
        ]
    }
}

impl Default for EspeakSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechSynthesizer for EspeakSynthesizer {
    fn speak(&self, utterance: &Utterance) -> Result<(), SpeechError> {
        let child = Command::new(&self.program)
            .args(Self::command_args(utterance))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| SpeechError::Unavailable(format!("{}: {err}", self.program)))?;

        let mut current = self
            .current
            .lock()
            .map_err(|_| SpeechError::Engine("speech state poisoned".to_string()))?;
        if let Some(mut previous) = current.replace(child) {
            let _ = previous.kill();
            let _ = previous.wait();
        }
        Ok(())
    }

    fn cancel(&self) {
        let Ok(mut current) = self.current.lock() else {
            return;
        };
        if let Some(mut child) = current.take() {
            if let Err(err) = child.kill() {
                debug!(%err, "speech: child already exited");
            }
            let _ = child.wait();
        }
    }
}

impl Drop for EspeakSynthesizer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utterance_maps_to_espeak_flags() {
        let args = EspeakSynthesizer::command_args(&Utterance::new("Hang up now"));
        assert_eq!(args, vec!["-v", "en", "-s", "140", "-a", "100", "Hang up now"]);
    }

    #[test]
    fn missing_binary_reports_unavailable() {
        let synthesizer = EspeakSynthesizer::with_program("definitely-not-a-speech-engine");
        let err = synthesizer
            .speak(&Utterance::new("hello"))
            .expect_err("spawn should fail");
        assert!(matches!(err, SpeechError::Unavailable(_)));
        synthesizer.cancel();
    }
}
