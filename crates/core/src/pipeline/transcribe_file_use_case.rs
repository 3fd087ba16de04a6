use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::audio::domain::audio_reader::AudioReader;
use crate::audio::domain::speech_recognizer::ModelLoader;
use crate::audio::domain::transcript::Transcription;
use crate::shared::constants::WHISPER_SAMPLE_RATE;

#[derive(Error, Debug)]
pub enum TranscribeError {
    #[error("no audio track found in {0}")]
    NoAudioTrack(PathBuf),
}

/// Loads a model, decodes one file and transcribes it.
///
/// `run` consumes the use case, so the loaded model never outlives the call.
pub struct TranscribeFileUseCase {
    reader: Box<dyn AudioReader>,
    loader: Box<dyn ModelLoader>,
    language: String,
}

impl TranscribeFileUseCase {
    pub fn new(
        reader: Box<dyn AudioReader>,
        loader: Box<dyn ModelLoader>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            reader,
            loader,
            language: language.into(),
        }
    }

    pub fn run(self, audio_path: &Path) -> Result<Transcription, Box<dyn std::error::Error>> {
        // 1. Acquire the model (may download weights)
        let recognizer = self.loader.load()?;

        // 2. Decode to 16 kHz mono
        let audio = self
            .reader
            .read_audio(audio_path, WHISPER_SAMPLE_RATE)?
            .ok_or_else(|| TranscribeError::NoAudioTrack(audio_path.to_path_buf()))?;
        log::info!(
            "Decoded {:.1}s of audio from {}",
            audio.duration(),
            audio_path.display()
        );

        // 3. One inference pass; the recognizer is dropped afterwards
        let transcription = recognizer.transcribe(&audio, &self.language)?;
        if transcription.is_empty() {
            log::warn!("No speech recognized in {}", audio_path.display());
        }
        Ok(transcription)
    }
}
