use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::audio::domain::audio_segment::AudioSegment;
use crate::audio::domain::speech_recognizer::{ModelLoader, SpeechRecognizer};
use crate::audio::domain::transcript::{TranscriptSegment, Transcription};
use crate::shared::constants::MAX_INFERENCE_THREADS;
use crate::shared::model_cache::{ModelCache, ProgressFn};

/// A Whisper model loaded through whisper.cpp via whisper-rs.
pub struct WhisperModel {
    ctx: WhisperContext,
    model_path: PathBuf,
}

impl WhisperModel {
    pub fn load(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if !model_path.exists() {
            return Err(format!("Whisper model not found at: {}", model_path.display()).into());
        }

        let ctx = WhisperContext::new_with_params(
            model_path.to_str().ok_or("Invalid model path")?,
            WhisperContextParameters::default(),
        )
        .map_err(|e| format!("Failed to load Whisper model: {e}"))?;

        log::info!("Loaded Whisper model from {}", model_path.display());
        Ok(Self {
            ctx,
            model_path: model_path.to_path_buf(),
        })
    }
}

impl fmt::Debug for WhisperModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WhisperModel")
            .field("model_path", &self.model_path)
            .finish_non_exhaustive()
    }
}

impl SpeechRecognizer for WhisperModel {
    fn transcribe(
        self: Box<Self>,
        audio: &AudioSegment,
        language: &str,
    ) -> Result<Transcription, Box<dyn std::error::Error>> {
        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| format!("Failed to create Whisper state: {e}"))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(Some(language));
        params.set_translate(false);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_n_threads(num_cpus().min(MAX_INFERENCE_THREADS) as i32);

        state
            .full(params, audio.samples())
            .map_err(|e| format!("Whisper inference failed: {e}"))?;

        let mut segments = Vec::new();
        let num_segments = state.full_n_segments();

        for seg_idx in 0..num_segments {
            let segment = match state.get_segment(seg_idx) {
                Some(s) => s,
                None => continue,
            };

            // A multi-byte character can straddle two segments.
            let text = match segment.to_bytes() {
                Ok(bytes) => segment_text(bytes),
                Err(e) => {
                    log::warn!("Skipping unreadable segment {seg_idx}: {e}");
                    continue;
                }
            };

            // Segment timestamps are in centiseconds (10ms units)
            let start_time = segment.start_timestamp() as f64 / 100.0;
            let end_time = segment.end_timestamp() as f64 / 100.0;
            log::debug!("[{start_time:7.2}s -> {end_time:7.2}s]{text}");

            segments.push(TranscriptSegment {
                text,
                start_time,
                end_time,
            });
        }

        log::info!("Transcribed {} segments", segments.len());
        Ok(Transcription::new(segments, language))
    }
}

/// Fetches a ggml model file through a [`ModelCache`] and loads it.
pub struct WhisperModelLoader {
    cache: ModelCache,
    name: String,
    url: String,
    progress: Option<ProgressFn>,
}

impl WhisperModelLoader {
    pub fn new(cache: ModelCache, name: &str, url: &str) -> Self {
        Self {
            cache,
            name: name.to_string(),
            url: url.to_string(),
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }
}

impl ModelLoader for WhisperModelLoader {
    fn load(self: Box<Self>) -> Result<Box<dyn SpeechRecognizer>, Box<dyn std::error::Error>> {
        let Self {
            cache,
            name,
            url,
            progress,
        } = *self;

        log::info!("Resolving model: {name}");
        let model_path = cache.fetch(&name, &url, progress)?;
        Ok(Box::new(WhisperModel::load(&model_path)?))
    }
}

fn segment_text(bytes: &[u8]) -> String {
    match String::from_utf8_lossy(bytes) {
        Cow::Borrowed(text) => text.to_string(),
        Cow::Owned(text) => {
            log::warn!("Segment text was not valid UTF-8; replaced undecodable bytes");
            text
        }
    }
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
