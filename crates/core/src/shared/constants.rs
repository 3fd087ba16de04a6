/// Whisper "base" tier in ggml format.
pub const WHISPER_MODEL_NAME: &str = "ggml-base.bin";
pub const WHISPER_MODEL_URL: &str =
    "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-base.bin";

/// Whisper expects 16 kHz mono input.
pub const WHISPER_SAMPLE_RATE: u32 = 16000;

/// Spoken language assumed during decoding.
pub const TRANSCRIPTION_LANGUAGE: &str = "de";

pub const MAX_INFERENCE_THREADS: usize = 4;

pub const USAGE_PROMPT: &str = "Bitte geben Sie den Pfad zur Audiodatei an.";
