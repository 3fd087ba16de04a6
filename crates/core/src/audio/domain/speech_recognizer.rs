use super::audio_segment::AudioSegment;
use super::transcript::Transcription;

/// A loaded speech-to-text model.
///
/// `transcribe` consumes the handle: each loaded model serves exactly one
/// transcription and is dropped afterwards.
pub trait SpeechRecognizer: Send {
    fn transcribe(
        self: Box<Self>,
        audio: &AudioSegment,
        language: &str,
    ) -> Result<Transcription, Box<dyn std::error::Error>>;
}

/// Acquires a [`SpeechRecognizer`], fetching model weights if needed.
pub trait ModelLoader: Send {
    fn load(self: Box<Self>) -> Result<Box<dyn SpeechRecognizer>, Box<dyn std::error::Error>>;
}
