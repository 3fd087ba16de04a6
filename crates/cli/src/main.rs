use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use transcribe_core::audio::infrastructure::ffmpeg_audio_reader::FfmpegAudioReader;
use transcribe_core::audio::infrastructure::whisper_recognizer::WhisperModelLoader;
use transcribe_core::pipeline::transcribe_file_use_case::TranscribeFileUseCase;
use transcribe_core::shared::constants::{
    TRANSCRIPTION_LANGUAGE, USAGE_PROMPT, WHISPER_MODEL_NAME, WHISPER_MODEL_URL,
};
use transcribe_core::shared::model_cache::{DownloadEvent, ModelCache};

/// Print the German transcription of an audio file.
#[derive(Parser, Debug)]
#[command(name = "transcribe", version)]
struct Cli {
    /// Audio file to transcribe.
    audio: Option<PathBuf>,

    /// Anything after the audio path is ignored.
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    ignored: Vec<OsString>,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let Some(audio) = cli.audio else {
        println!("{USAGE_PROMPT}");
        process::exit(1);
    };
    if !cli.ignored.is_empty() {
        log::warn!("Ignoring {} extra argument(s)", cli.ignored.len());
    }

    if let Err(e) = run(&audio) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(audio: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let loader = WhisperModelLoader::new(
        ModelCache::user_default()?,
        WHISPER_MODEL_NAME,
        WHISPER_MODEL_URL,
    )
    .with_progress(Box::new(|event: DownloadEvent| {
        eprint!("{}", progress_text(event))
    }));

    let use_case = TranscribeFileUseCase::new(
        Box::new(FfmpegAudioReader),
        Box::new(loader),
        TRANSCRIPTION_LANGUAGE,
    );
    let transcription = use_case.run(audio)?;
    log::info!("Transcription of {} finished", audio.display());

    println!("{}", transcription.text());
    Ok(())
}

/// Stderr rendering of a download event; progress redraws one line,
/// `Finished` ends it.
fn progress_text(event: DownloadEvent) -> String {
    match event {
        DownloadEvent::Progress {
            downloaded,
            total: Some(total),
        } if total > 0 => {
            let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
            format!("\rDownloading Whisper model... {pct}%")
        }
        DownloadEvent::Progress { downloaded, .. } => {
            format!("\rDownloading Whisper model... {downloaded} bytes")
        }
        DownloadEvent::Finished => "\n".to_string(),
    }
}
