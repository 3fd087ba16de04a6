use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Mono 16-bit PCM WAV: a quiet 220 Hz tone.
fn write_tone_wav(path: &Path, sample_rate: u32, seconds: f64) {
    let len = (seconds * sample_rate as f64) as usize;
    let samples: Vec<i16> = (0..len)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            ((2.0 * std::f64::consts::PI * 220.0 * t).sin() * 3000.0) as i16
        })
        .collect();

    let data_len = (samples.len() * 2) as u32;
    let mut bytes = Vec::with_capacity(44 + data_len as usize);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVEfmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
    bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    for s in samples {
        bytes.extend_from_slice(&s.to_le_bytes());
    }
    std::fs::write(path, bytes).unwrap();
}

#[test]
fn test_no_arguments_prints_usage_and_exits_1() {
    Command::cargo_bin("transcribe")
        .unwrap()
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "Bitte geben Sie den Pfad zur Audiodatei an.",
        ));
}

#[test]
fn test_no_arguments_does_not_touch_model() {
    Command::cargo_bin("transcribe")
        .unwrap()
        .env("RUST_LOG", "info")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Resolving model").not());
}

#[test]
fn test_help_mentions_audio_argument() {
    Command::cargo_bin("transcribe")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("AUDIO"));
}

#[test]
#[ignore] // Requires the whisper base model (downloads on first run)
fn test_valid_audio_prints_only_text_and_one_newline() {
    let tmp = TempDir::new().unwrap();
    let wav = tmp.path().join("speech.wav");
    write_tone_wav(&wav, 16000, 2.0);

    let output = Command::cargo_bin("transcribe")
        .unwrap()
        .arg(&wav)
        .env("RUST_LOG", "info")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.ends_with('\n'), "stdout: {stdout:?}");
    assert_eq!(stdout.matches('\n').count(), 1, "stdout: {stdout:?}");
    assert!(!stdout.contains("Downloading"), "stdout: {stdout:?}");
    assert!(!stdout.contains("INFO"), "stdout: {stdout:?}");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Resolving model"), "stderr: {stderr:?}");
}

#[test]
#[ignore] // Requires the whisper base model (downloads on first run)
fn test_missing_file_fails_without_transcript() {
    Command::cargo_bin("transcribe")
        .unwrap()
        .arg("missing.wav")
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("missing.wav"));
}
