use std::path::Path;

use crate::audio::domain::audio_reader::AudioReader;
use crate::audio::domain::audio_segment::AudioSegment;

/// Decodes any ffmpeg-supported audio (or video) file to mono f32 PCM.
pub struct FfmpegAudioReader;

impl AudioReader for FfmpegAudioReader {
    fn read_audio(
        &self,
        path: &Path,
        target_sample_rate: u32,
    ) -> Result<Option<AudioSegment>, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let mut ictx = ffmpeg_next::format::input(path)
            .map_err(|e| format!("Failed to open audio file {}: {e}", path.display()))?;

        let audio_stream = match ictx.streams().best(ffmpeg_next::media::Type::Audio) {
            Some(stream) => stream,
            None => return Ok(None),
        };

        let audio_stream_index = audio_stream.index();
        let codec_ctx =
            ffmpeg_next::codec::context::Context::from_parameters(audio_stream.parameters())?;
        let mut decoder = codec_ctx
            .decoder()
            .audio()
            .map_err(|e| format!("Unsupported audio codec in {}: {e}", path.display()))?;

        log::debug!(
            "Decoding {} ({} Hz, {} channels)",
            path.display(),
            decoder.rate(),
            decoder.channels()
        );

        // Some containers leave the layout unset; derive it from the channel count.
        let input_layout = match decoder.channel_layout() {
            layout if layout.is_empty() => {
                ffmpeg_next::ChannelLayout::default(decoder.channels() as i32)
            }
            layout => layout,
        };

        let mut resampler = ffmpeg_next::software::resampling::Context::get(
            decoder.format(),
            input_layout,
            decoder.rate(),
            ffmpeg_next::format::Sample::F32(ffmpeg_next::format::sample::Type::Planar),
            ffmpeg_next::ChannelLayout::MONO,
            target_sample_rate,
        )?;

        let mut samples: Vec<f32> = Vec::new();
        let mut decoded_frame = ffmpeg_next::util::frame::audio::Audio::empty();
        let mut resampled_frame = ffmpeg_next::util::frame::audio::Audio::empty();

        for (stream, packet) in ictx.packets() {
            if stream.index() != audio_stream_index {
                continue;
            }

            decoder.send_packet(&packet)?;

            while decoder.receive_frame(&mut decoded_frame).is_ok() {
                fill_layout(&mut decoded_frame, input_layout);
                resampler.run(&decoded_frame, &mut resampled_frame)?;
                extract_f32_samples(&resampled_frame, &mut samples);
            }
        }

        decoder.send_eof()?;
        while decoder.receive_frame(&mut decoded_frame).is_ok() {
            fill_layout(&mut decoded_frame, input_layout);
            resampler.run(&decoded_frame, &mut resampled_frame)?;
            extract_f32_samples(&resampled_frame, &mut samples);
        }

        // The resampler may still hold buffered samples.
        if let Ok(Some(delay)) = resampler.flush(&mut resampled_frame) {
            if delay.output > 0 {
                extract_f32_samples(&resampled_frame, &mut samples);
            }
        }

        Ok(Some(AudioSegment::new(samples, target_sample_rate, 1)))
    }
}

fn fill_layout(
    frame: &mut ffmpeg_next::util::frame::audio::Audio,
    layout: ffmpeg_next::ChannelLayout,
) {
    if frame.channel_layout().is_empty() {
        frame.set_channel_layout(layout);
    }
}

/// Extract f32 samples from a planar mono resampled frame.
fn extract_f32_samples(frame: &ffmpeg_next::util::frame::audio::Audio, out: &mut Vec<f32>) {
    let num_samples = frame.samples();
    if num_samples == 0 {
        return;
    }
    let data = frame.data(0);
    let floats = unsafe { std::slice::from_raw_parts(data.as_ptr() as *const f32, num_samples) };
    out.extend_from_slice(floats);
}
