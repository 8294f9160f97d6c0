//! Offline rendering to a stereo wav file: left is the dry output, right the ring output.

use std::path::Path;

use gendy_engine::realtime::FrameInputs;
use gendy_engine::Voice;
use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::info;

use crate::config::WavFormat;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RenderStats {
    pub frames: u64,
    pub peak: f32,
    pub cycles: u64,
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn render_wav(
    path: &Path,
    voice: &mut Voice,
    inputs: &mut impl FrameInputs,
    frames: u64,
    gain: f32,
    format: WavFormat,
) -> Result<RenderStats, hound::Error> {
    let sample_rate = voice.sample_rate() as u32;
    let spec = match format {
        WavFormat::Int16 => WavSpec {
            channels: 2,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        },
        WavFormat::Float32 => WavSpec {
            channels: 2,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        },
    };
    let mut writer = WavWriter::create(path, spec)?;
    info!(path = %path.display(), frames, ?format, "rendering");

    let start_cycles = voice.oscillator().cycle_count();
    let progress_every = u64::from(sample_rate.max(1)) * 10;
    let mut peak = 0.0_f32;

    for n in 0..frames {
        let (sync_in, ring_in) = inputs.next_inputs();
        let f = voice.process_frame(sync_in, ring_in);
        let dry = (f.dry * gain).clamp(-1.0, 1.0);
        let ring = (f.ring * gain).clamp(-1.0, 1.0);
        peak = peak.max(dry.abs());

        match format {
            WavFormat::Int16 => {
                writer.write_sample((dry * f32::from(i16::MAX)) as i16)?;
                writer.write_sample((ring * f32::from(i16::MAX)) as i16)?;
            }
            WavFormat::Float32 => {
                writer.write_sample(dry)?;
                writer.write_sample(ring)?;
            }
        }

        if n > 0 && n % progress_every == 0 {
            info!(seconds = n / u64::from(sample_rate.max(1)), "render progress");
        }
    }

    writer.finalize()?;
    let stats = RenderStats {
        frames,
        peak,
        cycles: voice.oscillator().cycle_count() - start_cycles,
    };
    info!(peak = stats.peak, cycles = stats.cycles, "render done");
    Ok(stats)
}
