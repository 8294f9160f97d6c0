//! Realtime output through CPAL (feature `realtime`).
//!
//! Device listing/selection, stream-config negotiation and a generic stream
//! builder that drives a [`Voice`] from the device callback. The voice is
//! mono plus a ring copy: channel 0 gets the dry signal, channel 1 (when
//! present) the ring output, any further channels the dry signal again.

use cpal::traits::{DeviceTrait, HostTrait};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::voice::Voice;

#[derive(Debug, Error)]
pub enum RealtimeError {
    #[error("no default output device")]
    NoDefaultDevice,
    #[error("requested device not found: {0}")]
    DeviceNotFound(String),
    #[error("no supported output configs")]
    NoSupportedConfig,
    #[error("unsupported device sample format: {0:?}")]
    UnsupportedFormat(cpal::SampleFormat),
    #[error(transparent)]
    Devices(#[from] cpal::DevicesError),
    #[error(transparent)]
    DeviceName(#[from] cpal::DeviceNameError),
    #[error(transparent)]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),
    #[error(transparent)]
    SupportedConfigs(#[from] cpal::SupportedStreamConfigsError),
    #[error(transparent)]
    BuildStream(#[from] cpal::BuildStreamError),
}

/// External inputs sampled once per frame: `(sync_in, ring_in)`.
pub trait FrameInputs: Send + 'static {
    fn next_inputs(&mut self) -> (f32, f32);
}

/// No sync, no ring modulation.
#[derive(Copy, Clone, Debug, Default)]
pub struct Unpatched;

impl FrameInputs for Unpatched {
    #[inline]
    fn next_inputs(&mut self) -> (f32, f32) {
        (0.0, 0.0)
    }
}

impl<F> FrameInputs for F
where
    F: FnMut() -> (f32, f32) + Send + 'static,
{
    #[inline]
    fn next_inputs(&mut self) -> (f32, f32) {
        self()
    }
}

pub fn output_device_names() -> Result<Vec<String>, RealtimeError> {
    let host = cpal::default_host();
    let mut names = Vec::new();
    for dev in host.output_devices()? {
        names.push(dev.name()?);
    }
    Ok(names)
}

/// The named output device, or the host default when `name` is `None`.
pub fn pick_device(name: Option<&str>) -> Result<cpal::Device, RealtimeError> {
    let host = cpal::default_host();
    if let Some(name) = name {
        for d in host.output_devices()? {
            if d.name()? == name {
                return Ok(d);
            }
        }
        return Err(RealtimeError::DeviceNotFound(name.to_string()));
    }
    host.default_output_device().ok_or(RealtimeError::NoDefaultDevice)
}

/// The supported config closest to the requested rate/channel count.
///
/// Sample-rate mismatch weighs far more than channel mismatch.
pub fn choose_config(
    device: &cpal::Device,
    req_sr: Option<u32>,
    req_ch: Option<u16>,
) -> Result<cpal::SupportedStreamConfig, RealtimeError> {
    // If nothing requested, default is already concrete.
    if req_sr.is_none() && req_ch.is_none() {
        return Ok(device.default_output_config()?);
    }

    let mut best: Option<(u64, cpal::SupportedStreamConfigRange)> = None;
    for range in device.supported_output_configs()? {
        let score = config_score(
            range.channels(),
            range.min_sample_rate().0,
            range.max_sample_rate().0,
            req_sr,
            req_ch,
        );
        if best.as_ref().map_or(true, |(s, _)| score < *s) {
            best = Some((score, range));
        }
    }

    let (_, range) = best.ok_or(RealtimeError::NoSupportedConfig)?;

    let pick_sr = match req_sr {
        Some(sr) => {
            let lo = range.min_sample_rate().0;
            let hi = range.max_sample_rate().0;
            cpal::SampleRate(sr.clamp(lo, hi))
        }
        None => range.max_sample_rate(),
    };

    Ok(range.with_sample_rate(pick_sr))
}

fn config_score(channels: u16, sr_min: u32, sr_max: u32, req_sr: Option<u32>, req_ch: Option<u16>) -> u64 {
    let ch_pen = req_ch.map_or(0, |c| u64::from(channels.abs_diff(c)));
    let sr_pen = req_sr.map_or(0, |sr| {
        if (sr_min..=sr_max).contains(&sr) {
            0
        } else {
            u64::from(sr_min.abs_diff(sr).min(sr_max.abs_diff(sr)))
        }
    });
    sr_pen.saturating_mul(1000) + ch_pen
}

/// Build (but do not start) an output stream in the device's sample format.
pub fn build_stream(
    device: &cpal::Device,
    supported: &cpal::SupportedStreamConfig,
    voice: Voice,
    inputs: impl FrameInputs,
    gain: f32,
) -> Result<cpal::Stream, RealtimeError> {
    let cfg = supported.config();
    match supported.sample_format() {
        cpal::SampleFormat::F32 => build_typed::<f32>(device, &cfg, voice, inputs, gain),
        cpal::SampleFormat::I16 => build_typed::<i16>(device, &cfg, voice, inputs, gain),
        cpal::SampleFormat::U16 => build_typed::<u16>(device, &cfg, voice, inputs, gain),
        other => Err(RealtimeError::UnsupportedFormat(other)),
    }
}

#[allow(clippy::cast_precision_loss)]
fn build_typed<T>(
    device: &cpal::Device,
    cfg: &cpal::StreamConfig,
    mut voice: Voice,
    mut inputs: impl FrameInputs,
    gain: f32,
) -> Result<cpal::Stream, RealtimeError>
where
    T: cpal::Sample + cpal::FromSample<f32> + cpal::SizedSample + Send + 'static,
{
    let channels = usize::from(cfg.channels);
    voice.set_sample_rate(cfg.sample_rate.0 as f32);
    info!(sr = cfg.sample_rate.0, channels, "building output stream");

    // ~1 second meter at the stream rate
    let meter_interval = (cfg.sample_rate.0).max(1) as usize;
    let mut meter_count: usize = 0;
    let mut meter_peak: f32 = 0.0;

    let stream = device.build_output_stream(
        cfg,
        move |output: &mut [T], _| {
            for frame in output.chunks_mut(channels) {
                let (sync_in, ring_in) = inputs.next_inputs();
                let f = voice.process_frame(sync_in, ring_in);
                let dry = (f.dry * gain).clamp(-1.0, 1.0);
                let ring = (f.ring * gain).clamp(-1.0, 1.0);

                for (i, ch) in frame.iter_mut().enumerate() {
                    *ch = T::from_sample(if i == 1 { ring } else { dry });
                }

                meter_peak = meter_peak.max(dry.abs());
                meter_count += 1;
                if meter_count >= meter_interval {
                    debug!(peak = meter_peak, "meter");
                    meter_peak = 0.0;
                    meter_count = 0;
                }
            }
        },
        |e: cpal::StreamError| error!("stream error: {e}"),
        None,
    )?;

    Ok(stream)
}
