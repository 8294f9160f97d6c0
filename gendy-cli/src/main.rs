//! gendy: real-time player and offline renderer for the GENDY oscillator.

mod calibrate;
mod cli;
mod config;
mod inputs;
mod render;

use std::error::Error;
use std::time::{Duration, TryFromFloatSecsError};

use clap::Parser;
use cpal::traits::{DeviceTrait, StreamTrait};
use gendy_engine::realtime::{build_stream, choose_config, output_device_names, pick_device};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::Args;
use crate::config::GendyConfig;
use crate::inputs::PatchInputs;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn list_output_devices() -> Result<(), Box<dyn Error>> {
    println!("Available output devices:");
    for name in output_device_names()? {
        println!("- {name}");
    }
    Ok(())
}

/// A run length in seconds; negative or NaN means zero, infinite or huge is an error.
fn run_length(secs: f32) -> Result<Duration, TryFromFloatSecsError> {
    Duration::try_from_secs_f32(secs.max(0.0))
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn render(args: &Args, cfg: &GendyConfig) -> Result<(), Box<dyn Error>> {
    let Some(path) = &args.wav else {
        return Ok(());
    };
    let seconds = args.duration.ok_or("--wav needs --duration")?;
    let sr = cfg.audio.sample_rate as f32;
    let frames = (run_length(seconds)?.as_secs_f64() * f64::from(sr)) as u64;

    let mut voice = cfg.build_voice(sr);
    let mut inputs = PatchInputs::new(&cfg.inputs, sr);
    render::render_wav(path, &mut voice, &mut inputs, frames, cfg.audio.gain, cfg.audio.wav_format)?;
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn play(args: &Args, cfg: &GendyConfig) -> Result<(), Box<dyn Error>> {
    let device = pick_device(cfg.audio.device.as_deref())?;
    let supported = choose_config(&device, Some(cfg.audio.sample_rate), cfg.audio.channels)?;
    let sr = supported.sample_rate().0 as f32;

    let name = device.name()?;
    info!(device = %name, config = ?supported, "using output device");
    info!(
        frequency = cfg.oscillator.frequency,
        mode = ?cfg.oscillator.walk_mode,
        breakpoints = cfg.oscillator.breakpoints,
        gain = cfg.audio.gain,
        "voice"
    );

    let voice = cfg.build_voice(sr);
    let inputs = PatchInputs::new(&cfg.inputs, sr);
    let stream = build_stream(&device, &supported, voice, inputs, cfg.audio.gain)?;
    stream.play()?;

    if let Some(secs) = args.duration {
        info!(secs, "auto-stop armed");
        std::thread::sleep(run_length(secs)?);
        return Ok(());
    }

    println!("Press Ctrl+C to stop…");
    loop {
        std::thread::sleep(Duration::from_millis(500));
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let args = Args::parse();

    if args.list_devices {
        return list_output_devices();
    }

    let mut cfg = GendyConfig::load_or_default(&args.config);
    args.apply_to(&mut cfg);

    if let Some(references) = &args.calibrate {
        calibrate::calibrate_and_save(references, &mut cfg, &args.config)?;
        return Ok(());
    }

    if args.write_config {
        cfg.save(&args.config)?;
    }

    if args.wav.is_some() {
        render(&args, &cfg)
    } else {
        play(&args, &cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_length_rejects_unbounded_durations() {
        assert_eq!(run_length(1.5).unwrap(), Duration::from_millis(1_500));
        assert_eq!(run_length(-3.0).unwrap(), Duration::ZERO);
        assert_eq!(run_length(f32::NAN).unwrap(), Duration::ZERO);
        assert!(run_length(f32::INFINITY).is_err());
        assert!(run_length(f32::MAX).is_err());
    }
}
