use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use gendy_core::walk::WalkMode;

use crate::config::GendyConfig;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum WalkModeArg {
    FirstOrder,
    SecondOrder,
    Correlated,
}

impl From<WalkModeArg> for WalkMode {
    fn from(m: WalkModeArg) -> Self {
        match m {
            WalkModeArg::FirstOrder => WalkMode::FirstOrder,
            WalkModeArg::SecondOrder => WalkMode::SecondOrder,
            WalkModeArg::Correlated => WalkMode::Correlated,
        }
    }
}

/// Play or render the GENDY dynamic stochastic synthesis oscillator.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// List output devices and exit
    #[arg(long)]
    pub list_devices: bool,

    /// Output device name (host default when omitted)
    #[arg(long)]
    pub device: Option<String>,

    /// Requested sample rate in Hz
    #[arg(long)]
    pub sample_rate: Option<u32>,

    /// Requested output channel count
    #[arg(long)]
    pub channels: Option<u16>,

    /// Stop after this many seconds (required with --wav)
    #[arg(long)]
    pub duration: Option<f32>,

    /// Output gain applied after the voice level
    #[arg(long)]
    pub gain: Option<f32>,

    /// Path to config TOML
    #[arg(long, default_value = "gendy.toml")]
    pub config: PathBuf,

    /// Render to a stereo (dry, ring) wav file instead of playing
    #[arg(long)]
    pub wav: Option<PathBuf>,

    /// Oscillator frequency in Hz
    #[arg(long)]
    pub frequency: Option<f32>,

    /// Random-walk mode
    #[arg(long, value_enum)]
    pub walk_mode: Option<WalkModeArg>,

    /// Number of active breakpoints (clamped to 2..=16)
    #[arg(long)]
    pub breakpoints: Option<usize>,

    /// Patch a sine at this frequency into the sync input
    #[arg(long)]
    pub sync_hz: Option<f32>,

    /// Patch a sine at this frequency into the ring input
    #[arg(long)]
    pub ring_hz: Option<f32>,

    /// Write the effective configuration back to --config
    #[arg(long)]
    pub write_config: bool,

    /// Calibrate the pitch input from raw readings at 1 V, 2 V and 3 V
    /// (each a comma-separated list of polls) and store the result in --config
    #[arg(long, num_args = 3, value_names = ["ONE_V", "TWO_V", "THREE_V"])]
    pub calibrate: Option<Vec<String>>,
}

impl Args {
    /// Command-line values override the file.
    pub fn apply_to(&self, cfg: &mut GendyConfig) {
        if let Some(sr) = self.sample_rate {
            cfg.audio.sample_rate = sr;
        }
        if let Some(ch) = self.channels {
            cfg.audio.channels = Some(ch);
        }
        if let Some(gain) = self.gain {
            cfg.audio.gain = gain;
        }
        if let Some(name) = &self.device {
            cfg.audio.device = Some(name.clone());
        }
        if let Some(hz) = self.frequency {
            cfg.oscillator.frequency = hz;
        }
        if let Some(mode) = self.walk_mode {
            cfg.oscillator.walk_mode = mode.into();
        }
        if let Some(n) = self.breakpoints {
            cfg.oscillator.breakpoints = n;
        }
        if self.sync_hz.is_some() {
            cfg.inputs.sync_hz = self.sync_hz;
        }
        if self.ring_hz.is_some() {
            cfg.inputs.ring_hz = self.ring_hz;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let args = Args::parse_from([
            "gendy",
            "--frequency",
            "110",
            "--walk-mode",
            "correlated",
            "--breakpoints",
            "12",
            "--sync-hz",
            "55.5",
        ]);
        assert_eq!(args.config, PathBuf::from("gendy.toml"));

        let mut cfg = GendyConfig::default();
        cfg.inputs.ring_hz = Some(3.0);
        args.apply_to(&mut cfg);
        assert_eq!(cfg.oscillator.frequency, 110.0);
        assert_eq!(cfg.oscillator.walk_mode, WalkMode::Correlated);
        assert_eq!(cfg.oscillator.breakpoints, 12);
        assert_eq!(cfg.inputs.sync_hz, Some(55.5));
        // untouched by the command line
        assert_eq!(cfg.inputs.ring_hz, Some(3.0));
        assert_eq!(cfg.audio.sample_rate, 48_000);
    }

    #[test]
    fn calibrate_takes_three_references() {
        let args = Args::parse_from(["gendy", "--calibrate", "50000,50002", "40000", "30000"]);
        assert_eq!(
            args.calibrate.as_deref(),
            Some(&["50000,50002".to_string(), "40000".to_string(), "30000".to_string()][..])
        );
        assert!(Args::try_parse_from(["gendy", "--calibrate", "50000", "40000"]).is_err());
    }

    #[test]
    fn rejects_unknown_walk_mode() {
        assert!(Args::try_parse_from(["gendy", "--walk-mode", "third-order"]).is_err());
    }
}
