use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use gendy_core::oscillator::{DEFAULT_BREAKPOINTS, DEFAULT_FREQUENCY};
use gendy_core::walk::{WalkMode, WalkParams};
use gendy_engine::voice::DEFAULT_LEVEL;
use gendy_engine::{Calibration, Voice};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("failed to write config {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Sample encoding of offline renders.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WavFormat {
    #[default]
    Int16,
    Float32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "AudioConfig::default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "AudioConfig::default_gain")]
    pub gain: f32,
    #[serde(default)]
    pub channels: Option<u16>,
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub wav_format: WavFormat,
}

impl AudioConfig {
    fn default_sample_rate() -> u32 {
        48_000
    }
    fn default_gain() -> f32 {
        0.35
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: Self::default_sample_rate(),
            gain: Self::default_gain(),
            channels: None,
            device: None,
            wav_format: WavFormat::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OscillatorConfig {
    #[serde(default = "OscillatorConfig::default_frequency")]
    pub frequency: f32,
    #[serde(default)]
    pub walk_mode: WalkMode,
    #[serde(default = "OscillatorConfig::default_breakpoints")]
    pub breakpoints: usize,
    #[serde(default = "OscillatorConfig::default_level")]
    pub level: f32,
    #[serde(default)]
    pub walk: WalkParams,
}

impl OscillatorConfig {
    fn default_frequency() -> f32 {
        DEFAULT_FREQUENCY
    }
    fn default_breakpoints() -> usize {
        DEFAULT_BREAKPOINTS
    }
    fn default_level() -> f32 {
        DEFAULT_LEVEL
    }
}

impl Default for OscillatorConfig {
    fn default() -> Self {
        Self {
            frequency: Self::default_frequency(),
            walk_mode: WalkMode::default(),
            breakpoints: Self::default_breakpoints(),
            level: Self::default_level(),
            walk: WalkParams::default(),
        }
    }
}

/// Signals fed to the voice's patch inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputsConfig {
    /// Frequency of a sine patched into the sync input; unpatched when absent.
    #[serde(default)]
    pub sync_hz: Option<f32>,
    /// Frequency of a sine patched into the ring input; unpatched when absent.
    #[serde(default)]
    pub ring_hz: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GendyConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub oscillator: OscillatorConfig,
    #[serde(default)]
    pub inputs: InputsConfig,
    #[serde(default)]
    pub calibration: Calibration,
}

impl GendyConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The config at `path`; defaults when it is missing or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!(path = %path.display(), "no config file, using defaults");
            return Self::default();
        }
        match Self::load(path) {
            Ok(cfg) => {
                info!(path = %path.display(), "loaded config");
                cfg
            }
            Err(err) => {
                warn!("{err}. Using defaults.");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = toml::to_string_pretty(self)?;
        fs::write(path, text).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "wrote config");
        Ok(())
    }

    /// A voice at `sample_rate` configured from the oscillator section.
    pub fn build_voice(&self, sample_rate: f32) -> Voice {
        let mut voice = Voice::with_calibration(sample_rate, self.calibration);
        let osc = voice.oscillator_mut();
        osc.set_walk_mode(self.oscillator.walk_mode);
        osc.set_frequency(self.oscillator.frequency);
        osc.set_params(self.oscillator.walk);
        osc.set_breakpoint_count(self.oscillator.breakpoints);
        // start the walks from the configured state
        osc.reset();
        voice.set_level(self.oscillator.level);
        voice
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_path(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!(
            "gendy_config_test_{}_{}",
            std::process::id(),
            name
        ));
        p
    }

    #[test]
    fn empty_file_gives_defaults() {
        let cfg: GendyConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, GendyConfig::default());
        assert_eq!(cfg.audio.sample_rate, 48_000);
        assert_eq!(cfg.oscillator.frequency, 220.0);
        assert_eq!(cfg.oscillator.breakpoints, 8);
        assert_eq!(cfg.oscillator.walk_mode, WalkMode::SecondOrder);
        assert_eq!(cfg.calibration, Calibration::default());
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let cfg: GendyConfig = toml::from_str(
            r#"
            [oscillator]
            walk_mode = "correlated"

            [oscillator.walk]
            amplitude_barrier = 0.4

            [calibration]
            units_per_volt = 13000
            "#,
        )
        .unwrap();
        assert_eq!(cfg.oscillator.walk_mode, WalkMode::Correlated);
        assert_eq!(cfg.oscillator.walk.amplitude_barrier, 0.4);
        assert_eq!(cfg.oscillator.walk.duration_step, 0.1);
        assert_eq!(cfg.oscillator.frequency, 220.0);
        assert_eq!(cfg.calibration.units_per_volt, 13_000);
        assert_eq!(cfg.calibration.offset, Calibration::default().offset);
    }

    #[test]
    fn unknown_walk_mode_is_a_parse_error() {
        let path = unique_path("bad_mode.toml");
        fs::write(&path, "[oscillator]\nwalk_mode = \"third-order\"\n").unwrap();
        assert!(matches!(GendyConfig::load(&path), Err(ConfigError::Parse { .. })));
        assert_eq!(GendyConfig::load_or_default(&path), GendyConfig::default());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let path = unique_path("does_not_exist.toml");
        assert!(matches!(GendyConfig::load(&path), Err(ConfigError::Read { .. })));
        assert_eq!(GendyConfig::load_or_default(&path), GendyConfig::default());
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let path = unique_path("saved.toml");
        let mut cfg = GendyConfig::default();
        cfg.audio.wav_format = WavFormat::Float32;
        cfg.audio.device = Some("Built-in Output".to_string());
        cfg.oscillator.breakpoints = 13;
        cfg.oscillator.walk_mode = WalkMode::FirstOrder;
        cfg.inputs.sync_hz = Some(110.0);
        cfg.save(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("walk_mode = \"first-order\""));
        assert!(text.contains("wav_format = \"float32\""));

        let back = GendyConfig::load(&path).unwrap();
        assert_eq!(back, cfg);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn voice_follows_oscillator_section() {
        let mut cfg = GendyConfig::default();
        cfg.oscillator.frequency = 330.0;
        cfg.oscillator.breakpoints = 40;
        cfg.oscillator.level = 0.5;
        cfg.oscillator.walk_mode = WalkMode::Correlated;
        let voice = cfg.build_voice(44_100.0);
        assert_eq!(voice.sample_rate(), 44_100.0);
        assert_eq!(voice.oscillator().frequency(), 330.0);
        assert_eq!(voice.oscillator().breakpoint_count(), 16);
        assert_eq!(voice.oscillator().walk_mode(), WalkMode::Correlated);
        assert_eq!(voice.level(), 0.5);
    }
}
