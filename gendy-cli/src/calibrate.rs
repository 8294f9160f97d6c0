//! Three-point pitch calibration from the command line.
//!
//! Each reference is one or more raw ADC readings taken with 1 V, 2 V and
//! 3 V patched into the pitch input, comma separated (`50012,49988,50001`).
//! The polls are averaged per step, fed through [`CalibrationCapture`] and
//! the result is stored in the config file.

use std::path::Path;

use gendy_engine::calibration::{average, CalibrationStep};
use gendy_engine::{Calibration, CalibrationCapture, CalibrationError};
use thiserror::Error;
use tracing::info;

use crate::config::{ConfigError, GendyConfig};

#[derive(Debug, Error)]
pub enum CalibrateError {
    #[error("bad reading {0:?}: expected comma-separated ADC values")]
    Reading(String),
    #[error("no readings for the {0:?} step")]
    Empty(CalibrationStep),
    #[error("expected three references, got {0}")]
    Incomplete(usize),
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn parse_polls(reference: &str) -> Result<Vec<f32>, CalibrateError> {
    reference
        .split(',')
        .map(|p| p.trim().parse::<f32>().map_err(|_| CalibrateError::Reading(reference.to_string())))
        .collect()
}

/// Run the capture over `references` (1 V, 2 V, 3 V in that order).
pub fn capture(references: &[String]) -> Result<Calibration, CalibrateError> {
    let mut cap = CalibrationCapture::new();
    for reference in references {
        let Some(step) = cap.step() else { break };
        let reading = average(&parse_polls(reference)?).ok_or(CalibrateError::Empty(step))?;
        info!(?step, reading, "captured reference");
        if let Some(result) = cap.capture(reading) {
            return Ok(result?);
        }
    }
    Err(CalibrateError::Incomplete(references.len()))
}

/// Capture, store the result in `cfg` and write `cfg` to `path`.
pub fn calibrate_and_save(
    references: &[String],
    cfg: &mut GendyConfig,
    path: &Path,
) -> Result<Calibration, CalibrateError> {
    let cal = capture(references)?;
    info!(offset = cal.offset, units_per_volt = cal.units_per_volt, "calibration done");
    cfg.calibration = cal;
    cfg.save(path)?;
    Ok(cal)
}
