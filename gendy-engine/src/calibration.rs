//! 1V/octave pitch calibration.
//!
//! The pitch CV arrives as a raw 16-bit ADC reading that *falls* as the
//! input voltage rises. A calibration stores the reading at 0 V (`offset`)
//! and the number of ADC units per volt, both measured with three reference
//! voltages (1 V, 2 V, 3 V) patched into the pitch input.
//!
//! Readings above [`UNPATCHED_THRESHOLD`] mean nothing is plugged in and map
//! to 0 V.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Readings above this are treated as an unpatched jack.
pub const UNPATCHED_THRESHOLD: f32 = 63_200.0;

/// Plausible range for `units_per_volt`; anything else is a failed calibration.
pub const UNITS_PER_VOLT_RANGE: core::ops::RangeInclusive<u16> = 400..=20_000;

/// Highest pitch CV honoured, in volts.
pub const MAX_VOLTS: f32 = 5.0;

#[derive(Debug, Error, PartialEq)]
pub enum CalibrationError {
    #[error("reference reading is not a finite number: {0}")]
    NonFinite(f32),
    #[error("units per volt {0:.1} outside the accepted range 400..=20000")]
    UnitsPerVolt(f32),
    #[error("zero-volt offset {0:.1} does not fit a 16-bit reading")]
    Offset(f32),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calibration {
    #[serde(default = "Calibration::default_offset")]
    pub offset: u16,
    #[serde(default = "Calibration::default_units_per_volt")]
    pub units_per_volt: u16,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            offset: Self::default_offset(),
            units_per_volt: Self::default_units_per_volt(),
        }
    }
}

impl Calibration {
    fn default_offset() -> u16 {
        64_262
    }
    fn default_units_per_volt() -> u16 {
        12_826
    }

    /// Derive a calibration from averaged readings taken at 1 V, 2 V and 3 V.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_references(one_volt: f32, two_volt: f32, three_volt: f32) -> Result<Self, CalibrationError> {
        for r in [one_volt, two_volt, three_volt] {
            if !r.is_finite() {
                return Err(CalibrationError::NonFinite(r));
            }
        }

        let per_volt = ((one_volt - two_volt) + (two_volt - three_volt)) / 2.0;
        let units_per_volt = (per_volt + 0.5).floor();
        if units_per_volt < f32::from(*UNITS_PER_VOLT_RANGE.start())
            || units_per_volt > f32::from(*UNITS_PER_VOLT_RANGE.end())
        {
            return Err(CalibrationError::UnitsPerVolt(per_volt));
        }

        let offset = one_volt + per_volt;
        if !(0.0..=f32::from(u16::MAX)).contains(&offset) {
            return Err(CalibrationError::Offset(offset));
        }

        Ok(Self {
            offset: offset as u16,
            units_per_volt: units_per_volt as u16,
        })
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        UNITS_PER_VOLT_RANGE.contains(&self.units_per_volt)
    }

    /// `self` if plausible, otherwise the factory defaults.
    pub fn validated(self) -> Self {
        if self.is_valid() {
            self
        } else {
            warn!(
                units_per_volt = self.units_per_volt,
                "stored calibration out of range, restoring defaults"
            );
            Self::default()
        }
    }

    /// Pitch CV in volts, `[0, 5]`.
    #[inline]
    pub fn volts(&self, raw: f32) -> f32 {
        if raw > UNPATCHED_THRESHOLD {
            return 0.0;
        }
        ((f32::from(self.offset) - raw) / f32::from(self.units_per_volt)).clamp(0.0, MAX_VOLTS)
    }

    /// `base_hz * 2^volts`.
    #[inline]
    pub fn frequency(&self, base_hz: f32, raw: f32) -> f32 {
        base_hz * self.volts(raw).exp2()
    }
}

/// Steps of the three-point calibration procedure, in order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CalibrationStep {
    OneVolt,
    TwoVolt,
    ThreeVolt,
}

/// Collects the three reference readings one button press at a time.
///
/// Each `capture` takes the reading for the current step (the caller
/// averages a few ADC polls first). The third capture yields the result.
#[derive(Clone, Debug, Default)]
pub struct CalibrationCapture {
    readings: [f32; 3],
    taken: usize,
}

impl CalibrationCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// The reference voltage the user should patch next, or `None` once finished.
    pub fn step(&self) -> Option<CalibrationStep> {
        match self.taken {
            0 => Some(CalibrationStep::OneVolt),
            1 => Some(CalibrationStep::TwoVolt),
            2 => Some(CalibrationStep::ThreeVolt),
            _ => None,
        }
    }

    /// Record the reading for the current step.
    ///
    /// Returns `Some(result)` after the third reading, `None` before. Further
    /// captures after completion are ignored and return `None`.
    pub fn capture(&mut self, reading: f32) -> Option<Result<Calibration, CalibrationError>> {
        if self.taken >= self.readings.len() {
            return None;
        }
        self.readings[self.taken] = reading;
        self.taken += 1;
        if self.taken < self.readings.len() {
            return None;
        }
        let [one, two, three] = self.readings;
        Some(Calibration::from_references(one, two, three))
    }
}

/// Mean of a batch of ADC polls, `None` if empty.
#[allow(clippy::cast_precision_loss)]
pub fn average(readings: &[f32]) -> Option<f32> {
    if readings.is_empty() {
        None
    } else {
        Some(readings.iter().sum::<f32>() / readings.len() as f32)
    }
}
