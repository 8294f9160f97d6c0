//! Front-panel control mapping.
//!
//! A control-rate snapshot of the panel ([`PanelState`]) is turned into
//! oscillator parameters. Knobs are normalized to `[0, 1]` (out-of-range
//! readings are clamped); the two three-way switches pick the walk mode and
//! the octave range; the pitch CV is converted through a [`Calibration`].
//!
//! | control          | parameter            | range            |
//! |------------------|----------------------|------------------|
//! | `duration_step`  | duration step        | 0.001 – 0.5      |
//! | `amplitude_step` | amplitude step       | 0.001 – 0.5      |
//! | `duration_barrier` | duration barrier   | 0.1 – 1.0        |
//! | `amplitude_barrier`| amplitude barrier  | 0.1 – 1.0        |
//! | `breakpoints`    | breakpoint count     | 2 – 16           |
//! | `level`          | output level         | 0 – 1            |

use gendy_core::oscillator::DssOscillator;
use gendy_core::walk::{WalkMode, WalkParams};
use serde::{Deserialize, Serialize};

use crate::calibration::Calibration;

const STEP_MIN: f32 = 0.001;
const STEP_SPAN: f32 = 0.499;
const BARRIER_MIN: f32 = 0.1;
const BARRIER_SPAN: f32 = 0.9;
const BREAKPOINT_SPAN: f32 = 14.0;

/// Position of a three-way toggle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Switch3 {
    Left,
    #[default]
    Center,
    Right,
}

/// Octave range selected by the range switch.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrequencyRange {
    Low,
    #[default]
    Mid,
    High,
}

impl FrequencyRange {
    /// Base frequency at 0 V: C2, C4, C6.
    #[inline]
    pub fn base_hz(self) -> f32 {
        match self {
            Self::Low => 65.41,
            Self::Mid => 261.63,
            Self::High => 1046.50,
        }
    }
}

impl From<Switch3> for FrequencyRange {
    fn from(s: Switch3) -> Self {
        match s {
            Switch3::Left => Self::Low,
            Switch3::Center => Self::Mid,
            Switch3::Right => Self::High,
        }
    }
}

/// Walk switch: left first-order, center second-order, right correlated.
#[inline]
pub fn walk_mode_for(s: Switch3) -> WalkMode {
    match s {
        Switch3::Left => WalkMode::FirstOrder,
        Switch3::Center => WalkMode::SecondOrder,
        Switch3::Right => WalkMode::Correlated,
    }
}

/// One control-rate reading of the whole panel.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PanelState {
    /// Raw pitch CV reading (16-bit ADC units).
    pub pitch_raw: f32,
    pub duration_step: f32,
    pub amplitude_step: f32,
    pub duration_barrier: f32,
    pub amplitude_barrier: f32,
    pub breakpoints: f32,
    pub level: f32,
    pub walk_switch: Switch3,
    pub range_switch: Switch3,
    /// Reset gate input.
    pub gate: bool,
    /// Reset button, edge-detected independently of the gate.
    pub button: bool,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            pitch_raw: u16::MAX.into(), // unpatched
            duration_step: 0.2,
            amplitude_step: 0.2,
            duration_barrier: 0.45,
            amplitude_barrier: 0.9,
            breakpoints: 0.43,
            level: 0.8,
            walk_switch: Switch3::Center,
            range_switch: Switch3::Center,
            gate: false,
            button: false,
        }
    }
}

/// Oscillator settings derived from a [`PanelState`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PanelParams {
    pub frequency: f32,
    pub walk: WalkParams,
    pub breakpoints: usize,
    pub mode: WalkMode,
    pub level: f32,
}

impl PanelParams {
    /// Map a panel reading through `cal`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_panel(panel: &PanelState, cal: &Calibration) -> Self {
        let range = FrequencyRange::from(panel.range_switch);
        Self {
            frequency: cal.frequency(range.base_hz(), panel.pitch_raw),
            walk: WalkParams {
                duration_step: step(panel.duration_step),
                amplitude_step: step(panel.amplitude_step),
                duration_barrier: barrier(panel.duration_barrier),
                amplitude_barrier: barrier(panel.amplitude_barrier),
            },
            breakpoints: 2 + (knob(panel.breakpoints) * BREAKPOINT_SPAN) as usize,
            mode: walk_mode_for(panel.walk_switch),
            level: knob(panel.level),
        }
    }

    /// Push everything but the level into `osc`.
    pub fn apply(&self, osc: &mut DssOscillator) {
        osc.set_walk_mode(self.mode);
        osc.set_frequency(self.frequency);
        osc.set_params(self.walk);
        if osc.breakpoint_count() != self.breakpoints {
            osc.set_breakpoint_count(self.breakpoints);
        }
    }
}

#[inline]
fn knob(k: f32) -> f32 {
    if k.is_nan() { 0.0 } else { k.clamp(0.0, 1.0) }
}

#[inline]
fn step(k: f32) -> f32 {
    STEP_MIN + knob(k) * STEP_SPAN
}

#[inline]
fn barrier(k: f32) -> f32 {
    BARRIER_MIN + knob(k) * BARRIER_SPAN
}
