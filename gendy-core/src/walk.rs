//! Random-walk update applied to the breakpoint table once per cycle.
//!
//! Walk modes:
//! - `FirstOrder`  : the random draw moves the position directly
//! - `SecondOrder` : the draw moves a velocity, the velocity moves the position
//! - `Correlated`  : like `SecondOrder`, but one draw drives both axes
//!
//! Every position is kept inside its barrier by elastic reflection, and in
//! the velocity modes the velocity is reflected into a barrier half as wide.

use crate::breakpoint::{Breakpoint, BreakpointTable};
use crate::dsp::{reflect_symmetric, MIN_DURATION};
use crate::rng::Lcg;

/// How a breakpoint's random-walk state is perturbed each cycle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum WalkMode {
    FirstOrder,
    #[default]
    SecondOrder,
    Correlated,
}

impl WalkMode {
    pub const ALL: [WalkMode; 3] = [Self::FirstOrder, Self::SecondOrder, Self::Correlated];

    /// Stable small-integer code (0, 1, 2), used by the C ABI.
    #[inline]
    pub fn code(self) -> u32 {
        match self {
            Self::FirstOrder => 0,
            Self::SecondOrder => 1,
            Self::Correlated => 2,
        }
    }

    #[inline]
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::FirstOrder),
            1 => Some(Self::SecondOrder),
            2 => Some(Self::Correlated),
            _ => None,
        }
    }

    #[inline]
    fn uses_velocity(self) -> bool {
        !matches!(self, Self::FirstOrder)
    }
}

/// Step sizes and barriers shared by every breakpoint.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WalkParams {
    pub duration_step: f32,
    pub amplitude_step: f32,
    pub duration_barrier: f32,
    pub amplitude_barrier: f32,
}

impl Default for WalkParams {
    fn default() -> Self {
        Self {
            duration_step: 0.1,
            amplitude_step: 0.1,
            duration_barrier: 0.5,
            amplitude_barrier: 0.9,
        }
    }
}

/// Advance a single breakpoint by one walk step.
///
/// Consumes one random draw, or two unless `mode` is `Correlated`.
#[inline]
pub fn step_breakpoint(bp: &mut Breakpoint, mode: WalkMode, params: &WalkParams, rng: &mut Lcg) {
    let r_dur = rng.next_bipolar();
    let r_amp = if mode == WalkMode::Correlated {
        r_dur
    } else {
        rng.next_bipolar()
    };

    if mode.uses_velocity() {
        bp.duration_velocity = reflect_symmetric(
            bp.duration_velocity + r_dur * params.duration_step,
            0.5 * params.duration_barrier,
        );
        bp.amplitude_velocity = reflect_symmetric(
            bp.amplitude_velocity + r_amp * params.amplitude_step,
            0.5 * params.amplitude_barrier,
        );
        bp.duration_position += bp.duration_velocity;
        bp.amplitude_position += bp.amplitude_velocity;
    } else {
        bp.duration_position += r_dur * params.duration_step;
        bp.amplitude_position += r_amp * params.amplitude_step;
    }

    bp.duration_position = reflect_symmetric(bp.duration_position, params.duration_barrier);
    bp.amplitude_position = reflect_symmetric(bp.amplitude_position, params.amplitude_barrier);

    bp.current_duration = (1.0 + bp.duration_position).max(MIN_DURATION);
    bp.current_amplitude = bp.amplitude_position;
}

/// One full walk update: step every active breakpoint, re-pin the origin,
/// renormalize to a unit cycle.
pub fn advance_cycle(table: &mut BreakpointTable, mode: WalkMode, params: &WalkParams, rng: &mut Lcg) {
    for bp in table.as_mut_slice() {
        step_breakpoint(bp, mode, params, rng);
    }
    table.pin_origin();
    table.normalize();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::DEFAULT_SEED;

    fn seeded_table(active: usize) -> (BreakpointTable, Lcg) {
        let mut rng = Lcg::new(DEFAULT_SEED);
        let mut table = BreakpointTable::new(active);
        table.randomize(&mut rng);
        (table, rng)
    }

    #[test]
    fn walk_mode_codes_round_trip() {
        for mode in WalkMode::ALL {
            assert_eq!(WalkMode::from_code(mode.code()), Some(mode));
        }
        assert_eq!(WalkMode::from_code(3), None);
        assert_eq!(WalkMode::default(), WalkMode::SecondOrder);
    }

    #[test]
    fn first_order_moves_position_only() {
        let mut bp = Breakpoint::default();
        let params = WalkParams::default();
        let mut rng = Lcg::new(1);
        let mut probe = rng;
        let r_dur = probe.next_bipolar();
        let r_amp = probe.next_bipolar();

        step_breakpoint(&mut bp, WalkMode::FirstOrder, &params, &mut rng);

        assert_eq!(bp.duration_velocity, 0.0);
        assert_eq!(bp.amplitude_velocity, 0.0);
        assert!((bp.duration_position - r_dur * 0.1).abs() < 1e-7);
        assert!((bp.amplitude_position - r_amp * 0.1).abs() < 1e-7);
        assert!((bp.current_duration - (1.0 + bp.duration_position)).abs() < 1e-7);
        assert_eq!(rng, probe);
    }

    #[test]
    fn correlated_uses_one_draw_for_both_axes() {
        let mut bp = Breakpoint::default();
        let params = WalkParams::default();
        let mut rng = Lcg::new(99);
        let mut probe = rng;
        let r = probe.next_bipolar();

        step_breakpoint(&mut bp, WalkMode::Correlated, &params, &mut rng);

        // equal steps and equal draws: both axes moved by the same amount
        assert!((bp.duration_velocity - r * 0.1).abs() < 1e-7);
        assert_eq!(bp.duration_velocity, bp.amplitude_velocity);
        assert_eq!(bp.duration_position, bp.amplitude_position);
        assert_eq!(rng, probe);
    }

    #[test]
    fn velocity_is_reflected_into_half_barrier() {
        let mut bp = Breakpoint {
            duration_velocity: 0.24,
            amplitude_velocity: -0.44,
            ..Breakpoint::default()
        };
        let params = WalkParams {
            duration_step: 0.5,
            amplitude_step: 0.5,
            ..WalkParams::default()
        };
        let mut rng = Lcg::new(3);
        for _ in 0..200 {
            step_breakpoint(&mut bp, WalkMode::SecondOrder, &params, &mut rng);
            assert!(bp.duration_velocity.abs() <= 0.25 + 1e-6);
            assert!(bp.amplitude_velocity.abs() <= 0.45 + 1e-6);
            assert!(bp.duration_position.abs() <= 0.5 + 1e-6);
            assert!(bp.amplitude_position.abs() <= 0.9 + 1e-6);
        }
    }

    #[test]
    fn duration_never_drops_below_floor() {
        let mut bp = Breakpoint::default();
        let params = WalkParams {
            duration_step: 2.0,
            duration_barrier: 3.0,
            ..WalkParams::default()
        };
        let mut rng = Lcg::new(11);
        for _ in 0..500 {
            step_breakpoint(&mut bp, WalkMode::FirstOrder, &params, &mut rng);
            assert!(bp.current_duration >= MIN_DURATION);
        }
    }

    #[test]
    fn advance_keeps_unit_cycle_and_pin() {
        for mode in WalkMode::ALL {
            let (mut table, mut rng) = seeded_table(11);
            let params = WalkParams::default();
            for _ in 0..64 {
                advance_cycle(&mut table, mode, &params, &mut rng);
                assert!((table.total_duration() - 1.0).abs() < 1e-5, "{mode:?}");
                assert_eq!(table.as_slice()[0].current_amplitude, 0.0);
                assert_eq!(table.as_slice()[0].amplitude_position, 0.0);
            }
        }
    }

    #[test]
    fn zero_steps_leave_positions_unchanged() {
        let (mut table, mut rng) = seeded_table(8);
        let params = WalkParams {
            duration_step: 0.0,
            amplitude_step: 0.0,
            ..WalkParams::default()
        };
        advance_cycle(&mut table, WalkMode::SecondOrder, &params, &mut rng);
        let first = table;
        for _ in 0..16 {
            advance_cycle(&mut table, WalkMode::SecondOrder, &params, &mut rng);
        }
        for (a, b) in first.as_slice().iter().zip(table.as_slice()) {
            assert_eq!(a.duration_position, b.duration_position);
            assert_eq!(a.amplitude_position, b.amplitude_position);
            assert!((a.current_duration - b.current_duration).abs() < 1e-6);
        }
    }

    #[test]
    fn inactive_slots_are_not_walked() {
        let (mut table, mut rng) = seeded_table(4);
        let before = *table.slots();
        advance_cycle(&mut table, WalkMode::FirstOrder, &WalkParams::default(), &mut rng);
        assert_eq!(&before[4..], &table.slots()[4..]);
    }
}
