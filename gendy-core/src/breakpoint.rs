//! Breakpoint records and the fixed-capacity table that holds them.
//!
//! The waveform is a closed ring of breakpoints: each one contributes a
//! segment of `current_duration` (a fraction of the cycle once normalized)
//! starting at amplitude `current_amplitude` and ramping linearly to the
//! next breakpoint's amplitude. The last segment ramps back to breakpoint 0,
//! whose amplitude is pinned to zero so the ring closes without a step.
//!
//! The table is a plain `[Breakpoint; MAX_BREAKPOINTS]` arena with an active
//! count; changing the count never allocates and inactive slots keep their
//! walk state.

use crate::dsp::DURATION_EPSILON;
use crate::rng::Lcg;

/// Capacity of the breakpoint arena.
pub const MAX_BREAKPOINTS: usize = 16;

/// Smallest ring that still describes a waveform.
pub const MIN_BREAKPOINTS: usize = 2;

/// Initial spread of duration positions on reset.
const RESET_DURATION_SPREAD: f32 = 0.3;
/// Initial spread of amplitude positions on reset.
const RESET_AMPLITUDE_SPREAD: f32 = 0.5;

/// One vertex of the waveform ring.
///
/// `*_position` / `*_velocity` are the random-walk state; velocities only
/// move in the velocity-mediated walk modes. `current_*` are the values the
/// phase engine reads.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Breakpoint {
    pub duration_velocity: f32,
    pub duration_position: f32,
    pub amplitude_velocity: f32,
    pub amplitude_position: f32,
    pub current_duration: f32,
    pub current_amplitude: f32,
}

/// The segment that contains a given phase.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Segment {
    pub index: usize,
    /// Cumulative duration of all segments before `index`.
    pub start: f32,
    pub duration: f32,
}

/// Fixed-capacity breakpoint arena plus the number of slots in play.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BreakpointTable {
    slots: [Breakpoint; MAX_BREAKPOINTS],
    active: usize,
}

impl BreakpointTable {
    /// All slots zeroed with unit duration; `active` is clamped to `[2, 16]`.
    pub fn new(active: usize) -> Self {
        let blank = Breakpoint {
            current_duration: 1.0,
            ..Breakpoint::default()
        };
        let mut table = Self {
            slots: [blank; MAX_BREAKPOINTS],
            active: clamp_count(active),
        };
        table.normalize();
        table
    }

    #[inline]
    pub fn active(&self) -> usize {
        self.active
    }

    /// Change the active count (clamped to `[2, 16]`) and renormalize at once.
    pub fn set_active(&mut self, count: usize) {
        self.active = clamp_count(count);
        self.normalize();
    }

    /// The active breakpoints, in ring order.
    #[inline]
    pub fn as_slice(&self) -> &[Breakpoint] {
        &self.slots[..self.active]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Breakpoint] {
        &mut self.slots[..self.active]
    }

    /// Every slot, active or not.
    #[inline]
    pub fn slots(&self) -> &[Breakpoint; MAX_BREAKPOINTS] {
        &self.slots
    }

    #[inline]
    pub fn total_duration(&self) -> f32 {
        self.as_slice().iter().map(|bp| bp.current_duration).sum()
    }

    /// Rescale active durations so they sum to one cycle.
    ///
    /// A total at or below [`DURATION_EPSILON`] is left alone; with the
    /// per-breakpoint duration floor this cannot happen in practice.
    pub fn normalize(&mut self) {
        let total = self.total_duration();
        if total > DURATION_EPSILON {
            let scale = 1.0 / total;
            for bp in self.as_mut_slice() {
                bp.current_duration *= scale;
            }
        }
    }

    /// Force breakpoint 0 to zero amplitude so the ring is continuous.
    #[inline]
    pub fn pin_origin(&mut self) {
        let origin = &mut self.slots[0];
        origin.amplitude_position = 0.0;
        origin.current_amplitude = 0.0;
    }

    /// Scatter every slot (active or not) around the origin.
    ///
    /// Velocities are cleared and durations reset to one unit each, so the
    /// first cycle after a reset has evenly spaced breakpoints; positions
    /// only show up in the durations after the first walk.
    pub fn randomize(&mut self, rng: &mut Lcg) {
        for bp in &mut self.slots {
            bp.duration_velocity = 0.0;
            bp.amplitude_velocity = 0.0;
            bp.duration_position = rng.next_bipolar() * RESET_DURATION_SPREAD;
            bp.amplitude_position = rng.next_bipolar() * RESET_AMPLITUDE_SPREAD;
            bp.current_duration = 1.0;
            bp.current_amplitude = bp.amplitude_position;
        }
        self.pin_origin();
        self.normalize();
    }

    /// First segment whose cumulative end lies beyond `phase`.
    ///
    /// If rounding leaves the durations summing to just under `phase`, the
    /// last active segment is returned.
    pub fn locate(&self, phase: f32) -> Segment {
        let mut start = 0.0;
        let last = self.active - 1;
        for (index, bp) in self.as_slice().iter().enumerate() {
            let end = start + bp.current_duration;
            if phase < end || index == last {
                return Segment {
                    index,
                    start,
                    duration: bp.current_duration,
                };
            }
            start = end;
        }
        // active >= 2, so the loop always returns
        Segment {
            index: last,
            start,
            duration: self.slots[last].current_duration,
        }
    }

    /// Index of the breakpoint after `index`, wrapping to 0.
    #[inline]
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.active
    }
}

impl Default for BreakpointTable {
    fn default() -> Self {
        Self::new(8)
    }
}

#[inline]
fn clamp_count(count: usize) -> usize {
    count.clamp(MIN_BREAKPOINTS, MAX_BREAKPOINTS)
}
