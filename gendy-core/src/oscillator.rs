//! The Dynamic Stochastic Synthesis oscillator.
//!
//! `DssOscillator` owns one [`BreakpointTable`], a phase accumulator and the
//! walk state. `process()` is the only call made at audio rate: it maps the
//! current phase onto a segment of the ring, interpolates between that
//! segment's endpoints, advances the phase and, when the phase wraps, runs
//! one walk update before returning. Everything is constant time and
//! allocation free.
//!
//! Lifecycle
//! - `new(sr)` / `init(sr)` : store the sample rate and `reset()`
//! - `reset()` : reseed, re-randomize all breakpoints, restart the phase
//! - `sync()`  : restart the phase only, then force one walk update
//!
//! The phase accumulator is `f64`: at audio rates an `f32` accumulator
//! drifts by whole samples per cycle (480 Hz at 48 kHz wraps after 101
//! samples instead of 100).
//!
//! Parameter setters are plain stores. Frequency takes effect on the next
//! sample, the breakpoint count renormalizes immediately, everything else is
//! read at the next cycle boundary.

use crate::breakpoint::{Breakpoint, BreakpointTable};
use crate::dsp::{lerp, DURATION_EPSILON};
use crate::rng::{Lcg, DEFAULT_SEED};
use crate::walk::{advance_cycle, WalkMode, WalkParams};

pub const DEFAULT_SAMPLE_RATE: f32 = 48_000.0;
pub const DEFAULT_FREQUENCY: f32 = 220.0;
pub const DEFAULT_BREAKPOINTS: usize = 8;

#[derive(Copy, Clone, Debug)]
pub struct DssOscillator {
    table: BreakpointTable,
    rng: Lcg,
    mode: WalkMode,
    params: WalkParams,

    sample_rate: f32,
    frequency: f32,
    phase_inc: f64,
    phase: f64, // [0,1)

    segment: usize,
    segment_phase: f32, // [0,1]
    cycles: u64,
}

impl Default for DssOscillator {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE)
    }
}

impl DssOscillator {
    /// Build an oscillator with the default parameter set and run `init(sample_rate)`.
    pub fn new(sample_rate: f32) -> Self {
        let mut osc = Self {
            table: BreakpointTable::new(DEFAULT_BREAKPOINTS),
            rng: Lcg::new(DEFAULT_SEED),
            mode: WalkMode::default(),
            params: WalkParams::default(),
            sample_rate,
            frequency: DEFAULT_FREQUENCY,
            phase_inc: 0.0,
            phase: 0.0,
            segment: 0,
            segment_phase: 0.0,
            cycles: 0,
        };
        osc.init(sample_rate);
        osc
    }

    /// Store the sample rate and perform a full reset.
    pub fn init(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.reset();
    }

    /// Full restart: reseed, re-randomize every breakpoint, restart the phase.
    ///
    /// Parameters (frequency, steps, barriers, count, mode) are kept.
    pub fn reset(&mut self) {
        self.rng.reseed(DEFAULT_SEED);
        self.table.randomize(&mut self.rng);
        self.restart_phase();
        self.cycles = 0;
        self.set_frequency(self.frequency);
    }

    /// Hard sync: restart the phase and force one walk step.
    ///
    /// Unlike `reset()` the walk state carries on from where it was.
    pub fn sync(&mut self) {
        self.restart_phase();
        self.advance_cycle();
    }

    /// Produce one output sample, nominally in `[-1, 1]`.
    #[inline]
    pub fn process(&mut self) -> f32 {
        #[allow(clippy::cast_possible_truncation)]
        let phase = self.phase as f32;
        let seg = self.table.locate(phase);
        self.segment = seg.index;
        self.segment_phase = if seg.duration > DURATION_EPSILON {
            ((phase - seg.start) / seg.duration).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let points = self.table.as_slice();
        let from = points[seg.index].current_amplitude;
        let to = points[self.table.next_index(seg.index)].current_amplitude;
        let out = lerp(from, to, self.segment_phase);

        self.phase += self.phase_inc;
        if self.phase >= 1.0 {
            // an increment past one cycle per sample still lands in [0, 1)
            self.phase %= 1.0;
            self.advance_cycle();
        }

        out
    }

    /// Fill `out` with consecutive samples.
    #[inline]
    pub fn fill(&mut self, out: &mut [f32]) {
        for y in out.iter_mut() {
            *y = self.process();
        }
    }

    #[inline]
    fn restart_phase(&mut self) {
        self.phase = 0.0;
        self.segment = 0;
        self.segment_phase = 0.0;
    }

    #[inline]
    fn advance_cycle(&mut self) {
        advance_cycle(&mut self.table, self.mode, &self.params, &mut self.rng);
        self.cycles = self.cycles.wrapping_add(1);
    }

    // ------------------------------- Setters ---------------------------------------

    /// Oscillator frequency in Hz; the phase increment follows immediately.
    #[inline]
    pub fn set_frequency(&mut self, hz: f32) {
        self.frequency = hz;
        self.phase_inc = f64::from(hz) / f64::from(self.sample_rate);
    }

    #[inline] pub fn set_duration_step(&mut self, step: f32) { self.params.duration_step = step; }
    #[inline] pub fn set_amplitude_step(&mut self, step: f32) { self.params.amplitude_step = step; }
    #[inline] pub fn set_duration_barrier(&mut self, barrier: f32) { self.params.duration_barrier = barrier; }
    #[inline] pub fn set_amplitude_barrier(&mut self, barrier: f32) { self.params.amplitude_barrier = barrier; }

    /// Replace all four walk parameters at once.
    #[inline]
    pub fn set_params(&mut self, params: WalkParams) {
        self.params = params;
    }

    /// Active breakpoint count, clamped to `[2, 16]`. Durations are renormalized at once.
    #[inline]
    pub fn set_breakpoint_count(&mut self, count: usize) {
        self.table.set_active(count);
    }

    #[inline]
    pub fn set_walk_mode(&mut self, mode: WalkMode) {
        self.mode = mode;
    }

    // ------------------------------- Observers -------------------------------------

    #[inline] pub fn sample_rate(&self) -> f32 { self.sample_rate }
    #[inline] pub fn frequency(&self) -> f32 { self.frequency }
    #[inline] pub fn phase_increment(&self) -> f64 { self.phase_inc }
    #[inline] pub fn phase(&self) -> f64 { self.phase }
    #[inline] pub fn current_segment(&self) -> usize { self.segment }
    #[inline] pub fn segment_phase(&self) -> f32 { self.segment_phase }
    #[inline] pub fn walk_mode(&self) -> WalkMode { self.mode }
    #[inline] pub fn params(&self) -> WalkParams { self.params }
    #[inline] pub fn breakpoint_count(&self) -> usize { self.table.active() }

    /// The active breakpoints.
    #[inline]
    pub fn breakpoints(&self) -> &[Breakpoint] {
        self.table.as_slice()
    }

    #[inline]
    pub fn table(&self) -> &BreakpointTable {
        &self.table
    }

    /// Walk updates performed since the last reset.
    #[inline]
    pub fn cycle_count(&self) -> u64 {
        self.cycles
    }
}
