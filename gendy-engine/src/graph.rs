//! Realtime generator core.
//!
//! This module defines the minimal `Generator` trait and a lightweight `Engine<G>`
//! wrapper that owns a generator, tracks the host sample rate and the number of
//! rendered frames, and produces one **mono** sample at a time with zero heap
//! work per sample.
//!
//! Design goals
//! - No dynamic allocations in the audio thread
//! - SR changes handled lazily (if the host reconfigures), with cheap branching
//! - Generic over the generator type, no trait objects on the audio path

use gendy_core::oscillator::{DssOscillator, DEFAULT_SAMPLE_RATE};

/// Anything that can generate one sample at a time.
pub trait Generator {
    /// Called when the engine is (re)initialized or when the sample rate changes.
    fn reset(&mut self, sr: f32);

    /// Hard-sync trigger. Generators without a phase to restart ignore it.
    fn sync(&mut self) {}

    /// Generate the next mono sample. Implementations should assume the sample
    /// rate has been communicated via `reset`.
    fn next(&mut self) -> f32;
}

impl Generator for DssOscillator {
    #[inline]
    fn reset(&mut self, sr: f32) {
        self.init(sr);
    }

    #[inline]
    fn sync(&mut self) {
        DssOscillator::sync(self);
    }

    #[inline]
    fn next(&mut self) -> f32 {
        self.process()
    }
}

/// Lightweight realtime engine that owns a generator.
///
/// The audio callback should call `next(sr)` for every output sample. If the
/// `sr` reported by the host changes, the engine will call `reset(sr)` on the
/// inner generator once and continue.
#[derive(Clone, Debug)]
pub struct Engine<G: Generator> {
    sr: f32,
    frames: u64,
    gen: G,
}

impl<G: Generator> Engine<G> {
    /// Construct with an already-configured generator. We immediately `reset`
    /// the generator to communicate the sample rate.
    #[inline]
    pub fn new(gen: G) -> Self {
        Self::with_sample_rate(gen, DEFAULT_SAMPLE_RATE)
    }

    #[inline]
    pub fn with_sample_rate(mut gen: G, sr: f32) -> Self {
        gen.reset(sr);
        Self { sr, frames: 0, gen }
    }

    /// Produce **one** mono sample at the given sample rate.
    ///
    /// If `sr` differs from the current engine `sr`, we update and call `reset(sr)`.
    #[inline]
    pub fn next(&mut self, sr: f32) -> f32 {
        if sr != self.sr {
            self.sr = sr;
            self.gen.reset(sr);
        }
        self.frames = self.frames.wrapping_add(1);
        self.gen.next()
    }

    /// Re-initialize the generator at the current sample rate.
    #[inline]
    pub fn reset(&mut self) {
        self.gen.reset(self.sr);
    }

    #[inline]
    pub fn sync(&mut self) {
        self.gen.sync();
    }

    /// Return the engine’s current sample rate.
    #[inline] pub fn sample_rate(&self) -> f32 { self.sr }

    /// Frames rendered since this engine was created.
    #[inline] pub fn frames(&self) -> u64 { self.frames }

    #[inline] pub fn generator(&self) -> &G { &self.gen }

    /// Get a mutable reference to the inner generator for live parameter tweaks.
    #[inline]
    pub fn generator_mut(&mut self) -> &mut G { &mut self.gen }
}
