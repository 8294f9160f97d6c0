#![cfg_attr(not(feature = "std"), no_std)]
//! GENDY Core — Dynamic Stochastic Synthesis oscillator, no_std-ready and allocation free.
//!
//! Features
//! - `std`       : (default) use the Rust standard library
//! - `no-std`    : build with `#![no_std]` and use the `libm` math backend
//! - `micromath` : use `micromath` instead of `libm` for the few math intrinsics needed
//! - `serde`     : derive `Serialize`/`Deserialize` on [`WalkMode`](walk::WalkMode) and [`WalkParams`](walk::WalkParams)
//!
//! Modules
//! - [`dsp`]        : math backend, interpolation, elastic barrier reflection
//! - [`rng`]        : deterministic LCG random source
//! - [`breakpoint`] : breakpoint records, fixed-capacity table, duration normalizer
//! - [`walk`]       : walk modes and the per-cycle random-walk update
//! - [`oscillator`] : phase/segment engine and the oscillator lifecycle
//!
//! Design
//! - No heap allocations; the breakpoint table is a fixed `[_; 16]` arena
//! - Constant time per sample, including barrier reflection
//! - No internal locking: one owner drives both the audio and control paths

#[cfg(all(test, not(feature = "std")))]
extern crate std;

pub mod breakpoint;
pub mod dsp;
pub mod oscillator;
pub mod rng;
pub mod walk;

/// Commonly used types/functions for convenience:
pub mod prelude {
    pub use crate::breakpoint::{Breakpoint, BreakpointTable, MAX_BREAKPOINTS, MIN_BREAKPOINTS};
    pub use crate::dsp::{lerp, reflect, reflect_symmetric};
    pub use crate::oscillator::DssOscillator;
    pub use crate::rng::Lcg;
    pub use crate::walk::{WalkMode, WalkParams};
}
