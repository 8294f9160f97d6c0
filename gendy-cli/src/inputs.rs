//! Emulated patch cables: sine sources for the sync and ring inputs.

use std::f32::consts::TAU;

use gendy_engine::realtime::FrameInputs;

use crate::config::InputsConfig;

#[derive(Copy, Clone, Debug)]
pub struct Sine {
    phase: f32,
    inc: f32,
}

impl Sine {
    /// Starts just below a rising zero crossing, so the first cycle triggers a sync.
    pub fn new(hz: f32, sample_rate: f32) -> Self {
        Self {
            phase: -f32::EPSILON,
            inc: hz / sample_rate,
        }
    }

    #[inline]
    pub fn next(&mut self) -> f32 {
        let s = (TAU * self.phase).sin();
        self.phase += self.inc;
        self.phase -= self.phase.floor();
        s
    }
}

/// Sync and ring inputs, each either patched to a sine or left open.
#[derive(Copy, Clone, Debug, Default)]
pub struct PatchInputs {
    sync: Option<Sine>,
    ring: Option<Sine>,
}

impl PatchInputs {
    pub fn new(cfg: &InputsConfig, sample_rate: f32) -> Self {
        Self {
            sync: cfg.sync_hz.map(|hz| Sine::new(hz, sample_rate)),
            ring: cfg.ring_hz.map(|hz| Sine::new(hz, sample_rate)),
        }
    }
}

impl FrameInputs for PatchInputs {
    #[inline]
    fn next_inputs(&mut self) -> (f32, f32) {
        (
            self.sync.as_mut().map_or(0.0, Sine::next),
            self.ring.as_mut().map_or(0.0, Sine::next),
        )
    }
}
