//! Edge detectors that turn external signals into oscillator events.
//!
//! - `GateEdge`     : rising edge of a gate/button, polled at control rate (→ reset)
//! - `ZeroCrossing` : rising zero crossing of an audio input, per sample (→ hard sync)

/// Rising-edge detector over a boolean gate.
#[derive(Copy, Clone, Debug, Default)]
pub struct GateEdge {
    prev: bool,
}

impl GateEdge {
    #[inline] pub fn new() -> Self { Self::default() }

    /// Returns `true` only on the poll where the gate goes from low to high.
    #[inline]
    pub fn rising(&mut self, gate: bool) -> bool {
        let edge = gate && !self.prev;
        self.prev = gate;
        edge
    }

    #[inline] pub fn state(&self) -> bool { self.prev }
}

/// Rising zero-crossing detector: fires when the previous sample was `<= 0`
/// and the current one is `> 0`.
#[derive(Copy, Clone, Debug, Default)]
pub struct ZeroCrossing {
    prev: f32,
}

impl ZeroCrossing {
    #[inline] pub fn new() -> Self { Self::default() }

    #[inline]
    pub fn rising(&mut self, x: f32) -> bool {
        let edge = self.prev <= 0.0 && x > 0.0;
        self.prev = x;
        edge
    }

    #[inline] pub fn reset(&mut self) { self.prev = 0.0; }
}
