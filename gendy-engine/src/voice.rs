//! The module context: one oscillator plus everything the panel wires around it.
//!
//! `Voice` is constructed once at startup and handed by `&mut` to whatever
//! drives the audio callback and the control loop. It owns
//! - the DSS oscillator (inside an [`Engine`] for sample-rate tracking),
//! - the pitch calibration,
//! - the output level,
//! - the sync (zero-crossing) and reset (gate and button) detectors.
//!
//! Audio rate: [`Voice::process_frame`]. Control rate: [`Voice::apply_controls`].

use gendy_core::oscillator::DssOscillator;
use tracing::debug;

use crate::calibration::Calibration;
use crate::controls::{PanelParams, PanelState};
use crate::graph::Engine;
use crate::triggers::{GateEdge, ZeroCrossing};

pub const DEFAULT_LEVEL: f32 = 0.8;

/// One output frame: the dry oscillator and the ring-modulated copy.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Frame {
    pub dry: f32,
    pub ring: f32,
}

#[derive(Clone, Debug)]
pub struct Voice {
    engine: Engine<DssOscillator>,
    calibration: Calibration,
    level: f32,
    sync_in: ZeroCrossing,
    gate: GateEdge,
    button: GateEdge,
}

impl Voice {
    pub fn new(sample_rate: f32) -> Self {
        Self::with_calibration(sample_rate, Calibration::default())
    }

    /// Build with a stored calibration; implausible values fall back to defaults.
    pub fn with_calibration(sample_rate: f32, calibration: Calibration) -> Self {
        Self {
            engine: Engine::with_sample_rate(DssOscillator::new(sample_rate), sample_rate),
            calibration: calibration.validated(),
            level: DEFAULT_LEVEL,
            sync_in: ZeroCrossing::new(),
            gate: GateEdge::new(),
            button: GateEdge::new(),
        }
    }

    /// One audio frame.
    ///
    /// `sync_in` is watched for rising zero crossings (hard sync); `ring_in`
    /// modulates the second output as `dry * (1 + ring_in)`, so an unpatched
    /// (zero) input leaves it equal to the dry signal.
    #[inline]
    pub fn process_frame(&mut self, sync_in: f32, ring_in: f32) -> Frame {
        if self.sync_in.rising(sync_in) {
            self.engine.sync();
        }
        let sr = self.engine.sample_rate();
        let dry = self.engine.next(sr) * self.level;
        Frame {
            dry,
            ring: dry * (1.0 + ring_in),
        }
    }

    /// Dry output only, no external inputs.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        self.process_frame(0.0, 0.0).dry
    }

    /// Control-rate update from a panel reading.
    ///
    /// A rising edge on either the gate or the button resets the walks; each
    /// has its own detector, so a press registers while the gate is held high.
    pub fn apply_controls(&mut self, panel: &PanelState) {
        let params = PanelParams::from_panel(panel, &self.calibration);
        self.apply_params(&params);
        let gate = self.gate.rising(panel.gate);
        let button = self.button.rising(panel.button);
        if gate || button {
            debug!(gate, button, "reset edge, resetting walks");
            self.reset();
        }
    }

    pub fn apply_params(&mut self, params: &PanelParams) {
        params.apply(self.engine.generator_mut());
        self.level = params.level;
    }

    /// Full re-randomization of the breakpoints.
    pub fn reset(&mut self) {
        self.engine.generator_mut().reset();
    }

    /// Hard sync, as if a zero crossing arrived.
    pub fn sync(&mut self) {
        self.engine.sync();
    }

    /// Re-initialize the oscillator at `sr`. Parameters survive, walks restart.
    pub fn init(&mut self, sr: f32) {
        self.engine = Engine::with_sample_rate(*self.engine.generator(), sr);
    }

    /// Follow a host sample-rate change; the oscillator is re-initialized.
    pub fn set_sample_rate(&mut self, sr: f32) {
        if sr != self.engine.sample_rate() {
            debug!(sr, "sample rate changed");
            self.init(sr);
        }
    }

    #[inline] pub fn set_level(&mut self, level: f32) { self.level = level; }
    #[inline] pub fn level(&self) -> f32 { self.level }
    #[inline] pub fn sample_rate(&self) -> f32 { self.engine.sample_rate() }
    #[inline] pub fn calibration(&self) -> Calibration { self.calibration }

    pub fn set_calibration(&mut self, calibration: Calibration) {
        self.calibration = calibration.validated();
    }

    #[inline] pub fn oscillator(&self) -> &DssOscillator { self.engine.generator() }
    #[inline] pub fn oscillator_mut(&mut self) -> &mut DssOscillator { self.engine.generator_mut() }
}
