//! GENDY Engine — host glue around the DSS oscillator.
//!
//! Crate layout:
//! - [`graph`]       : `Generator` trait and `Engine<G>` sample-rate wrapper
//! - [`voice`]       : `Voice`, the module context (oscillator + level + triggers + calibration)
//! - [`controls`]    : front-panel snapshot and its mapping onto oscillator parameters
//! - [`calibration`] : 1V/oct pitch calibration and the three-point capture procedure
//! - [`triggers`]    : gate edge and zero-crossing detectors
//! - [`realtime`]    : CPAL device selection and output streams (feature `realtime`)
//!
//! Nothing here allocates on the audio path. There is no global state: the
//! host builds one [`Voice`] and passes it by `&mut` to its audio callback
//! and control loop (or moves it into the callback and talks to it there).

pub mod calibration;
pub mod controls;
pub mod graph;
#[cfg(feature = "realtime")]
pub mod realtime;
pub mod triggers;
pub mod voice;

// Re-export some commonly used items to make downstream imports ergonomic.
pub use calibration::{Calibration, CalibrationCapture, CalibrationError};
pub use controls::{FrequencyRange, PanelParams, PanelState, Switch3};
pub use gendy_core::oscillator::DssOscillator;
pub use gendy_core::walk::{WalkMode, WalkParams};
pub use graph::{Engine, Generator};
pub use triggers::{GateEdge, ZeroCrossing};
pub use voice::{Frame, Voice};
