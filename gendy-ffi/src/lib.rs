//! C ABI wrapper for the GENDY oscillator.
//!
//! Exposes functions to create/destroy a voice, render samples and set the
//! oscillator parameters.
//!
//! ABI notes
//! - All functions are `extern "C"` and `#[no_mangle]`.
//! - Opaque handle type: `GendyEngine` (heap-allocated; you own/delete it).
//! - A null handle is ignored by every function (renders return 0).
//! - Render path produces **mono** internally and duplicates to N channels.
//! - Walk mode codes: 0 first-order, 1 second-order, 2 correlated.
//!
//! Threading
//! - The object is NOT thread-safe; call all functions from the same audio thread.

use gendy_core::walk::WalkMode;
use gendy_engine::Voice;

/// Opaque voice wrapper we hand to C.
pub struct GendyEngine {
    voice: Voice,
}

impl GendyEngine {
    fn new(sr: f32) -> Self {
        Self {
            voice: Voice::new(sanitize_rate(sr)),
        }
    }
}

#[inline]
fn sanitize_rate(sr: f32) -> f32 {
    // also maps NaN to 1.0
    sr.max(1.0)
}

/// Borrow the handle, or `None` for null.
///
/// # Safety
/// `engine` must be null or a live pointer from `gendy_create`.
#[inline]
unsafe fn handle<'a>(engine: *mut GendyEngine) -> Option<&'a mut GendyEngine> {
    engine.as_mut()
}

// --- Creation / destruction -------------------------------------------------------

/// Create a new voice with default parameters at `sample_rate`.
#[no_mangle]
pub extern "C" fn gendy_create(sample_rate: f32) -> *mut GendyEngine {
    Box::into_raw(Box::new(GendyEngine::new(sample_rate)))
}

/// Destroy a voice previously returned by `gendy_create`.
///
/// # Safety
/// `engine` must be null or a pointer from `gendy_create` not yet destroyed.
#[no_mangle]
pub unsafe extern "C" fn gendy_destroy(engine: *mut GendyEngine) {
    if !engine.is_null() {
        drop(Box::from_raw(engine));
    }
}

// --- Lifecycle --------------------------------------------------------------------

/// Store a new sample rate and fully reset the walks. Parameters are kept.
///
/// # Safety
/// `engine` must be null or a live pointer from `gendy_create`.
#[no_mangle]
pub unsafe extern "C" fn gendy_init(engine: *mut GendyEngine, sample_rate: f32) {
    if let Some(e) = handle(engine) {
        e.voice.init(sanitize_rate(sample_rate));
    }
}

/// Re-randomize every breakpoint and restart the phase.
///
/// # Safety
/// `engine` must be null or a live pointer from `gendy_create`.
#[no_mangle]
pub unsafe extern "C" fn gendy_reset(engine: *mut GendyEngine) {
    if let Some(e) = handle(engine) {
        e.voice.reset();
    }
}

/// Hard sync: restart the phase and advance the walks by one step.
///
/// # Safety
/// `engine` must be null or a live pointer from `gendy_create`.
#[no_mangle]
pub unsafe extern "C" fn gendy_sync(engine: *mut GendyEngine) {
    if let Some(e) = handle(engine) {
        e.voice.sync();
    }
}

// --- Rendering -------------------------------------------------------------------

/// One sample (output level applied). Returns 0.0 for a null handle.
///
/// # Safety
/// `engine` must be null or a live pointer from `gendy_create`.
#[no_mangle]
pub unsafe extern "C" fn gendy_process(engine: *mut GendyEngine) -> f32 {
    handle(engine).map_or(0.0, |e| e.voice.next_sample())
}

/// Render `frames` of audio into an interleaved f32 buffer with `channels` channels.
/// The sample is duplicated to all channels.
///
/// Returns the number of frames rendered (0 on error).
///
/// # Safety
/// `engine` must be null or a live pointer from `gendy_create`; `out_interleaved`
/// must be null or valid for `frames * channels` writes.
#[no_mangle]
pub unsafe extern "C" fn gendy_render_interleaved_f32(
    engine: *mut GendyEngine,
    out_interleaved: *mut f32,
    frames: u32,
    channels: u32,
) -> u32 {
    let Some(e) = handle(engine) else {
        return 0;
    };
    if out_interleaved.is_null() || frames == 0 || channels == 0 {
        return 0;
    }
    let ch = channels as usize;
    let out = std::slice::from_raw_parts_mut(out_interleaved, frames as usize * ch);

    for frame in out.chunks_exact_mut(ch) {
        frame.fill(e.voice.next_sample());
    }
    frames
}

// --- Parameters -------------------------------------------------------------------

/// Set the oscillator frequency in Hz.
///
/// # Safety
/// `engine` must be null or a live pointer from `gendy_create`.
#[no_mangle]
pub unsafe extern "C" fn gendy_set_frequency(engine: *mut GendyEngine, hz: f32) {
    if let Some(e) = handle(engine) {
        e.voice.oscillator_mut().set_frequency(hz);
    }
}

/// # Safety
/// `engine` must be null or a live pointer from `gendy_create`.
#[no_mangle]
pub unsafe extern "C" fn gendy_set_duration_step(engine: *mut GendyEngine, step: f32) {
    if let Some(e) = handle(engine) {
        e.voice.oscillator_mut().set_duration_step(step);
    }
}

/// # Safety
/// `engine` must be null or a live pointer from `gendy_create`.
#[no_mangle]
pub unsafe extern "C" fn gendy_set_amplitude_step(engine: *mut GendyEngine, step: f32) {
    if let Some(e) = handle(engine) {
        e.voice.oscillator_mut().set_amplitude_step(step);
    }
}

/// # Safety
/// `engine` must be null or a live pointer from `gendy_create`.
#[no_mangle]
pub unsafe extern "C" fn gendy_set_duration_barrier(engine: *mut GendyEngine, barrier: f32) {
    if let Some(e) = handle(engine) {
        e.voice.oscillator_mut().set_duration_barrier(barrier);
    }
}

/// # Safety
/// `engine` must be null or a live pointer from `gendy_create`.
#[no_mangle]
pub unsafe extern "C" fn gendy_set_amplitude_barrier(engine: *mut GendyEngine, barrier: f32) {
    if let Some(e) = handle(engine) {
        e.voice.oscillator_mut().set_amplitude_barrier(barrier);
    }
}

/// Set the number of active breakpoints, clamped to 2..=16.
///
/// # Safety
/// `engine` must be null or a live pointer from `gendy_create`.
#[no_mangle]
pub unsafe extern "C" fn gendy_set_breakpoint_count(engine: *mut GendyEngine, count: u32) {
    if let Some(e) = handle(engine) {
        e.voice.oscillator_mut().set_breakpoint_count(count as usize);
    }
}

/// Select the walk mode by code. Returns false (and changes nothing) for an
/// unknown code or a null handle.
///
/// # Safety
/// `engine` must be null or a live pointer from `gendy_create`.
#[no_mangle]
pub unsafe extern "C" fn gendy_set_walk_mode(engine: *mut GendyEngine, mode: u32) -> bool {
    match (handle(engine), WalkMode::from_code(mode)) {
        (Some(e), Some(mode)) => {
            e.voice.oscillator_mut().set_walk_mode(mode);
            true
        }
        _ => false,
    }
}

/// Set the output level applied after the oscillator. Non-finite values map to 0.
///
/// # Safety
/// `engine` must be null or a live pointer from `gendy_create`.
#[no_mangle]
pub unsafe extern "C" fn gendy_set_output_level(engine: *mut GendyEngine, level: f32) {
    if let Some(e) = handle(engine) {
        e.voice.set_level(if level.is_finite() { level } else { 0.0 });
    }
}
