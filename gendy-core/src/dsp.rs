//! Math backend and small numeric helpers shared by the generator.
//!
//! Design goals:
//! - `no_std` ready (guarded by the crate feature `no-std`)
//! - Math backend selection that works in both `std` and `no_std` contexts
//! - Bounded-time helpers only: everything here runs inside the audio callback
//!
//! Conventions:
//! - All functions are `#[inline]` where useful to help the optimizer.
//! - Argument and return domains are documented per function.

use cfg_if::cfg_if;

// ----------------------------- Math backend selection -----------------------------

cfg_if! {
    // micromath preferred if explicitly requested (works in no_std)
    if #[cfg(feature = "micromath")] {
        use micromath::F32Ext as _;
        #[inline] fn m_floor(x: f32) -> f32 { x.floor() }
    // libm (C math) in no_std
    } else if #[cfg(feature = "no-std")] {
        #[inline] fn m_floor(x: f32) -> f32 { libm::floorf(x) }
    // std backend
    } else if #[cfg(feature = "std")] {
        #[inline] fn m_floor(x: f32) -> f32 { x.floor() }
    // bare core, no backend selected
    } else {
        #[inline] fn m_floor(x: f32) -> f32 { floor_core(x) }
    }
}

/// `floor` with nothing but `core`. Values of magnitude 2^23 and above are
/// already integral; NaN and infinities pass through.
#[cfg_attr(any(feature = "std", feature = "no-std", feature = "micromath"), allow(dead_code))]
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn floor_core(x: f32) -> f32 {
    if x.is_nan() || x >= 8_388_608.0 || x <= -8_388_608.0 {
        return x;
    }
    let t = x as i32 as f32;
    if t > x { t - 1.0 } else { t }
}

// --------------------------------- Constants -------------------------------------

/// Below this, a duration (segment or whole cycle) is treated as zero.
pub const DURATION_EPSILON: f32 = 1.0e-4;

/// Floor applied to a breakpoint's un-normalized duration.
pub const MIN_DURATION: f32 = 0.1;

// --------------------------------- Utilities -------------------------------------

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Elastic barrier reflection of `x` into `[lo, hi]`.
///
/// Equivalent to repeatedly mirroring around whichever bound is exceeded
/// (`lo + (lo - x)` / `hi - (x - hi)`) until the value lands inside, but
/// evaluated in closed form: the fold is a triangle wave of period
/// `2 * (hi - lo)`, so arbitrarily large overshoots cost the same as small ones.
///
/// Values already inside are returned bit-exact. Degenerate bounds
/// (`hi <= lo`) and non-finite input collapse to the midpoint of the bounds.
#[inline]
pub fn reflect(x: f32, lo: f32, hi: f32) -> f32 {
    if x >= lo && x <= hi {
        return x;
    }
    let width = hi - lo;
    if !(width > 0.0) || !x.is_finite() {
        return 0.5 * (lo + hi);
    }
    let period = 2.0 * width;
    let offset = x - lo;
    let mut t = offset - period * m_floor(offset / period);
    if t > width {
        t = period - t;
    }
    // rounding in the subtraction above can leave us an ulp outside
    (lo + t).clamp(lo, hi)
}

/// Symmetric form of [`reflect`] for the `[-barrier, +barrier]` windows the walks use.
#[inline]
pub fn reflect_symmetric(x: f32, barrier: f32) -> f32 {
    reflect(x, -barrier, barrier)
}

// --------------------------------- Tests (std only) ------------------------------
