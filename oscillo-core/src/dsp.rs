//! Math backend and phase helpers shared by the waveform functions.
//!
//! Design goals:
//! - `no_std` ready (guarded by the crate feature `no-std`)
//! - Math backend selection that works in both `std` and `no_std` contexts
//! - Optional `fast-math` sine approximation for the hot path
//!
//! Phase arithmetic is done in `f64` so that long-running cursors and
//! low frequencies keep sub-sample accuracy; the final sample is `f32`.

#![allow(clippy::excessive_precision)]

use core::f32::consts::PI;

use cfg_if::cfg_if;

// ----------------------------- Math backend selection -----------------------------

cfg_if! {
    // libm (C math) in no_std
    if #[cfg(feature = "no-std")] {
        #[inline] fn m_sin(x: f32) -> f32 { libm::sinf(x) }
        #[inline] fn m_fmod(x: f64, y: f64) -> f64 { libm::fmod(x, y) }
        #[inline] fn m_floor(x: f64) -> f64 { libm::floor(x) }
    // std backend
    } else {
        #[inline] fn m_sin(x: f32) -> f32 { x.sin() }
        #[inline] fn m_fmod(x: f64, y: f64) -> f64 { x % y }
        #[inline] fn m_floor(x: f64) -> f64 { x.floor() }
    }
}

// --------------------------------- Constants -------------------------------------

/// 2π
pub const TAU: f32 = 2.0 * PI;

// ----------------------------------- Sine ----------------------------------------

/// Sine of `x` radians.
///
/// With `fast-math` this is [`poly_sin`]; otherwise it is the backend's exact `sin`.
#[inline]
pub fn fast_sin(x: f32) -> f32 {
    cfg_if! {
        if #[cfg(feature = "fast-math")] {
            poly_sin(x)
        } else {
            m_sin(x)
        }
    }
}

/// Polynomial sine: range-reduce to [-π, π], fold into [-π/2, π/2] with
/// `sin(x) = sin(±π - x)`, then a 9th-order odd polynomial.
/// Max abs error ~4e-6 plus the f32 reduction error.
#[inline]
pub fn poly_sin(x: f32) -> f32 {
    const HALF_PI: f32 = PI / 2.0;
    let k = m_floor(f64::from(x / TAU) + 0.5) as f32;
    let mut xr = x - k * TAU;
    if xr > HALF_PI {
        xr = PI - xr;
    } else if xr < -HALF_PI {
        xr = -PI - xr;
    }
    let x2 = xr * xr;
    xr * (1.0
        + x2 * (-1.0 / 6.0
            + x2 * (1.0 / 120.0 + x2 * (-1.0 / 5040.0 + x2 * (1.0 / 362_880.0)))))
}

// ----------------------------------- Phase ---------------------------------------

/// Period in seconds of `frequency`, or `None` when the frequency cannot
/// describe a periodic signal (zero, negative, NaN or infinite).
#[inline]
pub fn period_secs(frequency: f32) -> Option<f64> {
    if frequency.is_finite() && frequency > 0.0 {
        Some(1.0 / f64::from(frequency))
    } else {
        None
    }
}

/// Wrap `p` (in cycles) into [0, 1).
#[inline]
pub fn wrap_phase01(p: f64) -> f64 {
    let w = p - m_floor(p);
    // `p - floor(p)` can round up to exactly 1.0 for tiny negative inputs.
    if w >= 1.0 { 0.0 } else { w }
}

/// Normalised position of `time_secs` inside one period: `(t mod T) / T` in [0, 1).
///
/// Negative times wrap Euclidean-style so the result is always in range.
#[inline]
pub fn phase_in_period(time_secs: f64, period: f64) -> f64 {
    let mut r = m_fmod(time_secs, period);
    if r < 0.0 {
        r += period;
    }
    let p = r / period;
    if p >= 1.0 { 0.0 } else { p }
}

// --------------------------------- Tests -----------------------------------------
