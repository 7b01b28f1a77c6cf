#![cfg_attr(not(feature = "std"), no_std)]
//! Oscillo Core — the waveform library behind the Oscillo synthesizer.
//!
//! Features
//! - `std`      : (default) use the Rust standard library
//! - `no-std`   : build with `#![no_std]` and use the `libm` math backend
//! - `fast-math`: polynomial sine on the hot path
//!
//! Modules
//! - [`dsp`]      : math backend, `TAU`, period/phase helpers
//! - [`waveform`] : `WaveformKind`, the five generator functions, `NoiseSource`
//!
//! Design
//! - Every generator is a pure function of `(time, amplitude, frequency)`;
//!   only white noise carries state, and that state is passed in explicitly
//! - No heap allocations, no locks, nothing that can panic on bad parameters

pub mod dsp;
pub mod waveform;

/// Commonly used types/functions for convenience:
pub mod prelude {
    pub use crate::dsp::{period_secs, phase_in_period, wrap_phase01, TAU};
    pub use crate::waveform::{
        sawtooth, sine, square, triangle, white_noise, NoiseSource, ParseWaveformError,
        WaveformKind, PERIODIC_FALLBACK,
    };
}
