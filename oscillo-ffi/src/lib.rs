//! C ABI wrapper for the Oscillo signal engine.
//!
//! Exposes functions to create/destroy an engine, render interleaved f32
//! samples, and change waveform and parameters through a separate control
//! handle.
//!
//! ABI notes
//! - All functions are `extern "C"` and `#[no_mangle]`.
//! - Opaque handle types: `OscilloEngine` and `OscilloControl` (heap-allocated;
//!   you own/free them).
//! - Status codes: `OSCILLO_OK` (0), `OSCILLO_ERR_NULL` (-1),
//!   `OSCILLO_ERR_CONTRACT` (-2), `OSCILLO_ERR_WAVEFORM` (-3).
//!
//! Pointer contract
//! - Every function that takes a handle or buffer pointer is `unsafe`: the
//!   caller guarantees each non-null pointer came from the matching
//!   constructor, has not been freed, and (for buffers) is valid for the
//!   stated length. Null is always checked and reported.
//!
//! Threading
//! - `OscilloEngine` belongs to the audio thread: only the render function
//!   touches it after creation.
//! - `OscilloControl` may be used from any thread, concurrently with rendering.
//!   It stays valid after the engine is destroyed (updates then go nowhere).

use oscillo_engine::{RenderError, SignalEngine, SynthControl, WaveformKind};

pub const OSCILLO_OK: i32 = 0;
pub const OSCILLO_ERR_NULL: i32 = -1;
pub const OSCILLO_ERR_CONTRACT: i32 = -2;
pub const OSCILLO_ERR_WAVEFORM: i32 = -3;

/// Opaque engine wrapper we hand to C.
pub struct OscilloEngine {
    inner: SignalEngine,
}

/// Opaque, thread-safe control handle we hand to C.
pub struct OscilloControl {
    inner: SynthControl,
}

// --- Creation / destruction -------------------------------------------------------

/// Create an engine at `sample_rate` Hz (sine, 440 Hz, amplitude 1).
/// Returns null if the sample rate is not positive and finite.
#[no_mangle]
pub extern "C" fn oscillo_create(sample_rate: f32) -> *mut OscilloEngine {
    match SignalEngine::new(sample_rate) {
        Ok(inner) => Box::into_raw(Box::new(OscilloEngine { inner })),
        Err(e) => {
            log::error!("oscillo_create: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Destroy an engine previously returned by `oscillo_create`.
///
/// # Safety
/// `engine` is null or a live pointer from `oscillo_create`, not used again
/// afterwards and not being rendered on another thread.
#[no_mangle]
pub unsafe extern "C" fn oscillo_destroy(engine: *mut OscilloEngine) {
    if !engine.is_null() {
        drop(unsafe { Box::from_raw(engine) });
    }
}

/// Create a control handle for `engine`. Null if `engine` is null.
/// Call before handing the engine to the audio thread.
///
/// # Safety
/// `engine` is null or a live pointer from `oscillo_create`.
#[no_mangle]
pub unsafe extern "C" fn oscillo_control_new(engine: *const OscilloEngine) -> *mut OscilloControl {
    if engine.is_null() { return std::ptr::null_mut(); }
    let e = unsafe { &*engine };
    Box::into_raw(Box::new(OscilloControl { inner: e.inner.control() }))
}

/// Free a handle returned by `oscillo_control_new`.
///
/// # Safety
/// `control` is null or a live pointer from `oscillo_control_new`, not used
/// again afterwards.
#[no_mangle]
pub unsafe extern "C" fn oscillo_control_free(control: *mut OscilloControl) {
    if !control.is_null() {
        drop(unsafe { Box::from_raw(control) });
    }
}

// --- Rendering -------------------------------------------------------------------

/// Render `frames` frames into an interleaved f32 buffer with `channels` channels.
/// The signal is mono; each sample is duplicated to all channels.
///
/// Returns `OSCILLO_OK`, `OSCILLO_ERR_NULL` when `engine` or `out_interleaved`
/// is null (nothing is written), or `OSCILLO_ERR_CONTRACT` when `frames` or
/// `channels` is zero.
///
/// # Safety
/// `engine` is null or a live pointer from `oscillo_create`, used by one thread
/// at a time. `out_interleaved` is null or valid for writes of
/// `frames * channels` floats.
#[no_mangle]
pub unsafe extern "C" fn oscillo_render_interleaved_f32(
    engine: *mut OscilloEngine,
    out_interleaved: *mut f32,
    frames: u32,
    channels: u32,
) -> i32 {
    if engine.is_null() || out_interleaved.is_null() {
        return OSCILLO_ERR_NULL;
    }
    let e = unsafe { &mut *engine };
    let frames = frames as usize;
    let channels = channels as usize;
    let len = frames.saturating_mul(channels);
    let out = unsafe { std::slice::from_raw_parts_mut(out_interleaved, len) };

    match e.inner.render(out, frames, channels) {
        Ok(()) => OSCILLO_OK,
        Err(RenderError::NoFrames | RenderError::NoChannels) => OSCILLO_ERR_CONTRACT,
        // The slice is built from frames * channels, so it is never short.
        Err(RenderError::BufferTooSmall { .. }) => OSCILLO_ERR_CONTRACT,
    }
}

// --- Control ---------------------------------------------------------------------

/// Select a waveform by index: 0 sine, 1 triangle, 2 sawtooth, 3 square,
/// 4 white noise.
///
/// # Safety
/// `control` is null or a live pointer from `oscillo_control_new`.
#[no_mangle]
pub unsafe extern "C" fn oscillo_control_set_waveform(control: *const OscilloControl, index: u32) -> i32 {
    if control.is_null() { return OSCILLO_ERR_NULL; }
    let c = unsafe { &*control };
    let kind = u8::try_from(index).ok().and_then(|i| WaveformKind::try_from(i).ok());
    match kind {
        Some(kind) => {
            c.inner.set_waveform(kind);
            OSCILLO_OK
        }
        None => OSCILLO_ERR_WAVEFORM,
    }
}

/// Set amplitude and frequency together. Any values are accepted.
///
/// # Safety
/// `control` is null or a live pointer from `oscillo_control_new`.
#[no_mangle]
pub unsafe extern "C" fn oscillo_control_set_parameters(
    control: *const OscilloControl,
    amplitude: f32,
    frequency: f32,
) -> i32 {
    if control.is_null() { return OSCILLO_ERR_NULL; }
    let c = unsafe { &*control };
    c.inner.set_parameters(amplitude, frequency);
    OSCILLO_OK
}

/// Read the last published parameters (for display).
///
/// # Safety
/// `control` is null or a live pointer from `oscillo_control_new`;
/// `amplitude` and `frequency` are null or valid for one `f32` write each.
#[no_mangle]
pub unsafe extern "C" fn oscillo_control_get_parameters(
    control: *const OscilloControl,
    amplitude: *mut f32,
    frequency: *mut f32,
) -> i32 {
    if control.is_null() || amplitude.is_null() || frequency.is_null() {
        return OSCILLO_ERR_NULL;
    }
    let c = unsafe { &*control };
    let p = c.inner.parameters();
    unsafe {
        *amplitude = p.amplitude;
        *frequency = p.frequency;
    }
    OSCILLO_OK
}
