//! Oscillo Engine — the real-time render loop and its control exchange.
//!
//! Crate layout:
//! - [`engine`]  : `SignalEngine`, the render-thread object
//! - [`control`] : `SynthControl`, the thread-safe handle for control surfaces
//! - [`cursor`]  : `TimeCursor`, elapsed time wrapped to one period
//! - [`params`]  : `SynthParameters`, `Controls`, XY pad mapping, readout
//! - [`error`]   : `RenderError`, `EngineError`
//!
//! Wiring: construct a `SignalEngine`, hand `engine.control()` clones to the
//! control surface, then move the engine into the device callback and call
//! `render` there.

pub mod control;
pub mod cursor;
pub mod engine;
pub mod error;
pub mod params;

// Re-export some commonly used items to make downstream imports ergonomic.
pub use control::SynthControl;
pub use engine::SignalEngine;
pub use error::{EngineError, RenderError};
pub use oscillo_core::waveform::{ParseWaveformError, WaveformKind};
pub use params::{Controls, SynthParameters};
