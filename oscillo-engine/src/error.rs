//! Error types for the signal engine.

use thiserror::Error;

/// Contract violations detected by `render`. The engine stays usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("render called with zero frames")]
    NoFrames,
    #[error("render called with zero channels")]
    NoChannels,
    #[error("output buffer holds {got} samples, {needed} required")]
    BufferTooSmall { needed: usize, got: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid sample rate {0} (must be positive and finite)")]
    InvalidSampleRate(f32),
}
