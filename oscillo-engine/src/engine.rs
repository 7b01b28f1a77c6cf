//! The real-time signal engine.
//!
//! `SignalEngine` owns the time cursor, the noise source and the render-side
//! copy of the controls. The device callback owns the engine (`&mut` access
//! for `render`); control surfaces talk to it through [`SynthControl`]
//! handles obtained from [`SignalEngine::control`].
//!
//! Design goals
//! - No allocation, lock, log call or panic inside `render`
//! - One waveform and one parameter pair per render call, never a mix
//! - Phase-continuous across frequency and waveform changes

use oscillo_core::waveform::{NoiseSource, WaveformKind, DEFAULT_NOISE_SEED};

use crate::control::{self, ControlInbox, SynthControl};
use crate::cursor::TimeCursor;
use crate::error::{EngineError, RenderError};
use crate::params::Controls;

pub struct SignalEngine {
    sample_rate: f32,
    cursor: TimeCursor,
    active: Controls,
    noise: NoiseSource,
    inbox: ControlInbox,
    control: SynthControl,
    frames_rendered: u64,
}

impl SignalEngine {
    /// Sine at 440 Hz, amplitude 1, cursor at zero.
    pub fn new(sample_rate: f32) -> Result<Self, EngineError> {
        Self::with_seed(sample_rate, DEFAULT_NOISE_SEED)
    }

    /// Like [`SignalEngine::new`] with an explicit white-noise seed.
    pub fn with_seed(sample_rate: f32, seed: u64) -> Result<Self, EngineError> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(EngineError::InvalidSampleRate(sample_rate));
        }
        let active = Controls::default();
        let (control, inbox) = control::channel(active);
        log::debug!("signal engine at {sample_rate} Hz, starting with {active:?}");
        Ok(Self {
            sample_rate,
            cursor: TimeCursor::new(sample_rate, active.parameters.frequency),
            active,
            noise: NoiseSource::new(seed),
            inbox,
            control,
            frames_rendered: 0,
        })
    }

    /// A new handle for a control surface. Handles are cheap to clone.
    pub fn control(&self) -> SynthControl {
        self.control.clone()
    }

    /// Shorthand for `self.control().set_waveform(kind)`.
    pub fn set_waveform(&self, kind: WaveformKind) {
        self.control.set_waveform(kind);
    }

    /// Shorthand for `self.control().set_parameters(amplitude, frequency)`.
    pub fn set_parameters(&self, amplitude: f32, frequency: f32) {
        self.control.set_parameters(amplitude, frequency);
    }

    #[inline] pub fn sample_rate(&self) -> f32 { self.sample_rate }

    /// Controls used by the most recent render call.
    #[inline] pub fn active(&self) -> Controls { self.active }

    #[inline] pub fn frames_rendered(&self) -> u64 { self.frames_rendered }

    /// Seconds of audio rendered since construction.
    #[inline]
    pub fn elapsed_secs(&self) -> f64 {
        self.frames_rendered as f64 / f64::from(self.sample_rate)
    }

    /// Fill `frames` interleaved frames of `channels` samples each.
    ///
    /// The mono signal is written to every channel of a frame. Samples past
    /// `frames * channels` are left untouched. On a contract violation the
    /// whole buffer is silenced, the cursor does not move, and the error is
    /// returned to the caller.
    pub fn render(
        &mut self,
        output: &mut [f32],
        frames: usize,
        channels: usize,
    ) -> Result<(), RenderError> {
        if let Err(e) = check_interleaved(output.len(), frames, channels) {
            output.fill(0.0);
            return Err(e);
        }
        let (kind, amplitude, frequency) = self.begin_block();
        for frame in output[..frames * channels].chunks_exact_mut(channels) {
            let s = self.tick(kind, amplitude, frequency);
            frame.fill(s);
        }
        self.frames_rendered += frames as u64;
        Ok(())
    }

    /// Fill `frames` samples of each per-channel buffer in `outputs`.
    ///
    /// Same semantics as [`SignalEngine::render`] for non-interleaved hosts.
    pub fn render_planar(
        &mut self,
        outputs: &mut [&mut [f32]],
        frames: usize,
    ) -> Result<(), RenderError> {
        if let Err(e) = check_planar(outputs, frames) {
            for buf in outputs.iter_mut() {
                buf.fill(0.0);
            }
            return Err(e);
        }
        let (kind, amplitude, frequency) = self.begin_block();
        for i in 0..frames {
            let s = self.tick(kind, amplitude, frequency);
            for buf in outputs.iter_mut() {
                buf[i] = s;
            }
        }
        self.frames_rendered += frames as u64;
        Ok(())
    }

    /// Pick up pending control changes and snapshot them for this call.
    #[inline]
    fn begin_block(&mut self) -> (WaveformKind, f32, f32) {
        let previous = self.active.parameters.frequency;
        if self.inbox.drain_into(&mut self.active)
            && self.active.parameters.frequency.to_bits() != previous.to_bits()
        {
            self.cursor.retune(self.active.parameters.frequency);
        }
        let Controls { waveform, parameters } = self.active;
        (waveform, parameters.amplitude, parameters.frequency)
    }

    #[inline]
    fn tick(&mut self, kind: WaveformKind, amplitude: f32, frequency: f32) -> f32 {
        let s = kind.evaluate(self.cursor.seconds(), amplitude, frequency, &mut self.noise);
        self.cursor.advance();
        s
    }
}

impl core::fmt::Debug for SignalEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SignalEngine")
            .field("sample_rate", &self.sample_rate)
            .field("active", &self.active)
            .field("frames_rendered", &self.frames_rendered)
            .finish()
    }
}

#[inline]
fn check_interleaved(len: usize, frames: usize, channels: usize) -> Result<(), RenderError> {
    if frames == 0 {
        return Err(RenderError::NoFrames);
    }
    if channels == 0 {
        return Err(RenderError::NoChannels);
    }
    let needed = frames.saturating_mul(channels);
    if len < needed {
        return Err(RenderError::BufferTooSmall { needed, got: len });
    }
    Ok(())
}

#[inline]
fn check_planar(outputs: &[&mut [f32]], frames: usize) -> Result<(), RenderError> {
    if frames == 0 {
        return Err(RenderError::NoFrames);
    }
    if outputs.is_empty() {
        return Err(RenderError::NoChannels);
    }
    match outputs.iter().map(|b| b.len()).min() {
        Some(got) if got < frames => Err(RenderError::BufferTooSmall { needed: frames, got }),
        _ => Ok(()),
    }
}
