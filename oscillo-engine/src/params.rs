//! Performance parameters and the control snapshot exchanged between threads.

use core::fmt;

use oscillo_core::waveform::WaveformKind;

/// Lowest frequency reachable from the XY pad (left edge), in Hz.
pub const XY_FREQ_MIN: f32 = 32.0;
/// Frequency range covered by the XY pad's horizontal axis, in Hz.
pub const XY_FREQ_SPAN: f32 = 1014.0;

/// Amplitude and frequency, always published and read as a pair.
///
/// Amplitude is the peak output magnitude. Neither field is clamped here;
/// degenerate values are handled by the waveform functions.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SynthParameters {
    pub amplitude: f32,
    pub frequency: f32,
}

impl SynthParameters {
    /// Readout shown while nothing is playing.
    pub const IDLE_LABEL: &'static str = "Frequency 0 Hz  Amplitude 0%";

    #[inline]
    pub const fn new(amplitude: f32, frequency: f32) -> Self {
        Self { amplitude, frequency }
    }

    /// Map a normalised pad position to parameters.
    ///
    /// `x` runs left to right, `y` top to bottom, both in [0, 1] (clamped).
    /// Frequency spans `32..=1046` Hz across the pad; amplitude is 1 at the top
    /// edge and 0 at the bottom.
    pub fn from_xy(x: f32, y: f32) -> Self {
        let x = if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) };
        let y = if y.is_nan() { 1.0 } else { y.clamp(0.0, 1.0) };
        Self {
            amplitude: 1.0 - y,
            frequency: x * XY_FREQ_SPAN + XY_FREQ_MIN,
        }
    }
}

impl Default for SynthParameters {
    fn default() -> Self {
        Self::new(1.0, 440.0)
    }
}

impl fmt::Display for SynthParameters {
    /// `Frequency 440 Hz  Amplitude: 100%`, truncating to whole units.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hz = self.frequency as i64;
        let pct = (self.amplitude * 100.0) as i64;
        write!(f, "Frequency {hz} Hz  Amplitude: {pct}%")
    }
}

/// Everything the render path needs from the control surface, as one value.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Controls {
    pub waveform: WaveformKind,
    pub parameters: SynthParameters,
}
