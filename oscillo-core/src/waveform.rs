//! The waveform family: pure `(time, amplitude, frequency) -> sample` functions.
//!
//! Every periodic function computes its position inside one period as
//! `p = (t mod T) / T` with `T = 1 / frequency`, then shapes `p`:
//!
//! | kind       | shape (before scaling by amplitude)          |
//! |------------|----------------------------------------------|
//! | `Sine`     | `sin(2π p)`                                  |
//! | `Triangle` | `4p` / `2 - 4p` / `4p - 4` at 0.25 and 0.75  |
//! | `Sawtooth` | `2p - 1`                                     |
//! | `Square`   | `+1` for `p < 0.5`, `-1` otherwise           |
//!
//! Edge policy
//! - A frequency that is zero, negative, NaN or infinite has no period. The
//!   periodic functions then return [`PERIODIC_FALLBACK`] (silence) instead of
//!   dividing by zero.
//! - Amplitude is never clamped. Square's low half is exactly `-amplitude`, so
//!   a negative amplitude flips the whole cycle and keeps the 50% duty cycle.
//! - `WhiteNoise` ignores time and frequency and draws from a [`NoiseSource`].

use core::fmt;
use core::str::FromStr;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::dsp::{fast_sin, period_secs, phase_in_period, TAU};

/// Sample returned by periodic waveforms when the frequency has no period.
pub const PERIODIC_FALLBACK: f32 = 0.0;

/// Seed used by [`NoiseSource::default`].
pub const DEFAULT_NOISE_SEED: u64 = 0x5EED_CAFE_F00D_D00D;

/// Selects which generator function is active.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum WaveformKind {
    #[default]
    Sine,
    Triangle,
    Sawtooth,
    Square,
    WhiteNoise,
}

impl WaveformKind {
    /// All kinds in selector order (index 0..=4).
    pub const ALL: [WaveformKind; 5] = [
        WaveformKind::Sine,
        WaveformKind::Triangle,
        WaveformKind::Sawtooth,
        WaveformKind::Square,
        WaveformKind::WhiteNoise,
    ];

    /// Position of this kind in [`WaveformKind::ALL`].
    #[inline]
    pub fn index(self) -> u8 {
        match self {
            WaveformKind::Sine => 0,
            WaveformKind::Triangle => 1,
            WaveformKind::Sawtooth => 2,
            WaveformKind::Square => 3,
            WaveformKind::WhiteNoise => 4,
        }
    }

    /// Short lowercase name, also accepted by `FromStr`.
    pub fn name(self) -> &'static str {
        match self {
            WaveformKind::Sine => "sine",
            WaveformKind::Triangle => "triangle",
            WaveformKind::Sawtooth => "sawtooth",
            WaveformKind::Square => "square",
            WaveformKind::WhiteNoise => "noise",
        }
    }

    /// `true` for every kind whose output depends on time and frequency.
    #[inline]
    pub fn is_periodic(self) -> bool {
        !matches!(self, WaveformKind::WhiteNoise)
    }

    /// Evaluate this waveform at `time_secs`.
    ///
    /// `noise` is only touched by `WhiteNoise`.
    #[inline]
    pub fn evaluate(
        self,
        time_secs: f64,
        amplitude: f32,
        frequency: f32,
        noise: &mut NoiseSource,
    ) -> f32 {
        match self {
            WaveformKind::Sine => sine(time_secs, amplitude, frequency),
            WaveformKind::Triangle => triangle(time_secs, amplitude, frequency),
            WaveformKind::Sawtooth => sawtooth(time_secs, amplitude, frequency),
            WaveformKind::Square => square(time_secs, amplitude, frequency),
            WaveformKind::WhiteNoise => white_noise(noise, amplitude),
        }
    }
}

impl fmt::Display for WaveformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rejected waveform name or selector index.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseWaveformError {
    #[error("unknown waveform index {0} (expected 0..=4)")]
    Index(u8),
    #[error("unknown waveform name")]
    Name,
}

impl TryFrom<u8> for WaveformKind {
    type Error = ParseWaveformError;

    fn try_from(i: u8) -> Result<Self, Self::Error> {
        WaveformKind::ALL
            .get(usize::from(i))
            .copied()
            .ok_or(ParseWaveformError::Index(i))
    }
}

impl FromStr for WaveformKind {
    type Err = ParseWaveformError;

    /// Accepts the canonical names, a few aliases, and the selector index.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(i) = s.parse::<u8>() {
            return WaveformKind::try_from(i);
        }
        let kind = if s.eq_ignore_ascii_case("sine") || s.eq_ignore_ascii_case("sin") {
            WaveformKind::Sine
        } else if s.eq_ignore_ascii_case("triangle") || s.eq_ignore_ascii_case("tri") {
            WaveformKind::Triangle
        } else if s.eq_ignore_ascii_case("sawtooth") || s.eq_ignore_ascii_case("saw") {
            WaveformKind::Sawtooth
        } else if s.eq_ignore_ascii_case("square") || s.eq_ignore_ascii_case("sqr") {
            WaveformKind::Square
        } else if s.eq_ignore_ascii_case("noise")
            || s.eq_ignore_ascii_case("white-noise")
            || s.eq_ignore_ascii_case("whitenoise")
        {
            WaveformKind::WhiteNoise
        } else {
            return Err(ParseWaveformError::Name);
        };
        Ok(kind)
    }
}

// ----------------------------- Periodic waveforms --------------------------------

#[inline]
fn phase(time_secs: f64, frequency: f32) -> Option<f64> {
    period_secs(frequency).map(|period| phase_in_period(time_secs, period))
}

/// `amplitude * sin(2π f t)`
#[inline]
pub fn sine(time_secs: f64, amplitude: f32, frequency: f32) -> f32 {
    match phase(time_secs, frequency) {
        Some(p) => amplitude * fast_sin(TAU * p as f32),
        None => PERIODIC_FALLBACK,
    }
}

/// Triangle rising from 0 to +amplitude at T/4, down to -amplitude at 3T/4.
#[inline]
pub fn triangle(time_secs: f64, amplitude: f32, frequency: f32) -> f32 {
    let Some(p) = phase(time_secs, frequency) else {
        return PERIODIC_FALLBACK;
    };
    let shape = if p < 0.25 {
        4.0 * p
    } else if p < 0.75 {
        2.0 - 4.0 * p
    } else {
        4.0 * p - 4.0
    };
    amplitude * shape as f32
}

/// Rising ramp from -amplitude to +amplitude over one period.
#[inline]
pub fn sawtooth(time_secs: f64, amplitude: f32, frequency: f32) -> f32 {
    match phase(time_secs, frequency) {
        Some(p) => amplitude * (2.0 * p - 1.0) as f32,
        None => PERIODIC_FALLBACK,
    }
}

/// +amplitude for the first half period, -amplitude for the second.
#[inline]
pub fn square(time_secs: f64, amplitude: f32, frequency: f32) -> f32 {
    match phase(time_secs, frequency) {
        Some(p) if p < 0.5 => amplitude,
        Some(_) => -amplitude,
        None => PERIODIC_FALLBACK,
    }
}

// ---------------------------------- Noise ----------------------------------------

/// Real-time safe uniform noise: a seeded `SmallRng`, no locks, no syscalls.
#[derive(Clone, Debug)]
pub struct NoiseSource {
    rng: SmallRng,
}

impl NoiseSource {
    pub fn new(seed: u64) -> Self {
        Self { rng: SmallRng::seed_from_u64(seed) }
    }

    /// Uniform value in [-1, 1].
    #[inline]
    pub fn next_bipolar(&mut self) -> f32 {
        self.rng.gen_range(-1.0f32..=1.0)
    }
}

impl Default for NoiseSource {
    fn default() -> Self {
        Self::new(DEFAULT_NOISE_SEED)
    }
}

/// `amplitude * u` with `u` uniform in [-1, 1]. Zero amplitude is exactly 0.
#[inline]
pub fn white_noise(noise: &mut NoiseSource, amplitude: f32) -> f32 {
    if amplitude == 0.0 {
        return 0.0;
    }
    amplitude * noise.next_bipolar()
}

// ---------------------------------- Tests ----------------------------------------
