//! Wrapped time cursor for the render path.
//!
//! The cursor keeps elapsed time *modulo one period* of the active frequency,
//! stored as a phase in cycles (`f64`, in [0, 1)). That value never grows, so
//! accuracy does not decay however long the stream runs. Retuning keeps the
//! phase in cycles, so a frequency change continues the waveform from the
//! same point in its cycle instead of jumping.

use oscillo_core::dsp::{period_secs, wrap_phase01};

#[derive(Copy, Clone, Debug)]
pub struct TimeCursor {
    /// Position inside the current period, in cycles.
    phase: f64,
    /// Seconds per sample.
    dt: f64,
    /// `None` while the frequency has no period; the phase is then held.
    period: Option<f64>,
    /// Cycles advanced per sample.
    step: f64,
}

impl TimeCursor {
    pub fn new(sample_rate: f32, frequency: f32) -> Self {
        let mut c = Self {
            phase: 0.0,
            dt: 1.0 / f64::from(sample_rate),
            period: None,
            step: 0.0,
        };
        c.retune(frequency);
        c
    }

    /// Switch to `frequency`, preserving the phase.
    #[inline]
    pub fn retune(&mut self, frequency: f32) {
        self.period = period_secs(frequency);
        self.step = match self.period {
            Some(period) => self.dt / period,
            None => 0.0,
        };
    }

    /// Time handed to the waveform functions: the phase expressed in seconds.
    #[inline]
    pub fn seconds(&self) -> f64 {
        match self.period {
            Some(period) => self.phase * period,
            None => 0.0,
        }
    }

    #[inline]
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Move forward by one sample.
    #[inline]
    pub fn advance(&mut self) {
        self.phase += self.step;
        if self.phase >= 1.0 {
            self.phase = wrap_phase01(self.phase);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let c = TimeCursor::new(48_000.0, 440.0);
        assert_eq!(c.seconds(), 0.0);
        assert_eq!(c.phase(), 0.0);
    }

    #[test]
    fn advances_by_one_sample_period() {
        let mut c = TimeCursor::new(48_000.0, 1.0);
        c.advance();
        assert!((c.seconds() - 1.0 / 48_000.0).abs() < 1e-15);
    }

    #[test]
    fn wraps_every_period() {
        // 100 Hz at 48 kHz: exactly 480 samples per cycle.
        let mut c = TimeCursor::new(48_000.0, 100.0);
        for _ in 0..480 * 3 + 120 {
            c.advance();
        }
        assert!((c.phase() - 0.25).abs() < 1e-9, "phase={}", c.phase());
        assert!(c.seconds() < 0.01);
    }

    #[test]
    fn stays_bounded_over_a_long_run() {
        let mut c = TimeCursor::new(44_100.0, 443.3);
        for _ in 0..10_000_000 {
            c.advance();
        }
        assert!((0.0..1.0).contains(&c.phase()));
    }

    #[test]
    fn retune_keeps_phase() {
        let mut c = TimeCursor::new(48_000.0, 100.0);
        for _ in 0..120 {
            c.advance();
        }
        let before = c.phase();
        c.retune(250.0);
        assert_eq!(c.phase(), before);
        assert!((c.seconds() - before / 250.0).abs() < 1e-15);
    }

    #[test]
    fn degenerate_frequency_holds_phase() {
        let mut c = TimeCursor::new(48_000.0, 100.0);
        for _ in 0..10 {
            c.advance();
        }
        let held = c.phase();
        c.retune(0.0);
        for _ in 0..1000 {
            c.advance();
        }
        assert_eq!(c.phase(), held);
        assert_eq!(c.seconds(), 0.0);
        c.retune(-5.0);
        c.retune(100.0);
        assert_eq!(c.phase(), held);
    }
}
