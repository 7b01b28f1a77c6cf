//! Control exchange between the control surface and the render thread.
//!
//! Writers (any number of threads) hold a short `parking_lot` lock around the
//! latest [`Controls`], update it, and push the *whole* snapshot onto a bounded
//! lock-free queue while still holding the lock. The render thread drains the
//! queue at the start of every render call and keeps the last snapshot.
//!
//! - No torn reads: a snapshot is a single value.
//! - One global order: pushes happen under the writer lock, pops are FIFO.
//! - Overflow displaces the oldest snapshot, which every newer one supersedes.
//! - The render thread never takes the lock.

use std::sync::Arc;

use crossbeam::queue::ArrayQueue;
use parking_lot::Mutex;

use oscillo_core::waveform::WaveformKind;

use crate::params::{Controls, SynthParameters};

/// Snapshots that can be in flight between two render calls.
pub const CONTROL_QUEUE_CAPACITY: usize = 64;

#[derive(Debug)]
struct Shared {
    latest: Mutex<Controls>,
    pending: ArrayQueue<Controls>,
}

/// Cloneable, thread-safe handle used by the control surface.
#[derive(Clone, Debug)]
pub struct SynthControl {
    shared: Arc<Shared>,
}

impl SynthControl {
    /// Replace the active waveform from the next render call on.
    pub fn set_waveform(&self, waveform: WaveformKind) {
        self.publish(|c| c.waveform = waveform);
    }

    /// Replace amplitude and frequency together.
    pub fn set_parameters(&self, amplitude: f32, frequency: f32) {
        self.publish(|c| c.parameters = SynthParameters::new(amplitude, frequency));
    }

    pub fn set_amplitude(&self, amplitude: f32) {
        self.publish(|c| c.parameters.amplitude = amplitude);
    }

    pub fn set_frequency(&self, frequency: f32) {
        self.publish(|c| c.parameters.frequency = frequency);
    }

    /// Publish the parameters under a normalised pad position, see
    /// [`SynthParameters::from_xy`]. Returns what was published.
    pub fn set_from_xy(&self, x: f32, y: f32) -> SynthParameters {
        let p = SynthParameters::from_xy(x, y);
        self.publish(|c| c.parameters = p);
        p
    }

    /// Last published parameters. Advisory: the render thread may still be
    /// using the previous pair for the call in progress.
    pub fn parameters(&self) -> SynthParameters {
        self.shared.latest.lock().parameters
    }

    /// Last published waveform.
    pub fn waveform(&self) -> WaveformKind {
        self.shared.latest.lock().waveform
    }

    /// Last published snapshot.
    pub fn snapshot(&self) -> Controls {
        *self.shared.latest.lock()
    }

    fn publish(&self, update: impl FnOnce(&mut Controls)) {
        let mut latest = self.shared.latest.lock();
        update(&mut latest);
        let snapshot = *latest;
        // A displaced entry is older than `snapshot` and fully contained in it.
        let _ = self.shared.pending.force_push(snapshot);
        drop(latest);
        log::trace!("published {:?}", snapshot);
    }
}

/// Render-side end of the exchange. Owned by the engine, never shared.
#[derive(Debug)]
pub(crate) struct ControlInbox {
    shared: Arc<Shared>,
}

impl ControlInbox {
    /// Apply pending snapshots in order to `active`, at most one queue's worth
    /// per call so writers that never stop cannot hold up a render block.
    ///
    /// Returns `true` if anything arrived. Lock-free and allocation-free.
    #[inline]
    pub(crate) fn drain_into(&self, active: &mut Controls) -> bool {
        self.drain_at_most(active, CONTROL_QUEUE_CAPACITY)
    }

    #[inline]
    fn drain_at_most(&self, active: &mut Controls, limit: usize) -> bool {
        let mut changed = false;
        for _ in 0..limit {
            let Some(next) = self.shared.pending.pop() else { break };
            *active = next;
            changed = true;
        }
        changed
    }
}

/// Create a connected control handle and inbox, starting from `initial`.
pub(crate) fn channel(initial: Controls) -> (SynthControl, ControlInbox) {
    let shared = Arc::new(Shared {
        latest: Mutex::new(initial),
        pending: ArrayQueue::new(CONTROL_QUEUE_CAPACITY),
    });
    (
        SynthControl { shared: Arc::clone(&shared) },
        ControlInbox { shared },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_pending_after_construction() {
        let (_ctl, inbox) = channel(Controls::default());
        let mut active = Controls::default();
        assert!(!inbox.drain_into(&mut active));
        assert_eq!(active, Controls::default());
    }

    #[test]
    fn drain_applies_changes_in_order() {
        let (ctl, inbox) = channel(Controls::default());
        ctl.set_waveform(WaveformKind::Square);
        ctl.set_parameters(0.25, 110.0);
        ctl.set_frequency(220.0);

        let mut active = Controls::default();
        assert!(inbox.drain_into(&mut active));
        assert_eq!(active.waveform, WaveformKind::Square);
        assert_eq!(active.parameters, SynthParameters::new(0.25, 220.0));
        assert!(!inbox.drain_into(&mut active));
    }

    #[test]
    fn overflow_keeps_the_latest_snapshot() {
        let (ctl, inbox) = channel(Controls::default());
        ctl.set_waveform(WaveformKind::Triangle);
        for i in 0..(CONTROL_QUEUE_CAPACITY * 3) {
            ctl.set_amplitude(i as f32);
        }
        let mut active = Controls::default();
        inbox.drain_into(&mut active);
        assert_eq!(active.waveform, WaveformKind::Triangle);
        assert_eq!(active.parameters.amplitude, (CONTROL_QUEUE_CAPACITY * 3 - 1) as f32);
    }

    #[test]
    fn drain_stops_after_its_limit() {
        let (ctl, inbox) = channel(Controls::default());
        for i in 1..=10 {
            ctl.set_amplitude(i as f32);
        }
        let mut active = Controls::default();
        assert!(inbox.drain_at_most(&mut active, 4));
        assert_eq!(active.parameters.amplitude, 4.0);
        // The rest waits for the next block, still in order.
        assert!(inbox.drain_into(&mut active));
        assert_eq!(active.parameters.amplitude, 10.0);
        assert!(!inbox.drain_into(&mut active));
    }

    #[test]
    fn one_drain_empties_a_full_queue() {
        let (ctl, inbox) = channel(Controls::default());
        for i in 0..CONTROL_QUEUE_CAPACITY {
            ctl.set_frequency(i as f32);
        }
        let mut active = Controls::default();
        assert!(inbox.drain_into(&mut active));
        assert_eq!(active.parameters.frequency, (CONTROL_QUEUE_CAPACITY - 1) as f32);
        assert!(!inbox.drain_into(&mut active));
    }

    #[test]
    fn readback_reflects_last_publish() {
        let (ctl, _inbox) = channel(Controls::default());
        let p = ctl.set_from_xy(0.0, 0.25);
        assert_eq!(p, SynthParameters::new(0.75, 32.0));
        assert_eq!(ctl.parameters(), p);
        ctl.set_waveform(WaveformKind::WhiteNoise);
        assert_eq!(ctl.snapshot(), Controls { waveform: WaveformKind::WhiteNoise, parameters: p });
        assert_eq!(ctl.clone().waveform(), WaveformKind::WhiteNoise);
    }
}
