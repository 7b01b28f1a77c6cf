//! Audio session: owns the cpal stream that drives the signal engine.
//!
//! The session is the output-device side of the system. It negotiates the
//! device and stream format, moves a `SignalEngine` into the device callback,
//! and applies the session volume after rendering. State the callback shares
//! with the rest of the program (volume, peak meter, fault count) lives in
//! atomics so the callback never locks.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Context};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use oscillo_engine::{SignalEngine, SynthControl};

use crate::args::Args;

/// Smallest scratch buffer, and the size used when the device does not
/// report its buffer range.
const SCRATCH_FRAMES: usize = 1024;

/// Largest scratch buffer allocated up front.
const MAX_SCRATCH_FRAMES: usize = 16_384;

/// `f32` stored as bits in an `AtomicU32`.
#[derive(Debug)]
struct AtomicF32(AtomicU32);

impl AtomicF32 {
    fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Values the device callback publishes to, or reads from, other threads.
#[derive(Debug)]
pub struct SessionState {
    volume: AtomicF32,
    /// Bits of the largest |sample| since the last `take_peak`. Non-negative
    /// floats order the same as their bit patterns, so `fetch_max` works.
    peak_bits: AtomicU32,
    faults: AtomicU64,
}

impl SessionState {
    pub fn new(volume: f32) -> Self {
        Self {
            volume: AtomicF32::new(sanitize_volume(volume)),
            peak_bits: AtomicU32::new(0),
            faults: AtomicU64::new(0),
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume.load()
    }

    pub fn set_volume(&self, volume: f32) {
        self.volume.store(sanitize_volume(volume));
    }

    pub fn record_peak(&self, peak: f32) {
        self.peak_bits.fetch_max(peak.abs().to_bits(), Ordering::Relaxed);
    }

    /// Peak level since the previous call.
    pub fn take_peak(&self) -> f32 {
        f32::from_bits(self.peak_bits.swap(0, Ordering::Relaxed))
    }

    pub fn record_fault(&self) {
        self.faults.fetch_add(1, Ordering::Relaxed);
    }

    pub fn faults(&self) -> u64 {
        self.faults.load(Ordering::Relaxed)
    }
}

/// Non-finite volumes mute; negative volumes clamp to zero.
fn sanitize_volume(v: f32) -> f32 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

/// Apply `volume` to rendered samples and convert to the device format.
///
/// Returns the peak |sample| after volume and clipping.
fn write_scaled<T>(dst: &mut [T], src: &[f32], volume: f32) -> f32
where
    T: cpal::Sample + cpal::FromSample<f32>,
{
    let mut peak = 0.0f32;
    for (d, &s) in dst.iter_mut().zip(src) {
        let v = (s * volume).clamp(-1.0, 1.0);
        peak = peak.max(v.abs());
        *d = T::from_sample(v);
    }
    peak
}

pub struct AudioSession {
    // Dropping the stream stops playback.
    _stream: cpal::Stream,
    state: Arc<SessionState>,
    control: SynthControl,
    device_name: String,
    config: cpal::StreamConfig,
}

impl AudioSession {
    /// Pick a device and format from `args`, start the engine and begin playing.
    pub fn open(args: &Args) -> anyhow::Result<Self> {
        let device = pick_device(args)?;
        let device_name = device.name().unwrap_or_else(|_| "(no name)".into());
        let sup_cfg = choose_config(&device, args.sample_rate, args.channels)?;
        let sample_format = sup_cfg.sample_format();
        let supported_buffer = sup_cfg.buffer_size().clone();
        let mut config = sup_cfg.config();
        if let Some(ch) = args.channels {
            config.channels = ch;
        }

        let sample_rate = config.sample_rate.0 as f32;
        let engine = match args.seed {
            Some(seed) => SignalEngine::with_seed(sample_rate, seed),
            None => SignalEngine::new(sample_rate),
        }
        .context("creating signal engine")?;
        let control = engine.control();
        control.set_waveform(args.waveform);
        control.set_parameters(args.amplitude, args.frequency);

        let state = Arc::new(SessionState::new(args.volume));
        log::info!("device: {device_name}");
        log::info!("stream config: {config:?} (sample_format: {sample_format:?})");

        let scratch = scratch_frames(&config.buffer_size, &supported_buffer);
        log::debug!("scratch buffer: {scratch} frames");

        let err_fn = |e: cpal::StreamError| log::error!("stream error: {e}");
        let cb_state = Arc::clone(&state);
        let stream = match sample_format {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, scratch, engine, cb_state, err_fn)?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, scratch, engine, cb_state, err_fn)?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, scratch, engine, cb_state, err_fn)?,
            other => return Err(anyhow!("unsupported device sample format: {other:?}")),
        };
        stream.play().context("starting output stream")?;

        Ok(Self { _stream: stream, state, control, device_name, config })
    }

    pub fn control(&self) -> &SynthControl {
        &self.control
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Output volume applied after the engine; 0 mutes.
    pub fn volume(&self) -> f32 {
        self.state.volume()
    }

    pub fn set_volume(&self, volume: f32) {
        self.state.set_volume(volume);
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn config(&self) -> &cpal::StreamConfig {
        &self.config
    }
}

pub fn list_output_devices() -> anyhow::Result<()> {
    let host = cpal::default_host();
    println!("Available output devices ({}):", host.id().name());
    for dev in host.output_devices()? {
        println!("- {}", dev.name()?);
    }
    Ok(())
}

fn pick_device(args: &Args) -> anyhow::Result<cpal::Device> {
    let host = cpal::default_host();
    log::info!("cpal host: {}", host.id().name());
    if let Some(name) = &args.device_name {
        for d in host.output_devices()? {
            if d.name().map_or(false, |n| n == *name) {
                return Ok(d);
            }
        }
        return Err(anyhow!("requested device not found: {name}"));
    }
    host.default_output_device()
        .ok_or_else(|| anyhow!("no default output device"))
}

fn choose_config(
    device: &cpal::Device,
    req_sr: Option<u32>,
    req_ch: Option<u16>,
) -> anyhow::Result<cpal::SupportedStreamConfig> {
    if req_sr.is_none() && req_ch.is_none() {
        return Ok(device.default_output_config()?);
    }

    // Closest range: sample-rate distance dominates, channel distance breaks ties.
    let mut best: Option<(u64, cpal::SupportedStreamConfigRange)> = None;
    for range in device.supported_output_configs()? {
        let ch = range.channels();
        let sr_min = range.min_sample_rate().0;
        let sr_max = range.max_sample_rate().0;

        let ch_pen = req_ch.map_or(0, |c| u64::from(ch.abs_diff(c)));
        let sr_pen = match req_sr {
            Some(sr) if (sr_min..=sr_max).contains(&sr) => 0,
            Some(sr) => u64::from(sr_min.abs_diff(sr).min(sr_max.abs_diff(sr))),
            None => 0,
        };

        let score = sr_pen.saturating_mul(1000) + ch_pen;
        if best.as_ref().map_or(true, |(s, _)| score < *s) {
            best = Some((score, range));
        }
    }

    let (_, range) = best.ok_or_else(|| anyhow!("no supported output configs"))?;
    let pick_sr = match req_sr {
        Some(sr) => cpal::SampleRate(sr.clamp(range.min_sample_rate().0, range.max_sample_rate().0)),
        None => range.max_sample_rate(),
    };
    Ok(range.with_sample_rate(pick_sr))
}

/// Frames of scratch to cover one device pull, so a pull is one `render`
/// call and sees one control snapshot.
///
/// Devices with no reported range, or a range above `MAX_SCRATCH_FRAMES`, can
/// still deliver a longer pull; it is then split over several `render`
/// calls and a control change may land between them.
fn scratch_frames(requested: &cpal::BufferSize, supported: &cpal::SupportedBufferSize) -> usize {
    let frames = match (requested, supported) {
        (cpal::BufferSize::Fixed(n), _) => *n as usize,
        (cpal::BufferSize::Default, cpal::SupportedBufferSize::Range { max, .. }) => *max as usize,
        (cpal::BufferSize::Default, cpal::SupportedBufferSize::Unknown) => SCRATCH_FRAMES,
    };
    frames.clamp(SCRATCH_FRAMES, MAX_SCRATCH_FRAMES)
}

fn build_stream<T>(
    device: &cpal::Device,
    cfg: &cpal::StreamConfig,
    scratch_frames: usize,
    mut engine: SignalEngine,
    state: Arc<SessionState>,
    err_fn: impl Fn(cpal::StreamError) + Send + 'static,
) -> anyhow::Result<cpal::Stream>
where
    T: cpal::Sample + cpal::FromSample<f32> + cpal::SizedSample + Send + 'static,
{
    let channels = usize::from(cfg.channels).max(1);
    // Allocated once here; the callback only slices it.
    let mut scratch = vec![0.0f32; scratch_frames * channels];

    let stream = device.build_output_stream(
        cfg,
        move |output: &mut [T], _| {
            let volume = state.volume();
            let mut peak = 0.0f32;
            for chunk in output.chunks_mut(scratch.len()) {
                let frames = chunk.len() / channels;
                let buf = &mut scratch[..chunk.len()];
                if engine.render(buf, frames, channels).is_err() {
                    state.record_fault();
                }
                // A trailing partial frame is not rendered; keep it silent.
                buf[frames * channels..].fill(0.0);
                peak = peak.max(write_scaled(chunk, buf, volume));
            }
            state.record_peak(peak);
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}
