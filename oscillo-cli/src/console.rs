//! Line-oriented control surface: one command per stdin line.
//!
//! Stands in for the drag/tap pad of a touch UI. `xy` behaves like a touch on
//! the pad (sets parameters and opens the volume gate), `release` like lifting
//! the finger (closes the gate).

use std::str::FromStr;

use oscillo_engine::{ParseWaveformError, SynthParameters, WaveformKind};
use thiserror::Error;

use crate::session::AudioSession;

/// Session volume while the pad is touched.
pub const TOUCH_VOLUME: f32 = 0.5;

pub const HELP: &str = "\
commands:
  wave <sine|triangle|sawtooth|square|noise|0-4>
  freq <hz>            amp <amplitude>       params <amplitude> <hz>
  xy <x> <y>           touch the pad at x, y in [0, 1] (y from the top)
  release              lift off the pad (mutes)
  vol <volume>         session volume, 0 mutes
  status | help | quit";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConsoleCommand {
    Wave(WaveformKind),
    Freq(f32),
    Amp(f32),
    Params { amplitude: f32, frequency: f32 },
    Xy { x: f32, y: f32 },
    Release,
    Volume(f32),
    Status,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConsoleError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),
    #[error("`{0}` is missing an argument")]
    MissingArg(&'static str),
    #[error("`{0}` takes fewer arguments")]
    TrailingArgs(&'static str),
    #[error("not a number: `{0}`")]
    BadNumber(String),
    #[error(transparent)]
    Waveform(#[from] ParseWaveformError),
}

fn number<'a>(
    cmd: &'static str,
    words: &mut impl Iterator<Item = &'a str>,
) -> Result<f32, ConsoleError> {
    let w = words.next().ok_or(ConsoleError::MissingArg(cmd))?;
    w.parse::<f32>().map_err(|_| ConsoleError::BadNumber(w.to_string()))
}

impl FromStr for ConsoleCommand {
    type Err = ConsoleError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let head = words.next().ok_or(ConsoleError::Empty)?;
        let cmd = match head.to_ascii_lowercase().as_str() {
            "wave" | "w" => {
                let w = words.next().ok_or(ConsoleError::MissingArg("wave"))?;
                ConsoleCommand::Wave(w.parse()?)
            }
            "freq" | "f" => ConsoleCommand::Freq(number("freq", &mut words)?),
            "amp" | "a" => ConsoleCommand::Amp(number("amp", &mut words)?),
            "params" | "p" => ConsoleCommand::Params {
                amplitude: number("params", &mut words)?,
                frequency: number("params", &mut words)?,
            },
            "xy" | "touch" => ConsoleCommand::Xy {
                x: number("xy", &mut words)?,
                y: number("xy", &mut words)?,
            },
            "release" | "r" => ConsoleCommand::Release,
            "vol" | "volume" | "v" => ConsoleCommand::Volume(number("vol", &mut words)?),
            "status" | "s" => ConsoleCommand::Status,
            "help" | "?" => ConsoleCommand::Help,
            "quit" | "exit" | "q" => ConsoleCommand::Quit,
            _ => return Err(ConsoleError::Unknown(head.to_string())),
        };
        if words.next().is_some() {
            return Err(ConsoleError::TrailingArgs(command_name(&cmd)));
        }
        Ok(cmd)
    }
}

fn command_name(cmd: &ConsoleCommand) -> &'static str {
    match cmd {
        ConsoleCommand::Wave(_) => "wave",
        ConsoleCommand::Freq(_) => "freq",
        ConsoleCommand::Amp(_) => "amp",
        ConsoleCommand::Params { .. } => "params",
        ConsoleCommand::Xy { .. } => "xy",
        ConsoleCommand::Release => "release",
        ConsoleCommand::Volume(_) => "vol",
        ConsoleCommand::Status => "status",
        ConsoleCommand::Help => "help",
        ConsoleCommand::Quit => "quit",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Readout for the current state: the parameter label while sound is gated
/// on, the idle label while muted.
pub fn readout(parameters: SynthParameters, volume: f32) -> String {
    if volume > 0.0 {
        parameters.to_string()
    } else {
        SynthParameters::IDLE_LABEL.to_string()
    }
}

/// Execute one command against the running session.
pub fn apply(cmd: ConsoleCommand, session: &AudioSession) -> Flow {
    let control = session.control();
    match cmd {
        ConsoleCommand::Wave(kind) => {
            control.set_waveform(kind);
            log::info!("waveform: {kind}");
        }
        ConsoleCommand::Freq(hz) => {
            control.set_frequency(hz);
            log::info!("{}", control.parameters());
        }
        ConsoleCommand::Amp(a) => {
            control.set_amplitude(a);
            log::info!("{}", control.parameters());
        }
        ConsoleCommand::Params { amplitude, frequency } => {
            control.set_parameters(amplitude, frequency);
            log::info!("{}", control.parameters());
        }
        ConsoleCommand::Xy { x, y } => {
            let p = control.set_from_xy(x, y);
            session.set_volume(TOUCH_VOLUME);
            log::info!("{p}");
        }
        ConsoleCommand::Release => {
            session.set_volume(0.0);
            log::info!("{}", SynthParameters::IDLE_LABEL);
        }
        ConsoleCommand::Volume(v) => {
            session.set_volume(v);
            log::info!("volume: {:.2}", session.volume());
        }
        ConsoleCommand::Status => {
            let state = session.state();
            log::info!(
                "{} | waveform: {} | volume: {:.2} | peak: {:.3} | render faults: {}",
                readout(control.parameters(), session.volume()),
                control.waveform(),
                session.volume(),
                state.take_peak(),
                state.faults(),
            );
        }
        ConsoleCommand::Help => println!("{HELP}"),
        ConsoleCommand::Quit => return Flow::Quit,
    }
    Flow::Continue
}
