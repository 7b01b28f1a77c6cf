//! Oscillo CLI — real-time waveform player with a console control surface.

mod args;
mod console;
mod session;

use std::io::BufRead;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::{self, RecvTimeoutError};

use console::{ConsoleCommand, Flow};
use session::AudioSession;

/// How often the main loop wakes up to check the deadline and fault counter.
const POLL: Duration = Duration::from_millis(500);

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = args::parse();

    if args.list_devices {
        return session::list_output_devices();
    }

    let session = AudioSession::open(&args)?;
    log::info!(
        "playing on {} at {} Hz, {} channel(s)",
        session.device_name(),
        session.config().sample_rate.0,
        session.config().channels,
    );
    log::info!("{}", console::readout(session.control().parameters(), session.volume()));
    if let Some(d) = args.duration_sec {
        log::info!("auto-stop after {d} seconds");
    }
    println!("{}", console::HELP);

    // stdin blocks, so it gets its own thread; lines arrive over a channel.
    let (tx, rx) = channel::unbounded::<String>();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines().map_while(Result::ok) {
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let deadline = args.duration_sec.map(|d| Instant::now() + Duration::from_secs(d));
    let mut faults_seen = 0;
    let mut stdin_open = true;
    loop {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }

        let faults = session.state().faults();
        if faults > faults_seen {
            log::warn!("{} render fault(s) since last check; emitted silence", faults - faults_seen);
            faults_seen = faults;
        }

        if !stdin_open {
            thread::sleep(POLL);
            continue;
        }
        match rx.recv_timeout(POLL) {
            Ok(line) if line.trim().is_empty() => {}
            Ok(line) => match line.parse::<ConsoleCommand>() {
                Ok(cmd) => {
                    if console::apply(cmd, &session) == Flow::Quit {
                        break;
                    }
                }
                Err(e) => log::warn!("{e}"),
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                // EOF: keep playing until the deadline, if there is one.
                if deadline.is_none() {
                    break;
                }
                stdin_open = false;
            }
        }
    }

    log::info!("stopping");
    Ok(())
}
