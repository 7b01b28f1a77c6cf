use oscillo_engine::WaveformKind;

pub struct Args {
    pub list_devices: bool,
    pub device_name: Option<String>,
    pub sample_rate: Option<u32>,
    pub channels: Option<u16>,
    pub duration_sec: Option<u64>,
    pub waveform: WaveformKind,
    pub frequency: f32,
    pub amplitude: f32,
    pub volume: f32,
    pub seed: Option<u64>,
}

impl Args {
    fn parser() -> impl meap::Parser<Item = Self> {
        meap::let_map! {
            let {
                list_devices = flag("list-devices")
                    .desc("list output devices and exit");
                device_name = opt_opt::<String, _>("NAME", "device")
                    .name('d')
                    .desc("output device (default: host default)");
                sample_rate = opt_opt::<u32, _>("HZ", "sample-rate")
                    .name('r');
                channels = opt_opt::<u16, _>("INT", "channels")
                    .name('c');
                duration_sec = opt_opt::<u64, _>("SECS", "duration")
                    .desc("stop automatically after this many seconds");
                waveform = opt_opt::<WaveformKind, _>("KIND", "waveform")
                    .name('w')
                    .desc("sine, triangle, sawtooth, square or noise")
                    .with_default(WaveformKind::Sine);
                frequency = opt_opt::<f32, _>("HZ", "frequency")
                    .name('f')
                    .with_default(440.0);
                amplitude = opt_opt::<f32, _>("FLOAT", "amplitude")
                    .name('a')
                    .with_default(1.0);
                volume = opt_opt::<f32, _>("FLOAT", "volume")
                    .name('v')
                    .with_default(0.5);
                seed = opt_opt::<u64, _>("INT", "seed")
                    .desc("white-noise seed");
            } in {
                Self {
                    list_devices,
                    device_name,
                    sample_rate,
                    channels,
                    duration_sec,
                    waveform,
                    frequency,
                    amplitude,
                    volume,
                    seed,
                }
            }
        }
    }
}

pub fn parse() -> Args {
    use meap::Parser;
    Args::parser().with_help_default().parse_env_or_exit()
}
