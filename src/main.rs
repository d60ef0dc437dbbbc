use clap::Parser;
use partwright::composer::instrument::{list_instruments, program_by_name};
use partwright::composer::{KitVariant, Mode, PitchClass, ProgressionStyle, TimeSignature};
use partwright::{ArrangementConfig, Composer};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "partwright")]
#[command(version = "0.1.0")]
#[command(about = "Procedural four-part arrangement composer writing Standard MIDI Files", long_about = None)]
struct Args {
    /// Output MIDI file (writes to stdout if not specified)
    output: Option<PathBuf>,

    /// JSON arrangement config; other options override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tonic pitch class (C, F#, Bb, ...)
    #[arg(short, long)]
    key: Option<PitchClass>,

    /// Octave of the tonic
    #[arg(long)]
    octave: Option<u8>,

    /// Mode (major, dorian, phrygian, lydian, mixolydian, minor, locrian)
    #[arg(short, long)]
    mode: Option<Mode>,

    /// Progression style (ascending, circle, rock)
    #[arg(short, long)]
    progression: Option<ProgressionStyle>,

    /// Time signature as beats/unit
    #[arg(long)]
    time: Option<TimeSignature>,

    /// Tempo in beats per minute
    #[arg(short, long)]
    tempo: Option<u32>,

    /// Number of bars
    #[arg(short, long)]
    bars: Option<u32>,

    /// Chordal instrument (name or program number)
    #[arg(long, value_parser = program_by_name)]
    piano: Option<u8>,

    /// Bass instrument (name or program number)
    #[arg(long, value_parser = program_by_name)]
    bass: Option<u8>,

    /// Melody instrument (name or program number)
    #[arg(long, value_parser = program_by_name)]
    melody: Option<u8>,

    /// Drum kit (1 = standard, 2 = alternate)
    #[arg(long)]
    kit: Option<KitVariant>,

    /// Percent chance of a melody passing-tone ornament
    #[arg(long)]
    ornament: Option<u32>,

    /// Percent chance that a melody note is a rest
    #[arg(long)]
    skip: Option<u32>,

    /// Random seed for reproducible output
    #[arg(short, long)]
    seed: Option<u64>,

    /// List available instrument names
    #[arg(short = 'L', long)]
    list_instruments: bool,

    /// Log each bar's chord
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Apply command-line overrides on top of `config`
    fn apply(&self, config: &mut ArrangementConfig) {
        if let Some(key) = self.key {
            config.key = key;
        }
        if let Some(octave) = self.octave {
            config.octave = octave;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(progression) = self.progression {
            config.progression = progression;
        }
        if let Some(time) = self.time {
            config.time_signature = time;
        }
        if let Some(tempo) = self.tempo {
            config.tempo = tempo;
        }
        if let Some(bars) = self.bars {
            config.bars = bars;
        }
        if let Some(program) = self.piano {
            config.chordal_program = program;
        }
        if let Some(program) = self.bass {
            config.bass_program = program;
        }
        if let Some(program) = self.melody {
            config.melody_program = program;
        }
        if let Some(kit) = self.kit {
            config.kit = kit;
        }
        if let Some(rate) = self.ornament {
            config.ornament_rate = rate;
        }
        if let Some(rate) = self.skip {
            config.skip_rate = rate;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
    }
}

fn main() -> Result<(), partwright::Error> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if args.list_instruments {
        for (name, program) in list_instruments() {
            println!("{:<16} {}", name, program);
        }
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => ArrangementConfig::from_json_file(path)?,
        None => ArrangementConfig::default(),
    };
    args.apply(&mut config);

    let mut composer = Composer::new(config);
    match &args.output {
        Some(path) => composer.compose_file(path)?,
        None => {
            let bytes = composer.compose()?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        }
    }

    Ok(())
}
