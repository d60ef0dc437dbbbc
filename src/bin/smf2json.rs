//! Standard MIDI File to JSON converter

use clap::Parser;
use partwright::smf::{SmfJson, SmfReader};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "smf2json")]
#[command(version = "0.1.0")]
#[command(about = "Convert Standard MIDI Files to JSON", long_about = None)]
struct Args {
    /// Input MIDI file
    input: PathBuf,

    /// Output JSON file (writes to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output compact JSON (default is pretty-printed)
    #[arg(short, long)]
    compact: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let data = std::fs::read(&args.input)?;

    let mut reader = SmfReader::new(&data);
    let header = reader.parse_header()?;
    let tracks = reader.parse_tracks(&header)?;

    let smf_json = SmfJson::new(&header, tracks);

    let json_string = if args.compact {
        serde_json::to_string(&smf_json)?
    } else {
        serde_json::to_string_pretty(&smf_json)?
    };

    match args.output {
        Some(path) => {
            let mut file = File::create(path)?;
            file.write_all(json_string.as_bytes())?;
            file.write_all(b"\n")?;
        }
        None => {
            println!("{}", json_string);
        }
    }

    Ok(())
}
