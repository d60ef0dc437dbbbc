use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unknown key: {0}")]
    UnknownKey(String),

    #[error("Unknown mode: {0}")]
    UnknownMode(String),

    #[error("Unknown progression style: {0}")]
    UnknownProgression(String),

    #[error("Unknown instrument: {0}")]
    UnknownInstrument(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("MIDI parse error: {0}")]
    MidiParse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
