//! Single-track SMF writer

use super::events::{self, ChordMember, Note};
use super::header::{self, TrackMode, DEFAULT_DIVISION};
use crate::error::Result;
use std::path::Path;

/// Accumulates track events in memory and frames them into a file
#[derive(Debug, Clone)]
pub struct SmfWriter {
    mode: TrackMode,
    division: u16,
    /// Track contents, without the end-of-track marker
    track: Vec<u8>,
}

impl SmfWriter {
    /// Create a format 0 writer with the default division
    pub fn new() -> Self {
        Self::with_division(DEFAULT_DIVISION)
    }

    pub fn with_division(division: u16) -> Self {
        Self {
            mode: TrackMode::SingleTrack,
            division,
            track: Vec::new(),
        }
    }

    /// Ticks per quarter note
    pub fn division(&self) -> u16 {
        self.division
    }

    /// Write raw bytes to the track
    pub fn write_data(&mut self, data: &[u8]) {
        self.track.extend_from_slice(data);
    }

    /// Write a set-tempo event
    pub fn write_tempo(&mut self, bpm: u32) {
        self.write_data(&events::encode_tempo(bpm));
    }

    /// Write a program change at delta 0
    pub fn write_program_change(&mut self, program: u8, channel: u8) {
        self.write_data(&events::encode_program_change(program, 0, channel));
    }

    /// Write a standalone note
    pub fn write_note(&mut self, note: &Note) {
        self.write_data(&events::encode_single(note));
    }

    /// Write a merged chord
    pub fn write_chord(&mut self, root: &Note, members: &[ChordMember]) {
        self.write_data(&events::encode_chord(root, members));
    }

    /// Bytes of track data written so far
    pub fn position(&self) -> usize {
        self.track.len()
    }

    /// Track contents written so far
    pub fn contents(&self) -> &[u8] {
        &self.track
    }

    /// Frame the track and return the complete file
    pub fn finish(self) -> Vec<u8> {
        header::file(self.mode, &self.track, self.division)
    }

    /// Frame the track and store the file at `path`
    pub fn write_to_path(self, path: &Path) -> Result<()> {
        std::fs::write(path, self.finish())?;
        Ok(())
    }
}

impl Default for SmfWriter {
    fn default() -> Self {
        Self::new()
    }
}
