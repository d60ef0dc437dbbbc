//! Header and track chunk framing

use super::codec::{be_bytes_u16, be_bytes_u32};

/// "MThd" chunk identifier
pub const HEADER_MAGIC: [u8; 4] = *b"MThd";

/// "MTrk" chunk identifier
pub const TRACK_MAGIC: [u8; 4] = *b"MTrk";

/// Header chunk body length
pub const HEADER_LENGTH: u32 = 6;

/// Total header chunk size in bytes (magic + length + body)
pub const HEADER_CHUNK_SIZE: usize = 14;

/// End-of-track meta event with a zero delta
pub const END_OF_TRACK: [u8; 4] = [0x00, 0xFF, 0x2F, 0x00];

/// Default ticks per quarter note
pub const DEFAULT_DIVISION: u16 = 0x60;

/// File format field of the header chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackMode {
    /// Format 0: one multi-channel track
    SingleTrack,
    /// Format 1: tracks played together
    SimultaneousTracks(u16),
    /// Format 2: independent sequences
    IndependentTracks(u16),
}

impl TrackMode {
    pub fn format(self) -> u16 {
        match self {
            TrackMode::SingleTrack => 0,
            TrackMode::SimultaneousTracks(_) => 1,
            TrackMode::IndependentTracks(_) => 2,
        }
    }

    pub fn track_count(self) -> u16 {
        match self {
            TrackMode::SingleTrack => 1,
            TrackMode::SimultaneousTracks(n) | TrackMode::IndependentTracks(n) => n,
        }
    }
}

/// Build the 14-byte header chunk
pub fn header_chunk(mode: TrackMode, division: u16) -> [u8; HEADER_CHUNK_SIZE] {
    let mut chunk = [0u8; HEADER_CHUNK_SIZE];
    chunk[0..4].copy_from_slice(&HEADER_MAGIC);
    chunk[4..8].copy_from_slice(&be_bytes_u32(HEADER_LENGTH));
    chunk[8..10].copy_from_slice(&be_bytes_u16(mode.format()));
    chunk[10..12].copy_from_slice(&be_bytes_u16(mode.track_count()));
    chunk[12..14].copy_from_slice(&be_bytes_u16(division));
    chunk
}

/// Wrap raw track events in a track chunk terminated by end-of-track
///
/// The declared length includes the end-of-track event.
pub fn track_chunk(contents: &[u8]) -> Vec<u8> {
    let length = (contents.len() + END_OF_TRACK.len()) as u32;
    let mut chunk = Vec::with_capacity(8 + length as usize);
    chunk.extend_from_slice(&TRACK_MAGIC);
    chunk.extend_from_slice(&be_bytes_u32(length));
    chunk.extend_from_slice(contents);
    chunk.extend_from_slice(&END_OF_TRACK);
    chunk
}

/// A complete single-chunk file: header followed by one track
pub fn file(mode: TrackMode, contents: &[u8], division: u16) -> Vec<u8> {
    let mut bytes = header_chunk(mode, division).to_vec();
    bytes.extend(track_chunk(contents));
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_track_header() {
        assert_eq!(
            header_chunk(TrackMode::SingleTrack, DEFAULT_DIVISION),
            [0x4D, 0x54, 0x68, 0x64, 0x00, 0x00, 0x00, 0x06, 0x00, 0x00, 0x00, 0x01, 0x00, 0x60]
        );
    }

    #[test]
    fn test_multi_track_headers() {
        let simultaneous = header_chunk(TrackMode::SimultaneousTracks(3), 480);
        assert_eq!(&simultaneous[8..14], &[0x00, 0x01, 0x00, 0x03, 0x01, 0xE0]);

        let independent = header_chunk(TrackMode::IndependentTracks(2), 0x18);
        assert_eq!(&independent[8..14], &[0x00, 0x02, 0x00, 0x02, 0x00, 0x18]);
    }

    #[test]
    fn test_track_chunk_framing() {
        let contents = [0x00, 0xC1, 0x01];
        let chunk = track_chunk(&contents);
        assert_eq!(&chunk[0..4], b"MTrk");
        assert_eq!(&chunk[4..8], &[0x00, 0x00, 0x00, 0x07]);
        assert_eq!(&chunk[8..11], &contents);
        assert_eq!(&chunk[11..], &END_OF_TRACK);
    }

    #[test]
    fn test_empty_track_chunk() {
        let chunk = track_chunk(&[]);
        assert_eq!(chunk, vec![0x4D, 0x54, 0x72, 0x6B, 0, 0, 0, 4, 0x00, 0xFF, 0x2F, 0x00]);
    }

    #[test]
    fn test_file_concatenates_chunks() {
        let bytes = file(TrackMode::SingleTrack, &[0x00, 0xC0, 0x00], DEFAULT_DIVISION);
        assert_eq!(bytes.len(), HEADER_CHUNK_SIZE + 8 + 3 + 4);
        assert_eq!(&bytes[14..18], b"MTrk");
    }
}
