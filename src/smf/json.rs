//! JSON serialization types for SMF data

use super::reader::{SmfHeader, SmfEvent, TrackEvent};
use serde::Serialize;

/// Top-level JSON structure for an SMF file
#[derive(Debug, Clone, Serialize)]
pub struct SmfJson {
    /// Header information
    pub header: SmfHeaderJson,
    /// Tracks in file order
    pub tracks: Vec<TrackJson>,
}

/// JSON representation of the header chunk
#[derive(Debug, Clone, Serialize)]
pub struct SmfHeaderJson {
    pub format: u16,
    pub track_count: u16,
    /// Ticks per quarter note
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticks_per_quarter: Option<u16>,
    /// Raw division when SMPTE timing is used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smpte_division: Option<u16>,
}

/// JSON representation of one track
#[derive(Debug, Clone, Serialize)]
pub struct TrackJson {
    /// Tick of the last event
    pub length_ticks: u32,
    /// Number of sounding notes
    pub note_count: usize,
    /// Tempo in BPM, if the track sets one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tempo_bpm: Option<f64>,
    pub events: Vec<TrackEvent>,
}

impl SmfJson {
    /// Create an SmfJson from parsed SMF data
    pub fn new(header: &SmfHeader, tracks: Vec<Vec<TrackEvent>>) -> Self {
        Self {
            header: SmfHeaderJson::from(header),
            tracks: tracks.into_iter().map(TrackJson::from).collect(),
        }
    }
}

impl From<&SmfHeader> for SmfHeaderJson {
    fn from(header: &SmfHeader) -> Self {
        let smpte = header.division & 0x8000 != 0;
        Self {
            format: header.format,
            track_count: header.track_count,
            ticks_per_quarter: if smpte { None } else { Some(header.division) },
            smpte_division: if smpte { Some(header.division) } else { None },
        }
    }
}

impl From<Vec<TrackEvent>> for TrackJson {
    fn from(events: Vec<TrackEvent>) -> Self {
        let tempo_bpm = events.iter().find_map(|e| match e.event {
            SmfEvent::Tempo { micros_per_quarter } if micros_per_quarter > 0 => {
                Some(micros_to_bpm(micros_per_quarter))
            }
            _ => None,
        });
        Self {
            length_ticks: events.last().map(|e| e.tick).unwrap_or(0),
            note_count: events.iter().filter(|e| e.event.is_note_start()).count(),
            tempo_bpm,
            events,
        }
    }
}

/// Convert a tempo in microseconds per quarter note to BPM
fn micros_to_bpm(micros_per_quarter: u32) -> f64 {
    60_000_000.0 / micros_per_quarter as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_micros_to_bpm() {
        assert_eq!(micros_to_bpm(500_000), 120.0);
        assert_eq!(micros_to_bpm(400_000), 150.0);
    }

    #[test]
    fn test_track_summary() {
        let events = vec![
            TrackEvent {
                delta: 0,
                tick: 0,
                event: SmfEvent::Tempo { micros_per_quarter: 500_000 },
            },
            TrackEvent {
                delta: 0,
                tick: 0,
                event: SmfEvent::NoteOn { channel: 0, pitch: 60, velocity: 90 },
            },
            TrackEvent {
                delta: 96,
                tick: 96,
                event: SmfEvent::NoteOn { channel: 0, pitch: 60, velocity: 0 },
            },
        ];
        let track = TrackJson::from(events);
        assert_eq!(track.length_ticks, 96);
        assert_eq!(track.note_count, 1);
        assert_eq!(track.tempo_bpm, Some(120.0));
    }

    #[test]
    fn test_serialized_shape() {
        let header = SmfHeader {
            format: 0,
            track_count: 1,
            division: 96,
        };
        let json = SmfJson::new(
            &header,
            vec![vec![TrackEvent {
                delta: 0,
                tick: 0,
                event: SmfEvent::ProgramChange { channel: 3, program: 67 },
            }]],
        );
        let value = serde_json::to_value(&json).unwrap();
        assert_eq!(value["header"]["ticks_per_quarter"], 96);
        assert!(value["header"].get("smpte_division").is_none());
        assert_eq!(value["tracks"][0]["events"][0]["event"], "program_change");
        assert_eq!(value["tracks"][0]["events"][0]["program"], 67);
    }
}
