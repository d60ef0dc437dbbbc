//! SMF reader and parser

use super::events::meta;
use crate::error::{Error, Result};
use midly::{Format, Fps, MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use serde::Serialize;

/// Parsed header chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SmfHeader {
    pub format: u16,
    pub track_count: u16,
    /// Ticks per quarter note (or raw SMPTE division when the top bit is set)
    pub division: u16,
}

/// A parsed track event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SmfEvent {
    NoteOff { channel: u8, pitch: u8, velocity: u8 },
    /// Velocity 0 means note-off
    NoteOn { channel: u8, pitch: u8, velocity: u8 },
    PolyPressure { channel: u8, pitch: u8, pressure: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    ProgramChange { channel: u8, program: u8 },
    ChannelPressure { channel: u8, pressure: u8 },
    PitchBend { channel: u8, value: u16 },
    Tempo { micros_per_quarter: u32 },
    EndOfTrack,
    Meta { meta_type: u8, data: Vec<u8> },
    SysEx { data: Vec<u8> },
}

impl SmfEvent {
    /// True for note-on with non-zero velocity
    pub fn is_note_start(&self) -> bool {
        matches!(self, SmfEvent::NoteOn { velocity, .. } if *velocity > 0)
    }

    /// True for note-off or note-on with zero velocity
    pub fn is_note_end(&self) -> bool {
        matches!(
            self,
            SmfEvent::NoteOff { .. } | SmfEvent::NoteOn { velocity: 0, .. }
        )
    }
}

/// An event with its delta and absolute time in ticks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackEvent {
    pub delta: u32,
    pub tick: u32,
    #[serde(flatten)]
    pub event: SmfEvent,
}

/// SMF reader
///
/// Parsing is done by `midly` on first use; its events are mapped into
/// [`SmfEvent`] with absolute tick times added.
pub struct SmfReader<'a> {
    data: &'a [u8],
    smf: Option<Smf<'a>>,
}

impl<'a> SmfReader<'a> {
    /// Create a new reader from raw file data
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, smf: None }
    }

    fn smf(&mut self) -> Result<&Smf<'a>> {
        let smf = match self.smf.take() {
            Some(smf) => smf,
            None => Smf::parse(self.data).map_err(|e| Error::MidiParse(e.to_string()))?,
        };
        Ok(self.smf.insert(smf))
    }

    /// Validate the file and return its header
    pub fn parse_header(&mut self) -> Result<SmfHeader> {
        let smf = self.smf()?;
        let format = match smf.header.format {
            Format::SingleTrack => 0,
            Format::Parallel => 1,
            Format::Sequential => 2,
        };
        let division = match smf.header.timing {
            Timing::Metrical(ticks) => ticks.as_int(),
            // Negative frame rate in the high byte, ticks per frame in the low byte
            Timing::Timecode(fps, subframes) => {
                u16::from((fps.as_int() as i8).wrapping_neg() as u8) << 8 | u16::from(subframes)
            }
        };
        let track_count = u16::try_from(smf.tracks.len())
            .map_err(|_| Error::MidiParse(format!("Too many tracks: {}", smf.tracks.len())))?;

        Ok(SmfHeader {
            format,
            track_count,
            division,
        })
    }

    /// Parse every track chunk
    ///
    /// Chunks with unknown identifiers are skipped.
    pub fn parse_tracks(&mut self, header: &SmfHeader) -> Result<Vec<Vec<TrackEvent>>> {
        let smf = self.smf()?;
        if smf.tracks.len() != header.track_count as usize {
            return Err(Error::MidiParse(format!(
                "Expected {} tracks, found {}",
                header.track_count,
                smf.tracks.len()
            )));
        }
        smf.tracks.iter().map(|track| timed_events(track)).collect()
    }
}

/// Attach absolute times to one track's events
fn timed_events(track: &[midly::TrackEvent]) -> Result<Vec<TrackEvent>> {
    let mut tick = 0u32;
    track
        .iter()
        .map(|event| {
            let delta = event.delta.as_int();
            tick = tick
                .checked_add(delta)
                .ok_or_else(|| Error::MidiParse(format!("Track time overflows after tick {tick}")))?;
            Ok(TrackEvent {
                delta,
                tick,
                event: SmfEvent::from(&event.kind),
            })
        })
        .collect()
}

impl From<&TrackEventKind<'_>> for SmfEvent {
    fn from(kind: &TrackEventKind<'_>) -> Self {
        match *kind {
            TrackEventKind::Midi { channel, message } => channel_event(channel.as_int(), message),
            TrackEventKind::SysEx(data) | TrackEventKind::Escape(data) => SmfEvent::SysEx {
                data: data.to_vec(),
            },
            TrackEventKind::Meta(MetaMessage::EndOfTrack) => SmfEvent::EndOfTrack,
            TrackEventKind::Meta(MetaMessage::Tempo(micros)) => SmfEvent::Tempo {
                micros_per_quarter: micros.as_int(),
            },
            TrackEventKind::Meta(message) => {
                let (meta_type, data) = meta_body(&message);
                SmfEvent::Meta { meta_type, data }
            }
        }
    }
}

fn channel_event(channel: u8, message: MidiMessage) -> SmfEvent {
    match message {
        MidiMessage::NoteOff { key, vel } => SmfEvent::NoteOff {
            channel,
            pitch: key.as_int(),
            velocity: vel.as_int(),
        },
        MidiMessage::NoteOn { key, vel } => SmfEvent::NoteOn {
            channel,
            pitch: key.as_int(),
            velocity: vel.as_int(),
        },
        MidiMessage::Aftertouch { key, vel } => SmfEvent::PolyPressure {
            channel,
            pitch: key.as_int(),
            pressure: vel.as_int(),
        },
        MidiMessage::Controller { controller, value } => SmfEvent::ControlChange {
            channel,
            controller: controller.as_int(),
            value: value.as_int(),
        },
        MidiMessage::ProgramChange { program } => SmfEvent::ProgramChange {
            channel,
            program: program.as_int(),
        },
        MidiMessage::ChannelAftertouch { vel } => SmfEvent::ChannelPressure {
            channel,
            pressure: vel.as_int(),
        },
        MidiMessage::PitchBend { bend } => SmfEvent::PitchBend {
            channel,
            value: bend.0.as_int(),
        },
    }
}

/// Type byte and payload of a meta event without a dedicated variant
fn meta_body(message: &MetaMessage) -> (u8, Vec<u8>) {
    match *message {
        MetaMessage::TrackNumber(number) => (
            0x00,
            number.map(|n| n.to_be_bytes().to_vec()).unwrap_or_default(),
        ),
        MetaMessage::Text(data) => (0x01, data.to_vec()),
        MetaMessage::Copyright(data) => (0x02, data.to_vec()),
        MetaMessage::TrackName(data) => (0x03, data.to_vec()),
        MetaMessage::InstrumentName(data) => (0x04, data.to_vec()),
        MetaMessage::Lyric(data) => (0x05, data.to_vec()),
        MetaMessage::Marker(data) => (0x06, data.to_vec()),
        MetaMessage::CuePoint(data) => (0x07, data.to_vec()),
        MetaMessage::ProgramName(data) => (0x08, data.to_vec()),
        MetaMessage::DeviceName(data) => (0x09, data.to_vec()),
        MetaMessage::MidiChannel(channel) => (0x20, vec![channel.as_int()]),
        MetaMessage::MidiPort(port) => (0x21, vec![port.as_int()]),
        MetaMessage::EndOfTrack => (meta::END_OF_TRACK, Vec::new()),
        MetaMessage::Tempo(micros) => (meta::TEMPO, micros.as_int().to_be_bytes()[1..].to_vec()),
        MetaMessage::SmpteOffset(time) => (
            0x54,
            vec![
                smpte_rate_bits(time.fps()) | time.hour(),
                time.minute(),
                time.second(),
                time.frame(),
                time.subframe(),
            ],
        ),
        MetaMessage::TimeSignature(numerator, denominator, clocks, notes) => {
            (0x58, vec![numerator, denominator, clocks, notes])
        }
        MetaMessage::KeySignature(sharps, minor) => (0x59, vec![sharps as u8, u8::from(minor)]),
        MetaMessage::SequencerSpecific(data) => (0x7F, data.to_vec()),
        MetaMessage::Unknown(meta_type, data) => (meta_type, data.to_vec()),
    }
}

/// Frame-rate code stored in the top bits of the SMPTE offset hour byte
fn smpte_rate_bits(fps: Fps) -> u8 {
    let code = match fps {
        Fps::Fps24 => 0,
        Fps::Fps25 => 1,
        Fps::Fps29 => 2,
        Fps::Fps30 => 3,
    };
    code << 5
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smf::header::{file, TrackMode, DEFAULT_DIVISION};

    #[test]
    fn test_parse_header() {
        let bytes = file(TrackMode::SingleTrack, &[], DEFAULT_DIVISION);
        let mut reader = SmfReader::new(&bytes);
        let header = reader.parse_header().unwrap();
        assert_eq!(
            header,
            SmfHeader {
                format: 0,
                track_count: 1,
                division: 0x60
            }
        );
    }

    #[test]
    fn test_smpte_division_is_kept_raw() {
        // 25 frames per second, 40 ticks per frame
        let bytes = file(TrackMode::SingleTrack, &[], 0xE728);
        let header = SmfReader::new(&bytes).parse_header().unwrap();
        assert_eq!(header.division, 0xE728);
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut bytes = file(TrackMode::SingleTrack, &[], DEFAULT_DIVISION);
        bytes[0] = b'X';
        assert!(SmfReader::new(&bytes).parse_header().is_err());
        assert!(SmfReader::new(&bytes[..10]).parse_header().is_err());
    }

    #[test]
    fn test_parse_track_events() {
        let contents = [
            0x00, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20, // tempo
            0x00, 0xC1, 0x05, // program change
            0x00, 0x91, 0x3C, 0x50, // note on
            0x60, 0x91, 0x3C, 0x00, // note on, velocity 0
        ];
        let bytes = file(TrackMode::SingleTrack, &contents, DEFAULT_DIVISION);
        let mut reader = SmfReader::new(&bytes);
        let header = reader.parse_header().unwrap();
        let tracks = reader.parse_tracks(&header).unwrap();
        assert_eq!(tracks.len(), 1);

        let events: Vec<_> = tracks[0].iter().map(|e| (e.tick, e.event.clone())).collect();
        assert_eq!(
            events,
            vec![
                (0, SmfEvent::Tempo { micros_per_quarter: 500_000 }),
                (0, SmfEvent::ProgramChange { channel: 1, program: 5 }),
                (0, SmfEvent::NoteOn { channel: 1, pitch: 60, velocity: 80 }),
                (96, SmfEvent::NoteOn { channel: 1, pitch: 60, velocity: 0 }),
                (96, SmfEvent::EndOfTrack),
            ]
        );
        assert!(events[2].1.is_note_start());
        assert!(events[3].1.is_note_end());
    }

    fn parse_contents(contents: &[u8]) -> Result<Vec<TrackEvent>> {
        let bytes = file(TrackMode::SingleTrack, contents, DEFAULT_DIVISION);
        let mut reader = SmfReader::new(&bytes);
        let header = reader.parse_header()?;
        let mut tracks = reader.parse_tracks(&header)?;
        Ok(tracks.remove(0))
    }

    #[test]
    fn test_running_status_and_note_off() {
        let contents = [
            0x00, 0x90, 0x3C, 0x40, // note on
            0x10, 0x40, 0x40, // running status note on
            0x10, 0x80, 0x3C, 0x00, // explicit note off
            0x00, 0x40, 0x00, // running status note off
        ];
        let events = parse_contents(&contents).unwrap();
        assert_eq!(events.len(), 5);
        assert_eq!(events[1].tick, 0x10);
        assert_eq!(
            events[1].event,
            SmfEvent::NoteOn { channel: 0, pitch: 0x40, velocity: 0x40 }
        );
        assert_eq!(
            events[3].event,
            SmfEvent::NoteOff { channel: 0, pitch: 0x40, velocity: 0 }
        );
        assert!(events[2].event.is_note_end());
        assert_eq!(events[4].event, SmfEvent::EndOfTrack);
    }

    #[test]
    fn test_data_byte_without_status() {
        assert!(matches!(
            parse_contents(&[0x00, 0x3C, 0x40]),
            Err(Error::MidiParse(_))
        ));
    }

    #[test]
    fn test_meta_and_sysex_events() {
        let contents = [
            0x00, 0xFF, 0x03, 0x03, b'a', b'b', b'c', // track name
            0x00, 0xFF, 0x59, 0x02, 0xFE, 0x01, // two flats, minor
            0x00, 0xF0, 0x02, 0x7E, 0xF7, // sysex
        ];
        let events = parse_contents(&contents).unwrap();
        assert_eq!(
            events[0].event,
            SmfEvent::Meta { meta_type: 0x03, data: b"abc".to_vec() }
        );
        assert_eq!(
            events[1].event,
            SmfEvent::Meta { meta_type: 0x59, data: vec![0xFE, 0x01] }
        );
        assert_eq!(events[2].event, SmfEvent::SysEx { data: vec![0x7E, 0xF7] });
    }

    #[test]
    fn test_track_time_overflow_is_an_error() {
        // Seventeen maximal deltas pass the end of a 32-bit tick counter
        let contents: Vec<u8> = [0xFF, 0xFF, 0xFF, 0x7F, 0xC0, 0x00].repeat(17);
        assert!(matches!(
            parse_contents(&contents),
            Err(Error::MidiParse(_))
        ));

        let events = parse_contents(&contents[..6 * 16]).unwrap();
        assert_eq!(events[15].tick, 0x0FFF_FFFF * 16);
    }

    #[test]
    fn test_skips_unknown_chunks() {
        let original = file(TrackMode::SingleTrack, &[0x00, 0xC0, 0x01], DEFAULT_DIVISION);
        let mut bytes = original[..14].to_vec();
        bytes.extend_from_slice(&[b'X', b'F', b'I', b'H', 0, 0, 0, 2, 0xAA, 0xBB]);
        bytes.extend_from_slice(&original[14..]);
        let mut reader = SmfReader::new(&bytes);
        let header = reader.parse_header().unwrap();
        let tracks = reader.parse_tracks(&header).unwrap();
        assert_eq!(tracks[0][0].event, SmfEvent::ProgramChange { channel: 0, program: 1 });
    }

    #[test]
    fn test_missing_track() {
        let bytes = file(TrackMode::SingleTrack, &[], DEFAULT_DIVISION);
        let mut reader = SmfReader::new(&bytes[..14]);
        assert!(matches!(reader.parse_header(), Err(Error::MidiParse(_))));

        let header = SmfHeader {
            format: 1,
            track_count: 2,
            division: DEFAULT_DIVISION,
        };
        assert!(SmfReader::new(&bytes).parse_tracks(&header).is_err());
    }
}
