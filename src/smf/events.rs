//! Channel and meta event encoding, including multi-voice chord merging

use super::codec::{be_bytes_u32, encode_vlq};

/// Status byte opcodes
pub mod opcode {
    /// Note-off; never written, recognised by the reader
    pub const NOTE_OFF: u8 = 0x80;
    /// Note-on; velocity 0 doubles as note-off
    pub const NOTE_ON: u8 = 0x90;
    pub const POLY_PRESSURE: u8 = 0xA0;
    pub const CONTROL_CHANGE: u8 = 0xB0;
    pub const PROGRAM_CHANGE: u8 = 0xC0;
    pub const CHANNEL_PRESSURE: u8 = 0xD0;
    pub const PITCH_BEND: u8 = 0xE0;
    pub const SYSEX: u8 = 0xF0;
    pub const SYSEX_ESCAPE: u8 = 0xF7;
    pub const META: u8 = 0xFF;
}

/// Meta event types
pub mod meta {
    pub const END_OF_TRACK: u8 = 0x2F;
    pub const TEMPO: u8 = 0x51;
}

/// Note number, 0-127
pub type Pitch = u8;

/// Semitone offset from a chord root
pub type Interval = u8;

pub const MAX_PITCH: Pitch = 127;
pub const MAX_VELOCITY: u8 = 127;
pub const MAX_CHANNEL: u8 = 0x0F;

/// Percussion channel (zero-indexed)
pub const DRUM_CHANNEL: u8 = 9;

/// Microseconds per minute, the tempo numerator
const MICROS_PER_MINUTE: u32 = 60_000_000;

/// Add an interval to a pitch
///
/// Results above the note range drop by whole octaves, so the pitch class is
/// kept and distinct intervals stay distinct.
pub fn transpose(pitch: Pitch, interval: Interval) -> Pitch {
    let mut raised = pitch as u16 + interval as u16;
    if raised > MAX_PITCH as u16 {
        log::warn!("pitch {pitch} + {interval} exceeds {MAX_PITCH}, folding down");
        while raised > MAX_PITCH as u16 {
            raised -= 12;
        }
    }
    raised as Pitch
}

/// A standalone note, or the root every chord member inherits from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note {
    pub pitch: Pitch,
    pub velocity: u8,
    /// Length in ticks
    pub duration: u32,
    /// Delay in ticks before the note starts
    pub offset: u32,
    pub channel: u8,
}

impl Note {
    pub fn new(pitch: Pitch, velocity: u8, duration: u32) -> Self {
        Self {
            pitch,
            velocity,
            duration,
            offset: 0,
            channel: 0,
        }
    }
}

/// How a chord member names its pitch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberPitch {
    Absolute(Pitch),
    /// Offset from the chord root
    Interval(Interval),
}

/// A note in a chord; unset fields follow the root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChordMember {
    pub pitch: MemberPitch,
    pub velocity: Option<u8>,
    pub duration: Option<u32>,
    /// Start tick relative to the chord start
    pub offset: u32,
    pub channel: Option<u8>,
}

impl ChordMember {
    pub fn new(pitch: MemberPitch) -> Self {
        Self {
            pitch,
            velocity: None,
            duration: None,
            offset: 0,
            channel: None,
        }
    }

    pub fn absolute(pitch: Pitch) -> Self {
        Self::new(MemberPitch::Absolute(pitch))
    }

    pub fn interval(interval: Interval) -> Self {
        Self::new(MemberPitch::Interval(interval))
    }

    /// The concrete pitch against a given root
    pub fn resolve_pitch(&self, root: Pitch) -> Pitch {
        match self.pitch {
            MemberPitch::Absolute(pitch) => pitch,
            MemberPitch::Interval(interval) => transpose(root, interval),
        }
    }
}

/// Encode a note-on/note-off pair with the given leading delta
pub fn encode_note(pitch: Pitch, velocity: u8, duration: u32, offset: u32, channel: u8) -> Vec<u8> {
    let status = opcode::NOTE_ON | (channel & MAX_CHANNEL);
    let mut bytes = encode_vlq(offset);
    bytes.extend_from_slice(&[status, pitch, velocity]);
    bytes.extend(encode_vlq(duration));
    bytes.extend_from_slice(&[status, pitch, 0]);
    bytes
}

/// Encode a [`Note`] value
pub fn encode_single(note: &Note) -> Vec<u8> {
    encode_note(note.pitch, note.velocity, note.duration, note.offset, note.channel)
}

/// Encode an instrument change for a channel
pub fn encode_program_change(program: u8, offset: u32, channel: u8) -> Vec<u8> {
    let mut bytes = encode_vlq(offset);
    bytes.extend_from_slice(&[opcode::PROGRAM_CHANGE | (channel & MAX_CHANNEL), program]);
    bytes
}

/// Encode a set-tempo meta event at delta 0
///
/// # Panics
///
/// Panics if `bpm` is zero.
pub fn encode_tempo(bpm: u32) -> [u8; 7] {
    assert!(bpm > 0, "tempo must be at least 1 bpm");
    let micros = MICROS_PER_MINUTE / bpm;
    debug_assert!(micros <= 0x00FF_FFFF, "{bpm} bpm overflows the tempo field");
    let wide = be_bytes_u32(micros);
    [0x00, opcode::META, meta::TEMPO, 0x03, wide[1], wide[2], wide[3]]
}

/// One note-on (or velocity-0 note-off) at an absolute tick
#[derive(Debug, Clone, Copy)]
struct ChordEvent {
    pitch: Pitch,
    velocity: u8,
    time: u32,
    channel: u8,
}

/// Merge independently timed chord members into one event stream
///
/// The root itself is not sounded unless it is also listed as a member
/// (usually as interval 0). Its offset is ignored; members are placed by their
/// own offsets. Events sharing a tick keep the order in which their members
/// were listed, note-on before note-off for the same member.
pub fn encode_chord(root: &Note, members: &[ChordMember]) -> Vec<u8> {
    let mut events = Vec::with_capacity(members.len() * 2);
    for member in members {
        let pitch = member.resolve_pitch(root.pitch);
        let channel = member.channel.unwrap_or(root.channel) & MAX_CHANNEL;
        let start = member.offset;
        let end = start + member.duration.unwrap_or(root.duration);
        events.push(ChordEvent {
            pitch,
            velocity: member.velocity.unwrap_or(root.velocity),
            time: start,
            channel,
        });
        events.push(ChordEvent {
            pitch,
            velocity: 0,
            time: end,
            channel,
        });
    }

    // sort_by_key is stable: simultaneous events keep input order
    events.sort_by_key(|event| event.time);

    let mut bytes = Vec::with_capacity(events.len() * 4);
    let mut last_time = 0;
    for event in &events {
        bytes.extend(encode_vlq(event.time - last_time));
        bytes.extend_from_slice(&[opcode::NOTE_ON | event.channel, event.pitch, event.velocity]);
        last_time = event.time;
    }
    bytes
}
