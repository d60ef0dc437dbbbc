//! Part generators: the players that turn a chord into timed notes

pub mod bass;
pub mod chordal;
pub mod drummer;
pub mod melody;

use crate::composer::config::{ArrangementConfig, TimeSignature};
use crate::composer::harmony::ChordQuality;
use crate::composer::random::RandomSource;
use crate::smf::codec::duration_ticks;
use crate::smf::events::{ChordMember, MemberPitch, Pitch, DRUM_CHANNEL};

/// MIDI channel assignments (zero-indexed)
pub mod channel {
    pub const CHORDAL: u8 = 1;
    pub const BASS: u8 = 2;
    pub const MELODY: u8 = 3;
    pub const DRUMS: u8 = super::DRUM_CHANNEL;
}

/// State shared by every part: where it plays and how a bar is divided
#[derive(Debug, Clone)]
pub struct Voice {
    pub channel: u8,
    pub time: TimeSignature,
    /// Ticks per quarter note
    pub division: u16,
    /// Set once the arrangement reaches its closing bar
    pub final_bar: bool,
}

impl Voice {
    pub fn new(channel: u8, time: TimeSignature, division: u16) -> Self {
        Self {
            channel,
            time,
            division,
            final_bar: false,
        }
    }

    /// Length of one beat in ticks
    pub fn beat_ticks(&self) -> u32 {
        duration_ticks(self.time.unit, false, self.division)
    }

    /// Length of one bar in ticks
    pub fn bar_ticks(&self) -> u32 {
        self.beat_ticks() * self.time.beats
    }

    /// A member on this voice's channel starting at `beat` (1-based)
    pub fn member(
        &self,
        pitch: MemberPitch,
        velocity: Option<u8>,
        duration: Option<u32>,
        beat: u32,
    ) -> ChordMember {
        ChordMember {
            pitch,
            velocity,
            duration,
            offset: self.beat_ticks() * (beat - 1),
            channel: Some(self.channel),
        }
    }
}

/// A player in the arrangement
pub trait Part {
    /// Get part name (e.g., "chordal", "bass")
    fn name(&self) -> &'static str;

    fn voice(&self) -> &Voice;

    fn voice_mut(&mut self) -> &mut Voice;

    /// Switch to closing-bar behavior
    fn enter_final_bar(&mut self) {
        self.voice_mut().final_bar = true;
    }

    /// Notes to play on one beat of a bar built on `root` and `quality`
    ///
    /// Interval pitches are relative to `root`. Default: play nothing.
    fn produce_events(
        &mut self,
        _bar: u32,
        _beat: u32,
        _root: Pitch,
        _quality: ChordQuality,
        _rng: &mut dyn RandomSource,
    ) -> Vec<ChordMember> {
        Vec::new()
    }
}

/// The four players in output order: chordal, bass, melody, drums
pub fn create_parts(config: &ArrangementConfig, division: u16) -> Vec<Box<dyn Part>> {
    let time = config.time_signature;
    vec![
        Box::new(chordal::Chordal::new(Voice::new(channel::CHORDAL, time, division))),
        Box::new(bass::Bass::new(Voice::new(channel::BASS, time, division))),
        Box::new(melody::Melody::new(
            Voice::new(channel::MELODY, time, division),
            config.ornament_rate,
            config.skip_rate,
        )),
        Box::new(drummer::Drummer::new(
            Voice::new(channel::DRUMS, time, division),
            config.kit,
        )),
    ]
}
