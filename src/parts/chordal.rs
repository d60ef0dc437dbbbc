//! Block-chord accompaniment

use super::{Part, Voice};
use crate::composer::harmony::ChordQuality;
use crate::composer::random::RandomSource;
use crate::smf::events::{ChordMember, MemberPitch, Pitch};

const DOWNBEAT_VELOCITY: u8 = 80;
const HALF_BAR_VELOCITY: u8 = 70;
const OFFBEAT_VELOCITY: u8 = 60;

/// Sounds every chord tone on every beat
pub struct Chordal {
    voice: Voice,
}

impl Chordal {
    pub fn new(voice: Voice) -> Self {
        Self { voice }
    }

    fn velocity(&self, beat: u32) -> u8 {
        if beat == 1 {
            DOWNBEAT_VELOCITY
        } else if beat == self.voice.time.half_bar_beat() {
            HALF_BAR_VELOCITY
        } else {
            OFFBEAT_VELOCITY
        }
    }
}

impl Part for Chordal {
    fn name(&self) -> &'static str {
        "chordal"
    }

    fn voice(&self) -> &Voice {
        &self.voice
    }

    fn voice_mut(&mut self) -> &mut Voice {
        &mut self.voice
    }

    fn produce_events(
        &mut self,
        _bar: u32,
        beat: u32,
        _root: Pitch,
        quality: ChordQuality,
        _rng: &mut dyn RandomSource,
    ) -> Vec<ChordMember> {
        // The closing chord is struck once and rings for the whole bar
        let duration = if self.voice.final_bar {
            if beat != 1 {
                return Vec::new();
            }
            None
        } else {
            Some(self.voice.beat_ticks())
        };

        let velocity = self.velocity(beat);
        quality
            .intervals()
            .iter()
            .map(|&interval| {
                self.voice
                    .member(MemberPitch::Interval(interval), Some(velocity), duration, beat)
            })
            .collect()
    }
}
