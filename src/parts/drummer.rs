//! Percussion on the drum channel

use super::{Part, Voice};
use crate::composer::config::KitVariant;
use crate::composer::harmony::ChordQuality;
use crate::composer::instrument::drum;
use crate::composer::random::RandomSource;
use crate::smf::events::{ChordMember, MemberPitch, Pitch, MAX_VELOCITY};

const DOWNBEAT_VELOCITY: i32 = 100;
const HI_HAT_VELOCITY: i32 = 60;
const BACKBEAT_VELOCITY: i32 = 80;
/// Size of the random velocity jitter
const JITTER: u32 = 20;

/// One hit per beat: downbeat, hi-hat on the half bar, backbeat elsewhere
pub struct Drummer {
    voice: Voice,
    kit: KitVariant,
}

/// Either of two instruments with equal probability
fn pick(rng: &mut dyn RandomSource, first: Pitch, second: Pitch) -> Pitch {
    if rng.percent_chance(50) {
        first
    } else {
        second
    }
}

impl Drummer {
    pub fn new(voice: Voice, kit: KitVariant) -> Self {
        Self { voice, kit }
    }

    pub fn kit(&self) -> KitVariant {
        self.kit
    }

    /// Pick the instrument and base velocity for `beat`
    fn instrument(&self, beat: u32, rng: &mut dyn RandomSource) -> (Pitch, i32) {
        if beat == 1 {
            let pitch = match self.kit {
                KitVariant::Standard => pick(rng, drum::KICK_1, drum::KICK_2),
                KitVariant::Alternate => pick(rng, drum::CRASH_1, drum::CRASH_2),
            };
            (pitch, DOWNBEAT_VELOCITY)
        } else if beat == self.voice.time.half_bar_beat() {
            (pick(rng, drum::HI_HAT_1, drum::HI_HAT_2), HI_HAT_VELOCITY)
        } else {
            let pitch = match self.kit {
                KitVariant::Standard => pick(rng, drum::SNARE, drum::CLAP),
                KitVariant::Alternate => pick(rng, drum::TAMBOURINE, drum::COWBELL),
            };
            (pitch, BACKBEAT_VELOCITY)
        }
    }
}

impl Part for Drummer {
    fn name(&self) -> &'static str {
        "drummer"
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
        _quality: ChordQuality,
        rng: &mut dyn RandomSource,
    ) -> Vec<ChordMember> {
        let (pitch, base) = self.instrument(beat, rng);
        let jitter = rng.below(JITTER) as i32 * self.kit.sign();
        let velocity = (base + jitter).clamp(0, i32::from(MAX_VELOCITY)) as u8;
        vec![self.voice.member(
            MemberPitch::Absolute(pitch),
            Some(velocity),
            Some(self.voice.beat_ticks()),
            beat,
        )]
    }
}
