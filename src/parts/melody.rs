//! Melody line with passing-tone ornaments

use super::{Part, Voice};
use crate::composer::harmony::{interval, ChordQuality, SCALE_INTERVALS};
use crate::composer::random::RandomSource;
use crate::smf::events::{transpose, ChordMember, Interval, MemberPitch, Pitch, MAX_VELOCITY};

const ACCENT_VELOCITY: u8 = 80;
const SOFT_VELOCITY: u8 = 60;
/// Random reduction applied to a plain note's base velocity
const VELOCITY_SPREAD: u32 = 40;

/// Ornament progress between beats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ornament {
    Idle,
    /// The first outer tone has sounded; the passing tone comes next
    Holding { mid: Interval, end: Interval },
    /// The passing tone has sounded; the second outer tone comes next
    Resolving { end: Interval },
}

/// Plays one chord tone per beat, sometimes bridging two tones with a
/// three-beat passing figure
pub struct Melody {
    voice: Voice,
    ornament_rate: u32,
    skip_rate: u32,
    ornament: Ornament,
}

/// Diatonic tone strictly between `lower` and `upper`, at least a semitone
/// away from each; the octave above `lower` when none fits
fn passing_tone(lower: Interval, upper: Interval) -> Interval {
    SCALE_INTERVALS
        .iter()
        .rev()
        .find(|&&tone| tone > lower + 1 && tone + 1 < upper)
        .copied()
        .unwrap_or(lower + interval::OCTAVE)
}

impl Melody {
    pub fn new(voice: Voice, ornament_rate: u32, skip_rate: u32) -> Self {
        Self {
            voice,
            ornament_rate,
            skip_rate,
            ornament: Ornament::Idle,
        }
    }

    fn note(&self, interval: Interval, velocity: u8, beat: u32) -> ChordMember {
        self.voice.member(
            MemberPitch::Interval(interval),
            Some(velocity),
            Some(self.voice.beat_ticks()),
            beat,
        )
    }

    /// Closing note: the root, possibly an octave up, possibly folded back
    fn final_note(&self, root: Pitch, beat: u32, rng: &mut dyn RandomSource) -> ChordMember {
        let mut pitch = root;
        if rng.percent_chance(50) {
            pitch = transpose(pitch, interval::OCTAVE);
        }
        if rng.percent_chance(50) && pitch > interval::OCTAVE {
            pitch -= interval::OCTAVE;
        }
        self.voice
            .member(MemberPitch::Absolute(pitch), Some(SOFT_VELOCITY), None, beat)
    }

    /// Start a passing figure over an adjacent pair of chord tones
    fn begin_ornament(
        &mut self,
        quality: ChordQuality,
        beat: u32,
        rng: &mut dyn RandomSource,
    ) -> ChordMember {
        let tones = quality.intervals();
        let ascending = rng.percent_chance(50);
        let lower_idx = rng.below(tones.len() as u32 - 1) as usize;
        let (lower, upper) = (tones[lower_idx], tones[lower_idx + 1]);
        let mid = passing_tone(lower, upper);

        let (start, end) = if ascending {
            (lower, upper)
        } else {
            (upper, lower)
        };
        log::trace!("melody ornament {start} -> {mid} -> {end} at beat {beat}");
        self.ornament = Ornament::Holding { mid, end };
        self.note(start, ACCENT_VELOCITY, beat)
    }

    /// An ordinary chord tone with accent-dependent velocity, or a rest
    fn plain_note(
        &self,
        quality: ChordQuality,
        beat: u32,
        rng: &mut dyn RandomSource,
    ) -> ChordMember {
        let mut velocity = u32::from(ACCENT_VELOCITY) - rng.below(VELOCITY_SPREAD);
        if beat % 2 != 0 {
            velocity += 20;
        }
        if beat == 1 {
            velocity += 20;
        }
        if beat == self.voice.time.half_bar_beat() {
            velocity += 10;
        }
        if rng.percent_chance(self.skip_rate) {
            velocity = 0;
        }

        let tones = quality.intervals();
        let tone = tones[rng.below(tones.len() as u32) as usize];
        self.note(tone, velocity.min(u32::from(MAX_VELOCITY)) as u8, beat)
    }
}

impl Part for Melody {
    fn name(&self) -> &'static str {
        "melody"
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
        root: Pitch,
        quality: ChordQuality,
        rng: &mut dyn RandomSource,
    ) -> Vec<ChordMember> {
        if self.voice.final_bar {
            if beat != 1 {
                return Vec::new();
            }
            return vec![self.final_note(root, beat, rng)];
        }

        let member = match self.ornament {
            Ornament::Holding { mid, end } => {
                self.ornament = Ornament::Resolving { end };
                self.note(mid, SOFT_VELOCITY, beat)
            }
            Ornament::Resolving { end } => {
                self.ornament = Ornament::Idle;
                self.note(end, SOFT_VELOCITY, beat)
            }
            Ornament::Idle
                if beat + 2 <= self.voice.time.beats
                    && rng.percent_chance(self.ornament_rate) =>
            {
                self.begin_ornament(quality, beat, rng)
            }
            Ornament::Idle => self.plain_note(quality, beat, rng),
        };
        vec![member]
    }
}
