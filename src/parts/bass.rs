//! Walking bass with nearest-tone voice leading

use super::{Part, Voice};
use crate::composer::harmony::{interval, ChordQuality};
use crate::composer::random::RandomSource;
use crate::smf::events::{transpose, ChordMember, MemberPitch, Pitch};

const VELOCITY: u8 = 120;

/// One note per bar, held for the whole bar, moving to the chord tone
/// closest to the previous one
pub struct Bass {
    voice: Voice,
    last_root: Option<Pitch>,
    last_pitch: Option<Pitch>,
}

impl Bass {
    pub fn new(voice: Voice) -> Self {
        Self {
            voice,
            last_root: None,
            last_pitch: None,
        }
    }

    /// Pitch the bass would choose over `root`, before octave folding
    ///
    /// Ties between equally distant chord tones go to the one listed first
    /// in the quality's intervals.
    fn choose(&self, root: Pitch, quality: ChordQuality) -> Pitch {
        if self.voice.final_bar {
            return root;
        }
        match (self.last_root, self.last_pitch) {
            (Some(last_root), Some(last_pitch)) if last_root == root => last_pitch,
            (_, Some(last_pitch)) => quality
                .intervals()
                .iter()
                .map(|&step| transpose(root, step))
                .min_by_key(|candidate| candidate.abs_diff(last_pitch))
                .unwrap_or(root),
            _ => root,
        }
    }
}

impl Part for Bass {
    fn name(&self) -> &'static str {
        "bass"
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
        _rng: &mut dyn RandomSource,
    ) -> Vec<ChordMember> {
        let pitch = self.choose(root, quality);
        self.last_root = Some(root);
        self.last_pitch = Some(pitch);

        if beat != 1 {
            return Vec::new();
        }

        let folded = if pitch > interval::OCTAVE {
            pitch - interval::OCTAVE
        } else {
            pitch
        };
        vec![self
            .voice
            .member(MemberPitch::Absolute(folded), Some(VELOCITY), None, beat)]
    }
}
