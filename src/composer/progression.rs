//! Chord progression state machine

use super::harmony::{clamp_degree, degree_interval, degree_quality, ChordQuality, Mode};
use super::random::RandomSource;
use crate::error::Error;
use crate::smf::events::{transpose, Pitch};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Policy for choosing the next chord
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ProgressionStyle {
    /// Step up one degree per bar
    Ascending,
    /// Descend by fifths, sometimes as dominant sevenths
    Circle,
    /// Weighted walk over common pop/rock motions
    Rock,
}

impl ProgressionStyle {
    pub const ALL: [ProgressionStyle; 3] = [
        ProgressionStyle::Ascending,
        ProgressionStyle::Circle,
        ProgressionStyle::Rock,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ProgressionStyle::Ascending => "Ascending",
            ProgressionStyle::Circle => "Circle",
            ProgressionStyle::Rock => "Rock",
        }
    }
}

impl FromStr for ProgressionStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ascending" => Ok(ProgressionStyle::Ascending),
            "circle" => Ok(ProgressionStyle::Circle),
            "rock" => Ok(ProgressionStyle::Rock),
            _ => Err(Error::UnknownProgression(s.to_string())),
        }
    }
}

impl TryFrom<String> for ProgressionStyle {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ProgressionStyle> for String {
    fn from(style: ProgressionStyle) -> Self {
        style.name().to_string()
    }
}

impl fmt::Display for ProgressionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rock successors per degree as (cumulative threshold out of 100, next degree)
///
/// A draw in 0..100 picks the first entry whose threshold exceeds it. Degree
/// 4 has no route to degree 2: that successor sat behind a second `< 20` test
/// and could never fire, so it is left out.
fn rock_successors(degree: i32) -> &'static [(u32, i32)] {
    match degree {
        1 | 8 => &[(33, 2), (67, 4), (100, 6)],
        2 => &[(20, 4), (100, 5)],
        3 => &[(50, 4), (100, 6)],
        4 => &[(20, 6), (30, 1), (100, 5)],
        5 => &[(20, 6), (100, 1)],
        6 => &[(15, 7), (70, 2), (100, 4)],
        7 => &[(70, 1), (80, 3), (100, 4)],
        _ => &[(100, 1)],
    }
}

/// Walks scale degrees and reports one chord per call
#[derive(Debug, Clone)]
pub struct ChordGenerator {
    tonic: Pitch,
    mode: Mode,
    style: ProgressionStyle,
    degree: i32,
    quality: ChordQuality,
}

impl ChordGenerator {
    /// Start on degree 1 with its natural quality
    pub fn new(tonic: Pitch, mode: Mode, style: ProgressionStyle) -> Self {
        Self {
            tonic,
            mode,
            style,
            degree: 1,
            quality: degree_quality(mode, 1),
        }
    }

    /// Current scale degree, always in 1..=8
    pub fn degree(&self) -> i32 {
        self.degree
    }

    /// Quality of the chord the next call will report
    pub fn quality(&self) -> ChordQuality {
        self.quality
    }

    pub fn style(&self) -> ProgressionStyle {
        self.style
    }

    /// Root pitch of the current degree
    pub fn root(&self) -> Pitch {
        transpose(self.tonic, degree_interval(self.mode, self.degree))
    }

    /// Natural quality of the current degree
    fn natural(&self) -> ChordQuality {
        degree_quality(self.mode, self.degree)
    }

    /// Report the current chord, then move to the next one
    pub fn advance(&mut self, rng: &mut dyn RandomSource) -> (Pitch, ChordQuality) {
        let current = (self.root(), self.quality);

        match self.style {
            ProgressionStyle::Ascending => {
                self.degree += 1;
                self.quality = self.natural();
            }
            ProgressionStyle::Circle => {
                self.degree -= 4;
                self.quality = if rng.percent_chance(50) {
                    ChordQuality::DominantSeventh
                } else {
                    self.natural()
                };
            }
            ProgressionStyle::Rock => self.advance_rock(rng),
        }

        self.degree = clamp_degree(self.degree);
        current
    }

    fn advance_rock(&mut self, rng: &mut dyn RandomSource) {
        if self.quality == ChordQuality::DominantSeventh {
            self.degree -= 4;
        } else if self.quality.is_diminished() {
            self.degree += 1;
        } else {
            let draw = rng.below(100);
            let successors = rock_successors(clamp_degree(self.degree));
            self.degree = successors
                .iter()
                .find(|(threshold, _)| draw < *threshold)
                .map_or(1, |(_, next)| *next);
        }
        self.quality = self.natural();
    }
}
