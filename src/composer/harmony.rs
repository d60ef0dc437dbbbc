//! Scale, mode and chord-quality tables
//!
//! Modes are rotations of one diatonic table: degree `d` in a mode reads the
//! major-scale entry at `d + rotation`, so a Dorian piece in C walks the chords
//! of C major starting from D.

use crate::error::Error;
use crate::smf::events::{Interval, Pitch, MAX_PITCH};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named semitone offsets from a root
pub mod interval {
    use crate::smf::events::Interval;

    pub const UNISON: Interval = 0;
    pub const MINOR_SECOND: Interval = 1;
    pub const MAJOR_SECOND: Interval = 2;
    pub const MINOR_THIRD: Interval = 3;
    pub const MAJOR_THIRD: Interval = 4;
    pub const PERFECT_FOURTH: Interval = 5;
    pub const TRITONE: Interval = 6;
    pub const PERFECT_FIFTH: Interval = 7;
    pub const MINOR_SIXTH: Interval = 8;
    pub const MAJOR_SIXTH: Interval = 9;
    pub const MINOR_SEVENTH: Interval = 10;
    pub const MAJOR_SEVENTH: Interval = 11;
    pub const OCTAVE: Interval = 12;
}

use interval::*;

/// Chord types, each a fixed set of intervals above its root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChordQuality {
    Major,
    Minor,
    Augmented,
    Diminished,
    MajorSeventh,
    MinorSeventh,
    DominantSeventh,
    DiminishedSeventh,
    HalfDiminishedSeventh,
}

impl ChordQuality {
    pub const ALL: [ChordQuality; 9] = [
        ChordQuality::Major,
        ChordQuality::Minor,
        ChordQuality::Augmented,
        ChordQuality::Diminished,
        ChordQuality::MajorSeventh,
        ChordQuality::MinorSeventh,
        ChordQuality::DominantSeventh,
        ChordQuality::DiminishedSeventh,
        ChordQuality::HalfDiminishedSeventh,
    ];

    /// Chord tones in ascending order, starting with the root
    pub fn intervals(self) -> &'static [Interval] {
        match self {
            ChordQuality::Major => &[UNISON, MAJOR_THIRD, PERFECT_FIFTH],
            ChordQuality::Minor => &[UNISON, MINOR_THIRD, PERFECT_FIFTH],
            ChordQuality::Augmented => &[UNISON, MAJOR_THIRD, MINOR_SIXTH],
            ChordQuality::Diminished => &[UNISON, MINOR_THIRD, TRITONE],
            ChordQuality::MajorSeventh => &[UNISON, MAJOR_THIRD, PERFECT_FIFTH, MAJOR_SEVENTH],
            ChordQuality::MinorSeventh => &[UNISON, MINOR_THIRD, PERFECT_FIFTH, MINOR_SEVENTH],
            ChordQuality::DominantSeventh => &[UNISON, MAJOR_THIRD, PERFECT_FIFTH, MINOR_SEVENTH],
            ChordQuality::DiminishedSeventh => &[UNISON, MINOR_THIRD, TRITONE, MAJOR_SIXTH],
            ChordQuality::HalfDiminishedSeventh => {
                &[UNISON, MINOR_THIRD, TRITONE, MINOR_SEVENTH]
            }
        }
    }

    /// Diminished family: resolves upward by step in rock progressions
    pub fn is_diminished(self) -> bool {
        matches!(
            self,
            ChordQuality::Diminished
                | ChordQuality::DiminishedSeventh
                | ChordQuality::HalfDiminishedSeventh
        )
    }

    /// Chord symbol suffix
    pub fn symbol(self) -> &'static str {
        match self {
            ChordQuality::Major => "",
            ChordQuality::Minor => "m",
            ChordQuality::Augmented => "+",
            ChordQuality::Diminished => "°",
            ChordQuality::MajorSeventh => "maj7",
            ChordQuality::MinorSeventh => "m7",
            ChordQuality::DominantSeventh => "7",
            ChordQuality::DiminishedSeventh => "°7",
            ChordQuality::HalfDiminishedSeventh => "ø7",
        }
    }
}

/// Interval from the tonic for each major-scale degree; degree 8 is the octave
pub const SCALE_INTERVALS: [Interval; 8] = [
    UNISON,
    MAJOR_SECOND,
    MAJOR_THIRD,
    PERFECT_FOURTH,
    PERFECT_FIFTH,
    MAJOR_SIXTH,
    MAJOR_SEVENTH,
    OCTAVE,
];

/// Diatonic triad built on each major-scale degree
pub const SCALE_QUALITIES: [ChordQuality; 8] = [
    ChordQuality::Major,
    ChordQuality::Minor,
    ChordQuality::Minor,
    ChordQuality::Major,
    ChordQuality::Major,
    ChordQuality::Minor,
    ChordQuality::Diminished,
    ChordQuality::Major,
];

/// The seven diatonic modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Mode {
    Major,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Minor,
    Locrian,
}

impl Mode {
    pub const ALL: [Mode; 7] = [
        Mode::Major,
        Mode::Dorian,
        Mode::Phrygian,
        Mode::Lydian,
        Mode::Mixolydian,
        Mode::Minor,
        Mode::Locrian,
    ];

    /// Offset into the degree tables
    pub fn rotation(self) -> i32 {
        match self {
            Mode::Major => 0,
            Mode::Dorian => 1,
            Mode::Phrygian => 2,
            Mode::Lydian => 3,
            Mode::Mixolydian => 4,
            Mode::Minor => 5,
            Mode::Locrian => 6,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Major => "Major",
            Mode::Dorian => "Dorian",
            Mode::Phrygian => "Phrygian",
            Mode::Lydian => "Lydian",
            Mode::Mixolydian => "Mixolydian",
            Mode::Minor => "Minor",
            Mode::Locrian => "Locrian",
        }
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let mode = match lower.as_str() {
            "major" | "ionian" => Mode::Major,
            "dorian" => Mode::Dorian,
            "phrygian" => Mode::Phrygian,
            "lydian" => Mode::Lydian,
            "mixolydian" => Mode::Mixolydian,
            "minor" | "aeolian" => Mode::Minor,
            "locrian" => Mode::Locrian,
            _ => return Err(Error::UnknownMode(s.to_string())),
        };
        Ok(mode)
    }
}

impl TryFrom<String> for Mode {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Mode> for String {
    fn from(mode: Mode) -> Self {
        mode.name().to_string()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Normalize a scale degree into 1..=8 by steps of 7
///
/// Degree 8 is kept as-is (the octave), so the result is not a plain modulo.
pub fn clamp_degree(degree: i32) -> i32 {
    let mut degree = degree;
    while degree < 1 {
        degree += 7;
    }
    while degree > 8 {
        degree -= 7;
    }
    degree
}

fn table_index(mode: Mode, degree: i32) -> usize {
    (clamp_degree(degree + mode.rotation()) - 1) as usize
}

/// Interval from the tonic to the root of `degree` in `mode`
pub fn degree_interval(mode: Mode, degree: i32) -> Interval {
    SCALE_INTERVALS[table_index(mode, degree)]
}

/// Natural chord quality on `degree` in `mode`
pub fn degree_quality(mode: Mode, degree: i32) -> ChordQuality {
    SCALE_QUALITIES[table_index(mode, degree)]
}

/// The twelve pitch classes, spelled with sharps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl PitchClass {
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    /// Semitones above C
    pub fn semitone(self) -> u8 {
        self as u8
    }

    /// Note number in the given octave, where C of octave 4 is 60
    ///
    /// Saturates at 127 for pitches past G9.
    pub fn pitch(self, octave: u8) -> Pitch {
        let value = 12 * (octave as u16 + 1) + self.semitone() as u16;
        value.min(MAX_PITCH as u16) as Pitch
    }

    pub fn name(self) -> &'static str {
        const NAMES: [&str; 12] = [
            "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
        ];
        NAMES[self as usize]
    }

    fn from_semitone(semitone: i32) -> PitchClass {
        PitchClass::ALL[semitone.rem_euclid(12) as usize]
    }
}

impl FromStr for PitchClass {
    type Err = Error;

    /// Accepts a letter followed by optional `#`/`♯`/`b`/`♭` accidentals
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || Error::UnknownKey(s.to_string());
        let mut chars = s.trim().chars();
        let letter = chars.next().ok_or_else(unknown)?;
        let mut semitone: i32 = match letter.to_ascii_uppercase() {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return Err(unknown()),
        };
        for accidental in chars {
            match accidental {
                '#' | '♯' => semitone += 1,
                'b' | '♭' => semitone -= 1,
                _ => return Err(unknown()),
            }
        }
        Ok(PitchClass::from_semitone(semitone))
    }
}

impl TryFrom<String> for PitchClass {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PitchClass> for String {
    fn from(pc: PitchClass) -> Self {
        pc.name().to_string()
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Human-readable name of a note number, e.g. `C3` for 48
pub fn pitch_name(pitch: Pitch) -> String {
    let octave = pitch as i32 / 12 - 1;
    format!("{}{}", PitchClass::from_semitone(pitch as i32), octave)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_intervals_sorted() {
        for quality in ChordQuality::ALL {
            let intervals = quality.intervals();
            assert_eq!(intervals[0], UNISON);
            assert!(intervals.windows(2).all(|w| w[0] < w[1]), "{quality:?}");
        }
        assert_eq!(ChordQuality::Major.intervals(), &[0, 4, 7]);
        assert_eq!(ChordQuality::HalfDiminishedSeventh.intervals(), &[0, 3, 6, 10]);
    }

    #[test]
    fn test_clamp_degree_range_and_idempotence() {
        for degree in -50..=50 {
            let clamped = clamp_degree(degree);
            assert!((1..=8).contains(&clamped), "{degree} -> {clamped}");
            assert_eq!(clamp_degree(clamped), clamped);
        }
        assert_eq!(clamp_degree(8), 8);
        assert_eq!(clamp_degree(9), 2);
        assert_eq!(clamp_degree(0), 7);
        assert_eq!(clamp_degree(-3), 4);
    }

    #[test]
    fn test_major_degrees() {
        assert_eq!(degree_interval(Mode::Major, 1), UNISON);
        assert_eq!(degree_interval(Mode::Major, 5), PERFECT_FIFTH);
        assert_eq!(degree_quality(Mode::Major, 5), ChordQuality::Major);
        assert_eq!(degree_quality(Mode::Major, 7), ChordQuality::Diminished);
        assert_eq!(degree_interval(Mode::Major, 8), OCTAVE);
    }

    #[test]
    fn test_mode_rotation() {
        // Minor starts on the sixth degree of the parent major scale
        assert_eq!(degree_interval(Mode::Minor, 1), MAJOR_SIXTH);
        assert_eq!(degree_quality(Mode::Minor, 1), ChordQuality::Minor);
        assert_eq!(degree_interval(Mode::Dorian, 1), MAJOR_SECOND);
        assert_eq!(degree_quality(Mode::Locrian, 1), ChordQuality::Diminished);
        // 5 + 5 = 10 wraps to degree 3
        assert_eq!(degree_interval(Mode::Minor, 5), MAJOR_THIRD);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Major".parse::<Mode>().unwrap(), Mode::Major);
        assert_eq!("aeolian".parse::<Mode>().unwrap(), Mode::Minor);
        assert_eq!(" LYDIAN ".parse::<Mode>().unwrap(), Mode::Lydian);
        assert!(matches!("blues".parse::<Mode>(), Err(Error::UnknownMode(_))));
        for mode in Mode::ALL {
            assert_eq!(mode.to_string().parse::<Mode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_pitch_class_parsing() {
        assert_eq!("C".parse::<PitchClass>().unwrap(), PitchClass::C);
        assert_eq!("c#".parse::<PitchClass>().unwrap(), PitchClass::CSharp);
        assert_eq!("C♯".parse::<PitchClass>().unwrap(), PitchClass::CSharp);
        assert_eq!("Db".parse::<PitchClass>().unwrap(), PitchClass::CSharp);
        assert_eq!("E♭".parse::<PitchClass>().unwrap(), PitchClass::DSharp);
        assert_eq!("Cb".parse::<PitchClass>().unwrap(), PitchClass::B);
        assert!(matches!("H".parse::<PitchClass>(), Err(Error::UnknownKey(_))));
        assert!("".parse::<PitchClass>().is_err());
        assert!("C+".parse::<PitchClass>().is_err());
    }

    #[test]
    fn test_pitch_class_pitch() {
        assert_eq!(PitchClass::C.pitch(3), 48);
        assert_eq!(PitchClass::A.pitch(4), 69);
        assert_eq!(PitchClass::C.pitch(0), 12);
        assert_eq!(PitchClass::B.pitch(9), MAX_PITCH);
    }

    #[test]
    fn test_pitch_name() {
        assert_eq!(pitch_name(48), "C3");
        assert_eq!(pitch_name(61), "C#4");
        assert_eq!(pitch_name(0), "C-1");
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Mode::Mixolydian).unwrap();
        assert_eq!(json, "\"Mixolydian\"");
        let pc: PitchClass = serde_json::from_str("\"F#\"").unwrap();
        assert_eq!(pc, PitchClass::FSharp);
        assert!(serde_json::from_str::<PitchClass>("\"X\"").is_err());
    }
}
