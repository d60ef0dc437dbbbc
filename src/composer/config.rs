//! Arrangement configuration and validation

use super::harmony::{interval, Mode, PitchClass};
use super::instrument::program;
use super::progression::ProgressionStyle;
use crate::error::{Error, Result};
use crate::smf::events::{Interval, Pitch, MAX_PITCH};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Slowest tempo whose microseconds-per-quarter fits the 24-bit tempo field
pub const MIN_TEMPO: u32 = 4;
pub const MAX_TEMPO: u32 = 60_000_000;
pub const MAX_BEATS: u32 = 32;
pub const MAX_OCTAVE: u8 = 8;
pub const BEAT_UNITS: [u32; 6] = [1, 2, 4, 8, 16, 32];

/// Highest interval any part sounds above the tonic: a chord on degree 8
/// carrying a melody passing tone an octave above its fifth
pub const PITCH_REACH: Interval = interval::OCTAVE + interval::PERFECT_FIFTH + interval::OCTAVE;

/// Beats per bar over the note value of one beat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeSignature {
    pub beats: u32,
    pub unit: u32,
}

impl TimeSignature {
    pub const fn new(beats: u32, unit: u32) -> Self {
        Self { beats, unit }
    }

    /// The beat that carries the secondary accent
    pub fn half_bar_beat(&self) -> u32 {
        1 + self.beats / 2
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::new(4, 4)
    }
}

impl FromStr for TimeSignature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::Config(format!("Invalid time signature: {s}"));
        let (beats, unit) = s.trim().split_once('/').ok_or_else(invalid)?;
        Ok(Self {
            beats: beats.trim().parse().map_err(|_| invalid())?,
            unit: unit.trim().parse().map_err(|_| invalid())?,
        })
    }
}

impl TryFrom<String> for TimeSignature {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<TimeSignature> for String {
    fn from(time: TimeSignature) -> Self {
        time.to_string()
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.beats, self.unit)
    }
}

/// Drum kit used by the drummer part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum KitVariant {
    /// Kicks, hi-hats, snare and clap; velocities jitter upward
    #[default]
    Standard,
    /// Crashes, hi-hats, tambourine and cowbell; velocities jitter downward
    Alternate,
}

impl KitVariant {
    /// Direction of the velocity jitter
    pub fn sign(self) -> i32 {
        match self {
            KitVariant::Standard => 1,
            KitVariant::Alternate => -1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            KitVariant::Standard => "standard",
            KitVariant::Alternate => "alternate",
        }
    }
}

impl FromStr for KitVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "standard" => Ok(KitVariant::Standard),
            "2" | "alternate" => Ok(KitVariant::Alternate),
            _ => Err(Error::Config(format!("Unknown drum kit: {s}"))),
        }
    }
}

impl TryFrom<String> for KitVariant {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<KitVariant> for String {
    fn from(kit: KitVariant) -> Self {
        kit.name().to_string()
    }
}

/// Everything needed to compose one arrangement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArrangementConfig {
    pub key: PitchClass,
    /// Octave of the tonic; 3 puts C at note 48
    pub octave: u8,
    pub mode: Mode,
    pub progression: ProgressionStyle,
    pub time_signature: TimeSignature,
    /// Beats per minute
    pub tempo: u32,
    pub bars: u32,
    pub chordal_program: u8,
    pub bass_program: u8,
    pub melody_program: u8,
    pub kit: KitVariant,
    /// Percent chance per eligible beat that the melody starts a passing-tone figure
    pub ornament_rate: u32,
    /// Percent chance that a plain melody note is silenced
    pub skip_rate: u32,
    /// Fixed seed for reproducible output; entropy when absent
    pub seed: Option<u64>,
}

impl Default for ArrangementConfig {
    fn default() -> Self {
        Self {
            key: PitchClass::C,
            octave: 3,
            mode: Mode::Major,
            progression: ProgressionStyle::Rock,
            time_signature: TimeSignature::default(),
            tempo: 150,
            bars: 12,
            chordal_program: program::PIANO,
            bass_program: program::ACOUSTIC_BASS,
            melody_program: program::SAXOPHONE,
            kit: KitVariant::Standard,
            ornament_rate: 20,
            skip_rate: 20,
            seed: None,
        }
    }
}

impl ArrangementConfig {
    /// Parse a JSON config; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Tonic note number
    pub fn tonic(&self) -> Pitch {
        self.key.pitch(self.octave)
    }

    /// Reject values the encoder or generators cannot handle
    pub fn validate(&self) -> Result<()> {
        if self.bars == 0 {
            return Err(Error::Config("bars must be at least 1".into()));
        }
        let time = self.time_signature;
        if time.beats == 0 || time.beats > MAX_BEATS {
            return Err(Error::Config(format!(
                "beats per bar must be between 1 and {MAX_BEATS}, got {}",
                time.beats
            )));
        }
        if !BEAT_UNITS.contains(&time.unit) {
            return Err(Error::Config(format!(
                "beat unit must be one of {BEAT_UNITS:?}, got {}",
                time.unit
            )));
        }
        if !(MIN_TEMPO..=MAX_TEMPO).contains(&self.tempo) {
            return Err(Error::Config(format!(
                "tempo must be between {MIN_TEMPO} and {MAX_TEMPO} bpm, got {}",
                self.tempo
            )));
        }
        if self.octave > MAX_OCTAVE {
            return Err(Error::Config(format!(
                "octave must be at most {MAX_OCTAVE}, got {}",
                self.octave
            )));
        }
        let tonic = self.tonic();
        if u16::from(tonic) + u16::from(PITCH_REACH) > u16::from(MAX_PITCH) {
            return Err(Error::Config(format!(
                "{}{} is too high: parts reach {PITCH_REACH} semitones above the tonic \
                 and the tonic must be at most {}",
                self.key,
                self.octave,
                MAX_PITCH - PITCH_REACH
            )));
        }
        for (name, rate) in [("ornament", self.ornament_rate), ("skip", self.skip_rate)] {
            if rate > 100 {
                return Err(Error::Config(format!(
                    "{name} rate must be a percentage, got {rate}"
                )));
            }
        }
        for (name, program) in [
            ("chordal", self.chordal_program),
            ("bass", self.bass_program),
            ("melody", self.melody_program),
        ] {
            if program > 127 {
                return Err(Error::Config(format!(
                    "{name} program must be at most 127, got {program}"
                )));
            }
        }
        Ok(())
    }
}
