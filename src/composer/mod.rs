//! Composer - walks a chord progression and drives the part generators
//!
//! One call produces a complete format 0 file: a tempo event, program
//! changes for the pitched parts, then one merged chord per bar.

pub mod config;
pub mod harmony;
pub mod instrument;
pub mod progression;
pub mod random;

pub use config::{ArrangementConfig, KitVariant, TimeSignature};
pub use harmony::{ChordQuality, Mode, PitchClass};
pub use progression::{ChordGenerator, ProgressionStyle};
pub use random::{RandomSource, ScriptedRandom, SeededRandom};

use crate::error::Result;
use crate::parts::{channel, create_parts, Part};
use crate::smf::codec::duration_ticks;
use crate::smf::events::{transpose, ChordMember, Note, Pitch};
use crate::smf::header::DEFAULT_DIVISION;
use crate::smf::SmfWriter;
use harmony::{degree_interval, degree_quality, pitch_name};
use std::path::Path;

/// Generates arrangements from one configuration
pub struct Composer {
    config: ArrangementConfig,
    /// Chord chart of the last generated arrangement, one entry per bar
    chords: Vec<(Pitch, ChordQuality)>,
}

impl Composer {
    pub fn new(config: ArrangementConfig) -> Self {
        Self {
            config,
            chords: Vec::new(),
        }
    }

    pub fn config(&self) -> &ArrangementConfig {
        &self.config
    }

    /// Root and quality of every bar from the last generation
    pub fn chords(&self) -> &[(Pitch, ChordQuality)] {
        &self.chords
    }

    /// Build the track contents (without chunk framing) using `rng`
    pub fn generate(&mut self, rng: &mut dyn RandomSource) -> Result<Vec<u8>> {
        let mut writer = SmfWriter::with_division(DEFAULT_DIVISION);
        self.write_arrangement(&mut writer, rng)?;
        Ok(writer.contents().to_vec())
    }

    /// Build a complete file, seeding from the config or from entropy
    pub fn compose(&mut self) -> Result<Vec<u8>> {
        let mut rng = SeededRandom::new(self.config.seed);
        let mut writer = SmfWriter::with_division(DEFAULT_DIVISION);
        self.write_arrangement(&mut writer, &mut rng)?;
        Ok(writer.finish())
    }

    /// Compose and store the file at `path`
    pub fn compose_file(&mut self, path: &Path) -> Result<()> {
        let bytes = self.compose()?;
        std::fs::write(path, bytes)?;
        log::info!("Wrote {}", path.display());
        Ok(())
    }

    fn write_arrangement(
        &mut self,
        writer: &mut SmfWriter,
        rng: &mut dyn RandomSource,
    ) -> Result<()> {
        let config = &self.config;
        config.validate()?;

        let tonic = config.tonic();
        let time = config.time_signature;
        let beat_ticks = duration_ticks(time.unit, false, writer.division());
        let bar_ticks = beat_ticks * time.beats;

        writer.write_tempo(config.tempo);
        writer.write_program_change(config.chordal_program, channel::CHORDAL);
        writer.write_program_change(config.bass_program, channel::BASS);
        writer.write_program_change(config.melody_program, channel::MELODY);

        let mut generator = ChordGenerator::new(tonic, config.mode, config.progression);
        let mut parts = create_parts(config, writer.division());
        let mut chords = Vec::with_capacity(config.bars as usize);

        for bar in 1..=config.bars {
            let (root, quality) = if bar == config.bars {
                for part in parts.iter_mut() {
                    part.enter_final_bar();
                }
                (
                    transpose(tonic, degree_interval(config.mode, 1)),
                    degree_quality(config.mode, 1),
                )
            } else if bar + 1 == config.bars {
                (
                    transpose(tonic, degree_interval(config.mode, 5)),
                    ChordQuality::DominantSeventh,
                )
            } else {
                generator.advance(rng)
            };
            log::debug!("bar {bar}: {}{}", pitch_name(root), quality.symbol());

            let members = play_bar(&mut parts, bar, time.beats, root, quality, rng);
            writer.write_chord(&Note::new(root, 0, bar_ticks), &members);
            chords.push((root, quality));
        }

        log::info!(
            "Composed {} bars of {} {} ({}, {time}) at {} bpm",
            config.bars,
            config.key,
            config.mode,
            config.progression,
            config.tempo
        );
        self.chords = chords;
        Ok(())
    }
}

/// Collect every part's members for one bar, beat by beat
fn play_bar(
    parts: &mut [Box<dyn Part>],
    bar: u32,
    beats: u32,
    root: Pitch,
    quality: ChordQuality,
    rng: &mut dyn RandomSource,
) -> Vec<ChordMember> {
    let mut members = Vec::new();
    for beat in 1..=beats {
        for part in parts.iter_mut() {
            members.extend(part.produce_events(bar, beat, root, quality, rng));
        }
    }
    members
}
