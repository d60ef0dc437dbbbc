//! General MIDI program and percussion numbers

use crate::error::{Error, Result};

/// Program numbers written in program-change events
pub mod program {
    pub const PIANO: u8 = 1;
    pub const ELECTRIC_PIANO: u8 = 5;

    pub const SAXOPHONE: u8 = 67;
    pub const TRUMPET: u8 = 57;
    pub const SQUARE_LEAD: u8 = 81;

    pub const ACOUSTIC_BASS: u8 = 33;
    pub const ELECTRIC_BASS: u8 = 34;
    pub const CELLO: u8 = 43;
}

/// Percussion key numbers on the drum channel
pub mod drum {
    pub const KICK_1: u8 = 35;
    pub const KICK_2: u8 = 36;
    pub const SNARE: u8 = 38;
    pub const CLAP: u8 = 39;
    pub const HI_HAT_1: u8 = 42;
    pub const HI_HAT_2: u8 = 46;
    pub const CRASH_1: u8 = 49;
    pub const CRASH_2: u8 = 57;
    pub const TAMBOURINE: u8 = 54;
    pub const COWBELL: u8 = 56;
}

/// Named instruments accepted on the command line and in config files
const NAMED_PROGRAMS: [(&str, u8); 8] = [
    ("piano", program::PIANO),
    ("electric-piano", program::ELECTRIC_PIANO),
    ("saxophone", program::SAXOPHONE),
    ("trumpet", program::TRUMPET),
    ("square-lead", program::SQUARE_LEAD),
    ("acoustic-bass", program::ACOUSTIC_BASS),
    ("electric-bass", program::ELECTRIC_BASS),
    ("cello", program::CELLO),
];

/// Look up a program by name or by number (0-127)
///
/// Names are case-insensitive; spaces and underscores count as hyphens.
pub fn program_by_name(name: &str) -> Result<u8> {
    let trimmed = name.trim();
    if let Ok(number) = trimmed.parse::<u8>() {
        if number <= 127 {
            return Ok(number);
        }
        return Err(Error::UnknownInstrument(name.to_string()));
    }

    let normalized = trimmed.to_ascii_lowercase().replace([' ', '_'], "-");
    NAMED_PROGRAMS
        .iter()
        .find(|(candidate, _)| *candidate == normalized)
        .map(|(_, program)| *program)
        .ok_or_else(|| Error::UnknownInstrument(name.to_string()))
}

/// List all named instruments with their program numbers
pub fn list_instruments() -> Vec<(&'static str, u8)> {
    NAMED_PROGRAMS.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_by_name() {
        assert_eq!(program_by_name("piano").unwrap(), program::PIANO);
        assert_eq!(program_by_name("Electric Piano").unwrap(), program::ELECTRIC_PIANO);
        assert_eq!(program_by_name("square_lead").unwrap(), program::SQUARE_LEAD);
        assert_eq!(program_by_name(" CELLO ").unwrap(), program::CELLO);
    }

    #[test]
    fn test_program_by_number() {
        assert_eq!(program_by_name("0").unwrap(), 0);
        assert_eq!(program_by_name("127").unwrap(), 127);
        assert!(program_by_name("128").is_err());
        assert!(program_by_name("300").is_err());
    }

    #[test]
    fn test_unknown_instrument() {
        assert!(matches!(
            program_by_name("theremin"),
            Err(Error::UnknownInstrument(name)) if name == "theremin"
        ));
    }

    #[test]
    fn test_list_instruments() {
        let names: Vec<_> = list_instruments().into_iter().map(|(n, _)| n).collect();
        assert!(names.contains(&"saxophone"));
        assert_eq!(names.len(), 8);
    }
}
