// Note names and General MIDI instrument lookup

use std::fmt;
use std::str::FromStr;

const PITCH_CLASSES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Scientific pitch name for a MIDI note (60 = "C4", 0 = "C-1")
pub fn note_name(note: u8) -> String {
    let octave = (note / 12) as i32 - 1;
    format!("{}{}", PITCH_CLASSES[(note % 12) as usize], octave)
}

/// Instruments selectable from the customization document.
///
/// Each maps to a General MIDI program, sent to the output port when a
/// session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Instrument {
    #[default]
    Piano,
    ElectricPiano,
    Vibraphone,
    Organ,
    Guitar,
    Bass,
    Strings,
    Choir,
    Trumpet,
    Flute,
    SynthLead,
    SynthPad,
}

impl Instrument {
    pub const ALL: [Instrument; 12] = [
        Instrument::Piano,
        Instrument::ElectricPiano,
        Instrument::Vibraphone,
        Instrument::Organ,
        Instrument::Guitar,
        Instrument::Bass,
        Instrument::Strings,
        Instrument::Choir,
        Instrument::Trumpet,
        Instrument::Flute,
        Instrument::SynthLead,
        Instrument::SynthPad,
    ];

    /// General MIDI program number (0-based)
    pub fn program(&self) -> u8 {
        match self {
            Instrument::Piano => 0,
            Instrument::ElectricPiano => 4,
            Instrument::Vibraphone => 11,
            Instrument::Organ => 19,
            Instrument::Guitar => 24,
            Instrument::Bass => 32,
            Instrument::Strings => 48,
            Instrument::Choir => 52,
            Instrument::Trumpet => 56,
            Instrument::Flute => 73,
            Instrument::SynthLead => 80,
            Instrument::SynthPad => 88,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Instrument::Piano => "Piano",
            Instrument::ElectricPiano => "Electric Piano",
            Instrument::Vibraphone => "Vibraphone",
            Instrument::Organ => "Organ",
            Instrument::Guitar => "Guitar",
            Instrument::Bass => "Bass",
            Instrument::Strings => "Strings",
            Instrument::Choir => "Choir",
            Instrument::Trumpet => "Trumpet",
            Instrument::Flute => "Flute",
            Instrument::SynthLead => "Synth Lead",
            Instrument::SynthPad => "Synth Pad",
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown instrument: {0}")]
pub struct UnknownInstrument(pub String);

impl FromStr for Instrument {
    type Err = UnknownInstrument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Instrument::ALL
            .into_iter()
            .find(|instrument| instrument.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownInstrument(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_names() {
        assert_eq!(note_name(60), "C4");
        assert_eq!(note_name(0), "C-1");
        assert_eq!(note_name(36), "C2");
        assert_eq!(note_name(61), "C#4");
        assert_eq!(note_name(127), "G9");
    }

    #[test]
    fn test_instrument_parse() {
        assert_eq!("Piano".parse::<Instrument>().unwrap(), Instrument::Piano);
        assert_eq!(
            " synth pad ".parse::<Instrument>().unwrap(),
            Instrument::SynthPad
        );
        assert!("Kazoo".parse::<Instrument>().is_err());
    }

    #[test]
    fn test_instrument_names_round_trip() {
        for instrument in Instrument::ALL {
            assert_eq!(instrument.name().parse::<Instrument>().unwrap(), instrument);
            assert!(instrument.program() < 128);
        }
    }
}
