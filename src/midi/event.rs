// MIDI event types exchanged with note players and recordings

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MidiEvent {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8 },
    ProgramChange { program: u8 },
}

impl MidiEvent {
    /// Encode as a channel 0 MIDI message; data bytes are masked to 7 bits
    pub fn to_bytes(&self) -> Vec<u8> {
        match *self {
            MidiEvent::NoteOn { note, velocity } => vec![0x90, note & 0x7F, velocity & 0x7F],
            MidiEvent::NoteOff { note } => vec![0x80, note & 0x7F, 0],
            MidiEvent::ProgramChange { program } => vec![0xC0, program & 0x7F],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_is_channel_zero() {
        assert_eq!(
            MidiEvent::NoteOn {
                note: 36,
                velocity: 100
            }
            .to_bytes(),
            vec![0x90, 36, 100]
        );
        assert_eq!(MidiEvent::NoteOff { note: 48 }.to_bytes(), vec![0x80, 48, 0]);
        assert_eq!(
            MidiEvent::ProgramChange { program: 40 }.to_bytes(),
            vec![0xC0, 40]
        );
    }

    #[test]
    fn test_out_of_range_data_is_masked() {
        let bytes = MidiEvent::NoteOn {
            note: 200,
            velocity: 255,
        }
        .to_bytes();
        assert!(bytes[1..].iter().all(|b| *b < 0x80));
    }

    #[test]
    fn test_take_event_json_shape() {
        let json = serde_json::to_string(&MidiEvent::NoteOff { note: 60 }).unwrap();
        assert_eq!(json, r#"{"NoteOff":{"note":60}}"#);
        let back: MidiEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, MidiEvent::NoteOff { note: 60 });
    }
}
