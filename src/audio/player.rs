// Note player seam - everything the touch tracker sends sound to

use crate::midi::event::MidiEvent;
use std::collections::HashMap;

/// Velocity used for every touch-triggered note
pub const DEFAULT_VELOCITY: u8 = 100;

/// Errors raised while opening a note player backend
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    #[error("MIDI initialisation failed: {0}")]
    Init(String),

    #[error("No MIDI output port available")]
    NoOutputPort,

    #[error("MIDI output port not found: {0}")]
    PortNotFound(String),

    #[error("MIDI connection failed: {0}")]
    Connection(String),
}

/// Receiver of note commands.
///
/// Calls are fire-and-forget: implementations must accept a `stop_note` for
/// a note that is not sounding, and a repeated `play_note` re-triggers.
pub trait NotePlayer {
    fn play_note(&mut self, note: u8, velocity: u8);
    fn stop_note(&mut self, note: u8);

    /// Forward a MIDI event to the matching call
    fn send(&mut self, event: MidiEvent) {
        match event {
            MidiEvent::NoteOn { note, velocity } => self.play_note(note, velocity),
            MidiEvent::NoteOff { note } => self.stop_note(note),
            MidiEvent::ProgramChange { .. } => {}
        }
    }
}

impl<P: NotePlayer + ?Sized> NotePlayer for &mut P {
    fn play_note(&mut self, note: u8, velocity: u8) {
        (**self).play_note(note, velocity);
    }

    fn stop_note(&mut self, note: u8) {
        (**self).stop_note(note);
    }
}

impl<P: NotePlayer + ?Sized> NotePlayer for Box<P> {
    fn play_note(&mut self, note: u8, velocity: u8) {
        (**self).play_note(note, velocity);
    }

    fn stop_note(&mut self, note: u8) {
        (**self).stop_note(note);
    }
}

/// Player that only records the calls it receives
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<MidiEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[MidiEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn note_ons(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|event| match event {
                MidiEvent::NoteOn { note, .. } => Some(*note),
                _ => None,
            })
            .collect()
    }

    pub fn note_offs(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|event| match event {
                MidiEvent::NoteOff { note } => Some(*note),
                _ => None,
            })
            .collect()
    }

    /// Number of note-on calls not yet matched by a note-off of the same note.
    ///
    /// A note-off for a note with nothing outstanding is ignored, matching
    /// how a sampler treats a stop for a silent note.
    pub fn outstanding(&self) -> usize {
        let mut counts: HashMap<u8, usize> = HashMap::new();
        for event in &self.events {
            match event {
                MidiEvent::NoteOn { note, .. } => *counts.entry(*note).or_default() += 1,
                MidiEvent::NoteOff { note } => {
                    if let Some(count) = counts.get_mut(note) {
                        *count = count.saturating_sub(1);
                    }
                }
                MidiEvent::ProgramChange { .. } => {}
            }
        }
        counts.values().sum()
    }
}

impl NotePlayer for EventLog {
    fn play_note(&mut self, note: u8, velocity: u8) {
        self.events.push(MidiEvent::NoteOn { note, velocity });
    }

    fn stop_note(&mut self, note: u8) {
        self.events.push(MidiEvent::NoteOff { note });
    }
}
