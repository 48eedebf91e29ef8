pub mod model;
pub mod scale;

pub use model::{BASELINE_NOTE, BASELINE_OCTAVE, GridError, MAX_MIDI_NOTE, NoteGrid};
pub use scale::Scale;
