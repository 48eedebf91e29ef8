pub mod device;
pub mod event;
pub mod names;
pub mod output;

pub use event::MidiEvent;
pub use names::{Instrument, note_name};
