// PadPlay - touch surface to MIDI note instrument core

pub mod audio;
pub mod config;
pub mod grid;
pub mod messaging;
pub mod midi;
pub mod recorder;
pub mod session;
pub mod touch;

// Re-export commonly used types for convenience
pub use audio::player::{DEFAULT_VELOCITY, EventLog, NotePlayer};
pub use config::Customization;
pub use grid::{GridError, NoteGrid, Scale};
pub use messaging::channels::{create_notification_channel, drain_notifications};
pub use midi::{Instrument, MidiEvent, note_name};
pub use recorder::{ExportFormat, MAX_TAKE_DURATION_MS, PerformanceRecorder, RecorderError};
pub use session::{Session, SessionCommand, SessionError};
pub use touch::{NormalizedPosition, TouchBatch, TouchContact, TouchPhase, TouchTracker, TrackerSnapshot};
