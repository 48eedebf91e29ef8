pub mod player;

pub use player::{DEFAULT_VELOCITY, EventLog, NotePlayer, PlayerError};
