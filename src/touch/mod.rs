pub mod event;
pub mod tracker;

pub use event::{NormalizedPosition, TouchBatch, TouchContact, TouchId, TouchPhase};
pub use tracker::{ActiveTouch, SnapshotCallback, TouchTracker, TrackerSnapshot};
