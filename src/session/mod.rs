// Session - grid, touch tracker and recorder wired together for one front-end

use crate::audio::player::NotePlayer;
use crate::config::{ConfigError, Customization};
use crate::grid::model::NoteGrid;
use crate::messaging::channels::NotificationProducer;
use crate::messaging::notification::Notification;
use crate::midi::names::Instrument;
use crate::recorder::{ExportFormat, PerformanceRecorder, RecorderError, RecordingTap};
use crate::touch::event::{TouchBatch, TouchId};
use crate::touch::tracker::{TouchTracker, TrackerSnapshot};
use std::path::{Path, PathBuf};

/// User actions coming from buttons or shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    OctaveUp,
    OctaveDown,
    SemitoneUp,
    SemitoneDown,
    ToggleRecording,
    StopPlayback,
    ReleaseAll,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Recorder(#[from] RecorderError),
}

pub struct Session<K, P> {
    tracker: TouchTracker<K, RecordingTap<P>>,
    recorder: PerformanceRecorder,
    instrument: Instrument,
    notifications: Option<NotificationProducer>,
}

impl<K: TouchId, P: NotePlayer> Session<K, P> {
    pub fn new(grid: NoteGrid, player: P, recorder: PerformanceRecorder) -> Self {
        let tracker = TouchTracker::new(grid, recorder.tap(player));
        Self {
            tracker,
            recorder,
            instrument: Instrument::default(),
            notifications: None,
        }
    }

    pub fn from_config<D: AsRef<Path>>(
        config: &Customization,
        player: P,
        scratch_dir: D,
    ) -> Result<Self, SessionError> {
        let grid = config.to_grid()?;
        let mut session = Self::new(grid, player, PerformanceRecorder::new(scratch_dir));
        session.instrument = config.instrument()?;
        Ok(session)
    }

    pub fn with_notifications(mut self, notifications: NotificationProducer) -> Self {
        self.notifications = Some(notifications);
        self
    }

    pub fn grid(&self) -> &NoteGrid {
        self.tracker.grid()
    }

    pub fn instrument(&self) -> Instrument {
        self.instrument
    }

    pub fn tracker(&self) -> &TouchTracker<K, RecordingTap<P>> {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut TouchTracker<K, RecordingTap<P>> {
        &mut self.tracker
    }

    pub fn recorder(&self) -> &PerformanceRecorder {
        &self.recorder
    }

    pub fn player(&self) -> &P {
        self.tracker.player().inner()
    }

    pub fn handle_touches(&mut self, batch: &TouchBatch<K>) -> TrackerSnapshot {
        self.tracker.handle_batch(batch)
    }

    pub fn apply(&mut self, command: SessionCommand) -> Result<(), SessionError> {
        match command {
            SessionCommand::OctaveUp => self.transpose(NoteGrid::increment_octave),
            SessionCommand::OctaveDown => self.transpose(NoteGrid::decrement_octave),
            SessionCommand::SemitoneUp => self.transpose(NoteGrid::increment_base_note),
            SessionCommand::SemitoneDown => self.transpose(NoteGrid::decrement_base_note),
            SessionCommand::ToggleRecording => {
                if self.recorder.is_recording() {
                    let result = self.recorder.stop_recording();
                    self.report(result, |_| "Recording stopped".to_string())?;
                } else {
                    let result = self.recorder.start_recording();
                    self.report(result, |_| "Recording started".to_string())?;
                }
            }
            SessionCommand::StopPlayback => self.recorder.stop_playback(),
            SessionCommand::ReleaseAll => {
                self.tracker.release_all();
            }
        }
        Ok(())
    }

    pub fn start_playback<Q, F>(&mut self, player: Q, on_complete: F) -> Result<(), SessionError>
    where
        Q: NotePlayer + Send + 'static,
        F: FnOnce() + Send + 'static,
    {
        let result = self.recorder.playback_recording(player, on_complete);
        Ok(self.report(result, |_| "Playback started".to_string())?)
    }

    pub fn export_recording<D: AsRef<Path>>(
        &mut self,
        dest: D,
        format: ExportFormat,
    ) -> Result<PathBuf, SessionError> {
        let result = self.recorder.export_recording(dest, format);
        Ok(self.report(result, |path| {
            format!("Recording exported to {}", path.display())
        })?)
    }

    fn transpose(&mut self, f: fn(&NoteGrid) -> NoteGrid) {
        let next = f(self.tracker.grid());
        log::debug!(
            "Grid transposed: octave {} -> {}",
            self.tracker.grid().base_octave(),
            next.base_octave()
        );
        self.tracker.set_grid(next);
    }

    /// Push an info line for success or the error onto the notification channel,
    /// then hand the result back
    fn report<T>(
        &mut self,
        result: Result<T, RecorderError>,
        success: impl FnOnce(&T) -> String,
    ) -> Result<T, RecorderError> {
        let notification = match &result {
            Ok(value) => Notification::info(success(value)),
            Err(e) => {
                log::error!("Recorder error: {}", e);
                Notification::error(e.to_string())
            }
        };

        if let Some(tx) = self.notifications.as_mut() {
            if ringbuf::traits::Producer::try_push(tx, notification).is_err() {
                log::warn!("Notification buffer full, notification dropped");
            }
        }
        result
    }
}
