// Performance recorder - capture, replay and export of what was played

pub mod export;
pub(crate) mod playback;
pub mod take;

pub use export::{ExportFormat, RenderSettings};
pub use take::{MAX_TAKE_DURATION_MS, NoteSpan, RecordingTap, Take, TimedEvent};

use crate::audio::player::NotePlayer;
use crate::recorder::playback::PlaybackHandle;
use crate::recorder::take::Capture;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// File the last finished take is written to inside the scratch directory
pub const TAKE_FILE_NAME: &str = "last_take.json";

#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    #[error("No recording available")]
    NoRecording,

    #[error("Recorder state unavailable: capture lock poisoned")]
    Poisoned,

    #[error("Take lasts {duration_ms} ms, longer than the 1800000 ms limit")]
    TakeTooLong { duration_ms: u64 },

    #[error("Take event at {offset_ms} ms lies past its {duration_ms} ms end")]
    EventPastEnd { offset_ms: u64, duration_ms: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

pub struct PerformanceRecorder {
    scratch_dir: PathBuf,
    capture: Arc<Mutex<Capture>>,
    take: Option<Take>,
    playback: Option<PlaybackHandle>,
}

impl PerformanceRecorder {
    /// Create a recorder that keeps its working files in `scratch_dir`
    pub fn new<P: AsRef<Path>>(scratch_dir: P) -> Self {
        Self {
            scratch_dir: scratch_dir.as_ref().to_path_buf(),
            capture: Arc::new(Mutex::new(Capture::default())),
            take: None,
            playback: None,
        }
    }

    /// Wrap a player so its commands are captured while recording
    pub fn tap<P: NotePlayer>(&self, player: P) -> RecordingTap<P> {
        RecordingTap::new(player, self.capture.clone())
    }

    pub fn is_recording(&self) -> bool {
        self.capture
            .lock()
            .map(|capture| capture.is_recording())
            .unwrap_or(false)
    }

    pub fn has_recording(&self) -> bool {
        self.take.is_some()
    }

    pub fn take(&self) -> Option<&Take> {
        self.take.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.playback
            .as_ref()
            .map(PlaybackHandle::is_running)
            .unwrap_or(false)
    }

    /// Start capturing. A call while already recording keeps the running take.
    pub fn start_recording(&mut self) -> Result<(), RecorderError> {
        std::fs::create_dir_all(&self.scratch_dir)?;

        let mut capture = self.capture.lock().map_err(|_| RecorderError::Poisoned)?;
        if capture.is_recording() {
            log::debug!("Recording already running");
            return Ok(());
        }
        capture.begin();
        log::info!("Recording started");
        Ok(())
    }

    /// Finish the running take and keep it as the last recording.
    ///
    /// Does nothing when no recording is running.
    pub fn stop_recording(&mut self) -> Result<(), RecorderError> {
        let finished = self
            .capture
            .lock()
            .map_err(|_| RecorderError::Poisoned)?
            .finish();

        let Some(take) = finished else {
            return Ok(());
        };

        log::info!(
            "Recording stopped: {} events over {} ms",
            take.events.len(),
            take.duration_ms
        );

        let take_path = self.scratch_dir.join(TAKE_FILE_NAME);
        let write_result = export::write_json(&take, &take_path);
        self.take = Some(take);
        write_result
    }

    /// Replay the last take on a background thread.
    ///
    /// `on_complete` runs exactly once, when the take ends or is stopped. It is
    /// called on the playback thread, so a front-end that must touch its UI from
    /// the main thread should hand the signal over, e.g. through an mpsc channel.
    pub fn playback_recording<P, F>(&mut self, player: P, on_complete: F) -> Result<(), RecorderError>
    where
        P: NotePlayer + Send + 'static,
        F: FnOnce() + Send + 'static,
    {
        let take = self.take.clone().ok_or(RecorderError::NoRecording)?;
        self.stop_playback();

        log::info!("Playback started ({} ms)", take.duration_ms);
        self.playback = Some(PlaybackHandle::spawn(take, player, on_complete)?);
        Ok(())
    }

    /// Stop a running playback; a no-op when nothing plays
    pub fn stop_playback(&mut self) {
        if let Some(mut playback) = self.playback.take() {
            playback.stop();
            log::info!("Playback stopped");
        }
    }

    /// Load a take previously written with [`ExportFormat::Json`].
    ///
    /// Takes longer than [`MAX_TAKE_DURATION_MS`] are rejected and the current take is kept.
    pub fn load_take<P: AsRef<Path>>(&mut self, path: P) -> Result<(), RecorderError> {
        let json = std::fs::read_to_string(path)?;
        let take: Take = serde_json::from_str(&json)?;
        take.validate()?;
        self.take = Some(take);
        Ok(())
    }

    /// Write the last take to `dest` and return the path written
    pub fn export_recording<P: AsRef<Path>>(
        &self,
        dest: P,
        format: ExportFormat,
    ) -> Result<PathBuf, RecorderError> {
        let take = self.take.as_ref().ok_or(RecorderError::NoRecording)?;
        take.validate()?;
        let dest = dest.as_ref();

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        match format {
            ExportFormat::Wav => export::write_wav(take, &RenderSettings::default(), dest)?,
            ExportFormat::Json => export::write_json(take, dest)?,
        }

        log::info!("Recording exported to {}", dest.display());
        Ok(dest.to_path_buf())
    }
}

impl Drop for PerformanceRecorder {
    fn drop(&mut self) {
        self.stop_playback();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::player::EventLog;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::time::Duration;

    /// Player that shares its log with the test across threads
    #[derive(Clone, Default)]
    struct SharedLog(Arc<Mutex<EventLog>>);

    impl NotePlayer for SharedLog {
        fn play_note(&mut self, note: u8, velocity: u8) {
            self.0.lock().unwrap().play_note(note, velocity);
        }

        fn stop_note(&mut self, note: u8) {
            self.0.lock().unwrap().stop_note(note);
        }
    }

    fn record_chord(recorder: &mut PerformanceRecorder) {
        let mut tap = recorder.tap(EventLog::new());
        recorder.start_recording().unwrap();
        tap.play_note(60, 100);
        tap.play_note(64, 100);
        tap.stop_note(60);
        tap.stop_note(64);
        tap.stop_note(67); // silent, not captured
        recorder.stop_recording().unwrap();
        assert_eq!(tap.inner().events().len(), 5);
    }

    #[test]
    fn test_record_keeps_take_and_writes_scratch_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = PerformanceRecorder::new(dir.path().join("scratch"));
        assert!(!recorder.has_recording());

        record_chord(&mut recorder);

        assert!(recorder.has_recording());
        assert!(!recorder.is_recording());
        assert_eq!(recorder.take().unwrap().events.len(), 4);
        assert!(dir.path().join("scratch").join(TAKE_FILE_NAME).exists());
    }

    #[test]
    fn test_tap_ignores_commands_when_not_recording() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = PerformanceRecorder::new(dir.path());
        let mut tap = recorder.tap(EventLog::new());
        tap.play_note(60, 100);
        recorder.stop_recording().unwrap();
        assert!(!recorder.has_recording());
        assert_eq!(tap.inner().note_ons(), vec![60]);
    }

    #[test]
    fn test_start_recording_reports_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, b"x").unwrap();

        let mut recorder = PerformanceRecorder::new(blocker.join("scratch"));
        assert!(matches!(recorder.start_recording(), Err(RecorderError::Io(_))));
        assert!(!recorder.is_recording());
    }

    #[test]
    fn test_playback_without_take_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = PerformanceRecorder::new(dir.path());
        let result = recorder.playback_recording(EventLog::new(), || {});
        assert!(matches!(result, Err(RecorderError::NoRecording)));
    }

    #[test]
    fn test_playback_replays_and_completes_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = PerformanceRecorder::new(dir.path());
        record_chord(&mut recorder);

        let log = SharedLog::default();
        let (done_tx, done_rx) = mpsc::channel();
        recorder
            .playback_recording(log.clone(), move || done_tx.send(()).unwrap())
            .unwrap();

        done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        recorder.stop_playback();
        recorder.stop_playback();

        let log = log.0.lock().unwrap();
        assert_eq!(log.note_ons(), vec![60, 64]);
        assert_eq!(log.outstanding(), 0);
    }

    #[test]
    fn test_stop_playback_silences_and_calls_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = PerformanceRecorder::new(dir.path());
        recorder.take = Some(Take {
            recorded_at: chrono::Utc::now(),
            duration_ms: 60_000,
            events: vec![
                TimedEvent {
                    offset_ms: 0,
                    event: crate::midi::event::MidiEvent::NoteOn {
                        note: 50,
                        velocity: 100,
                    },
                },
                TimedEvent {
                    offset_ms: 60_000,
                    event: crate::midi::event::MidiEvent::NoteOff { note: 50 },
                },
            ],
        });

        let log = SharedLog::default();
        let completions = Arc::new(AtomicUsize::new(0));
        let counter = completions.clone();
        recorder
            .playback_recording(log.clone(), move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        std::thread::sleep(Duration::from_millis(50));
        assert!(recorder.is_playing());
        recorder.stop_playback();

        assert!(!recorder.is_playing());
        assert_eq!(completions.load(Ordering::SeqCst), 1);
        let log = log.0.lock().unwrap();
        assert_eq!(log.note_ons(), vec![50]);
        assert_eq!(log.note_offs(), vec![50]);
    }

    #[test]
    fn test_export_formats() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = PerformanceRecorder::new(dir.path().join("scratch"));
        assert!(matches!(
            recorder.export_recording(dir.path().join("a.wav"), ExportFormat::Wav),
            Err(RecorderError::NoRecording)
        ));

        record_chord(&mut recorder);

        let wav = recorder
            .export_recording(dir.path().join("out").join("take.wav"), ExportFormat::Wav)
            .unwrap();
        let reader = hound::WavReader::open(&wav).unwrap();
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.spec().sample_rate, 44100);
        assert!(reader.len() > 0);

        let json = recorder
            .export_recording(dir.path().join("take.json"), ExportFormat::Json)
            .unwrap();
        let mut reloaded = PerformanceRecorder::new(dir.path());
        reloaded.load_take(&json).unwrap();
        assert_eq!(reloaded.take(), recorder.take());
    }

    fn huge_take() -> Take {
        Take {
            recorded_at: chrono::Utc::now(),
            duration_ms: u64::MAX,
            events: vec![TimedEvent {
                offset_ms: u64::MAX - 1,
                event: crate::midi::event::MidiEvent::NoteOn {
                    note: 60,
                    velocity: 100,
                },
            }],
        }
    }

    #[test]
    fn test_load_rejects_overlong_take() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.json");
        std::fs::write(&path, serde_json::to_string(&huge_take()).unwrap()).unwrap();

        let mut recorder = PerformanceRecorder::new(dir.path());
        record_chord(&mut recorder);
        let kept = recorder.take().cloned();

        assert!(matches!(
            recorder.load_take(&path),
            Err(RecorderError::TakeTooLong {
                duration_ms: u64::MAX
            })
        ));
        assert_eq!(recorder.take().cloned(), kept);
    }

    #[test]
    fn test_export_rejects_overlong_take() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = PerformanceRecorder::new(dir.path());
        recorder.take = Some(huge_take());

        for format in [ExportFormat::Wav, ExportFormat::Json] {
            let dest = dir.path().join("huge").join("take");
            assert!(matches!(
                recorder.export_recording(&dest, format),
                Err(RecorderError::TakeTooLong { .. })
            ));
            assert!(!dest.exists());
        }
    }

    #[test]
    fn test_load_rejects_event_past_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        let take = Take {
            duration_ms: 1000,
            events: vec![TimedEvent {
                offset_ms: 5000,
                event: crate::midi::event::MidiEvent::NoteOff { note: 60 },
            }],
            ..huge_take()
        };
        std::fs::write(&path, serde_json::to_string(&take).unwrap()).unwrap();

        let mut recorder = PerformanceRecorder::new(dir.path());
        assert!(matches!(
            recorder.load_take(&path),
            Err(RecorderError::EventPastEnd {
                offset_ms: 5000,
                duration_ms: 1000
            })
        ));
        assert!(!recorder.has_recording());
    }
}
