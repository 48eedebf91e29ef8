// Background replay of a take into a note player

use crate::audio::player::NotePlayer;
use crate::midi::event::MidiEvent;
use crate::recorder::take::Take;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Longest sleep between stop-flag checks
const POLL_INTERVAL: Duration = Duration::from_millis(5);

pub(crate) struct PlaybackHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl PlaybackHandle {
    pub(crate) fn spawn<P, F>(take: Take, player: P, on_complete: F) -> std::io::Result<Self>
    where
        P: NotePlayer + Send + 'static,
        F: FnOnce() + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();

        let thread = thread::Builder::new()
            .name("padplay-playback".to_string())
            .spawn(move || {
                replay(&take, player, &stop_flag);
                on_complete();
            })?;

        Ok(Self {
            stop,
            thread: Some(thread),
        })
    }

    pub(crate) fn is_running(&self) -> bool {
        self.thread
            .as_ref()
            .map(|thread| !thread.is_finished())
            .unwrap_or(false)
    }

    /// Ask the replay to stop and wait for it; safe to call repeatedly
    pub(crate) fn stop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("Playback thread panicked");
            }
        }
    }
}

impl Drop for PlaybackHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn replay<P: NotePlayer>(take: &Take, mut player: P, stop: &AtomicBool) {
    let start = Instant::now();
    let mut sounding: HashMap<u8, usize> = HashMap::new();

    'events: for timed in &take.events {
        let due = Duration::from_millis(timed.offset_ms);
        loop {
            if stop.load(Ordering::Acquire) {
                break 'events;
            }
            let elapsed = start.elapsed();
            if elapsed >= due {
                break;
            }
            thread::sleep((due - elapsed).min(POLL_INTERVAL));
        }

        match timed.event {
            MidiEvent::NoteOn { note, .. } => *sounding.entry(note).or_default() += 1,
            MidiEvent::NoteOff { note } => {
                if let Some(count) = sounding.get_mut(&note) {
                    *count = count.saturating_sub(1);
                }
            }
            MidiEvent::ProgramChange { .. } => {}
        }
        player.send(timed.event);
    }

    // Stopped mid-take: silence whatever is still held
    for (note, count) in sounding {
        for _ in 0..count {
            player.stop_note(note);
        }
    }
}
