// Recorded takes and the capture buffer shared with recording taps

use crate::audio::player::NotePlayer;
use crate::midi::event::MidiEvent;
use crate::recorder::RecorderError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Longest take that can be loaded or exported (30 minutes).
///
/// A WAV render holds the whole take in memory, about 10 MB per minute at 44.1 kHz.
pub const MAX_TAKE_DURATION_MS: u64 = 30 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedEvent {
    /// Milliseconds since the recording started
    pub offset_ms: u64,
    pub event: MidiEvent,
}

/// One finished performance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Take {
    pub recorded_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub events: Vec<TimedEvent>,
}

/// A note with its start and end, as rendered by the exporter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteSpan {
    pub note: u8,
    pub velocity: u8,
    pub start_ms: u64,
    pub end_ms: u64,
}

impl Take {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Reject takes longer than [`MAX_TAKE_DURATION_MS`] or with events past their end
    pub fn validate(&self) -> Result<(), RecorderError> {
        if self.duration_ms > MAX_TAKE_DURATION_MS {
            return Err(RecorderError::TakeTooLong {
                duration_ms: self.duration_ms,
            });
        }
        if let Some(timed) = self.events.iter().find(|e| e.offset_ms > self.duration_ms) {
            return Err(RecorderError::EventPastEnd {
                offset_ms: timed.offset_ms,
                duration_ms: self.duration_ms,
            });
        }
        Ok(())
    }

    /// Pair note-ons with their note-offs (first in, first out per note)
    pub fn note_spans(&self) -> Vec<NoteSpan> {
        let mut open: HashMap<u8, Vec<(u8, u64)>> = HashMap::new();
        let mut spans = Vec::new();

        for timed in &self.events {
            match timed.event {
                MidiEvent::NoteOn { note, velocity } => {
                    open.entry(note).or_default().push((velocity, timed.offset_ms));
                }
                MidiEvent::NoteOff { note } => {
                    if let Some(starts) = open.get_mut(&note) {
                        if !starts.is_empty() {
                            let (velocity, start_ms) = starts.remove(0);
                            spans.push(NoteSpan {
                                note,
                                velocity,
                                start_ms,
                                end_ms: timed.offset_ms,
                            });
                        }
                    }
                }
                MidiEvent::ProgramChange { .. } => {}
            }
        }

        for (note, starts) in open {
            for (velocity, start_ms) in starts {
                spans.push(NoteSpan {
                    note,
                    velocity,
                    start_ms,
                    end_ms: self.duration_ms,
                });
            }
        }

        spans.sort_by_key(|span| (span.start_ms, span.note));
        spans
    }
}

/// Capture state written by taps and drained by the recorder
#[derive(Debug, Default)]
pub(crate) struct Capture {
    started: Option<Instant>,
    events: Vec<TimedEvent>,
    sounding: HashMap<u8, usize>,
}

impl Capture {
    pub(crate) fn is_recording(&self) -> bool {
        self.started.is_some()
    }

    pub(crate) fn begin(&mut self) {
        self.started = Some(Instant::now());
        self.events.clear();
        self.sounding.clear();
    }

    pub(crate) fn record(&mut self, event: MidiEvent) {
        let Some(started) = self.started else {
            return;
        };
        let offset_ms = started.elapsed().as_millis() as u64;

        match event {
            MidiEvent::NoteOn { note, .. } => *self.sounding.entry(note).or_default() += 1,
            MidiEvent::NoteOff { note } => match self.sounding.get_mut(&note) {
                // stops for silent notes (grid-wide safety stops) are not part of the take
                Some(count) if *count > 0 => *count -= 1,
                _ => return,
            },
            MidiEvent::ProgramChange { .. } => {}
        }

        self.events.push(TimedEvent { offset_ms, event });
    }

    /// Close hanging notes and hand back the take; `None` when not recording
    pub(crate) fn finish(&mut self) -> Option<Take> {
        let started = self.started.take()?;
        let duration_ms = started.elapsed().as_millis() as u64;

        let mut events = std::mem::take(&mut self.events);
        let mut hanging: Vec<_> = self.sounding.drain().collect();
        hanging.sort_unstable();
        for (note, count) in hanging {
            for _ in 0..count {
                events.push(TimedEvent {
                    offset_ms: duration_ms,
                    event: MidiEvent::NoteOff { note },
                });
            }
        }

        Some(Take {
            recorded_at: Utc::now(),
            duration_ms,
            events,
        })
    }
}

/// Note player wrapper that copies every command into the active recording
pub struct RecordingTap<P> {
    inner: P,
    capture: Arc<Mutex<Capture>>,
}

impl<P> RecordingTap<P> {
    pub(crate) fn new(inner: P, capture: Arc<Mutex<Capture>>) -> Self {
        Self { inner, capture }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    fn capture(&self, event: MidiEvent) {
        if let Ok(mut capture) = self.capture.lock() {
            capture.record(event);
        }
    }
}

impl<P: NotePlayer> NotePlayer for RecordingTap<P> {
    fn play_note(&mut self, note: u8, velocity: u8) {
        self.inner.play_note(note, velocity);
        self.capture(MidiEvent::NoteOn { note, velocity });
    }

    fn stop_note(&mut self, note: u8) {
        self.inner.stop_note(note);
        self.capture(MidiEvent::NoteOff { note });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timed(offset_ms: u64, event: MidiEvent) -> TimedEvent {
        TimedEvent { offset_ms, event }
    }

    #[test]
    fn test_capture_ignores_events_when_idle() {
        let mut capture = Capture::default();
        capture.record(MidiEvent::NoteOn {
            note: 60,
            velocity: 100,
        });
        assert!(capture.finish().is_none());
    }

    #[test]
    fn test_capture_drops_stray_note_offs_and_closes_hanging() {
        let mut capture = Capture::default();
        capture.begin();
        capture.record(MidiEvent::NoteOff { note: 40 });
        capture.record(MidiEvent::NoteOn {
            note: 60,
            velocity: 100,
        });

        let take = capture.finish().unwrap();
        assert_eq!(take.events.len(), 2);
        assert_eq!(take.events[1].event, MidiEvent::NoteOff { note: 60 });
        assert_eq!(take.events[1].offset_ms, take.duration_ms);
        assert!(!capture.is_recording());
    }

    #[test]
    fn test_note_spans_pair_in_order() {
        let take = Take {
            recorded_at: Utc::now(),
            duration_ms: 1000,
            events: vec![
                timed(0, MidiEvent::NoteOn { note: 60, velocity: 100 }),
                timed(100, MidiEvent::NoteOn { note: 60, velocity: 80 }),
                timed(200, MidiEvent::NoteOff { note: 60 }),
                timed(300, MidiEvent::NoteOn { note: 64, velocity: 90 }),
                timed(400, MidiEvent::NoteOff { note: 60 }),
            ],
        };

        let spans = take.note_spans();
        assert_eq!(
            spans,
            vec![
                NoteSpan { note: 60, velocity: 100, start_ms: 0, end_ms: 200 },
                NoteSpan { note: 60, velocity: 80, start_ms: 100, end_ms: 400 },
                NoteSpan { note: 64, velocity: 90, start_ms: 300, end_ms: 1000 },
            ]
        );
    }
}
