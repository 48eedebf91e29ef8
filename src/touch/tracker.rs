// Touch tracker - turns touch batches into note-on/note-off commands
//
// Each touch identity drives at most one sounding note. Moving a touch into
// a cell with a different note stops the old note before starting the new
// one, and once the surface is empty every note the grid can reach is
// silenced as a safety net against lost end events.

use crate::audio::player::{DEFAULT_VELOCITY, NotePlayer};
use crate::grid::model::NoteGrid;
use crate::touch::event::{NormalizedPosition, TouchBatch, TouchId};
use std::collections::{BTreeSet, HashMap};

/// State kept for one contact that is currently sounding a note
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveTouch {
    pub row: usize,
    pub column: usize,
    pub note: u8,
    pub position: NormalizedPosition,
}

/// What a display needs after each batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackerSnapshot {
    pub notes: BTreeSet<u8>,
    pub touches: Vec<(NormalizedPosition, u8)>,
}

pub type SnapshotCallback = Box<dyn FnMut(&TrackerSnapshot)>;

pub struct TouchTracker<K, P> {
    grid: NoteGrid,
    player: P,
    active_touches: HashMap<K, ActiveTouch>,
    observer: Option<SnapshotCallback>,
}

impl<K: TouchId, P: NotePlayer> TouchTracker<K, P> {
    pub fn new(grid: NoteGrid, player: P) -> Self {
        Self {
            grid,
            player,
            active_touches: HashMap::new(),
            observer: None,
        }
    }

    /// Register the callback that receives a snapshot after every batch
    pub fn set_observer(&mut self, observer: impl FnMut(&TrackerSnapshot) + 'static) {
        self.observer = Some(Box::new(observer));
    }

    pub fn grid(&self) -> &NoteGrid {
        &self.grid
    }

    /// Replace the grid; sounding notes keep playing until their touch moves or ends
    pub fn set_grid(&mut self, grid: NoteGrid) {
        self.grid = grid;
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    pub fn active_count(&self) -> usize {
        self.active_touches.len()
    }

    pub fn active_touch(&self, id: &K) -> Option<&ActiveTouch> {
        self.active_touches.get(id)
    }

    /// Process one batch and publish the resulting snapshot
    pub fn handle_batch(&mut self, batch: &TouchBatch<K>) -> TrackerSnapshot {
        let ending = batch.is_ending();

        for contact in &batch.touching {
            let position = contact.position;
            let Some((row, column)) = self.grid.cell_for_position(position.x, position.y) else {
                continue;
            };
            let Some(note) = self.grid.note_for(row, column) else {
                continue;
            };

            match self.active_touches.get_mut(&contact.id) {
                None => {
                    self.player.play_note(note, DEFAULT_VELOCITY);
                    self.active_touches.insert(
                        contact.id.clone(),
                        ActiveTouch {
                            row,
                            column,
                            note,
                            position,
                        },
                    );
                }
                Some(active) if !ending && active.note != note => {
                    self.player.stop_note(active.note);
                    self.player.play_note(note, DEFAULT_VELOCITY);
                    *active = ActiveTouch {
                        row,
                        column,
                        note,
                        position,
                    };
                }
                Some(active) => {
                    active.position = position;
                }
            }
        }

        for id in &batch.ended {
            if let Some(active) = self.active_touches.remove(id) {
                self.player.stop_note(active.note);
            }
        }

        if self.active_touches.is_empty() {
            self.stop_all_grid_notes();
        }

        log::debug!(
            "{:?} batch: {} touching, {} ended, {} active",
            batch.phase,
            batch.touching.len(),
            batch.ended.len(),
            self.active_touches.len()
        );

        self.publish()
    }

    /// Silence every active touch and forget it
    pub fn release_all(&mut self) -> TrackerSnapshot {
        for (_, active) in self.active_touches.drain() {
            self.player.stop_note(active.note);
        }
        self.stop_all_grid_notes();
        self.publish()
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        let notes = self.active_touches.values().map(|a| a.note).collect();
        let mut touches: Vec<_> = self
            .active_touches
            .values()
            .map(|a| (a.position, a.note))
            .collect();
        touches.sort_by_key(|(_, note)| *note);

        TrackerSnapshot { notes, touches }
    }

    fn stop_all_grid_notes(&mut self) {
        for note in self.grid.possible_notes() {
            self.player.stop_note(note);
        }
    }

    fn publish(&mut self) -> TrackerSnapshot {
        let snapshot = self.snapshot();
        if let Some(observer) = self.observer.as_mut() {
            observer(&snapshot);
        }
        snapshot
    }
}
