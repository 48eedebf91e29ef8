// Note grid - maps trackpad cells to MIDI notes

use crate::grid::scale::Scale;
use std::collections::BTreeSet;

/// Lowest octave the grid can be transposed down to
pub const BASELINE_OCTAVE: i32 = 3;
/// Lowest semitone offset a mapping entry can be transposed down to
pub const BASELINE_NOTE: u8 = 0;
pub const MAX_MIDI_NOTE: u8 = 127;

const SEMITONES_PER_OCTAVE: i64 = 12;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("Grid must have at least one row and one column (got {rows}x{columns})")]
    EmptyGrid { rows: usize, columns: usize },

    #[error("Note mapping has {actual} rows, expected {expected}")]
    RowCountMismatch { expected: usize, actual: usize },

    #[error("Note mapping row {row} has {actual} entries, expected {expected}")]
    ColumnCountMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Note mapping entry at ({row}, {column}) is {value}, above 127")]
    OffsetOutOfRange { row: usize, column: usize, value: u8 },

    #[error("Base octave {0} is below the baseline octave 3")]
    OctaveBelowBaseline(i32),

    #[error("Unknown scale: {0}")]
    UnknownScale(String),
}

/// Immutable grid of semitone offsets.
///
/// Cell `(row, column)` sounds `12 * (base_octave + row) + note_mapping[row][column]`,
/// clamped to the MIDI range. Row 0 is the top of the surface. Every
/// transposition returns a new grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteGrid {
    rows: usize,
    columns: usize,
    note_mapping: Vec<Vec<u8>>,
    base_octave: i32,
}

impl NoteGrid {
    pub fn new(
        rows: usize,
        columns: usize,
        note_mapping: Vec<Vec<u8>>,
        base_octave: i32,
    ) -> Result<Self, GridError> {
        if rows == 0 || columns == 0 {
            return Err(GridError::EmptyGrid { rows, columns });
        }

        if note_mapping.len() != rows {
            return Err(GridError::RowCountMismatch {
                expected: rows,
                actual: note_mapping.len(),
            });
        }

        for (row, entries) in note_mapping.iter().enumerate() {
            if entries.len() != columns {
                return Err(GridError::ColumnCountMismatch {
                    row,
                    expected: columns,
                    actual: entries.len(),
                });
            }
            if let Some((column, &value)) = entries
                .iter()
                .enumerate()
                .find(|(_, value)| **value > MAX_MIDI_NOTE)
            {
                return Err(GridError::OffsetOutOfRange { row, column, value });
            }
        }

        if base_octave < BASELINE_OCTAVE {
            return Err(GridError::OctaveBelowBaseline(base_octave));
        }

        Ok(Self {
            rows,
            columns,
            note_mapping,
            base_octave,
        })
    }

    /// Major-scale grid: `0,2,4,5,7,9,11,12` on every row.
    ///
    /// Widths other than 8 continue the scale by degree, so no column ever
    /// indexes past the pattern.
    pub fn default_grid(rows: usize, columns: usize, base_octave: i32) -> Result<Self, GridError> {
        Self::with_scale(rows, columns, base_octave, Scale::Major)
    }

    pub fn with_scale(
        rows: usize,
        columns: usize,
        base_octave: i32,
        scale: Scale,
    ) -> Result<Self, GridError> {
        let pattern = scale.row_pattern(columns);
        Self::new(rows, columns, vec![pattern; rows], base_octave)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn base_octave(&self) -> i32 {
        self.base_octave
    }

    pub fn note_mapping(&self) -> &[Vec<u8>] {
        &self.note_mapping
    }

    /// MIDI note for a cell, `None` outside the grid
    pub fn note_for(&self, row: usize, column: usize) -> Option<u8> {
        if row >= self.rows || column >= self.columns {
            return None;
        }

        let octave = self.base_octave as i64 + row as i64;
        let note = SEMITONES_PER_OCTAVE * octave + self.note_mapping[row][column] as i64;
        Some(note.clamp(0, MAX_MIDI_NOTE as i64) as u8)
    }

    /// Cell under a normalized position (origin bottom-left, `[0,1]` on both axes).
    ///
    /// Coordinates outside `[0,1]` clamp to the border cells; non-finite
    /// coordinates resolve to nothing.
    pub fn cell_for_position(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }

        let row = ((1.0 - y) * self.rows as f64).floor();
        let column = (x * self.columns as f64).floor();

        let row = row.clamp(0.0, (self.rows - 1) as f64) as usize;
        let column = column.clamp(0.0, (self.columns - 1) as f64) as usize;
        Some((row, column))
    }

    /// Every distinct note the grid can sound, ascending
    pub fn possible_notes(&self) -> BTreeSet<u8> {
        (0..self.rows)
            .flat_map(|row| (0..self.columns).map(move |column| (row, column)))
            .filter_map(|(row, column)| self.note_for(row, column))
            .collect()
    }

    /// Highest base octave whose top row still fits in the MIDI range
    pub fn max_base_octave(&self) -> i32 {
        let max_offset = self
            .note_mapping
            .iter()
            .flatten()
            .copied()
            .max()
            .unwrap_or(BASELINE_NOTE);
        let headroom = (MAX_MIDI_NOTE - max_offset) as i32 / SEMITONES_PER_OCTAVE as i32;
        headroom - (self.rows as i32 - 1)
    }

    /// One octave up, unless the top row would leave the MIDI range
    pub fn increment_octave(&self) -> Self {
        let mut next = self.clone();
        if self.base_octave < self.max_base_octave() {
            next.base_octave = self.base_octave + 1;
        }
        next
    }

    /// One octave down, never below [`BASELINE_OCTAVE`]
    pub fn decrement_octave(&self) -> Self {
        let mut next = self.clone();
        next.base_octave = (self.base_octave - 1).max(BASELINE_OCTAVE);
        next
    }

    /// Every offset one semitone up, saturating at 127
    pub fn increment_base_note(&self) -> Self {
        self.map_offsets(|value| value.saturating_add(1).min(MAX_MIDI_NOTE))
    }

    /// Every offset one semitone down, saturating at [`BASELINE_NOTE`]
    pub fn decrement_base_note(&self) -> Self {
        self.map_offsets(|value| value.saturating_sub(1).max(BASELINE_NOTE))
    }

    fn map_offsets(&self, f: impl Fn(u8) -> u8) -> Self {
        let note_mapping = self
            .note_mapping
            .iter()
            .map(|row| row.iter().map(|&value| f(value)).collect())
            .collect();

        Self {
            note_mapping,
            ..self.clone()
        }
    }
}

impl Default for NoteGrid {
    fn default() -> Self {
        Self {
            rows: 4,
            columns: 8,
            note_mapping: vec![Scale::Major.row_pattern(8); 4],
            base_octave: BASELINE_OCTAVE,
        }
    }
}
