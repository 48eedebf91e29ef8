// Scale patterns used to seed a note grid

use crate::grid::model::{GridError, MAX_MIDI_NOTE};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scale {
    #[default]
    Major,
    NaturalMinor,
    HarmonicMinor,
    MajorPentatonic,
    MinorPentatonic,
    Blues,
    Chromatic,
}

impl Scale {
    pub const ALL: [Scale; 7] = [
        Scale::Major,
        Scale::NaturalMinor,
        Scale::HarmonicMinor,
        Scale::MajorPentatonic,
        Scale::MinorPentatonic,
        Scale::Blues,
        Scale::Chromatic,
    ];

    /// Semitone offsets of one octave, starting at the root
    pub fn steps(&self) -> &'static [u8] {
        match self {
            Scale::Major => &[0, 2, 4, 5, 7, 9, 11],
            Scale::NaturalMinor => &[0, 2, 3, 5, 7, 8, 10],
            Scale::HarmonicMinor => &[0, 2, 3, 5, 7, 8, 11],
            Scale::MajorPentatonic => &[0, 2, 4, 7, 9],
            Scale::MinorPentatonic => &[0, 3, 5, 7, 10],
            Scale::Blues => &[0, 3, 5, 6, 7, 10],
            Scale::Chromatic => &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
        }
    }

    /// Offset of the given scale degree, continuing into higher octaves.
    ///
    /// For the major scale degrees 0..8 give `0,2,4,5,7,9,11,12`.
    pub fn offset_for_degree(&self, degree: usize) -> u8 {
        let steps = self.steps();
        let octave = degree / steps.len();
        let offset = 12 * octave + steps[degree % steps.len()] as usize;
        offset.min(MAX_MIDI_NOTE as usize) as u8
    }

    /// One row of a grid: `columns` consecutive degrees
    pub fn row_pattern(&self, columns: usize) -> Vec<u8> {
        (0..columns).map(|c| self.offset_for_degree(c)).collect()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Scale::Major => "Major",
            Scale::NaturalMinor => "Minor",
            Scale::HarmonicMinor => "Harmonic Minor",
            Scale::MajorPentatonic => "Major Pentatonic",
            Scale::MinorPentatonic => "Minor Pentatonic",
            Scale::Blues => "Blues",
            Scale::Chromatic => "Chromatic",
        }
    }

    /// Parse names such as "C Major" or "minor pentatonic".
    ///
    /// Grids are always rooted on C, so a leading "C" is accepted and dropped.
    pub fn from_name(name: &str) -> Result<Self, GridError> {
        let trimmed = name.trim();
        let without_root = match trimmed.split_once(' ') {
            Some((root, rest)) if root.eq_ignore_ascii_case("c") => rest.trim(),
            _ => trimmed,
        };

        if without_root.eq_ignore_ascii_case("natural minor") {
            return Ok(Scale::NaturalMinor);
        }

        Scale::ALL
            .into_iter()
            .find(|scale| scale.name().eq_ignore_ascii_case(without_root))
            .ok_or_else(|| GridError::UnknownScale(name.to_string()))
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C {}", self.name())
    }
}

impl FromStr for Scale {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scale::from_name(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_major_row_matches_default_pattern() {
        assert_eq!(Scale::Major.row_pattern(8), vec![0, 2, 4, 5, 7, 9, 11, 12]);
    }

    #[test]
    fn test_pattern_continues_past_octave() {
        assert_eq!(
            Scale::Major.row_pattern(10),
            vec![0, 2, 4, 5, 7, 9, 11, 12, 14, 16]
        );
        assert_eq!(Scale::MajorPentatonic.row_pattern(6), vec![0, 2, 4, 7, 9, 12]);
    }

    #[test]
    fn test_offset_is_clamped() {
        assert_eq!(Scale::Chromatic.offset_for_degree(500), MAX_MIDI_NOTE);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(Scale::from_name("C Major").unwrap(), Scale::Major);
        assert_eq!(Scale::from_name("c minor").unwrap(), Scale::NaturalMinor);
        assert_eq!(
            Scale::from_name("Natural Minor").unwrap(),
            Scale::NaturalMinor
        );
        assert_eq!(
            Scale::from_name("C Minor Pentatonic").unwrap(),
            Scale::MinorPentatonic
        );
        assert_eq!(Scale::from_name("Chromatic").unwrap(), Scale::Chromatic);
        assert!(matches!(
            Scale::from_name("D Dorian"),
            Err(GridError::UnknownScale(_))
        ));
    }

    #[test]
    fn test_display_round_trips() {
        for scale in Scale::ALL {
            assert_eq!(scale.to_string().parse::<Scale>().unwrap(), scale);
        }
    }
}
