//! Judgment engine: candidate selection and timing-distance classification.

use crate::error::ConfigError;
use crate::notes::{ActiveNote, PlayField};

/// Discrete judgment outcome, best first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Judgment {
    Perfect,
    Great,
    Good,
    Miss,
}

impl Judgment {
    pub fn score(self) -> u64 {
        match self {
            Judgment::Perfect => 300,
            Judgment::Great => 200,
            Judgment::Good => 100,
            Judgment::Miss => 0,
        }
    }

    /// Health delta in health-tracking modes.
    pub fn health_delta(self) -> i32 {
        match self {
            Judgment::Perfect => 1,
            Judgment::Great | Judgment::Good => 0,
            Judgment::Miss => -10,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Judgment::Perfect => "Perfect",
            Judgment::Great => "Great",
            Judgment::Good => "Good",
            Judgment::Miss => "Miss",
        }
    }

    pub fn is_hit(self) -> bool {
        self != Judgment::Miss
    }
}

/// Ascending distance thresholds (exclusive upper bounds) for each tier.
/// A `None` tier is skipped.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JudgeWindows {
    pub perfect: f64,
    pub great: Option<f64>,
    pub good: f64,
}

impl JudgeWindows {
    /// Perfect<20, Great<40, Good<60.
    pub const NARROW: JudgeWindows = JudgeWindows {
        perfect: 20.0,
        great: Some(40.0),
        good: 60.0,
    };

    /// Perfect<30, Good<60; no Great tier.
    pub const WIDE: JudgeWindows = JudgeWindows {
        perfect: 30.0,
        great: None,
        good: 60.0,
    };

    /// Windows must be finite with `0 < perfect <= great <= good`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let great = self.great.unwrap_or(self.perfect);
        let ordered = self.perfect > 0.0 && self.perfect <= great && great <= self.good;
        if ![self.perfect, great, self.good].iter().all(|v| v.is_finite()) || !ordered {
            return Err(ConfigError::InvalidWindows);
        }
        Ok(())
    }

    pub fn classify(&self, distance: f64) -> Judgment {
        let d = distance.abs();
        if d < self.perfect {
            Judgment::Perfect
        } else if self.great.is_some_and(|g| d < g) {
            Judgment::Great
        } else if d < self.good {
            Judgment::Good
        } else {
            Judgment::Miss
        }
    }
}

impl Default for JudgeWindows {
    fn default() -> Self {
        Self::NARROW
    }
}

/// Index of the note in `lane` nearest the judgment line (either side).
/// Ties go to the earliest-spawned note.
pub fn select_candidate(notes: &[ActiveNote], lane: usize, field: &PlayField) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, note) in notes.iter().enumerate() {
        if note.lane != lane {
            continue;
        }
        let gap = (note.position - field.judgment_line).abs();
        if best.is_none_or(|(_, best_gap)| gap < best_gap) {
            best = Some((idx, gap));
        }
    }
    best.map(|(idx, _)| idx)
}

/// Distance from the note's center to the judgment line.
pub fn timing_distance(note: &ActiveNote, field: &PlayField) -> f64 {
    (note.position + field.half_extent() - field.judgment_line).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::NoteId;

    fn note(id: u64, lane: usize, position: f64) -> ActiveNote {
        ActiveNote {
            id: NoteId(id),
            lane,
            position,
            penalized: false,
        }
    }

    #[test]
    fn narrow_windows_cover_all_tiers() {
        let w = JudgeWindows::NARROW;
        assert_eq!(w.classify(0.0), Judgment::Perfect);
        assert_eq!(w.classify(19.9), Judgment::Perfect);
        assert_eq!(w.classify(20.0), Judgment::Great);
        assert_eq!(w.classify(39.0), Judgment::Great);
        assert_eq!(w.classify(40.0), Judgment::Good);
        assert_eq!(w.classify(59.9), Judgment::Good);
        assert_eq!(w.classify(60.0), Judgment::Miss);
    }

    #[test]
    fn wide_windows_collapse_great_into_good() {
        let w = JudgeWindows::WIDE;
        assert_eq!(w.classify(29.0), Judgment::Perfect);
        assert_eq!(w.classify(35.0), Judgment::Good);
        assert_eq!(w.classify(61.0), Judgment::Miss);
    }

    #[test]
    fn windows_must_ascend_from_a_positive_perfect() {
        assert_eq!(JudgeWindows::NARROW.validate(), Ok(()));
        assert_eq!(JudgeWindows::WIDE.validate(), Ok(()));
        let bad = [
            JudgeWindows { perfect: -1.0, great: None, good: -1.0 },
            JudgeWindows { perfect: 0.0, great: None, good: 60.0 },
            JudgeWindows { perfect: 30.0, great: Some(20.0), good: 60.0 },
            JudgeWindows { perfect: 20.0, great: Some(70.0), good: 60.0 },
            JudgeWindows { perfect: 40.0, great: None, good: 30.0 },
            JudgeWindows { perfect: 20.0, great: None, good: f64::INFINITY },
            JudgeWindows { perfect: f64::NAN, great: Some(40.0), good: 60.0 },
        ];
        for w in bad {
            assert_eq!(w.validate(), Err(ConfigError::InvalidWindows), "{w:?} accepted");
        }
    }

    #[test]
    fn candidate_is_nearest_in_lane() {
        let field = PlayField::new(300.0, 0.0, 50.0);
        let notes = vec![note(0, 0, 310.0), note(1, 1, 299.0), note(2, 0, 250.0), note(3, 0, 295.0)];
        assert_eq!(select_candidate(&notes, 0, &field), Some(3));
        assert_eq!(select_candidate(&notes, 1, &field), Some(1));
        assert_eq!(select_candidate(&notes, 2, &field), None);
    }

    #[test]
    fn candidate_ties_go_to_earliest_spawned() {
        let field = PlayField::new(300.0, 0.0, 50.0);
        let notes = vec![note(0, 0, 310.0), note(1, 0, 290.0)];
        assert_eq!(select_candidate(&notes, 0, &field), Some(0));
    }

    #[test]
    fn distance_measures_from_note_center() {
        let field = PlayField::new(300.0, 20.0, 50.0);
        assert_eq!(timing_distance(&note(0, 0, 285.0), &field), 5.0);
        assert_eq!(timing_distance(&note(0, 0, 300.0), &field), 10.0);
    }
}
