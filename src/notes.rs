//! Note stream scheduler: consumes the chart in time order, spawns active
//! notes, moves them every tick and retires the ones that leave the field.

use std::collections::VecDeque;

use crate::chart::{Chart, ChartEvent};
use crate::error::ConfigError;

/// Play-area geometry, in the same units as note positions.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayField {
    pub judgment_line: f64,
    /// Full size of a note along the travel axis.
    pub note_extent: f64,
    /// Distance past the judgment line before a note counts as missed.
    pub miss_margin: f64,
}

impl PlayField {
    pub fn new(judgment_line: f64, note_extent: f64, miss_margin: f64) -> Self {
        Self {
            judgment_line,
            note_extent,
            miss_margin,
        }
    }

    pub fn half_extent(&self) -> f64 {
        self.note_extent / 2.0
    }

    /// Position beyond which a note has left the field.
    pub fn travel_length(&self) -> f64 {
        self.judgment_line + self.miss_margin
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [self.judgment_line, self.note_extent, self.miss_margin]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.judgment_line <= 0.0 || self.note_extent < 0.0 || self.miss_margin < 0.0 {
            return Err(ConfigError::InvalidField {
                judgment_line: self.judgment_line,
                note_extent: self.note_extent,
                miss_margin: self.miss_margin,
            });
        }
        Ok(())
    }
}

impl Default for PlayField {
    fn default() -> Self {
        Self::new(350.0, 20.0, 50.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoteId(pub u64);

/// A spawned, unresolved note. Position is distance travelled since spawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveNote {
    pub id: NoteId,
    pub lane: usize,
    pub position: f64,
    /// Health penalty already charged by an off-window press.
    pub penalized: bool,
}

/// What one scheduler step did.
#[derive(Debug, Default, PartialEq)]
pub struct StepReport {
    pub spawned: Vec<ActiveNote>,
    pub expired: Vec<ActiveNote>,
    /// Chart events dropped because their lane does not exist.
    pub skipped: usize,
}

pub struct NoteStream {
    pending: VecDeque<ChartEvent>,
    active: Vec<ActiveNote>, // spawn order
    next_id: u64,
    lane_count: usize,
    note_speed: f64,
}

impl NoteStream {
    pub fn new(chart: Chart, lane_count: usize, note_speed: f64) -> Self {
        Self {
            pending: chart.into_events().into(),
            active: Vec::new(),
            next_id: 0,
            lane_count,
            note_speed,
        }
    }

    pub fn active(&self) -> &[ActiveNote] {
        &self.active
    }

    pub fn active_mut(&mut self) -> &mut [ActiveNote] {
        &mut self.active
    }

    /// Spawn every event due at `elapsed_ms`, advance all notes by the note
    /// speed, then retire notes past the field's travel length.
    pub fn step(&mut self, elapsed_ms: f64, field: &PlayField) -> StepReport {
        let mut report = StepReport::default();

        while let Some(event) = self.pending.front().copied() {
            if event.time_offset_ms as f64 > elapsed_ms {
                break;
            }
            self.pending.pop_front();
            if event.lane >= self.lane_count {
                log::warn!(
                    "skipping chart event at {}ms: lane {} outside {} lane(s)",
                    event.time_offset_ms,
                    event.lane,
                    self.lane_count
                );
                report.skipped += 1;
                continue;
            }
            let note = ActiveNote {
                id: NoteId(self.next_id),
                lane: event.lane,
                position: 0.0,
                penalized: false,
            };
            self.next_id += 1;
            self.active.push(note);
            report.spawned.push(note);
        }

        for note in &mut self.active {
            note.position += self.note_speed;
        }

        let limit = field.travel_length();
        let mut i = 0;
        while i < self.active.len() {
            if self.active[i].position > limit {
                report.expired.push(self.active.remove(i));
            } else {
                i += 1;
            }
        }
        report
    }

    /// Remove a note by id. Absent ids are a no-op.
    pub fn remove(&mut self, id: NoteId) -> Option<ActiveNote> {
        let idx = self.active.iter().position(|n| n.id == id)?;
        Some(self.active.remove(idx))
    }

    /// Drop everything still pending or on the field without scoring it.
    pub fn discard(&mut self) -> usize {
        let dropped = self.pending.len() + self.active.len();
        self.pending.clear();
        self.active.clear();
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart(events: &[(u64, usize)]) -> Chart {
        Chart::from_events(
            events
                .iter()
                .map(|&(time_offset_ms, lane)| ChartEvent { time_offset_ms, lane })
                .collect(),
        )
    }

    #[test]
    fn spawns_due_events_once() {
        let field = PlayField::default();
        let mut stream = NoteStream::new(chart(&[(0, 1), (100, 0), (500, 2)]), 3, 2.0);
        let report = stream.step(100.0, &field);
        assert_eq!(report.spawned.len(), 2);
        assert_eq!(report.spawned[0].lane, 1);
        assert_eq!(report.spawned[1].lane, 0);

        let report = stream.step(120.0, &field);
        assert!(report.spawned.is_empty());
        assert_eq!(stream.active().len(), 2);

        let report = stream.step(500.0, &field);
        assert_eq!(report.spawned.len(), 1);
        assert_eq!(report.spawned[0].id, NoteId(2));
    }

    #[test]
    fn spawned_notes_advance_on_their_first_tick() {
        let field = PlayField::default();
        let mut stream = NoteStream::new(chart(&[(0, 0)]), 1, 3.0);
        stream.step(0.0, &field);
        assert_eq!(stream.active()[0].position, 3.0);
        stream.step(16.0, &field);
        assert_eq!(stream.active()[0].position, 6.0);
    }

    #[test]
    fn notes_past_travel_length_expire() {
        let field = PlayField::new(10.0, 2.0, 5.0);
        let mut stream = NoteStream::new(chart(&[(0, 0), (40, 0)]), 1, 4.0);
        stream.step(0.0, &field); // 4
        stream.step(16.0, &field); // 8
        stream.step(32.0, &field); // 12
        let report = stream.step(48.0, &field); // 16 > 15
        assert_eq!(report.expired.len(), 1);
        assert_eq!(report.expired[0].id, NoteId(0));
        assert_eq!(stream.active().len(), 1);
    }

    #[test]
    fn note_exactly_at_travel_length_stays_on_the_field() {
        // travel length 15, speed 5: positions 5, 10, 15, 20
        let field = PlayField::new(10.0, 2.0, 5.0);
        let mut stream = NoteStream::new(chart(&[(0, 0)]), 1, 5.0);
        stream.step(0.0, &field);
        stream.step(16.0, &field);
        let report = stream.step(32.0, &field);
        assert!(report.expired.is_empty());
        assert_eq!(stream.active()[0].position, field.travel_length());

        let report = stream.step(48.0, &field);
        assert_eq!(report.expired.len(), 1);
        assert_eq!(report.expired[0].position, 20.0);
        assert!(stream.active().is_empty());
    }

    #[test]
    fn out_of_range_lane_is_skipped() {
        let field = PlayField::default();
        let mut stream = NoteStream::new(chart(&[(0, 5), (0, 0)]), 2, 1.0);
        let report = stream.step(0.0, &field);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.spawned.len(), 1);
    }

    #[test]
    fn remove_is_idempotent() {
        let field = PlayField::default();
        let mut stream = NoteStream::new(chart(&[(0, 0)]), 1, 1.0);
        stream.step(0.0, &field);
        assert!(stream.remove(NoteId(0)).is_some());
        assert!(stream.remove(NoteId(0)).is_none());
        assert!(stream.remove(NoteId(42)).is_none());
        assert!(stream.active().is_empty());
    }

    #[test]
    fn field_geometry_must_be_finite_and_non_negative() {
        assert!(PlayField::default().validate().is_ok());
        assert!(PlayField::new(300.0, 0.0, 0.0).validate().is_ok());
        for field in [
            PlayField::new(-10.0, 20.0, -1000.0),
            PlayField::new(0.0, 20.0, 50.0),
            PlayField::new(350.0, -1.0, 50.0),
            PlayField::new(350.0, 20.0, -1.0),
            PlayField::new(f64::NAN, 20.0, 50.0),
            PlayField::new(350.0, 20.0, f64::INFINITY),
        ] {
            assert!(
                matches!(field.validate(), Err(ConfigError::InvalidField { .. })),
                "{field:?} accepted"
            );
        }
    }
}
