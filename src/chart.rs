//! Chart generation: the ordered note schedule a session plays against.
//!
//! Two generators exist. `fixed_chart` walks a cyclic lane pattern one beat at a
//! time; `measure_chart` samples a 4-slot rhythm template per measure from a
//! difficulty-keyed pool and scatters hits over the lanes with an injected RNG.
//! Both emit events in ascending time by construction. Charts built from
//! arbitrary event lists go through `Chart::from_events`, which stable-sorts.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::ConfigError;

/// One scheduled note: when it spawns (ms since session start) and in which lane.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChartEvent {
    pub time_offset_ms: u64,
    pub lane: usize,
}

/// Upper bound on beat slots (fixed beats, or measures x 4) in one chart.
pub const MAX_CHART_SLOTS: u64 = 100_000;

/// A slot in a fixed pattern: a lane index or a rest.
pub type Slot = Option<usize>;

/// 4-slot rhythm template for one measure; `true` = hit on that quarter.
pub type MeasureTemplate = [bool; 4];

const X: bool = true;
const O: bool = false;

const EASY_TEMPLATES: &[MeasureTemplate] = &[[X, O, O, O], [X, O, X, O], [O, O, X, O]];
const NORMAL_TEMPLATES: &[MeasureTemplate] =
    &[[X, O, X, O], [X, X, O, X], [X, O, X, X], [O, X, O, X]];
const HARD_TEMPLATES: &[MeasureTemplate] =
    &[[X, X, X, X], [X, X, O, X], [X, O, X, X], [O, X, X, X], [X, X, X, O]];

/// Named template pool for randomized charts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PatternPool {
    Easy,
    Normal,
    Hard,
}

impl PatternPool {
    pub fn templates(self) -> &'static [MeasureTemplate] {
        match self {
            PatternPool::Easy => EASY_TEMPLATES,
            PatternPool::Normal => NORMAL_TEMPLATES,
            PatternPool::Hard => HARD_TEMPLATES,
        }
    }
}

/// How a difficulty builds its chart.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "lowercase"))]
pub enum ChartSpec {
    Fixed {
        bpm: f64,
        duration_seconds: f64,
        pattern: Vec<Slot>,
    },
    Measures {
        bpm: f64,
        total_measures: u32,
        pool: PatternPool,
    },
}

impl ChartSpec {
    pub fn bpm(&self) -> f64 {
        match self {
            ChartSpec::Fixed { bpm, .. } | ChartSpec::Measures { bpm, .. } => *bpm,
        }
    }

    pub fn validate(&self, lane_count: usize) -> Result<(), ConfigError> {
        let bpm = self.bpm();
        if !(bpm.is_finite() && bpm > 0.0) {
            return Err(ConfigError::InvalidTempo(bpm));
        }
        match self {
            ChartSpec::Fixed {
                duration_seconds,
                pattern,
                ..
            } => {
                if !(duration_seconds.is_finite() && *duration_seconds > 0.0) {
                    return Err(ConfigError::InvalidDuration);
                }
                if pattern.is_empty() {
                    return Err(ConfigError::EmptyPattern);
                }
                if let Some(&lane) = pattern.iter().flatten().find(|&&l| l >= lane_count) {
                    return Err(ConfigError::LaneOutOfRange { lane, lane_count });
                }
                check_slots((duration_seconds * bpm / 60.0).floor())?;
            }
            ChartSpec::Measures {
                total_measures,
                pool,
                ..
            } => {
                if *total_measures == 0 {
                    return Err(ConfigError::InvalidDuration);
                }
                if pool.templates().is_empty() {
                    return Err(ConfigError::EmptyPatternPool);
                }
                check_slots(*total_measures as f64 * 4.0)?;
            }
        }
        Ok(())
    }

    /// Generate the chart. The RNG is only consulted for `Measures`.
    pub fn build<R: Rng + ?Sized>(&self, lane_count: usize, rng: &mut R) -> Chart {
        let events = match self {
            ChartSpec::Fixed {
                bpm,
                duration_seconds,
                pattern,
            } => fixed_chart(*bpm, *duration_seconds, pattern),
            ChartSpec::Measures {
                bpm,
                total_measures,
                pool,
            } => measure_chart(*bpm, *total_measures, pool.templates(), lane_count, rng),
        };
        Chart { events }
    }
}

fn check_slots(slots: f64) -> Result<(), ConfigError> {
    if !slots.is_finite() || slots > MAX_CHART_SLOTS as f64 {
        return Err(ConfigError::ChartTooLong {
            slots,
            max: MAX_CHART_SLOTS,
        });
    }
    Ok(())
}

/// One candidate note per beat, lanes cycling through `pattern`; rests emit nothing.
pub fn fixed_chart(bpm: f64, duration_seconds: f64, pattern: &[Slot]) -> Vec<ChartEvent> {
    if pattern.is_empty() || bpm <= 0.0 {
        return Vec::new();
    }
    let beat_interval_ms = 60_000.0 / bpm;
    let total_beats = (duration_seconds * 1000.0 / beat_interval_ms).floor() as usize;
    (0..total_beats)
        .filter_map(|i| {
            pattern[i % pattern.len()].map(|lane| ChartEvent {
                time_offset_ms: ((i + 1) as f64 * beat_interval_ms).floor() as u64,
                lane,
            })
        })
        .collect()
}

/// Per measure, pick a template uniformly from `pool` and place its hits on the
/// quarter grid. Lanes are uniform over `[0, lane_count)`; lane 0 when single-lane.
pub fn measure_chart<R: Rng + ?Sized>(
    bpm: f64,
    total_measures: u32,
    pool: &[MeasureTemplate],
    lane_count: usize,
    rng: &mut R,
) -> Vec<ChartEvent> {
    if pool.is_empty() || bpm <= 0.0 {
        return Vec::new();
    }
    let measure_ms = 60_000.0 / bpm * 4.0;
    let mut events = Vec::new();
    for measure in 0..total_measures {
        let Some(template) = pool.choose(rng) else {
            break;
        };
        for (slot, &hit) in template.iter().enumerate() {
            if !hit {
                continue;
            }
            let lane = if lane_count <= 1 {
                0
            } else {
                rng.gen_range(0..lane_count)
            };
            let t = measure as f64 * measure_ms + slot as f64 * measure_ms / 4.0;
            events.push(ChartEvent {
                time_offset_ms: t.floor() as u64,
                lane,
            });
        }
    }
    events
}

/// An immutable chart, ordered ascending by `time_offset_ms`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Chart {
    events: Vec<ChartEvent>,
}

impl Chart {
    /// Wrap arbitrary events, stable-sorting by time when they arrive out of order.
    pub fn from_events(mut events: Vec<ChartEvent>) -> Self {
        if !is_time_ordered(&events) {
            events.sort_by_key(|e| e.time_offset_ms);
        }
        Self { events }
    }

    pub fn events(&self) -> &[ChartEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn into_events(self) -> Vec<ChartEvent> {
        self.events
    }
}

pub fn is_time_ordered(events: &[ChartEvent]) -> bool {
    events
        .windows(2)
        .all(|w| w[0].time_offset_ms <= w[1].time_offset_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn fixed_chart_places_one_note_per_beat() {
        let events = fixed_chart(120.0, 60.0, &[Some(0), Some(1), Some(2), Some(1)]);
        assert_eq!(events.len(), 120);
        let head: Vec<(u64, usize)> = events[..4].iter().map(|e| (e.time_offset_ms, e.lane)).collect();
        assert_eq!(head, vec![(500, 0), (1000, 1), (1500, 2), (2000, 1)]);
        assert_eq!(events.last().map(|e| e.time_offset_ms), Some(60_000));
    }

    #[test]
    fn fixed_chart_skips_rests_and_floors_times() {
        // 135 bpm -> 444.44ms beats
        let events = fixed_chart(135.0, 2.0, &[Some(0), None, Some(2)]);
        let got: Vec<(u64, usize)> = events.iter().map(|e| (e.time_offset_ms, e.lane)).collect();
        assert_eq!(got, vec![(444, 0), (1333, 2), (1777, 0)]);
    }

    #[test]
    fn measure_chart_is_reproducible_with_same_seed() {
        let a = measure_chart(128.0, 16, HARD_TEMPLATES, 3, &mut StdRng::seed_from_u64(7));
        let b = measure_chart(128.0, 16, HARD_TEMPLATES, 3, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert!(is_time_ordered(&a));
        assert!(a.iter().all(|e| e.lane < 3));
    }

    #[test]
    fn measure_chart_stays_on_quarter_grid() {
        // 120 bpm -> 2000ms measures, 500ms quarters
        let events = measure_chart(120.0, 8, NORMAL_TEMPLATES, 1, &mut StdRng::seed_from_u64(1));
        assert!(!events.is_empty());
        for e in &events {
            assert_eq!(e.time_offset_ms % 500, 0);
            assert!(e.time_offset_ms < 16_000);
            assert_eq!(e.lane, 0);
        }
    }

    #[test]
    fn from_events_sorts_stably() {
        let chart = Chart::from_events(vec![
            ChartEvent { time_offset_ms: 900, lane: 1 },
            ChartEvent { time_offset_ms: 100, lane: 2 },
            ChartEvent { time_offset_ms: 900, lane: 0 },
        ]);
        let lanes: Vec<usize> = chart.events().iter().map(|e| e.lane).collect();
        assert_eq!(lanes, vec![2, 1, 0]);
    }

    #[test]
    fn validate_rejects_out_of_range_pattern_lane() {
        let spec = ChartSpec::Fixed {
            bpm: 120.0,
            duration_seconds: 10.0,
            pattern: vec![Some(0), Some(3)],
        };
        assert_eq!(
            spec.validate(3),
            Err(ConfigError::LaneOutOfRange { lane: 3, lane_count: 3 })
        );
        assert_eq!(spec.validate(4), Ok(()));
    }

    #[test]
    fn validate_rejects_bad_tempo() {
        let spec = ChartSpec::Measures {
            bpm: 0.0,
            total_measures: 4,
            pool: PatternPool::Easy,
        };
        assert_eq!(spec.validate(1), Err(ConfigError::InvalidTempo(0.0)));
    }

    #[test]
    fn validate_caps_chart_length() {
        let huge_tempo = ChartSpec::Fixed {
            bpm: 1e300,
            duration_seconds: 60.0,
            pattern: vec![Some(0)],
        };
        assert!(matches!(
            huge_tempo.validate(1),
            Err(ConfigError::ChartTooLong { max: MAX_CHART_SLOTS, .. })
        ));

        let long_song = ChartSpec::Fixed {
            bpm: 120.0,
            duration_seconds: 1e9,
            pattern: vec![Some(0)],
        };
        assert!(matches!(long_song.validate(1), Err(ConfigError::ChartTooLong { .. })));

        // 100_000 beats exactly is still allowed
        let at_cap = ChartSpec::Fixed {
            bpm: 6_000.0,
            duration_seconds: 1_000.0,
            pattern: vec![Some(0)],
        };
        assert_eq!(at_cap.validate(1), Ok(()));

        let many_measures = ChartSpec::Measures {
            bpm: 120.0,
            total_measures: u32::MAX,
            pool: PatternPool::Hard,
        };
        assert_eq!(
            many_measures.validate(1),
            Err(ConfigError::ChartTooLong {
                slots: u32::MAX as f64 * 4.0,
                max: MAX_CHART_SLOTS,
            })
        );
        let measures_at_cap = ChartSpec::Measures {
            bpm: 120.0,
            total_measures: 25_000,
            pool: PatternPool::Hard,
        };
        assert_eq!(measures_at_cap.validate(1), Ok(()));
    }
}
