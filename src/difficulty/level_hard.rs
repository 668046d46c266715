// Hard: a 150 bpm song charted on an eighth-note grid (300 "beats" per
// minute) with rests thinning it out.
use super::{DifficultyConfig, home_row};
use crate::chart::{ChartSpec, Slot};
use crate::judge::JudgeWindows;
use crate::notes::PlayField;
use std::sync::OnceLock;

const HARD_PATTERN: [Slot; 16] = [
    Some(0), None, Some(1), None, Some(2), None, Some(1), None,
    Some(0), Some(1), Some(2), None, Some(0), None, Some(1), Some(2),
];

pub fn hard() -> &'static DifficultyConfig {
    static LD: OnceLock<DifficultyConfig> = OnceLock::new();
    LD.get_or_init(|| DifficultyConfig {
        name: "hard".into(),
        track: Some("assets/audio/song-hard.mp3".into()),
        chart: ChartSpec::Fixed {
            bpm: 150.0 * 2.0,
            duration_seconds: 60.0,
            pattern: HARD_PATTERN.to_vec(),
        },
        lanes: home_row(),
        note_speed: 3.0,
        windows: JudgeWindows::NARROW,
        field: PlayField::default(),
        health: false,
    })
}
