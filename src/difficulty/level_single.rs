// Single: one lane, one button (space bar or a tap anywhere on the field).
use super::{DifficultyConfig, LaneMapping};
use crate::chart::{ChartSpec, PatternPool};
use crate::judge::JudgeWindows;
use crate::notes::PlayField;
use std::sync::OnceLock;

pub fn single() -> &'static DifficultyConfig {
    static LD: OnceLock<DifficultyConfig> = OnceLock::new();
    LD.get_or_init(|| DifficultyConfig {
        name: "single".into(),
        track: Some("assets/audio/song-single.mp3".into()),
        chart: ChartSpec::Measures {
            bpm: 110.0,
            total_measures: 28,
            pool: PatternPool::Easy,
        },
        lanes: LaneMapping::new(1, &[(" ", 0), ("Spacebar", 0)]),
        note_speed: 2.0,
        windows: JudgeWindows::WIDE,
        field: PlayField::default(),
        health: false,
    })
}
