// Survival: hard measures with health tracking; ten misses from full ends the run.
use super::{DifficultyConfig, home_row};
use crate::chart::{ChartSpec, PatternPool};
use crate::judge::JudgeWindows;
use crate::notes::PlayField;
use std::sync::OnceLock;

pub fn survival() -> &'static DifficultyConfig {
    static LD: OnceLock<DifficultyConfig> = OnceLock::new();
    LD.get_or_init(|| DifficultyConfig {
        name: "survival".into(),
        track: Some("assets/audio/song-survival.mp3".into()),
        chart: ChartSpec::Measures {
            bpm: 140.0,
            total_measures: 48,
            pool: PatternPool::Hard,
        },
        lanes: home_row(),
        note_speed: 3.0,
        windows: JudgeWindows::WIDE,
        field: PlayField::default(),
        health: true,
    })
}
