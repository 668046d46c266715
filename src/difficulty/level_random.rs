// Random: fresh measures every play, drawn from the normal pool.
use super::{DifficultyConfig, home_row};
use crate::chart::{ChartSpec, PatternPool};
use crate::judge::JudgeWindows;
use crate::notes::PlayField;
use std::sync::OnceLock;

pub fn random() -> &'static DifficultyConfig {
    static LD: OnceLock<DifficultyConfig> = OnceLock::new();
    LD.get_or_init(|| DifficultyConfig {
        name: "random".into(),
        track: Some("assets/audio/song-random.mp3".into()),
        chart: ChartSpec::Measures {
            bpm: 128.0,
            total_measures: 32,
            pool: PatternPool::Normal,
        },
        lanes: home_row(),
        note_speed: 2.5,
        windows: JudgeWindows::WIDE,
        field: PlayField::default(),
        health: false,
    })
}
