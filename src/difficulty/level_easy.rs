// Easy: quarter notes at 120 bpm sweeping the three lanes.
use super::{DifficultyConfig, home_row};
use crate::chart::ChartSpec;
use crate::judge::JudgeWindows;
use crate::notes::PlayField;
use std::sync::OnceLock;

pub fn easy() -> &'static DifficultyConfig {
    static LD: OnceLock<DifficultyConfig> = OnceLock::new();
    LD.get_or_init(|| DifficultyConfig {
        name: "easy".into(),
        track: Some("assets/audio/song-easy.mp3".into()),
        chart: ChartSpec::Fixed {
            bpm: 120.0,
            duration_seconds: 60.0,
            pattern: vec![Some(0), Some(1), Some(2), Some(1)],
        },
        lanes: home_row(),
        note_speed: 2.0,
        windows: JudgeWindows::NARROW,
        field: PlayField::default(),
        health: false,
    })
}
