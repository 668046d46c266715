// Normal: 135 bpm, eight-beat phrase ending on a rest.
use super::{DifficultyConfig, home_row};
use crate::chart::ChartSpec;
use crate::judge::JudgeWindows;
use crate::notes::PlayField;
use std::sync::OnceLock;

pub fn normal() -> &'static DifficultyConfig {
    static LD: OnceLock<DifficultyConfig> = OnceLock::new();
    LD.get_or_init(|| DifficultyConfig {
        name: "normal".into(),
        track: Some("assets/audio/song-normal.mp3".into()),
        chart: ChartSpec::Fixed {
            bpm: 135.0,
            duration_seconds: 60.0,
            pattern: vec![Some(0), Some(2), Some(1), Some(0), Some(1), Some(2), Some(0), None],
        },
        lanes: home_row(),
        note_speed: 2.0,
        windows: JudgeWindows::NARROW,
        field: PlayField::default(),
        health: false,
    })
}
