//! Difficulty descriptors: chart recipe, lane bindings, note speed, judgment
//! windows and whether health is tracked.
//!
//! The built-in presets live in one file each (`level_*.rs`) and are built
//! lazily on first lookup. A session can also be started from a hand-built
//! `DifficultyConfig`; every config is validated before use.

use std::sync::OnceLock;

use crate::chart::ChartSpec;
use crate::error::ConfigError;
use crate::judge::JudgeWindows;
use crate::notes::PlayField;

mod level_easy;
mod level_hard;
mod level_normal;
mod level_random;
mod level_single;
mod level_survival;

/// One input symbol bound to a lane.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyBinding {
    pub symbol: String,
    pub lane: usize,
}

/// Input symbol -> lane. Fixed for the session. Symbols match ASCII
/// case-insensitively so a held Shift does not swallow presses.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LaneMapping {
    lane_count: usize,
    bindings: Vec<KeyBinding>,
}

impl LaneMapping {
    pub fn new(lane_count: usize, bindings: &[(&str, usize)]) -> Self {
        Self {
            lane_count,
            bindings: bindings
                .iter()
                .map(|&(symbol, lane)| KeyBinding {
                    symbol: symbol.to_string(),
                    lane,
                })
                .collect(),
        }
    }

    /// One symbol per lane, lane `i` bound to `symbols[i]`.
    pub fn from_symbols(symbols: &[&str]) -> Self {
        let pairs: Vec<(&str, usize)> = symbols.iter().enumerate().map(|(i, s)| (*s, i)).collect();
        Self::new(symbols.len(), &pairs)
    }

    pub fn lane_count(&self) -> usize {
        self.lane_count
    }

    pub fn lane_for(&self, symbol: &str) -> Option<usize> {
        self.bindings
            .iter()
            .find(|b| b.symbol.eq_ignore_ascii_case(symbol))
            .map(|b| b.lane)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lane_count == 0 {
            return Err(ConfigError::NoLanes);
        }
        if let Some(b) = self.bindings.iter().find(|b| b.lane >= self.lane_count) {
            return Err(ConfigError::LaneOutOfRange {
                lane: b.lane,
                lane_count: self.lane_count,
            });
        }
        let all_bound = (0..self.lane_count).all(|lane| self.bindings.iter().any(|b| b.lane == lane));
        if !all_bound {
            return Err(ConfigError::UnmappedLanes);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DifficultyConfig {
    pub name: String,
    /// Audio track handed to the transport; `None` plays silently.
    pub track: Option<String>,
    pub chart: ChartSpec,
    pub lanes: LaneMapping,
    /// Distance a note travels per tick.
    pub note_speed: f64,
    pub windows: JudgeWindows,
    pub field: PlayField,
    /// Survival rules: health 0..=100, session ends at 0.
    pub health: bool,
}

impl DifficultyConfig {
    pub fn lane_count(&self) -> usize {
        self.lanes.lane_count()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.lanes.validate()?;
        if !(self.note_speed.is_finite() && self.note_speed > 0.0) {
            return Err(ConfigError::InvalidNoteSpeed(self.note_speed));
        }
        self.field.validate()?;
        self.windows.validate()?;
        self.chart.validate(self.lane_count())
    }

    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Keys of the built-in presets, in menu order.
pub const PRESET_KEYS: [&str; 6] = ["easy", "normal", "hard", "random", "single", "survival"];

fn presets() -> &'static [&'static DifficultyConfig] {
    static PRESETS: OnceLock<Vec<&'static DifficultyConfig>> = OnceLock::new();
    PRESETS.get_or_init(|| {
        vec![
            level_easy::easy(),
            level_normal::normal(),
            level_hard::hard(),
            level_random::random(),
            level_single::single(),
            level_survival::survival(),
        ]
    })
}

/// Look up a built-in preset. Accepts the bare key or the `level-` prefixed
/// button id the page uses.
pub fn preset(key: &str) -> Result<&'static DifficultyConfig, ConfigError> {
    let bare = key.strip_prefix("level-").unwrap_or(key);
    presets()
        .iter()
        .copied()
        .find(|c| c.name == bare)
        .ok_or_else(|| ConfigError::UnknownDifficulty(key.to_string()))
}

/// The three-lane home-row layout shared by the keyboard presets.
fn home_row() -> LaneMapping {
    LaneMapping::from_symbols(&["d", "f", "j"])
}
