//! Error taxonomy for session setup and audio transport.
//!
//! Judgment no-ops (empty-lane presses, out-of-tier presses) are not errors and
//! never show up here; tick and input handling do not fail.

use thiserror::Error;

/// Rejected difficulty configuration. Raised by `Game::start_session` before
/// any session state is touched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),

    #[error("tempo must be a positive, finite bpm (got {0})")]
    InvalidTempo(f64),

    #[error("chart length must be positive")]
    InvalidDuration,

    #[error("chart pattern is empty")]
    EmptyPattern,

    #[error("pattern pool is empty")]
    EmptyPatternPool,

    #[error("lane count must be at least 1")]
    NoLanes,

    #[error("lane {lane} out of range for {lane_count} lane(s)")]
    LaneOutOfRange { lane: usize, lane_count: usize },

    #[error("note speed must be positive and finite (got {0})")]
    InvalidNoteSpeed(f64),

    #[error("some lanes have no input symbol mapped")]
    UnmappedLanes,

    #[error(
        "play field needs a positive judgment line and non-negative extent and margin \
         (got line {judgment_line}, extent {note_extent}, margin {miss_margin})"
    )]
    InvalidField {
        judgment_line: f64,
        note_extent: f64,
        miss_margin: f64,
    },

    #[error("judgment windows must be finite and ascend from a positive perfect window")]
    InvalidWindows,

    #[error("chart would hold {slots} beat slot(s); at most {max} are allowed")]
    ChartTooLong { slots: f64, max: u64 },

    #[cfg(feature = "serde_json")]
    #[error("malformed difficulty config: {0}")]
    Malformed(String),
}

/// Audio transport failure. Never fatal: the session continues on the clock.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    #[error("audio playback failed: {0}")]
    PlaybackFailed(String),
}
