//! Beat Lane core crate.
//!
//! Notes fall toward a judgment line in sync with a track; presses on mapped
//! keys (or taps on the field) are judged by how far the nearest note in that
//! lane is from the line. The gameplay engine (`chart`, `notes`, `judge`,
//! `session`) is plain Rust and runs under host tests; `stage` wires it to the
//! browser (canvas, keyboard, `<audio>`, requestAnimationFrame).

use wasm_bindgen::prelude::*;

pub mod chart;
pub mod clock;
pub mod difficulty;
pub mod error;
pub mod judge;
pub mod logging;
pub mod notes;
pub mod session;
mod stage;

pub use chart::{Chart, ChartEvent, ChartSpec, PatternPool};
pub use clock::{Clock, ManualClock, PerformanceClock, PlaybackClock};
pub use difficulty::{DifficultyConfig, LaneMapping, PRESET_KEYS};
pub use error::{ConfigError, TransportError};
pub use judge::{JudgeWindows, Judgment};
pub use notes::{ActiveNote, NoteId, NoteStream, PlayField};
pub use session::{
    AudioTransport, EndReason, Game, GameEvent, JudgmentCounts, MAX_HEALTH, NoAudio, RenderSink,
    RetireCause, SessionResult, SessionState,
};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);
}

// -----------------------------------------------------------------------------
// Page entrypoints
// -----------------------------------------------------------------------------

/// Start a session on a preset (`"easy"`, `"level-hard"`, ...). Unknown keys
/// are rejected before anything starts.
#[wasm_bindgen]
pub fn start_game(level: &str) -> Result<(), JsValue> {
    stage::start_stage(level)
}

/// Start a session from a JSON-encoded `DifficultyConfig`.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_game_json(config: &str) -> Result<(), JsValue> {
    let config = DifficultyConfig::from_json(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
    stage::start_stage_with(&config)
}

#[wasm_bindgen]
pub fn give_up() {
    stage::give_up();
}

#[wasm_bindgen]
pub fn current_score() -> f64 {
    stage::score() as f64
}

/// Health in survival presets; `undefined` when the session tracks none.
#[wasm_bindgen]
pub fn current_health() -> Option<u8> {
    stage::health()
}

#[wasm_bindgen]
pub fn final_score() -> Option<f64> {
    stage::last_result().map(|r| r.score as f64)
}

#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn final_result_json() -> Option<String> {
    let result = stage::last_result()?;
    match serde_json::to_string(&result) {
        Ok(json) => Some(json),
        Err(e) => {
            log::error!("could not encode session result: {e}");
            None
        }
    }
}

#[wasm_bindgen]
pub fn difficulty_keys() -> String {
    PRESET_KEYS.join(",")
}
