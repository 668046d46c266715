//! Browser stage: owns the canvas, the keyboard / pointer listeners, the audio
//! element and the requestAnimationFrame loop, and forwards all of it to a
//! single `Game`.
//!
//! The stage lives in a thread-local so event closures can reach it. Every
//! callback takes one `borrow_mut` for its whole run, so a frame and a key
//! press never observe each other half-done. The frame loop is cancelled as
//! soon as the session ends, whichever callback ended it.
use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, window};

use crate::clock::{Clock, PerformanceClock};
use crate::difficulty::{self, DifficultyConfig};
use crate::notes::PlayField;
use crate::session::{Game, GameEvent, SessionResult};

mod audio;
mod render;

use audio::HtmlAudio;
use render::Canvas;

type StageGame = Game<PerformanceClock, HtmlAudio, Vec<GameEvent>>;
type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

struct Stage {
    game: StageGame,
    canvas: Canvas,
    frame: FrameCallback,
    frame_handle: Option<i32>,
    // Field geometry and lane count of the current (or last) session
    layout: (PlayField, usize),
}

impl Stage {
    /// Move buffered engine events into the renderer.
    fn flush_events(&mut self, now: f64) {
        let events = std::mem::take(self.game.sink_mut());
        self.canvas.absorb(&events, now);
    }

    fn draw(&self, now: f64) {
        let (field, lanes) = self.layout;
        self.canvas.draw(self.game.active_notes(), &field, lanes, now);
    }

    /// Cancel the pending frame once the session is over, then paint the
    /// result overlay a last time.
    fn halt_if_ended(&mut self) {
        if self.game.is_running() {
            return;
        }
        if let Some(handle) = self.frame_handle.take() {
            if let Some(w) = window() {
                let _ = w.cancel_animation_frame(handle);
            }
        }
        let now = PerformanceClock.now_ms();
        self.flush_events(now);
        self.draw(now);
    }

    fn request_frame(&mut self) {
        if self.frame_handle.is_some() {
            return;
        }
        let Some(w) = window() else { return };
        let frame = self.frame.borrow();
        if let Some(cb) = frame.as_ref() {
            self.frame_handle = w.request_animation_frame(cb.as_ref().unchecked_ref()).ok();
        }
    }
}

thread_local! {
    static STAGE: RefCell<Option<Stage>> = const { RefCell::new(None) };
}

/// Start (or restart) a session on the given preset key.
pub fn start_stage(level: &str) -> Result<(), JsValue> {
    let config = difficulty::preset(level).map_err(|e| JsValue::from_str(&e.to_string()))?;
    start_stage_with(config)
}

pub fn start_stage_with(config: &DifficultyConfig) -> Result<(), JsValue> {
    let needs_setup = STAGE.with(|cell| cell.borrow().is_none());
    if needs_setup {
        let stage = build_stage()?;
        STAGE.with(|cell| cell.replace(Some(stage)));
    }
    STAGE.with(|cell| {
        let mut guard = cell.borrow_mut();
        let stage = guard.as_mut().ok_or_else(|| JsValue::from_str("stage missing"))?;
        stage
            .game
            .start_session(config)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        // Drop the replaced session's tail (its SessionEnded included).
        let events = std::mem::take(stage.game.sink_mut());
        let fresh = events
            .iter()
            .rposition(|e| matches!(e, GameEvent::SessionEnded(_)))
            .map_or(0, |i| i + 1);
        stage.layout = (config.field, config.lane_count());
        stage.canvas.reset();
        stage.canvas.absorb(&events[fresh..], PerformanceClock.now_ms());
        stage.request_frame();
        Ok(())
    })
}

pub fn give_up() {
    with_stage(|stage| {
        stage.game.give_up();
        stage.halt_if_ended();
    });
}

pub fn score() -> u64 {
    with_stage(|stage| stage.game.score()).unwrap_or(0)
}

pub fn health() -> Option<u8> {
    with_stage(|stage| stage.game.health()).flatten()
}

pub fn last_result() -> Option<SessionResult> {
    with_stage(|stage| stage.game.last_result().cloned()).flatten()
}

fn with_stage<T>(f: impl FnOnce(&mut Stage) -> T) -> Option<T> {
    STAGE.with(|cell| cell.borrow_mut().as_mut().map(f))
}

pub(crate) fn on_audio_ended() {
    with_stage(|stage| {
        stage.game.audio_ended();
        stage.halt_if_ended();
    });
}

fn build_stage() -> Result<Stage, JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    // Create / reuse the play-field canvas
    let canvas: HtmlCanvasElement = if let Some(el) = doc.get_element_by_id("bl-canvas") {
        el.dyn_into()?
    } else {
        let c: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into()?;
        c.set_id("bl-canvas");
        c.set_width(360);
        c.set_height(600);
        c.set_attribute("style", "position:fixed; left:50%; top:50%; transform:translate(-50%,-50%); border:2px solid #222; border-radius:12px; background:#141420; z-index:20;").ok();
        let body = doc.body().ok_or_else(|| JsValue::from_str("no body"))?;
        body.append_child(&c)?;
        c
    };
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()?;

    // Keyboard: mapped keys judge, Escape gives up.
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
            if evt.repeat() {
                return;
            }
            let key = evt.key();
            with_stage(|stage| {
                if key == "Escape" {
                    stage.game.give_up();
                } else if stage.game.handle_input(&key).is_some() {
                    evt.prevent_default();
                }
                stage.halt_if_ended();
            });
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Pointer: a press on the canvas judges the lane under it.
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::MouseEvent| {
            let x = evt.offset_x() as f64;
            with_stage(|stage| {
                let lanes = stage.game.config().map(|c| c.lane_count()).unwrap_or(0);
                if lanes == 0 || x < 0.0 {
                    return;
                }
                let lane = ((x / (stage.canvas.width() / lanes as f64)).floor() as usize).min(lanes - 1);
                stage.game.handle_lane(lane);
                stage.halt_if_ended();
            });
        }) as Box<dyn FnMut(_)>);
        canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    let frame: FrameCallback = Rc::new(RefCell::new(None));
    *frame.borrow_mut() = Some(Closure::wrap(Box::new(move |_ts: f64| {
        with_stage(|stage| {
            stage.frame_handle = None;
            stage.game.tick();
            let now = PerformanceClock.now_ms();
            stage.flush_events(now);
            stage.draw(now);
            if stage.game.is_running() {
                stage.request_frame();
            } else {
                stage.halt_if_ended();
            }
        });
    }) as Box<dyn FnMut(f64)>));

    Ok(Stage {
        game: Game::new(PerformanceClock, HtmlAudio::new(), Vec::new()),
        canvas: Canvas::new(canvas, ctx),
        frame,
        frame_handle: None,
        layout: (PlayField::default(), 1),
    })
}
