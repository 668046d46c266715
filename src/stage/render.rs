// Canvas renderer. Reads engine output (events + active notes) and never
// writes back into the engine.
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::judge::Judgment;
use crate::notes::{ActiveNote, PlayField};
use crate::session::{EndReason, GameEvent, SessionResult};

const EFFECT_MS: f64 = 500.0;

// Floating judgment label
struct Effect {
    label: &'static str,
    lane: usize,
    start_ms: f64,
}

pub struct Canvas {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    effects: Vec<Effect>,
    score: u64,
    health: Option<u8>,
    result: Option<SessionResult>,
}

impl Canvas {
    pub fn new(canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d) -> Self {
        Self {
            canvas,
            ctx,
            effects: Vec::new(),
            score: 0,
            health: None,
            result: None,
        }
    }

    pub fn width(&self) -> f64 {
        self.canvas.width() as f64
    }

    /// Forget the previous session's HUD state.
    pub fn reset(&mut self) {
        self.effects.clear();
        self.score = 0;
        self.health = None;
        self.result = None;
    }

    pub fn absorb(&mut self, events: &[GameEvent], now: f64) {
        for event in events {
            match event {
                GameEvent::NoteSpawned { .. } => {}
                GameEvent::NoteRetired { lane, judgment, .. } => self.effects.push(Effect {
                    label: judgment.label(),
                    lane: *lane,
                    start_ms: now,
                }),
                GameEvent::MissedPress { lane, .. } => self.effects.push(Effect {
                    label: Judgment::Miss.label(),
                    lane: *lane,
                    start_ms: now,
                }),
                GameEvent::ScoreChanged(s) => self.score = *s,
                GameEvent::HealthChanged(h) => self.health = Some(*h),
                GameEvent::SessionEnded(r) => self.result = Some(r.clone()),
            }
        }
        self.effects.retain(|e| now - e.start_ms < EFFECT_MS);
    }

    pub fn draw(&self, notes: &[ActiveNote], field: &PlayField, lane_count: usize, now: f64) {
        let w = self.width();
        let h = self.canvas.height() as f64;
        let lane_w = w / lane_count.max(1) as f64;
        // Field units -> pixels: the bottom edge is where notes expire.
        let scale = h / field.travel_length();
        let ctx = &self.ctx;

        ctx.set_fill_style_str("#141420");
        ctx.fill_rect(0.0, 0.0, w, h);

        ctx.set_stroke_style_str("#2a2a3a");
        ctx.set_line_width(2.0);
        for lane in 1..lane_count {
            let x = lane as f64 * lane_w;
            line(ctx, x, 0.0, x, h);
        }

        let line_y = field.judgment_line * scale;
        ctx.set_stroke_style_str("#ffd166");
        ctx.set_line_width(4.0);
        line(ctx, 0.0, line_y, w, line_y);

        let note_h = field.note_extent * scale;
        ctx.set_fill_style_str("#7ad7ff");
        for note in notes {
            let y = note.position * scale;
            let x = note.lane as f64 * lane_w;
            ctx.fill_rect(x + lane_w * 0.15, y, lane_w * 0.7, note_h);
        }

        ctx.set_text_align("center");
        ctx.set_font("bold 22px 'Fira Code', monospace");
        for e in &self.effects {
            let t = ((now - e.start_ms) / EFFECT_MS).clamp(0.0, 1.0);
            let alpha = 1.0 - t;
            let color = match e.label {
                "Perfect" => format!("rgba(255,209,102,{alpha:.2})"),
                "Miss" => format!("rgba(255,77,77,{alpha:.2})"),
                _ => format!("rgba(180,240,255,{alpha:.2})"),
            };
            ctx.set_fill_style_str(&color);
            let x = e.lane as f64 * lane_w + lane_w / 2.0;
            ctx.fill_text(e.label, x, line_y - 24.0 - t * 30.0).ok();
        }

        ctx.set_text_align("left");
        ctx.set_font("15px 'Fira Code', monospace");
        ctx.set_fill_style_str("#ffd166");
        ctx.fill_text(&format!("Score: {}", self.score), 12.0, 24.0).ok();
        if let Some(hp) = self.health {
            let bar_w = 120.0;
            ctx.set_fill_style_str("#333");
            ctx.fill_rect(w - bar_w - 12.0, 12.0, bar_w, 12.0);
            ctx.set_fill_style_str(if hp > 30 { "#5ee07a" } else { "#ff4d4d" });
            ctx.fill_rect(w - bar_w - 12.0, 12.0, bar_w * hp as f64 / 100.0, 12.0);
        }

        if let Some(r) = &self.result {
            self.draw_result(r, w, h);
        }
    }

    fn draw_result(&self, r: &SessionResult, w: f64, h: f64) {
        let ctx = &self.ctx;
        ctx.set_fill_style_str("rgba(0,0,0,0.72)");
        ctx.fill_rect(0.0, 0.0, w, h);
        ctx.set_text_align("center");
        ctx.set_fill_style_str("#ffffff");
        ctx.set_font("bold 28px 'Fira Code', monospace");
        let title = match r.reason {
            EndReason::HealthDepleted => "Game Over",
            EndReason::GaveUp => "Gave Up",
            EndReason::TrackEnded | EndReason::Replaced => "Finished",
        };
        ctx.fill_text(title, w / 2.0, h / 2.0 - 40.0).ok();
        ctx.set_font("18px 'Fira Code', monospace");
        ctx.fill_text(&format!("Final score: {}", r.score), w / 2.0, h / 2.0).ok();
        let c = r.counts;
        let tally = format!(
            "P {}  Gr {}  Gd {}  M {}",
            c.perfect, c.great, c.good, c.miss
        );
        ctx.fill_text(&tally, w / 2.0, h / 2.0 + 30.0).ok();
    }
}

fn line(ctx: &CanvasRenderingContext2d, x1: f64, y1: f64, x2: f64, y2: f64) {
    ctx.begin_path();
    ctx.move_to(x1, y1);
    ctx.line_to(x2, y2);
    ctx.stroke();
}
