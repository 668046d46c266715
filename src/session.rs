//! Session lifecycle and the engine surface the page drives.
//!
//! `Game` owns the collaborators (clock, audio transport, render sink, RNG) and
//! at most one running `Session`. Every mutation goes through `&mut Game`, so a
//! tick and an input handler can never interleave; a multi-threaded host wraps
//! the whole `Game` in one mutex.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::chart::Chart;
use crate::clock::{Clock, PlaybackClock};
use crate::difficulty::{self, DifficultyConfig};
use crate::error::{ConfigError, TransportError};
use crate::judge::{self, Judgment};
use crate::notes::{ActiveNote, NoteId, NoteStream};

pub const MAX_HEALTH: u8 = 100;

/// Audio collaborator. `ended` is reported back through `Game::audio_ended`.
pub trait AudioTransport {
    fn play(&mut self, track: &str) -> Result<(), TransportError>;
    fn stop(&mut self);
}

/// Transport for silent sessions and hosts without audio.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAudio;

impl AudioTransport for NoAudio {
    fn play(&mut self, _track: &str) -> Result<(), TransportError> {
        Ok(())
    }
    fn stop(&mut self) {}
}

/// Observational output. Nothing a sink does feeds back into the engine.
pub trait RenderSink {
    fn notify(&mut self, event: &GameEvent);
}

impl RenderSink for () {
    fn notify(&mut self, _event: &GameEvent) {}
}

impl RenderSink for Vec<GameEvent> {
    fn notify(&mut self, event: &GameEvent) {
        self.push(event.clone());
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetireCause {
    /// Consumed by an in-window press.
    Hit,
    /// Travelled past the field.
    Expired,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    NoteSpawned { id: NoteId, lane: usize },
    NoteRetired {
        id: NoteId,
        lane: usize,
        judgment: Judgment,
        cause: RetireCause,
    },
    /// A press found a note but outside every window; the note stays.
    MissedPress { id: NoteId, lane: usize },
    ScoreChanged(u64),
    HealthChanged(u8),
    SessionEnded(SessionResult),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EndReason {
    TrackEnded,
    HealthDepleted,
    GaveUp,
    /// A new session was started over this one.
    Replaced,
}

/// Resolved notes per tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JudgmentCounts {
    pub perfect: u32,
    pub great: u32,
    pub good: u32,
    pub miss: u32,
}

impl JudgmentCounts {
    pub fn record(&mut self, judgment: Judgment) {
        match judgment {
            Judgment::Perfect => self.perfect += 1,
            Judgment::Great => self.great += 1,
            Judgment::Good => self.good += 1,
            Judgment::Miss => self.miss += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.perfect + self.great + self.good + self.miss
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionResult {
    pub difficulty: String,
    pub score: u64,
    pub health: Option<u8>,
    pub reason: EndReason,
    pub counts: JudgmentCounts,
}

/// Score, health and tallies. Score only grows; health stays in 0..=100.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionState {
    score: u64,
    health: Option<u8>,
    counts: JudgmentCounts,
}

impl SessionState {
    pub fn new(track_health: bool) -> Self {
        Self {
            score: 0,
            health: track_health.then_some(MAX_HEALTH),
            counts: JudgmentCounts::default(),
        }
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn health(&self) -> Option<u8> {
        self.health
    }

    pub fn counts(&self) -> JudgmentCounts {
        self.counts
    }

    pub fn add_score(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
    }

    pub fn record(&mut self, judgment: Judgment) {
        self.counts.record(judgment);
    }

    /// Apply a clamped health delta. Returns the new value when it changed;
    /// `None` when health is untracked or already at the bound.
    pub fn apply_health(&mut self, delta: i32) -> Option<u8> {
        let current = self.health?;
        let next = (current as i32).saturating_add(delta).clamp(0, MAX_HEALTH as i32) as u8;
        self.health = Some(next);
        (next != current).then_some(next)
    }

    pub fn is_depleted(&self) -> bool {
        self.health == Some(0)
    }
}

#[cfg(feature = "rng")]
fn default_rng() -> Box<dyn RngCore> {
    Box::new(StdRng::from_entropy())
}

/// Without an entropy source every session replays the same random charts.
#[cfg(not(feature = "rng"))]
fn default_rng() -> Box<dyn RngCore> {
    log::debug!("built without `rng`; randomized charts use a fixed seed");
    Box::new(StdRng::seed_from_u64(FALLBACK_SEED))
}

#[cfg(not(feature = "rng"))]
const FALLBACK_SEED: u64 = 0x6265_6174_6c61_6e65;

struct Session {
    config: DifficultyConfig,
    stream: NoteStream,
    state: SessionState,
    clock: PlaybackClock,
    audio_live: bool,
}

pub struct Game<C: Clock, A: AudioTransport, S: RenderSink> {
    clock: C,
    audio: A,
    sink: S,
    rng: Box<dyn RngCore>,
    session: Option<Session>,
    last_result: Option<SessionResult>,
}

impl<C: Clock, A: AudioTransport, S: RenderSink> Game<C, A, S> {
    pub fn new(clock: C, audio: A, sink: S) -> Self {
        Self {
            clock,
            audio,
            sink,
            rng: default_rng(),
            session: None,
            last_result: None,
        }
    }

    /// Replace the chart RNG, e.g. with a seeded one for reproducible charts.
    pub fn with_rng(mut self, rng: impl RngCore + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// Live score, or the final score once the session has ended.
    pub fn score(&self) -> u64 {
        match (&self.session, &self.last_result) {
            (Some(s), _) => s.state.score(),
            (None, Some(r)) => r.score,
            (None, None) => 0,
        }
    }

    pub fn health(&self) -> Option<u8> {
        match (&self.session, &self.last_result) {
            (Some(s), _) => s.state.health(),
            (None, Some(r)) => r.health,
            (None, None) => None,
        }
    }

    pub fn active_notes(&self) -> &[ActiveNote] {
        self.session.as_ref().map(|s| s.stream.active()).unwrap_or(&[])
    }

    pub fn config(&self) -> Option<&DifficultyConfig> {
        self.session.as_ref().map(|s| &s.config)
    }

    pub fn last_result(&self) -> Option<&SessionResult> {
        self.last_result.as_ref()
    }

    pub fn start_preset(&mut self, key: &str) -> Result<(), ConfigError> {
        let config = difficulty::preset(key)?;
        self.start_session(config)
    }

    /// Validate `config`, end any running session, then build the chart,
    /// capture the clock and start audio. A rejected config changes nothing.
    pub fn start_session(&mut self, config: &DifficultyConfig) -> Result<(), ConfigError> {
        config.validate()?;

        if self.session.is_some() {
            self.terminate(EndReason::Replaced);
        } else {
            // A previous play() may still be pending on the element.
            self.audio.stop();
        }

        let chart: Chart = config.chart.build(config.lane_count(), &mut *self.rng);
        log::info!(
            "starting '{}': {} notes over {} lane(s)",
            config.name,
            chart.len(),
            config.lane_count()
        );
        let stream = NoteStream::new(chart, config.lane_count(), config.note_speed);

        let audio_live = match config.track.as_deref() {
            Some(track) => match self.audio.play(track) {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("{e}; continuing without audio");
                    false
                }
            },
            None => false,
        };

        let state = SessionState::new(config.health);
        self.sink.notify(&GameEvent::ScoreChanged(0));
        if let Some(h) = state.health() {
            self.sink.notify(&GameEvent::HealthChanged(h));
        }
        self.session = Some(Session {
            config: config.clone(),
            stream,
            state,
            clock: PlaybackClock::start(self.clock.now_ms()),
            audio_live,
        });
        Ok(())
    }

    /// One frame: spawn due notes, move them, expire the ones that left the
    /// field. No-op without a running session.
    pub fn tick(&mut self) {
        let now = self.clock.now_ms();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let elapsed = session.clock.elapsed(now);
        let field = session.config.field;
        let report = session.stream.step(elapsed, &field);

        for note in &report.spawned {
            self.sink.notify(&GameEvent::NoteSpawned {
                id: note.id,
                lane: note.lane,
            });
        }

        let mut depleted = false;
        for note in &report.expired {
            session.state.record(Judgment::Miss);
            self.sink.notify(&GameEvent::NoteRetired {
                id: note.id,
                lane: note.lane,
                judgment: Judgment::Miss,
                cause: RetireCause::Expired,
            });
            // One health penalty per note: an earlier off-window press already paid it.
            if !note.penalized {
                if let Some(h) = session.state.apply_health(Judgment::Miss.health_delta()) {
                    self.sink.notify(&GameEvent::HealthChanged(h));
                }
            }
            if session.state.is_depleted() {
                depleted = true;
                break;
            }
        }

        if depleted {
            self.terminate(EndReason::HealthDepleted);
        }
    }

    /// Map an input symbol to a lane and judge it. Unmapped symbols are ignored.
    pub fn handle_input(&mut self, symbol: &str) -> Option<Judgment> {
        let lane = self.session.as_ref()?.config.lanes.lane_for(symbol)?;
        self.handle_lane(lane)
    }

    /// Judge a press on `lane` directly (on-screen buttons). Returns `None` when
    /// there is nothing to judge.
    pub fn handle_lane(&mut self, lane: usize) -> Option<Judgment> {
        let session = self.session.as_mut()?;
        let field = session.config.field;
        let idx = judge::select_candidate(session.stream.active(), lane, &field)?;
        let note = session.stream.active()[idx];
        let judgment = session.config.windows.classify(judge::timing_distance(&note, &field));

        if judgment.is_hit() {
            session.stream.remove(note.id);
            session.state.record(judgment);
            session.state.add_score(judgment.score());
            self.sink.notify(&GameEvent::NoteRetired {
                id: note.id,
                lane,
                judgment,
                cause: RetireCause::Hit,
            });
            self.sink.notify(&GameEvent::ScoreChanged(session.state.score()));
            if let Some(h) = session.state.apply_health(judgment.health_delta()) {
                self.sink.notify(&GameEvent::HealthChanged(h));
            }
            return Some(judgment);
        }

        self.sink.notify(&GameEvent::MissedPress { id: note.id, lane });
        if session.state.health().is_some() && !note.penalized {
            session.stream.active_mut()[idx].penalized = true;
            if let Some(h) = session.state.apply_health(judgment.health_delta()) {
                self.sink.notify(&GameEvent::HealthChanged(h));
            }
            if session.state.is_depleted() {
                self.terminate(EndReason::HealthDepleted);
            }
        }
        Some(judgment)
    }

    pub fn give_up(&mut self) {
        self.terminate(EndReason::GaveUp);
    }

    /// The audio collaborator finished the track.
    pub fn audio_ended(&mut self) {
        self.terminate(EndReason::TrackEnded);
    }

    /// End the running session exactly once. Later calls are no-ops.
    fn terminate(&mut self, reason: EndReason) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        if session.audio_live {
            self.audio.stop();
        }
        let dropped = session.stream.discard();
        if dropped > 0 {
            log::debug!("discarding {dropped} unresolved note(s)");
        }
        let result = SessionResult {
            difficulty: session.config.name.clone(),
            score: session.state.score(),
            health: session.state.health(),
            reason,
            counts: session.state.counts(),
        };
        log::info!(
            "'{}' ended ({:?}) with score {}",
            result.difficulty,
            reason,
            result.score
        );
        self.sink.notify(&GameEvent::SessionEnded(result.clone()));
        self.last_result = Some(result);
    }
}
