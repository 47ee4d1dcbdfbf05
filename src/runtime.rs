//! Loop driver
//!
//! [`Runtime`] owns the collaborators a running game needs (renderer, audio
//! and frame pacing) and pushes a [`Game`] through input, update, audio and
//! render once per frame. Browser hosts drive the same steps from
//! `requestAnimationFrame` through [`FixedStep`].

use std::time::{Duration, Instant};

use crate::audio::{AudioSink, play_events};
use crate::consts::*;
use crate::game::Game;
use crate::renderer::{DrawList, Renderer};
use crate::sim::{GameEvent, GamePhase, GameSession, TickInput};

/// Whether the loop should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Produces one input per frame; `None` means the source is exhausted
pub trait InputSource {
    fn poll(&mut self, session: &GameSession) -> Option<TickInput>;
}

/// Scripted input: any iterator of inputs
impl<I: Iterator<Item = TickInput>> InputSource for I {
    fn poll(&mut self, _session: &GameSession) -> Option<TickInput> {
        self.next()
    }
}

/// Converts variable host frame times into fixed simulation steps
#[derive(Debug, Clone, Default)]
pub struct FixedStep {
    accumulator: f32,
    last_time: Option<f64>,
}

impl FixedStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of steps to run for a host frame `dt` seconds long
    pub fn steps(&mut self, dt: f32) -> u32 {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        substeps
    }

    /// Number of steps for a frame stamped `time_ms` (e.g. a rAF timestamp)
    pub fn frame(&mut self, time_ms: f64) -> u32 {
        let dt = match self.last_time {
            Some(last) => ((time_ms - last) / 1000.0) as f32,
            None => SIM_DT,
        };
        self.last_time = Some(time_ms);
        self.steps(dt.max(0.0))
    }

    /// Forget accumulated time, e.g. after the tab was hidden
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.last_time = None;
    }
}

/// Rolling frames-per-second over the last 60 frame timestamps
#[derive(Debug, Clone)]
pub struct FpsCounter {
    frame_times: [f64; 60],
    frame_index: usize,
    fps: f32,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self {
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0.0,
        }
    }
}

impl FpsCounter {
    /// Record a frame at `time_ms` and return the current estimate
    pub fn record(&mut self, time_ms: f64) -> f32 {
        self.frame_times[self.frame_index] = time_ms;
        self.frame_index = (self.frame_index + 1) % 60;

        // Oldest sample sits where the next write goes
        let oldest_time = self.frame_times[self.frame_index];
        if oldest_time > 0.0 {
            let elapsed = time_ms - oldest_time;
            if elapsed > 0.0 {
                self.fps = (59_000.0 / elapsed) as f32;
            }
        }
        self.fps
    }
}

/// Sleeps out the rest of each frame to hold a steady rate
#[derive(Debug, Clone)]
pub struct FrameClock {
    frame: Duration,
    last: Instant,
    elapsed_ms: f64,
}

impl FrameClock {
    pub fn new(fps: u32) -> Self {
        Self {
            frame: Duration::from_secs_f64(1.0 / fps.max(1) as f64),
            last: Instant::now(),
            elapsed_ms: 0.0,
        }
    }

    /// Wait for the next frame boundary; returns milliseconds since the clock started
    pub fn tick(&mut self) -> f64 {
        let target = self.last + self.frame;
        let now = Instant::now();
        if now < target {
            std::thread::sleep(target - now);
        }

        let now = Instant::now();
        self.elapsed_ms += (now - self.last).as_secs_f64() * 1000.0;
        self.last = now;
        self.elapsed_ms
    }
}

/// Explicit runtime context: renderer, audio, pacing and the frame buffer
pub struct Runtime<R: Renderer, A: AudioSink> {
    pub renderer: R,
    pub audio: A,
    clock: Option<FrameClock>,
    fps: FpsCounter,
    list: DrawList,
}

impl<R: Renderer, A: AudioSink> Runtime<R, A> {
    /// Unpaced runtime; frames run back to back
    pub fn new(renderer: R, audio: A) -> Self {
        Self {
            renderer,
            audio,
            clock: None,
            fps: FpsCounter::default(),
            list: DrawList::new(),
        }
    }

    /// Hold the loop to `FPS` frames per second
    pub fn paced(mut self) -> Self {
        self.clock = Some(FrameClock::new(FPS));
        self
    }

    /// One frame: input, update, audio, render
    pub fn step(&mut self, game: &mut Game, input: TickInput) -> Flow {
        if input.quit {
            log::info!("Quit requested after {} frames", game.frame);
            self.audio.stop_music();
            return Flow::Quit;
        }

        let events = game.step(&input);
        play_events(&mut self.audio, &events);
        for event in &events {
            if let GameEvent::Scored { score } = event {
                log::debug!("Score: {score}");
            }
        }

        game.compose(&mut self.list);
        self.renderer.present(&self.list);

        if let Some(clock) = &mut self.clock {
            let now = clock.tick();
            game.set_fps(self.fps.record(now));
        }

        Flow::Continue
    }

    /// Run until quit or until `source` runs dry; returns frames stepped
    pub fn run<S: InputSource + ?Sized>(&mut self, game: &mut Game, source: &mut S) -> u64 {
        self.audio.start_music();
        let start = game.frame;

        while let Some(input) = source.poll(&game.session) {
            if self.step(game, input) == Flow::Quit {
                break;
            }
        }

        game.frame - start
    }
}

/// Frames an autopilot round may last before the pilot lets go
pub const ROUND_FRAME_LIMIT: u64 = 60 * FPS as u64;
/// How far below the gap centre the pilot holds the bird
const AIM_BELOW_CENTER: f32 = 40.0;

/// Plays the game on its own: starts, flaps toward the next gap, restarts
#[derive(Debug, Clone)]
pub struct Autopilot {
    rounds: u32,
    rounds_done: u32,
    round_frames: u64,
    round_limit: u64,
    counted: bool,
    scores: Vec<u32>,
}

impl Autopilot {
    /// Play `rounds` rounds, then quit
    pub fn new(rounds: u32) -> Self {
        Self {
            rounds: rounds.max(1),
            rounds_done: 0,
            round_frames: 0,
            round_limit: ROUND_FRAME_LIMIT,
            counted: false,
            scores: Vec::new(),
        }
    }

    /// Let go of the controls after `frames` frames of a round
    pub fn with_round_limit(mut self, frames: u64) -> Self {
        self.round_limit = frames;
        self
    }

    /// Final score of every finished round
    pub fn scores(&self) -> &[u32] {
        &self.scores
    }

    /// Height the pilot steers toward
    fn aim(session: &GameSession) -> f32 {
        let bird = &session.bird;
        let tail = bird.pos.x - BIRD_HITBOX_WIDTH / 2.0;
        session
            .pipes
            .iter()
            .find(|p| p.x + p.width >= tail)
            .map(|p| p.gap_center())
            .unwrap_or(SCREEN_HEIGHT / 2.0)
            + AIM_BELOW_CENTER
    }
}

impl InputSource for Autopilot {
    fn poll(&mut self, session: &GameSession) -> Option<TickInput> {
        match session.phase {
            GamePhase::GameOver => {
                if !self.counted {
                    self.counted = true;
                    self.rounds_done += 1;
                    self.scores.push(session.score);
                    log::info!(
                        "Round {}/{} over: score {}",
                        self.rounds_done,
                        self.rounds,
                        session.score
                    );
                }
                if self.rounds_done >= self.rounds {
                    Some(TickInput::QUIT)
                } else {
                    Some(TickInput::JUMP)
                }
            }
            GamePhase::Start => {
                self.counted = false;
                self.round_frames = 0;
                Some(TickInput::JUMP)
            }
            GamePhase::Playing => {
                self.round_frames += 1;
                let bird = &session.bird;
                let flap = self.round_frames < self.round_limit
                    && bird.velocity > 0.0
                    && bird.pos.y > Self::aim(session);
                Some(TickInput {
                    jump: flap,
                    quit: false,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{SilentAudio, SoundEffect};
    use crate::settings::Settings;

    #[derive(Default)]
    struct Recording {
        frames: u32,
        texts: Vec<Vec<String>>,
    }

    impl Renderer for Recording {
        fn present(&mut self, frame: &DrawList) {
            self.frames += 1;
            self.texts.push(
                frame
                    .iter()
                    .filter_map(|c| match c {
                        crate::renderer::DrawCmd::Text { text, .. } => Some(text.clone()),
                        _ => None,
                    })
                    .collect(),
            );
        }
    }

    #[derive(Default)]
    struct Cues {
        played: Vec<SoundEffect>,
        music: bool,
    }

    impl AudioSink for Cues {
        fn play(&mut self, effect: SoundEffect) {
            self.played.push(effect);
        }
        fn start_music(&mut self) {
            self.music = true;
        }
        fn stop_music(&mut self) {
            self.music = false;
        }
    }

    #[test]
    fn test_fixed_step_at_sixty_hz() {
        let mut step = FixedStep::new();
        assert_eq!(step.steps(SIM_DT), 1);
        assert_eq!(step.steps(2.0 * SIM_DT), 2);
    }

    #[test]
    fn test_fixed_step_caps_substeps() {
        let mut step = FixedStep::new();
        assert_eq!(step.steps(5.0), MAX_SUBSTEPS);
    }

    #[test]
    fn test_fixed_step_accumulates_short_frames() {
        let mut step = FixedStep::new();
        let half = SIM_DT * 0.6;
        assert_eq!(step.steps(half), 0);
        assert_eq!(step.steps(half), 1);
    }

    #[test]
    fn test_first_timestamp_runs_one_step() {
        let mut step = FixedStep::new();
        assert_eq!(step.frame(12_345.0), 1);
        // Clock going backwards never yields negative time
        assert_eq!(step.frame(12_000.0), 0);
    }

    #[test]
    fn test_fps_counter_at_sixty() {
        let mut fps = FpsCounter::default();
        let mut estimate = 0.0;
        for i in 1..=120 {
            estimate = fps.record(i as f64 * 1000.0 / 60.0);
        }
        assert!((estimate - 60.0).abs() < 0.5, "got {estimate}");
    }

    #[test]
    fn test_step_renders_every_frame() {
        let mut runtime = Runtime::new(Recording::default(), SilentAudio);
        let mut game = Game::new(3, &Settings::default());

        assert_eq!(runtime.step(&mut game, TickInput::default()), Flow::Continue);
        assert_eq!(runtime.step(&mut game, TickInput::JUMP), Flow::Continue);

        assert_eq!(runtime.renderer.frames, 2);
        assert!(runtime.renderer.texts[0].contains(&"FLAPPY BIRD".to_string()));
        assert_eq!(runtime.renderer.texts[1], vec!["Score: 0", "Score: 0"]);
    }

    #[test]
    fn test_quit_stops_without_rendering() {
        let mut runtime = Runtime::new(Recording::default(), Cues::default());
        let mut game = Game::new(3, &Settings::default());

        let mut script = [TickInput::JUMP, TickInput::QUIT, TickInput::JUMP].into_iter();
        let frames = runtime.run(&mut game, &mut script);

        assert_eq!(frames, 1);
        assert_eq!(runtime.renderer.frames, 1);
        assert_eq!(runtime.audio.played, vec![SoundEffect::Jump]);
        assert!(!runtime.audio.music);
    }

    #[test]
    fn test_run_stops_when_script_ends() {
        let mut runtime = Runtime::new(Recording::default(), SilentAudio);
        let mut game = Game::new(3, &Settings::default());

        let mut script = std::iter::repeat_n(TickInput::default(), 5);
        assert_eq!(runtime.run(&mut game, &mut script), 5);
    }

    #[test]
    fn test_dropping_bird_ends_in_game_over_cues() {
        let mut runtime = Runtime::new(Recording::default(), Cues::default());
        let mut game = Game::new(3, &Settings::default());

        let mut script =
            std::iter::once(TickInput::JUMP).chain(std::iter::repeat_n(TickInput::default(), 120));
        runtime.run(&mut game, &mut script);

        assert_eq!(game.session.phase, GamePhase::GameOver);
        assert_eq!(
            runtime.audio.played,
            vec![SoundEffect::Jump, SoundEffect::Dead]
        );
        assert!(!runtime.audio.music);
        let last = runtime.renderer.texts.last().unwrap();
        assert!(last.contains(&"GAME OVER".to_string()));
    }

    #[test]
    fn test_autopilot_plays_requested_rounds() {
        let mut runtime = Runtime::new(Recording::default(), SilentAudio);
        let mut game = Game::new(11, &Settings::default());
        let mut pilot = Autopilot::new(2).with_round_limit(400);

        let frames = runtime.run(&mut game, &mut pilot);

        assert_eq!(pilot.scores().len(), 2);
        assert!(frames > 0);
        assert_eq!(game.session.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_autopilot_flaps_only_when_falling_below_aim() {
        let mut pilot = Autopilot::new(1);
        let mut session = GameSession::new(1);
        session.phase = GamePhase::Playing;

        session.bird.pos.y = 500.0;
        session.bird.velocity = 1.0;
        assert_eq!(pilot.poll(&session), Some(TickInput::JUMP));

        session.bird.velocity = -3.0;
        assert_eq!(pilot.poll(&session), Some(TickInput::default()));

        session.bird.pos.y = 100.0;
        session.bird.velocity = 1.0;
        assert_eq!(pilot.poll(&session), Some(TickInput::default()));
    }
}
