//! A playable game: the session plus its decorative sky

use glam::Vec2;

use crate::renderer::draw::{Align, DrawList, rgb};
use crate::renderer::scene;
use crate::settings::Settings;
use crate::sim::{GameEvent, GameSession, NightSky, TickInput, tick};

/// Everything the loop driver advances once per frame
#[derive(Debug, Clone)]
pub struct Game {
    pub session: GameSession,
    pub sky: NightSky,
    /// Frames stepped since construction
    pub frame: u64,
    show_fps: bool,
    fps: Option<f32>,
}

impl Game {
    pub fn new(seed: u64, settings: &Settings) -> Self {
        Self {
            session: GameSession::new(seed),
            sky: NightSky::with_counts(seed, settings.stars(), settings.clouds()),
            frame: 0,
            show_fps: settings.show_fps,
            fps: None,
        }
    }

    /// Advance one frame: the sky always moves, the session follows its phase
    pub fn step(&mut self, input: &TickInput) -> Vec<GameEvent> {
        self.frame += 1;
        self.sky.update();
        tick(&mut self.session, input)
    }

    /// Host-measured frame rate, shown when enabled in settings
    pub fn set_fps(&mut self, fps: f32) {
        self.fps = Some(fps);
    }

    /// Compose the current frame
    pub fn compose(&self, list: &mut DrawList) {
        scene::compose(&self.session, &self.sky, list);

        if let (true, Some(fps)) = (self.show_fps, self.fps) {
            list.text(
                format!("FPS: {}", fps.round() as u32),
                Vec2::new(crate::consts::SCREEN_WIDTH - 20.0, 20.0),
                14.0,
                rgb(180, 180, 180),
                Align::Right,
            );
        }
    }
}
