//! Night Flap - a night-sky Flappy Bird clone
//!
//! Core modules:
//! - `sim`: Deterministic simulation (bird, pipes, scoring, game flow, night sky)
//! - `renderer`: Draw lists, tessellation and the WebGPU pipeline
//! - `audio`: Sound effect recipes and the Web Audio backend
//! - `assets`: Sprite manifests with a procedural fallback
//! - `runtime`: Fixed-rate loop driver and its collaborator traits
//! - `settings`: Player preferences

pub mod assets;
pub mod audio;
pub mod game;
pub mod renderer;
pub mod runtime;
pub mod settings;
pub mod sim;

pub use game::Game;
pub use settings::{QualityPreset, Settings};

/// Game configuration constants
///
/// All physics run in screen pixels per frame at a fixed 60 Hz.
pub mod consts {
    /// Play field dimensions
    pub const SCREEN_WIDTH: f32 = 800.0;
    pub const SCREEN_HEIGHT: f32 = 600.0;
    /// Ground strip height; the floor line sits at `SCREEN_HEIGHT - FLOOR_HEIGHT`
    pub const FLOOR_HEIGHT: f32 = 100.0;
    pub const FLOOR_Y: f32 = SCREEN_HEIGHT - FLOOR_HEIGHT;

    /// Target frame rate
    pub const FPS: u32 = 60;
    /// Fixed simulation timestep in seconds
    pub const SIM_DT: f32 = 1.0 / FPS as f32;
    /// Maximum substeps per host frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Downward acceleration (px/frame²)
    pub const GRAVITY: f32 = 0.5;
    /// Velocity set by a flap (px/frame, negative is up)
    pub const JUMP_STRENGTH: f32 = -10.0;

    /// Bird spawn point
    pub const BIRD_START_X: f32 = 266.0; // SCREEN_WIDTH / 3, integer division
    pub const BIRD_START_Y: f32 = SCREEN_HEIGHT / 2.0;
    /// Half the bird's body height, used for floor and ceiling clamps
    pub const BIRD_HALF_HEIGHT: f32 = 20.0;
    /// Collision box, smaller than the 50x35 sprite
    pub const BIRD_HITBOX_WIDTH: f32 = 40.0;
    pub const BIRD_HITBOX_HEIGHT: f32 = 30.0;
    /// Rendered sprite size
    pub const BIRD_SPRITE_WIDTH: f32 = 50.0;
    pub const BIRD_SPRITE_HEIGHT: f32 = 35.0;
    /// Frames of wing animation after a flap
    pub const FLAP_FRAMES: u32 = 10;
    /// Degrees of tilt per px/frame of velocity
    pub const ROTATION_PER_VELOCITY: f32 = 2.5;
    pub const MAX_ROTATION_DEG: f32 = 30.0;

    /// Pipe geometry and motion
    pub const PIPE_WIDTH: f32 = 70.0;
    pub const PIPE_GAP: f32 = 200.0;
    pub const PIPE_VELOCITY: f32 = -4.0;
    /// Frames between pipe spawns
    pub const PIPE_INTERVAL: u32 = 100;
    /// Range for the top edge of the gap (inclusive)
    pub const PIPE_GAP_MIN_Y: i32 = 150;
    pub const PIPE_GAP_MAX_Y: i32 = (SCREEN_HEIGHT - FLOOR_HEIGHT - PIPE_GAP - 100.0) as i32;
}

/// Milliseconds of game time represented by a frame count
#[inline]
pub fn frames_to_millis(frames: u64) -> f64 {
    frames as f64 * 1000.0 / consts::FPS as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gap_range_keeps_full_gap_above_floor() {
        assert_eq!(consts::PIPE_GAP_MAX_Y, 200);
        let lowest_gap_bottom = consts::PIPE_GAP_MAX_Y as f32 + consts::PIPE_GAP;
        assert!(lowest_gap_bottom < consts::FLOOR_Y);
    }

    #[test]
    fn frames_to_millis_at_sixty_hz() {
        assert!((frames_to_millis(60) - 1000.0).abs() < 1e-9);
    }
}
