//! The player's bird

use glam::Vec2;

use super::collision::Rect;
use crate::consts::*;

/// The player-controlled bird
///
/// `x` never changes; the world scrolls past it.
#[derive(Debug, Clone, PartialEq)]
pub struct Bird {
    pub pos: Vec2,
    /// Vertical velocity in px/frame (negative is up)
    pub velocity: f32,
    /// Cleared once on death; only a session reset brings the bird back
    pub alive: bool,
    /// Visual tilt in degrees, derived from velocity
    pub rotation: f32,
    /// Wing animation countdown, no gameplay effect
    pub flap_timer: u32,
}

impl Default for Bird {
    fn default() -> Self {
        Self::new()
    }
}

impl Bird {
    pub fn new() -> Self {
        Self {
            pos: Vec2::new(BIRD_START_X, BIRD_START_Y),
            velocity: 0.0,
            alive: true,
            rotation: 0.0,
            flap_timer: 0,
        }
    }

    /// Upward impulse; replaces whatever velocity the bird had
    pub fn jump(&mut self) {
        self.velocity = JUMP_STRENGTH;
        self.flap_timer = FLAP_FRAMES;
    }

    /// Advance one frame: gravity, position, tilt, then floor and ceiling.
    ///
    /// Returns true if this frame killed the bird on the floor.
    pub fn update(&mut self) -> bool {
        self.velocity += GRAVITY;
        self.pos.y += self.velocity;

        self.rotation =
            (self.velocity * ROTATION_PER_VELOCITY).clamp(-MAX_ROTATION_DEG, MAX_ROTATION_DEG);

        if self.flap_timer > 0 {
            self.flap_timer -= 1;
        }

        let mut hit_floor = false;
        if self.pos.y + BIRD_HALF_HEIGHT > FLOOR_Y {
            self.pos.y = FLOOR_Y - BIRD_HALF_HEIGHT;
            hit_floor = self.alive;
            self.alive = false;
        }

        // Ceiling stops the climb but is not lethal
        if self.pos.y - BIRD_HALF_HEIGHT < 0.0 {
            self.pos.y = BIRD_HALF_HEIGHT;
            self.velocity = 0.0;
        }

        hit_floor
    }

    /// Collision box used against pipes
    pub fn hitbox(&self) -> Rect {
        Rect::centered(self.pos, BIRD_HITBOX_WIDTH, BIRD_HITBOX_HEIGHT)
    }

    /// Wings are raised while the flap animation is running
    pub fn wings_up(&self) -> bool {
        self.flap_timer > FLAP_FRAMES / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_update_from_rest() {
        let mut bird = Bird::new();
        assert_eq!(bird.pos, Vec2::new(BIRD_START_X, SCREEN_HEIGHT / 2.0));
        bird.update();
        assert_eq!(bird.velocity, GRAVITY);
        assert_eq!(bird.pos.y, SCREEN_HEIGHT / 2.0 + GRAVITY);
        assert!(bird.alive);
    }

    #[test]
    fn test_jump_overrides_velocity() {
        let mut bird = Bird::new();
        bird.velocity = 7.25;
        bird.jump();
        assert_eq!(bird.velocity, JUMP_STRENGTH);
        assert_eq!(bird.flap_timer, FLAP_FRAMES);

        bird.velocity = -3.0;
        bird.jump();
        assert_eq!(bird.velocity, JUMP_STRENGTH);
    }

    #[test]
    fn test_rotation_clamped() {
        let mut bird = Bird::new();
        bird.jump();
        bird.update();
        // -9.5 * 2.5 = -23.75
        assert!((bird.rotation + 23.75).abs() < 1e-6);

        bird.velocity = 40.0;
        bird.update();
        assert_eq!(bird.rotation, MAX_ROTATION_DEG);

        bird.velocity = -40.0;
        bird.pos.y = 300.0;
        bird.update();
        assert_eq!(bird.rotation, -MAX_ROTATION_DEG);
    }

    #[test]
    fn test_flap_timer_counts_down_to_zero() {
        let mut bird = Bird::new();
        bird.jump();
        assert!(bird.wings_up());
        for _ in 0..FLAP_FRAMES + 5 {
            bird.update();
            bird.pos.y = 300.0;
        }
        assert_eq!(bird.flap_timer, 0);
        assert!(!bird.wings_up());
    }

    #[test]
    fn test_floor_kills_and_clamps() {
        let mut bird = Bird::new();
        bird.pos.y = FLOOR_Y - BIRD_HALF_HEIGHT - 1.0;
        bird.velocity = 5.0;
        assert!(bird.update());
        assert!(!bird.alive);
        assert_eq!(bird.pos.y, FLOOR_Y - BIRD_HALF_HEIGHT);

        // Death is reported once and never undone
        assert!(!bird.update());
        bird.jump();
        bird.update();
        assert!(!bird.alive);
    }

    #[test]
    fn test_ceiling_clamps_without_killing() {
        let mut bird = Bird::new();
        bird.pos.y = BIRD_HALF_HEIGHT + 2.0;
        bird.jump();
        bird.update();
        assert!(bird.alive);
        assert_eq!(bird.pos.y, BIRD_HALF_HEIGHT);
        assert_eq!(bird.velocity, 0.0);
    }

    #[test]
    fn test_hitbox_centered_on_bird() {
        let bird = Bird::new();
        let hb = bird.hitbox();
        assert_eq!(hb.center(), bird.pos);
        assert_eq!(hb.w, BIRD_HITBOX_WIDTH);
        assert_eq!(hb.h, BIRD_HITBOX_HEIGHT);
    }
}
