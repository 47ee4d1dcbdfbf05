//! Gap pipes scrolling toward the bird

use rand::Rng;

use super::bird::Bird;
use super::collision::Rect;
use crate::consts::*;

/// A pair of pipe segments with a gap between them
#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    /// Left edge
    pub x: f32,
    pub width: f32,
    /// Top edge of the gap; the gap spans `gap_y..gap_y + PIPE_GAP`
    pub gap_y: f32,
    /// Set once the bird has cleared the trailing edge
    pub passed: bool,
    /// Color multiplier applied to the base pipe greens (0.8 - 1.2)
    pub shade: f32,
}

impl Pipe {
    /// Create a pipe at `x` with a random gap that fits fully on screen
    pub fn new<R: Rng + ?Sized>(x: f32, rng: &mut R) -> Self {
        let gap_y = rng.random_range(PIPE_GAP_MIN_Y..=PIPE_GAP_MAX_Y) as f32;
        let shade = rng.random_range(0.8..=1.2);
        Self::with_gap(x, gap_y, shade)
    }

    /// Create a pipe with an explicit gap position
    pub fn with_gap(x: f32, gap_y: f32, shade: f32) -> Self {
        Self {
            x,
            width: PIPE_WIDTH,
            gap_y,
            passed: false,
            shade,
        }
    }

    /// Scroll left by one frame
    pub fn update(&mut self) {
        self.x += PIPE_VELOCITY;
    }

    /// Bottom edge of the gap
    pub fn gap_bottom(&self) -> f32 {
        self.gap_y + PIPE_GAP
    }

    /// Vertical center of the gap
    pub fn gap_center(&self) -> f32 {
        self.gap_y + PIPE_GAP / 2.0
    }

    /// Trailing (right) edge
    pub fn trailing_edge(&self) -> f32 {
        self.x + self.width
    }

    /// Solid segment from the top of the screen to the gap
    pub fn top_rect(&self) -> Rect {
        Rect::new(self.x, 0.0, self.width, self.gap_y)
    }

    /// Solid segment from the gap downward.
    ///
    /// Extends a full screen height below the gap so it also covers the ground strip.
    pub fn bottom_rect(&self) -> Rect {
        Rect::new(self.x, self.gap_bottom(), self.width, SCREEN_HEIGHT)
    }

    /// True if the bird's hitbox overlaps either segment
    pub fn collide(&self, bird: &Bird) -> bool {
        let hitbox = bird.hitbox();
        hitbox.overlaps(&self.top_rect()) || hitbox.overlaps(&self.bottom_rect())
    }

    /// True once the trailing edge is strictly left of `x`
    pub fn is_behind(&self, x: f32) -> bool {
        self.trailing_edge() < x
    }

    /// True once the whole pipe has left the play field
    pub fn is_offscreen(&self) -> bool {
        self.x < -self.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_gap_within_bounds() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..500 {
            let pipe = Pipe::new(SCREEN_WIDTH, &mut rng);
            assert!(pipe.gap_y >= PIPE_GAP_MIN_Y as f32);
            assert!(pipe.gap_y <= PIPE_GAP_MAX_Y as f32);
            assert_eq!(pipe.gap_y.fract(), 0.0);
            assert!(pipe.gap_bottom() < FLOOR_Y);
            assert!((0.8..=1.2).contains(&pipe.shade));
            assert!(!pipe.passed);
        }
    }

    #[test]
    fn test_update_moves_left() {
        let mut pipe = Pipe::with_gap(SCREEN_WIDTH, 150.0, 1.0);
        pipe.update();
        assert_eq!(pipe.x, SCREEN_WIDTH + PIPE_VELOCITY);
        assert_eq!(pipe.gap_y, 150.0);
    }

    #[test]
    fn test_bird_in_gap_does_not_collide() {
        let pipe = Pipe::with_gap(BIRD_START_X - 35.0, 200.0, 1.0);
        let mut bird = Bird::new();
        bird.pos = Vec2::new(BIRD_START_X, pipe.gap_center());
        assert!(!pipe.collide(&bird));
    }

    #[test]
    fn test_bird_hits_top_segment() {
        let pipe = Pipe::with_gap(BIRD_START_X - 35.0, 200.0, 1.0);
        let mut bird = Bird::new();
        // Hitbox top at 199, one pixel into the top segment
        bird.pos = Vec2::new(BIRD_START_X, 214.0);
        assert!(pipe.collide(&bird));
        // Hitbox top exactly on the gap edge
        bird.pos.y = 215.0;
        assert!(!pipe.collide(&bird));
    }

    #[test]
    fn test_bird_hits_bottom_segment() {
        let pipe = Pipe::with_gap(BIRD_START_X - 35.0, 150.0, 1.0);
        let mut bird = Bird::new();
        bird.pos = Vec2::new(BIRD_START_X, pipe.gap_bottom() - 14.0);
        assert!(pipe.collide(&bird));
    }

    #[test]
    fn test_hitbox_forgiveness_horizontally() {
        let mut bird = Bird::new();
        bird.pos.y = 100.0;
        // Pipe starts 21px right of the bird center; hitbox reaches 20px
        let pipe = Pipe::with_gap(BIRD_START_X + 20.0, 200.0, 1.0);
        assert!(!pipe.collide(&bird));
        let pipe = Pipe::with_gap(BIRD_START_X + 19.0, 200.0, 1.0);
        assert!(pipe.collide(&bird));
    }

    #[test]
    fn test_offscreen_threshold() {
        let mut pipe = Pipe::with_gap(-PIPE_WIDTH, 150.0, 1.0);
        assert!(!pipe.is_offscreen());
        pipe.x -= 0.5;
        assert!(pipe.is_offscreen());
    }

    #[test]
    fn test_is_behind_strict() {
        let pipe = Pipe::with_gap(100.0, 150.0, 1.0);
        assert!(!pipe.is_behind(170.0));
        assert!(pipe.is_behind(170.5));
    }
}
