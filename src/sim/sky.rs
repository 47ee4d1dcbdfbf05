//! Decorative night sky
//!
//! Stars, clouds, shooting stars, the moon and the ground texture. This layer
//! animates on its own cadence and never touches gameplay state.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::frames_to_millis;

/// Default number of stars
pub const STAR_COUNT: usize = 150;
/// Default number of clouds
pub const CLOUD_COUNT: usize = 5;
/// Frames between shooting star rolls
pub const SHOOTING_STAR_INTERVAL: u32 = 300;
/// Chance of a shooting star on each roll
pub const SHOOTING_STAR_CHANCE: f64 = 0.3;
/// Frames a shooting star stays visible
pub const SHOOTING_STAR_LIFE: i32 = 40;

pub const MOON_POS: Vec2 = Vec2::new(SCREEN_WIDTH - 150.0, 80.0);
pub const MOON_RADIUS: f32 = 40.0;
/// Lit fraction of the moon (0 - 1)
pub const MOON_PHASE: f32 = 0.7;
/// Spacing of the grass tufts along the ground
pub const TUFT_SPACING: f32 = 20.0;

/// Stars only spawn above this line
const STAR_MAX_Y: f32 = SCREEN_HEIGHT - FLOOR_HEIGHT - 100.0;

/// Salt mixed into the session seed so sky and pipes draw from separate streams
const SKY_SEED_SALT: u64 = 0x5eed_0f_5ca1ab1e;

/// Star tints
pub const STAR_COLORS: [[u8; 3]; 3] = [[255, 255, 255], [255, 255, 200], [200, 220, 255]];

/// A twinkling background star
#[derive(Debug, Clone)]
pub struct Star {
    pub pos: Vec2,
    pub size: f32,
    pub brightness: f32,
    pub twinkle_speed: f32,
    pub twinkle_offset: f32,
    pub color: [u8; 3],
    /// Leftward drift in px/frame
    pub speed: f32,
}

impl Star {
    fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            pos: Vec2::new(
                rng.random_range(0..=SCREEN_WIDTH as i32) as f32,
                rng.random_range(0..=STAR_MAX_Y as i32) as f32,
            ),
            size: rng.random_range(1.0..=3.0),
            brightness: rng.random_range(0.3..=1.0),
            twinkle_speed: rng.random_range(0.02..=0.08),
            twinkle_offset: rng.random_range(0.0..=std::f32::consts::TAU),
            color: STAR_COLORS[rng.random_range(0..STAR_COLORS.len())],
            speed: rng.random_range(0.1..=0.5),
        }
    }

    fn update<R: Rng + ?Sized>(&mut self, time_ms: f64, rng: &mut R) {
        self.pos.x -= self.speed;
        if self.pos.x < -10.0 {
            self.pos.x = SCREEN_WIDTH + 10.0;
            self.pos.y = rng.random_range(0..=STAR_MAX_Y as i32) as f32;
        }

        let phase = time_ms * self.twinkle_speed as f64 + self.twinkle_offset as f64;
        self.brightness = 0.5 + 0.5 * phase.sin() as f32;
    }

    /// Color scaled by the current brightness
    pub fn current_color(&self) -> [u8; 3] {
        self.color.map(|c| (c as f32 * self.brightness) as u8)
    }
}

/// A translucent drifting cloud
#[derive(Debug, Clone)]
pub struct Cloud {
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    /// Alpha, 0 - 255
    pub opacity: u8,
}

impl Cloud {
    fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            pos: Vec2::new(
                rng.random_range(0..=SCREEN_WIDTH as i32) as f32,
                rng.random_range(50..=200) as f32,
            ),
            width: rng.random_range(100..=200) as f32,
            height: rng.random_range(30..=60) as f32,
            speed: rng.random_range(0.1..=0.3),
            opacity: rng.random_range(20..=60),
        }
    }

    fn update<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.pos.x -= self.speed;
        if self.pos.x < -self.width {
            self.pos.x = SCREEN_WIDTH + self.width;
            self.pos.y = rng.random_range(50..=200) as f32;
        }
    }
}

/// A short-lived streak across the upper sky
#[derive(Debug, Clone)]
pub struct ShootingStar {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Frames left
    pub life: i32,
    /// Number of trail segments
    pub length: u32,
}

impl ShootingStar {
    fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            pos: Vec2::new(
                rng.random_range((SCREEN_WIDTH as i32 / 2)..=SCREEN_WIDTH as i32) as f32,
                rng.random_range(0..=(SCREEN_HEIGHT as i32 / 3)) as f32,
            ),
            vel: Vec2::new(-15.0, 3.0),
            life: SHOOTING_STAR_LIFE,
            length: rng.random_range(20..=40),
        }
    }
}

/// A crater on the moon's face, offset from the moon center
#[derive(Debug, Clone, Copy)]
pub struct Crater {
    pub offset: Vec2,
    pub radius: f32,
}

/// The whole decorative layer
#[derive(Debug, Clone)]
pub struct NightSky {
    pub stars: Vec<Star>,
    pub clouds: Vec<Cloud>,
    pub shooting_stars: Vec<ShootingStar>,
    pub craters: Vec<Crater>,
    /// Height of each grass tuft, one per `TUFT_SPACING` px of ground
    pub tufts: Vec<f32>,
    shooting_star_timer: u32,
    frame: u64,
    rng: Pcg32,
}

impl NightSky {
    /// Build a sky with the default star and cloud counts
    pub fn new(seed: u64) -> Self {
        Self::with_counts(seed, STAR_COUNT, CLOUD_COUNT)
    }

    pub fn with_counts(seed: u64, star_count: usize, cloud_count: usize) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed ^ SKY_SEED_SALT);

        let stars = (0..star_count).map(|_| Star::new(&mut rng)).collect();
        let clouds = (0..cloud_count).map(|_| Cloud::new(&mut rng)).collect();
        let craters = (0..5)
            .map(|_| Crater {
                offset: Vec2::new(
                    rng.random_range(-30..=30) as f32,
                    rng.random_range(-30..=30) as f32,
                ),
                radius: rng.random_range(5..=15) as f32,
            })
            .collect();
        let tuft_count = (SCREEN_WIDTH / TUFT_SPACING).ceil() as usize;
        let tufts = (0..tuft_count)
            .map(|_| rng.random_range(5..=15) as f32)
            .collect();

        Self {
            stars,
            clouds,
            shooting_stars: Vec::new(),
            craters,
            tufts,
            shooting_star_timer: 0,
            frame: 0,
            rng,
        }
    }

    /// Advance all decorations by one frame
    pub fn update(&mut self) {
        self.frame += 1;
        let time_ms = frames_to_millis(self.frame);

        for star in &mut self.stars {
            star.update(time_ms, &mut self.rng);
        }

        for cloud in &mut self.clouds {
            cloud.update(&mut self.rng);
        }

        self.shooting_star_timer += 1;
        if self.shooting_star_timer > SHOOTING_STAR_INTERVAL {
            self.shooting_star_timer = 0;
            if self.rng.random_bool(SHOOTING_STAR_CHANCE) {
                self.spawn_shooting_star();
            }
        }

        for streak in &mut self.shooting_stars {
            streak.pos += streak.vel;
            streak.life -= 1;
        }
        self.shooting_stars.retain(|s| s.life > 0);
    }

    /// Launch a shooting star immediately
    pub fn spawn_shooting_star(&mut self) {
        let streak = ShootingStar::new(&mut self.rng);
        log::trace!("Shooting star at {:?}", streak.pos);
        self.shooting_stars.push(streak);
    }

    /// Frames this sky has animated
    pub fn frame(&self) -> u64 {
        self.frame
    }
}
