//! Frame composition
//!
//! Turns the session and the night sky into a draw list, back to front:
//! sky, ground, pipes, bird, score, then the start or game-over overlay.

use glam::Vec2;

use super::draw::{Align, Color, DrawCmd, DrawList, rgb, rgba};
use crate::assets::{BIRD, BIRD_FLAP};
use crate::consts::*;
use crate::sim::sky::{MOON_PHASE, MOON_POS, MOON_RADIUS, TUFT_SPACING};
use crate::sim::{GamePhase, GameSession, NightSky, Pipe, Rect};

/// Night palette
pub mod palette {
    use super::super::draw::{Color, rgb};

    pub const DARK_BLUE: Color = rgb(10, 15, 40);
    pub const DARKER_BLUE: Color = rgb(5, 10, 30);
    pub const MOON_YELLOW: Color = rgb(255, 245, 200);
    pub const CRATER: Color = rgb(230, 230, 180);
    pub const WHITE: Color = rgb(255, 255, 255);
    pub const BLACK: Color = rgb(0, 0, 0);
    pub const PIPE_GREEN: [u8; 3] = [40, 180, 70];
    pub const PIPE_DARK_GREEN: [u8; 3] = [30, 140, 55];
    pub const FLOOR_BROWN: Color = rgb(80, 50, 30);
    pub const FLOOR_DARK_BROWN: Color = rgb(60, 40, 20);
    pub const RED: Color = rgb(255, 80, 80);
    pub const YELLOW: Color = rgb(255, 220, 50);
    pub const TITLE_GLOW: Color = [255, 150, 50, 128];
    pub const SUBTITLE: Color = rgb(200, 220, 255);
    pub const CONTROLS: Color = rgb(200, 200, 200);
}

use palette::*;

/// Pipe cap height and overhang
const CAP_HEIGHT: f32 = 30.0;
const CAP_OVERHANG: f32 = 5.0;
/// Highlight strip along the pipe's right side
const PIPE_GLOW_WIDTH: f32 = 5.0;
/// Ground glow band above the floor line
const GROUND_GLOW_HEIGHT: usize = 30;

/// Scale a base color by a shade factor, saturating at 255
fn shaded(base: [u8; 3], shade: f32) -> Color {
    let c = base.map(|v| (v as f32 * shade).min(255.0) as u8);
    rgb(c[0], c[1], c[2])
}

/// Compose a complete frame into `list` (cleared first)
pub fn compose(session: &GameSession, sky: &NightSky, list: &mut DrawList) {
    list.clear();

    draw_sky(sky, list);
    draw_ground(sky, list);

    for pipe in &session.pipes {
        draw_pipe(pipe, list);
    }

    draw_bird(session, list);

    list.text_with_shadow(
        &format!("Score: {}", session.score),
        Vec2::new(20.0, 20.0),
        36.0,
        WHITE,
        BLACK,
        2.0,
        Align::Left,
    );

    match session.phase {
        GamePhase::Start => draw_start_screen(list),
        GamePhase::GameOver => draw_game_over_screen(session.score, list),
        GamePhase::Playing => {}
    }
}

fn draw_sky(sky: &NightSky, list: &mut DrawList) {
    list.push(DrawCmd::GradientRect {
        rect: Rect::new(0.0, 0.0, SCREEN_WIDTH, FLOOR_Y),
        top: DARK_BLUE,
        bottom: DARKER_BLUE,
    });

    // Moon: full disc, then a sky-colored disc shifted right to carve the phase
    let phase_radius = MOON_RADIUS * MOON_PHASE;
    list.circle(MOON_POS, MOON_RADIUS, MOON_YELLOW);
    list.circle(
        MOON_POS + Vec2::new(MOON_RADIUS - phase_radius, 0.0),
        MOON_RADIUS,
        DARK_BLUE,
    );
    for crater in &sky.craters {
        list.circle(MOON_POS + crater.offset, crater.radius, CRATER);
    }

    for cloud in &sky.clouds {
        // Five overlapping puffs across the cloud's width
        let segments = 5;
        let segment_width = (cloud.width / segments as f32).floor();
        let radius = (cloud.height / 2.0).floor();
        for i in 0..segments {
            let x = cloud.pos.x + i as f32 * segment_width + (segment_width / 2.0).floor();
            let y = cloud.pos.y + radius;
            list.circle(Vec2::new(x, y), radius, rgba(255, 255, 255, cloud.opacity));
        }
    }

    for star in &sky.stars {
        let c = star.current_color();
        list.circle(star.pos, star.size.floor().max(1.0), rgb(c[0], c[1], c[2]));
    }

    for streak in &sky.shooting_stars {
        let len = streak.length as f32;
        for i in 0..streak.length {
            let fade = (len - i as f32) / len;
            let pos = streak.pos - streak.vel * (i as f32 / 5.0);
            let radius = (3.0 * fade).max(1.0);
            list.circle(pos, radius, rgba(255, 255, 255, (255.0 * fade) as u8));
        }
    }
}

fn draw_ground(sky: &NightSky, list: &mut DrawList) {
    list.rect(Rect::new(0.0, FLOOR_Y, SCREEN_WIDTH, FLOOR_HEIGHT), FLOOR_BROWN);

    for (i, height) in sky.tufts.iter().enumerate() {
        let x = i as f32 * TUFT_SPACING;
        list.line(
            Vec2::new(x, FLOOR_Y),
            Vec2::new(x, FLOOR_Y - height),
            3.0,
            FLOOR_DARK_BROWN,
        );
    }

    // Faint moonlight on the ground, strongest at the top of the band
    for i in 0..GROUND_GLOW_HEIGHT {
        let alpha = (10.0 * (1.0 - i as f32 / GROUND_GLOW_HEIGHT as f32)) as u8;
        if alpha == 0 {
            continue;
        }
        let y = FLOOR_Y - GROUND_GLOW_HEIGHT as f32 + i as f32;
        list.rect(Rect::new(0.0, y, SCREEN_WIDTH, 1.0), rgba(255, 245, 200, alpha));
    }
}

fn draw_pipe(pipe: &Pipe, list: &mut DrawList) {
    let body = shaded(PIPE_GREEN, pipe.shade);
    let cap = shaded(PIPE_DARK_GREEN, pipe.shade);
    let glow = rgba(255, 255, 255, 30);

    let top_height = pipe.gap_y;
    let bottom_y = pipe.gap_bottom();
    let bottom_height = SCREEN_HEIGHT - bottom_y - FLOOR_HEIGHT;

    list.rect(Rect::new(pipe.x, 0.0, pipe.width, top_height), body);
    list.rect(
        Rect::new(
            pipe.x - CAP_OVERHANG,
            top_height - CAP_HEIGHT,
            pipe.width + CAP_OVERHANG * 2.0,
            CAP_HEIGHT,
        ),
        cap,
    );

    list.rect(Rect::new(pipe.x, bottom_y, pipe.width, bottom_height), body);
    list.rect(
        Rect::new(
            pipe.x - CAP_OVERHANG,
            bottom_y,
            pipe.width + CAP_OVERHANG * 2.0,
            CAP_HEIGHT,
        ),
        cap,
    );

    let glow_x = pipe.x + pipe.width - PIPE_GLOW_WIDTH;
    list.rect(Rect::new(glow_x, 0.0, PIPE_GLOW_WIDTH, top_height), glow);
    list.rect(Rect::new(glow_x, bottom_y, PIPE_GLOW_WIDTH, bottom_height), glow);
}

fn draw_bird(session: &GameSession, list: &mut DrawList) {
    let bird = &session.bird;
    let name = if bird.wings_up() { BIRD_FLAP } else { BIRD };
    list.push(DrawCmd::Sprite {
        name,
        center: bird.pos,
        rotation_deg: bird.rotation,
    });
    list.circle(bird.pos, 15.0, rgba(255, 255, 200, 30));
}

fn centered_text(list: &mut DrawList, text: &str, y: f32, size: f32, color: Color) {
    list.text(text, Vec2::new(SCREEN_WIDTH / 2.0, y), size, color, Align::Center);
}

fn draw_start_screen(list: &mut DrawList) {
    let title_y = SCREEN_HEIGHT / 3.0 - 50.0;
    for offset in (1..10).step_by(2) {
        centered_text(list, "FLAPPY BIRD", title_y + offset as f32, 64.0, TITLE_GLOW);
    }
    centered_text(list, "FLAPPY BIRD", title_y, 64.0, YELLOW);
    centered_text(list, "Night Edition", SCREEN_HEIGHT / 3.0 + 20.0, 32.0, SUBTITLE);
    centered_text(list, "Press SPACE to start", SCREEN_HEIGHT / 2.0 + 40.0, 28.0, WHITE);

    list.circle(
        Vec2::new(SCREEN_WIDTH / 2.0 - 85.0, SCREEN_HEIGHT / 2.0 + 95.0),
        15.0,
        MOON_YELLOW,
    );

    for (i, control) in ["SPACE - Jump", "ESC - Quit"].iter().enumerate() {
        centered_text(
            list,
            control,
            SCREEN_HEIGHT / 2.0 + 120.0 + i as f32 * 40.0,
            24.0,
            CONTROLS,
        );
    }
}

fn draw_game_over_screen(score: u32, list: &mut DrawList) {
    list.rect(
        Rect::new(0.0, 0.0, SCREEN_WIDTH, SCREEN_HEIGHT),
        rgba(0, 0, 0, 150),
    );

    let y = SCREEN_HEIGHT / 3.0;
    list.text_with_shadow(
        "GAME OVER",
        Vec2::new(SCREEN_WIDTH / 2.0, y),
        72.0,
        RED,
        BLACK,
        3.0,
        Align::Center,
    );
    centered_text(
        list,
        &format!("Final Score: {score}"),
        SCREEN_HEIGHT / 2.0,
        48.0,
        WHITE,
    );
    centered_text(
        list,
        "Press SPACE to play again",
        SCREEN_HEIGHT / 2.0 + 80.0,
        32.0,
        YELLOW,
    );
}
