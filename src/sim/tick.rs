//! Fixed timestep simulation tick
//!
//! Advances a session by exactly one frame. Input is applied first, then
//! (while playing) the bird, the spawner, every pipe and the pruner.

use super::pipe::Pipe;
use super::state::{DeathCause, GameEvent, GamePhase, GameSession};
use crate::consts::*;

/// Discrete input for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Flap / start / restart (key-down edge)
    pub jump: bool,
    /// Quit request; handled by the loop driver, ignored by the simulation
    pub quit: bool,
}

impl TickInput {
    pub const JUMP: Self = Self {
        jump: true,
        quit: false,
    };
    pub const QUIT: Self = Self {
        jump: false,
        quit: true,
    };
}

/// Advance the session by one frame, returning what happened
pub fn tick(state: &mut GameSession, input: &TickInput) -> Vec<GameEvent> {
    let mut events = Vec::new();
    state.time_ticks += 1;

    if input.jump {
        match state.phase {
            GamePhase::Start => {
                state.phase = GamePhase::Playing;
                state.bird.jump();
                events.push(GameEvent::Jumped);
                log::info!("Run started (seed {})", state.seed);
            }
            GamePhase::Playing => {
                state.bird.jump();
                events.push(GameEvent::Jumped);
            }
            GamePhase::GameOver => {
                state.reset();
                events.push(GameEvent::Restarted);
                log::info!("Session reset");
            }
        }
    }

    if state.phase != GamePhase::Playing {
        return events;
    }

    if state.bird.update() {
        events.push(GameEvent::Died {
            cause: DeathCause::Floor,
        });
    }

    spawn_pipes(state);
    advance_pipes(state, &mut events);

    if !state.bird.alive {
        state.phase = GamePhase::GameOver;
        events.push(GameEvent::GameOver { score: state.score });
        log::info!("Game over - score {}", state.score);
    }

    events
}

/// Append a pipe at the right edge every `PIPE_INTERVAL` frames
fn spawn_pipes(state: &mut GameSession) {
    state.pipe_timer += 1;
    if state.pipe_timer >= PIPE_INTERVAL {
        let pipe = Pipe::new(SCREEN_WIDTH, &mut state.rng);
        log::trace!("Spawned pipe with gap at {}", pipe.gap_y);
        state.pipes.push(pipe);
        state.pipe_timer = 0;
    }
}

/// Move every pipe, resolve collisions and scoring, then drop off-screen pipes
fn advance_pipes(state: &mut GameSession, events: &mut Vec<GameEvent>) {
    let bird_x = state.bird.pos.x;

    for pipe in state.pipes.iter_mut() {
        pipe.update();

        if pipe.collide(&state.bird) && state.bird.alive {
            state.bird.alive = false;
            events.push(GameEvent::Died {
                cause: DeathCause::Pipe,
            });
        }

        if !pipe.passed && pipe.is_behind(bird_x) {
            pipe.passed = true;
            state.score += 1;
            events.push(GameEvent::Scored { score: state.score });
        }
    }

    state.pipes.retain(|p| !p.is_offscreen());
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    /// Keep the bird hovering mid-screen so long runs stay alive
    fn hover(state: &mut GameSession) {
        state.bird.pos.y = BIRD_START_Y;
        state.bird.velocity = 0.0;
    }

    #[test]
    fn test_start_stays_idle_without_input() {
        let mut state = GameSession::new(12345);
        for _ in 0..200 {
            let events = tick(&mut state, &TickInput::default());
            assert!(events.is_empty());
        }
        assert_eq!(state.phase, GamePhase::Start);
        assert_eq!(state.bird, crate::sim::Bird::new());
        assert!(state.pipes.is_empty());
    }

    #[test]
    fn test_jump_from_start_begins_play() {
        let mut state = GameSession::new(12345);
        let events = tick(&mut state, &TickInput::JUMP);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(events, vec![GameEvent::Jumped]);
        // The bird integrates once after the impulse in the same frame
        assert_eq!(state.bird.velocity, JUMP_STRENGTH + GRAVITY);
        assert_eq!(state.bird.pos.y, BIRD_START_Y + JUMP_STRENGTH + GRAVITY);
    }

    #[test]
    fn test_pipe_spawns_every_interval() {
        let mut state = GameSession::new(5);
        state.phase = GamePhase::Playing;
        for frame in 1..=PIPE_INTERVAL * 3 {
            hover(&mut state);
            tick(&mut state, &TickInput::default());
            let expected = (frame / PIPE_INTERVAL) as usize;
            assert_eq!(state.pipes.len(), expected, "frame {frame}");
        }
        // Newest pipe was just spawned and advanced once
        let newest = state.pipes.last().map(|p| p.x);
        assert_eq!(newest, Some(SCREEN_WIDTH + PIPE_VELOCITY));
    }

    #[test]
    fn test_score_once_per_pipe() {
        let mut state = GameSession::new(5);
        state.phase = GamePhase::Playing;
        // Trailing edge at bird_x + 2: clears the bird on the next tick
        state.pipes.push(Pipe::with_gap(BIRD_START_X - PIPE_WIDTH + 2.0, 200.0, 1.0));
        state.bird.pos = Vec2::new(BIRD_START_X, 300.0);

        let events = tick(&mut state, &TickInput::default());
        assert_eq!(state.score, 1);
        assert!(events.contains(&GameEvent::Scored { score: 1 }));

        for _ in 0..10 {
            hover(&mut state);
            let events = tick(&mut state, &TickInput::default());
            assert!(!events.iter().any(|e| matches!(e, GameEvent::Scored { .. })));
        }
        assert_eq!(state.score, 1);
    }

    #[test]
    fn test_pipe_collision_ends_run() {
        let mut state = GameSession::new(5);
        state.phase = GamePhase::Playing;
        state.pipes.push(Pipe::with_gap(BIRD_START_X - 10.0, 400.0, 1.0));

        let events = tick(&mut state, &TickInput::default());
        assert!(!state.bird.alive);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(events.contains(&GameEvent::Died {
            cause: DeathCause::Pipe
        }));
        assert_eq!(events.last(), Some(&GameEvent::GameOver { score: 0 }));
    }

    #[test]
    fn test_game_over_is_frozen_until_input() {
        let mut state = GameSession::new(5);
        state.phase = GamePhase::Playing;
        state.bird.pos.y = FLOOR_Y - BIRD_HALF_HEIGHT;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::GameOver);

        let bird = state.bird.clone();
        for _ in 0..500 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.bird, bird);
    }

    #[test]
    fn test_restart_lands_in_start() {
        let mut state = GameSession::new(5);
        state.phase = GamePhase::GameOver;
        state.score = 4;
        state.bird.alive = false;
        state.pipes.push(Pipe::with_gap(300.0, 150.0, 1.0));

        let events = tick(&mut state, &TickInput::JUMP);
        assert_eq!(events, vec![GameEvent::Restarted]);
        assert_eq!(state.phase, GamePhase::Start);
        assert_eq!(state.score, 0);
        assert!(state.pipes.is_empty());
        assert_eq!(state.bird, crate::sim::Bird::new());

        // A second jump actually starts the next run
        tick(&mut state, &TickInput::JUMP);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_offscreen_pipes_pruned() {
        let mut state = GameSession::new(5);
        state.phase = GamePhase::Playing;
        state.pipes.push(Pipe::with_gap(-PIPE_WIDTH + 4.0, 150.0, 1.0));
        state.pipes.push(Pipe::with_gap(-PIPE_WIDTH + 4.5, 150.0, 1.0));
        state.pipes.push(Pipe::with_gap(500.0, 150.0, 1.0));
        hover(&mut state);

        tick(&mut state, &TickInput::default());
        // First pipe sits exactly at -width: still present
        assert_eq!(state.pipes.len(), 3);
        hover(&mut state);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.pipes.len(), 1);
        assert_eq!(state.pipes[0].x, 500.0 + 2.0 * PIPE_VELOCITY);
    }

    #[test]
    fn test_determinism() {
        // Two sessions with the same seed and inputs stay identical
        let mut a = GameSession::new(99999);
        let mut b = GameSession::new(99999);
        for frame in 0..2000u32 {
            let input = TickInput {
                jump: frame % 23 == 0,
                quit: false,
            };
            let ea = tick(&mut a, &input);
            let eb = tick(&mut b, &input);
            assert_eq!(ea, eb);
        }
        assert_eq!(a.score, b.score);
        assert_eq!(a.phase, b.phase);
        assert_eq!(a.bird, b.bird);
        assert_eq!(a.pipes, b.pipes);
    }

    #[test]
    fn test_untouched_bird_dies_in_bounded_frames() {
        let mut state = GameSession::new(1);
        tick(&mut state, &TickInput::JUMP);
        let mut frames = 1;
        while state.phase == GamePhase::Playing {
            tick(&mut state, &TickInput::default());
            frames += 1;
            assert!(frames < 100, "bird should have hit the floor");
        }
        // One flap from y=300, then 52 frames of free fall reach the floor
        assert_eq!(frames, 53);
    }
}
