//! Game session state
//!
//! The session is the single mutable root of a run: it owns the bird, the
//! pipes, the score and the seeded RNG that places pipes.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::bird::Bird;
use super::pipe::Pipe;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GamePhase {
    /// Title screen, bird waiting for the first flap
    #[default]
    Start,
    /// Active gameplay
    Playing,
    /// Run ended, waiting for a restart input
    GameOver,
}

/// What killed the bird
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    Floor,
    Pipe,
}

/// Notable things that happened during a tick
///
/// Audio and logging react to these; the simulation never depends on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Bird flapped (including the flap that starts a run)
    Jumped,
    /// A pipe was cleared
    Scored { score: u32 },
    /// Bird died this tick
    Died { cause: DeathCause },
    /// Run ended
    GameOver { score: u32 },
    /// Session was reset after game over
    Restarted,
}

/// Complete game session (deterministic for a given seed and input sequence)
#[derive(Debug, Clone)]
pub struct GameSession {
    /// Run seed for reproducibility
    pub seed: u64,
    pub phase: GamePhase,
    pub bird: Bird,
    /// Active pipes, oldest (leftmost) first
    pub pipes: Vec<Pipe>,
    pub score: u32,
    /// Frames since the last pipe spawn
    pub pipe_timer: u32,
    /// Total ticks simulated, across resets
    pub time_ticks: u64,
    pub(crate) rng: Pcg32,
}

impl GameSession {
    /// Create a new session with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            phase: GamePhase::Start,
            bird: Bird::new(),
            pipes: Vec::new(),
            score: 0,
            pipe_timer: 0,
            time_ticks: 0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Rebuild every owned entity and return to the title screen.
    ///
    /// The RNG keeps its stream so successive runs get fresh pipe layouts.
    pub fn reset(&mut self) {
        self.bird = Bird::new();
        self.pipes.clear();
        self.score = 0;
        self.pipe_timer = 0;
        self.phase = GamePhase::Start;
    }
}
