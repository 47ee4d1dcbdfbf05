//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one call to `tick` is one frame)
//! - Seeded RNG only
//! - Stable iteration order (pipes oldest first)
//! - No rendering or platform dependencies

pub mod bird;
pub mod collision;
pub mod pipe;
pub mod sky;
pub mod state;
pub mod tick;

pub use bird::Bird;
pub use collision::Rect;
pub use pipe::Pipe;
pub use sky::NightSky;
pub use state::{DeathCause, GameEvent, GamePhase, GameSession};
pub use tick::{TickInput, tick};
