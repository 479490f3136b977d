//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! Everything is driven through a [`Session`], which the terminal front end
//! feeds with key presses and elapsed time.

pub mod action;
pub mod config;
pub mod engine;
pub mod hazard;
pub mod scheduler;
pub mod session;
pub mod state;

// Re-export commonly used types
pub use action::{Direction, Signal};
pub use config::{Difficulty, GameConfig, TickPeriods};
pub use engine::{GameEngine, StepResult};
pub use hazard::HazardScheduler;
pub use scheduler::{Scheduler, TimerKind, TimerToken};
pub use session::{GameEvent, Session};
pub use state::{CollisionKind, GameState, Position, RunMode, Snake};
