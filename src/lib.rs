//! Hazard Snake - a terminal Snake game with timed hazards
//!
//! This library provides:
//! - Core game logic and run lifecycle (game module)
//! - Best score persistence (storage module)
//! - TUI rendering and keyboard input (render, input modules)
//! - The interactive game loop (modes module)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod storage;
