//! Vigil library crate — re-exports all modules for integration testing.
//!
//! The binary crate (`main.rs`) is the actual session entry point.
//! This library crate exposes the same modules so that `tests/` integration
//! tests can drive the game core headless — no window, no renderer.

pub mod shared;
pub mod actions;
pub mod day;
pub mod narrative;
pub mod focus;
