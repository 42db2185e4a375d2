//! Application orchestration layer
//!
//! Ties gesture detection, the snap controller and the overlay registry
//! together. Everything except the Win32 runner is platform independent.

pub mod controller;
pub mod registry;
#[cfg(windows)]
pub mod runner;
pub mod state;
