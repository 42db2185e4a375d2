//! Configuration module
//!
//! Holds the persisted settings document and the user-facing limits and
//! styling derived from it. The snapping core only ever sees the
//! [`GridConfig`](crate::domain::grid::GridConfig) values produced here.

pub mod grid;
pub mod settings;

pub use grid::GridStyle;
pub use settings::{AppSettings, SettingsError};
