//! Shared compile-time defaults for the roll scene engine.
//!
//! Runtime settings loaded from `scene_settings.json` fall back to these
//! values for any field the file omits.

pub mod camera;
pub mod card;
pub mod effects;
pub mod physics;
pub mod render_settings;
