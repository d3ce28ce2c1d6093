//! Core application setup and frame orchestration.
//!
//! Owns the composition root, the gated render tick and the ordered
//! render action registry that effects and actors hook into.

/// Application setup: plugin wiring, startup order and teardown.
pub mod app_setup;

/// Application state machine from settings loading to the running scene.
pub mod app_state;

/// Fixed-interval accumulator that gates the per-frame render tick.
pub mod frame_clock;

/// Named, ordered per-frame callbacks run on every render tick.
pub mod render_actions;

/// Platform-specific window configuration for native and WASM builds.
///
/// Binds to the page canvas on web targets.
pub mod window_config;
