//! Runtime systems shared across the scene.

/// FPS diagnostics display and notifications.
pub mod fps_tracking;

/// Debug / post-processed presentation mode.
pub mod render_mode;
