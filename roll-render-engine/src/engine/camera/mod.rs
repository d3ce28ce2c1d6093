//! Orbit camera for the roll scene.
//!
//! Orbit and zoom input are applied on render ticks; preset transitions
//! interpolate every frame.

/// Orbit camera resource, presets and controller systems.
pub mod orbit_camera;
