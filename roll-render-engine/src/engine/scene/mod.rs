//! The example world: lights, ground and the actors listed in the scene
//! settings.
//!
//! Actors with per-frame behaviour register a render action under their
//! own name and order when they are spawned.

/// Wall, brazier and die actors.
pub mod actors;

/// Ground plane and its static collider.
pub mod ground;

/// Ambient and key lights.
pub mod lighting;
