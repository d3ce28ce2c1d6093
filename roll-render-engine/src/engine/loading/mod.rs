//! Asset loading for the scene: settings first, then models, fonts and
//! textures requested by the scene once it is running.
//!
//! Loads never block the frame; entities appear once their assets arrive.

/// Scene settings loading with a defaults fallback on failure.
pub mod settings_loader;

/// Loading progress tracking resource for state transitions.
pub mod progress;

/// glTF scene loading for actors.
pub mod model_loader;

/// Font loading and text label spawning.
pub mod text_loader;

/// Image loading for textured materials.
pub mod texture_loader;

/// Extra page module injection on web targets.
pub mod page_scripts;
