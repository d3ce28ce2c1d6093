//! Page UI layered over the scene.
//!
//! The card editor is a modal built from an HTML template. It runs beside
//! the render loop: surface callbacks only queue [`surface::EditorMessage`]s,
//! which frame systems apply to the cards.

/// Editor state machine and its systems.
pub mod card_editor;
/// DOM-backed editor surface.
#[cfg(target_arch = "wasm32")]
pub mod dom_surface;
/// Editor surface abstraction and message queue.
pub mod surface;
/// Template fetching.
pub mod template;
