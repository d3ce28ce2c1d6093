//! Initiative cards.
//!
//! Cards live in the [`manager::CardManager`] resource for the length of
//! the session. Each one gets a clickable marker in the scene; clicking it
//! opens the card editor.

/// Card data and its display rules.
pub mod card;
/// Portrait recompression to JPEG data URLs.
pub mod compress;
/// Card collection, scene markers and initiative rolls.
pub mod manager;
