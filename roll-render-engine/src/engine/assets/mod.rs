//! Runtime scene configuration loaded from JSON.
//!
//! Every field falls back to the compile-time defaults in `constants`.

/// Scene settings asset: render flags, effect parameters, actors and cards.
pub mod scene_settings;
