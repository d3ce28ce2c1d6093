//! Frame presentation: the dither post-process and the selection outline.
//!
//! Debug mode presents the scene directly; otherwise both are attached
//! to the main camera and the selected entities on each render tick.

/// Ordered-dither full-screen post-process node.
pub mod dither_post_processing;

/// Outline highlight for selected scene objects.
pub mod outline;

/// Gated present step choosing between direct and post-processed output.
pub mod present;
