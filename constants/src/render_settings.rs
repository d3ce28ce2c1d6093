use bevy::color::Color;

/// Fixed render tick interval in seconds (60 Hz).
pub const FRAME_INTERVAL: f32 = 1.0 / 60.0;

/// Start in debug mode: scene rendered straight to screen, post-processing bypassed.
pub const DEBUG_RENDERING: bool = true;

/// Dither post-process bias applied to the luminance threshold.
pub const DITHER_BIAS: f32 = 0.35;

/// Dither cell size in screen pixels.
pub const DITHER_PIXEL_SIZE: f32 = 1.0;

/// Quantisation steps per colour channel.
pub const DITHER_LEVELS: u32 = 4;

/// Outline colour for selected objects (#ffff00).
pub const OUTLINE_COLOUR: Color = Color::srgb(1.0, 1.0, 0.0);

/// Ambient light colour and intensity multiplier.
pub const AMBIENT_COLOUR: Color = Color::WHITE;
pub const AMBIENT_INTENSITY: f32 = 2.0;

/// Brightness of one unit of ambient intensity, in Bevy's cd/m² scale.
pub const AMBIENT_BRIGHTNESS_PER_UNIT: f32 = 400.0;

/// Directional light illuminance (lux) for the overhead key light.
pub const DIRECTIONAL_ILLUMINANCE: f32 = 0.5 * 10_000.0;
