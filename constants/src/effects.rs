/// Rain particle count.
pub const RAIN_COUNT: usize = 2000;

/// Half-width of the rain volume on X and Z.
pub const RAIN_HALF_EXTENT: f32 = 50.0;

/// Rain particles below this height respawn at `RAIN_CEILING`.
pub const RAIN_FLOOR: f32 = -100.0;
pub const RAIN_CEILING: f32 = 100.0;

/// Per-update displacement of each raindrop.
pub const RAIN_FALL_STEP: f32 = 1.0;
pub const RAIN_DRIFT_STEP: f32 = 0.5;

/// Horizontal respawn range for raindrops, `[min, max)`.
pub const RAIN_RESPAWN_X: (f32, f32) = (0.0, 100.0);

/// Peak flash intensity multiplier for lightning strikes.
pub const LIGHTNING_PEAK_INTENSITY: f32 = 2.0;

/// Flash intensity lost per update.
pub const LIGHTNING_DECAY: f32 = 0.08;

/// Chance per update that a new bolt strikes.
pub const LIGHTNING_STRIKE_CHANCE: f32 = 0.005;

/// Number of segments in a bolt polyline.
pub const LIGHTNING_SEGMENTS: usize = 24;

/// Height bolts start from and horizontal jitter per segment.
pub const LIGHTNING_SKY_HEIGHT: f32 = 100.0;
pub const LIGHTNING_JITTER: f32 = 3.0;

/// Point light intensity (lumens) at flash intensity 1.0.
pub const LIGHTNING_LUMENS: f32 = 4_000_000.0;

/// Brazier fire defaults.
pub const FIRE_RADIUS: f32 = 0.75;
pub const FIRE_HEIGHT: f32 = 8.0;
pub const FIRE_PARTICLE_COUNT: usize = 400;
pub const FIRE_RISE_SPEED: f32 = 0.0125;

/// Fraction of the horizontal offset removed per update, pulling flames inward.
pub const FIRE_CENTRE_PULL: f32 = 0.02;

/// Fire origin sits this far above the brazier's base.
pub const FIRE_HEIGHT_OFFSET: f32 = 3.0;
