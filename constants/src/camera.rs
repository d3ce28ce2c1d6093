use bevy::math::Vec3;

/// Initial orbit camera placement.
pub const INITIAL_POSITION: Vec3 = Vec3::new(0.0, 10.0, -20.0);
pub const INITIAL_TARGET: Vec3 = Vec3::new(0.0, 2.0, 0.0);

/// Camera preset used while dice are rolling.
pub const ROLL_VIEW_POSITION: Vec3 = Vec3::new(0.0, 20.0, -7.0);
pub const ROLL_VIEW_TARGET: Vec3 = Vec3::new(0.0, 0.0, -7.0);

/// Camera preset used while inspecting cards.
pub const CARD_VIEW_POSITION: Vec3 = Vec3::new(-1.0, 4.0, -12.0);
pub const CARD_VIEW_TARGET: Vec3 = Vec3::new(0.0, 6.0, 0.0);

/// Fraction of the remaining distance covered per second during transitions.
pub const TRANSITION_SPEED: f32 = 4.0;

/// Transitions snap to the goal once closer than this.
pub const TRANSITION_EPSILON: f32 = 0.01;

/// Orbit input sensitivities.
pub const ORBIT_YAW_SENSITIVITY: f32 = 0.0035;
pub const ORBIT_PITCH_SENSITIVITY: f32 = 0.0030;
pub const ORBIT_ZOOM_SENSITIVITY: f32 = 0.1;

/// Orbit distance limits.
pub const ORBIT_MIN_DISTANCE: f32 = 2.0;
pub const ORBIT_MAX_DISTANCE: f32 = 150.0;
