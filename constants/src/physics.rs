/// World gravity along Y.
pub const GRAVITY: f32 = -9.81;

/// Longest step handed to the physics pipeline, in seconds.
pub const MAX_STEP: f32 = 0.1;

/// Side length of the debug plane mesh.
pub const DEBUG_PLANE_SIZE: f32 = 10.0;

/// Debug mesh colours.
pub const DEBUG_SHAPE_COLOUR: (f32, f32, f32) = (0.0, 1.0, 0.0);
pub const DEBUG_PARTICLE_COLOUR: (f32, f32, f32) = (1.0, 0.0, 0.0);

/// Balls at or below this radius are treated as point particles.
pub const PARTICLE_RADIUS_EPSILON: f32 = 1e-4;
