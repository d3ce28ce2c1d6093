use bevy::prelude::*;
use constants::render_settings::{
    AMBIENT_BRIGHTNESS_PER_UNIT, AMBIENT_COLOUR, AMBIENT_INTENSITY, DIRECTIONAL_ILLUMINANCE,
};

pub fn ambient_brightness(intensity: f32) -> f32 {
    intensity * AMBIENT_BRIGHTNESS_PER_UNIT
}

/// White ambient fill plus a shadow-casting key light shining straight down.
pub fn spawn_lighting(mut commands: Commands) {
    commands.insert_resource(AmbientLight {
        color: AMBIENT_COLOUR,
        brightness: ambient_brightness(AMBIENT_INTENSITY),
        ..default()
    });

    commands.spawn((
        DirectionalLight {
            color: Color::WHITE,
            illuminance: DIRECTIONAL_ILLUMINANCE,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(0.0, 1.0, 0.0).looking_at(Vec3::ZERO, Vec3::Z),
        Name::new("key_light"),
    ));
}
