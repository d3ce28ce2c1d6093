use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::engine::camera::orbit_camera::MainCamera;
use crate::engine::render::dither_post_processing::DitherSettings;
use crate::engine::systems::render_mode::RenderModeState;

/// Attaches the dither pass to the main camera outside debug mode and
/// keeps its resolution in step with the window.
pub fn present_frame(
    mut commands: Commands,
    render_mode: Res<RenderModeState>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut cameras: Query<(Entity, Option<&mut DitherSettings>), With<MainCamera>>,
) {
    let Ok((camera, settings)) = cameras.single_mut() else {
        return;
    };

    if render_mode.debug {
        if settings.is_some() {
            commands.entity(camera).remove::<DitherSettings>();
        }
        return;
    }

    let resolution = windows
        .single()
        .map(|window| {
            Vec2::new(
                window.physical_width() as f32,
                window.physical_height() as f32,
            )
        })
        .unwrap_or(Vec2::ONE)
        .max(Vec2::ONE);

    match settings {
        Some(mut settings) => {
            if settings.resolution != resolution {
                settings.resolution = resolution;
            }
        }
        None => {
            commands.entity(camera).insert(DitherSettings {
                resolution,
                ..default()
            });
        }
    }
}
