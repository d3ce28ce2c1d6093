use bevy::math::Affine2;
use bevy::prelude::*;

use crate::engine::assets::scene_settings::SceneSettings;
use crate::engine::loading::texture_loader::load_texture;
use crate::engine::physics::world::{BodyKind, ColliderSpec, PhysicsWorld};

const GROUND_SIZE: f32 = 200.0;
/// World units covered by one repeat of the ground texture.
const GROUND_TILE: f32 = 4.0;

#[derive(Component)]
pub struct Ground;

/// Visible floor plus the static half-space the dice land on.
pub fn spawn_ground(
    mut commands: Commands,
    settings: Res<SceneSettings>,
    asset_server: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut physics: ResMut<PhysicsWorld>,
) {
    if physics
        .add_body(
            BodyKind::Fixed,
            Vec3::ZERO,
            Quat::IDENTITY,
            &ColliderSpec::HalfSpace,
        )
        .is_none()
    {
        warn!("Ground collider could not be created");
    }

    let material = match settings.ground_texture.as_deref() {
        Some(path) => StandardMaterial {
            base_color_texture: Some(load_texture(&asset_server, path)),
            uv_transform: Affine2::from_scale(Vec2::splat(GROUND_SIZE / GROUND_TILE)),
            perceptual_roughness: 1.0,
            ..default()
        },
        None => StandardMaterial {
            base_color: Color::srgb(0.18, 0.17, 0.16),
            perceptual_roughness: 1.0,
            ..default()
        },
    };

    commands.spawn((
        Ground,
        Mesh3d(meshes.add(Plane3d::default().mesh().size(GROUND_SIZE, GROUND_SIZE))),
        MeshMaterial3d(materials.add(material)),
        Transform::default(),
        Name::new("ground"),
    ));
}
