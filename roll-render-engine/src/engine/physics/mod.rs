//! Rigid-body physics for the scene and its optional debug view.
//!
//! The world is stepped every frame with the frame delta; bodies drive
//! their entities' transforms, and the debug mirror shows every collider
//! as a translucent mesh when enabled.

/// Conversions between Bevy's glam release and the one rapier builds on.
pub mod conversions;

/// Collider meshes mirrored index-for-index from the physics world.
pub mod debug_mirror;

/// Shape descriptors read back from rapier colliders.
pub mod shapes;

/// The rapier world resource.
pub mod world;

use bevy::prelude::*;
use constants::physics::MAX_STEP;
use rapier3d::prelude::RigidBodyHandle;

use crate::engine::assets::scene_settings::SceneSettings;
use world::PhysicsWorld;

/// Links an entity to the rigid body that drives its transform.
#[derive(Component, Debug, Clone, Copy)]
pub struct PhysicsBody(pub RigidBodyHandle);

#[derive(Resource, Debug, Default)]
pub struct PhysicsDebugState {
    pub enabled: bool,
}

pub fn apply_physics_debug_setting(
    settings: Res<SceneSettings>,
    mut state: ResMut<PhysicsDebugState>,
) {
    state.enabled = settings.physics_debug;
}

pub fn step_physics(time: Res<Time>, mut physics: ResMut<PhysicsWorld>) {
    let dt = time.delta_secs().min(MAX_STEP);
    if dt > 0.0 {
        physics.step(dt);
    }
}

pub fn sync_physics_bodies(
    physics: Res<PhysicsWorld>,
    mut bodies: Query<(&PhysicsBody, &mut Transform)>,
) {
    for (body, mut transform) in &mut bodies {
        if let Some((translation, rotation)) = physics.body_pose(body.0) {
            transform.translation = translation;
            transform.rotation = rotation;
        }
    }
}

/// Toggle the collider view with F2 on native builds.
pub fn physics_debug_shortcut(
    #[cfg(not(target_arch = "wasm32"))] mut state: ResMut<PhysicsDebugState>,
    #[cfg(not(target_arch = "wasm32"))] keyboard: Res<ButtonInput<KeyCode>>,
) {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if keyboard.just_pressed(KeyCode::F2) {
            state.enabled = !state.enabled;
            info!("Physics debug view: {}", state.enabled);
        }
    }
}
