//! Particle and geometry effects driven by render actions.
//!
//! Each effect owns a fixed-capacity position buffer that it rewrites in
//! place on every update and uploads to its mesh when dirty.

pub mod fire;
pub mod lightning;
pub mod point_buffer;
pub mod rain;

use bevy::pbr::NotShadowCaster;
use bevy::prelude::*;
use bevy::render::mesh::PrimitiveTopology;
use constants::effects::LIGHTNING_LUMENS;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::engine::assets::scene_settings::{FireSettings, SceneSettings};
use crate::engine::core::render_actions::RegisterRenderAction;
use fire::FireEffect;
use lightning::{LightningEffect, LightningFlash};
use rain::RainEffect;

/// Shared random source for all effects, seeded from the scene settings.
#[derive(Resource)]
pub struct EffectRng(pub StdRng);

impl Default for EffectRng {
    fn default() -> Self {
        Self(StdRng::seed_from_u64(SceneSettings::default().seed))
    }
}

pub fn seed_effect_rng(settings: Res<SceneSettings>, mut rng: ResMut<EffectRng>) {
    rng.0 = StdRng::seed_from_u64(settings.seed);
}

/// Spawns the weather effects and registers their render actions.
pub fn spawn_effects(
    mut commands: Commands,
    settings: Res<SceneSettings>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut rng: ResMut<EffectRng>,
) {
    if settings.lightning.enabled {
        let lightning = LightningEffect::new(&settings.lightning);
        let mesh = meshes.add(point_buffer::create_buffer_mesh(
            PrimitiveTopology::LineStrip,
            lightning.bolt(),
        ));
        commands.spawn((
            lightning,
            Mesh3d(mesh),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: Color::srgb(0.85, 0.9, 1.0),
                unlit: true,
                ..default()
            })),
            Transform::default(),
            Visibility::Hidden,
            NotShadowCaster,
        ));
        commands.spawn((
            LightningFlash,
            PointLight {
                intensity: 0.0,
                range: 200.0,
                color: Color::srgb(0.8, 0.85, 1.0),
                ..default()
            },
            Transform::from_xyz(0.0, 50.0, 0.0),
        ));
        commands.register_render_action("lightning", settings.lightning.order, update_lightning);
    }

    if settings.rain.enabled {
        let rain = RainEffect::new(settings.rain.count, &mut rng.0);
        let mesh = meshes.add(point_buffer::create_buffer_mesh(
            PrimitiveTopology::PointList,
            rain.positions(),
        ));
        commands.spawn((
            rain,
            Mesh3d(mesh),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: Color::srgba(0.75, 0.8, 0.9, 0.8),
                alpha_mode: AlphaMode::Blend,
                unlit: true,
                ..default()
            })),
            Transform::default(),
            NotShadowCaster,
        ));
        commands.register_render_action("rain", settings.rain.order, update_rain);
    }

    info!(
        "Effects ready (lightning: {}, rain: {} drops)",
        settings.lightning.enabled,
        if settings.rain.enabled {
            settings.rain.count
        } else {
            0
        }
    );
}

/// Spawns a fire effect at `origin` and returns its entity.
pub fn spawn_fire(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    origin: Vec3,
    settings: &FireSettings,
    rng: &mut StdRng,
) -> Entity {
    let fire = FireEffect::new(origin, settings, rng);
    let mesh = meshes.add(point_buffer::create_buffer_mesh(
        PrimitiveTopology::PointList,
        fire.positions(),
    ));
    commands
        .spawn((
            fire,
            Mesh3d(mesh),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: Color::srgb(1.0, 0.55, 0.1),
                alpha_mode: AlphaMode::Add,
                unlit: true,
                ..default()
            })),
            Transform::default(),
            NotShadowCaster,
        ))
        .id()
}

pub fn update_rain(
    mut rain: Query<(&mut RainEffect, &Mesh3d)>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut rng: ResMut<EffectRng>,
) {
    for (mut effect, mesh) in &mut rain {
        effect.update(&mut rng.0);
        if effect.take_dirty() {
            point_buffer::upload(&mut meshes, &mesh.0, effect.positions());
        }
    }
}

pub fn update_lightning(
    mut bolts: Query<(&mut LightningEffect, &Mesh3d, &mut Visibility)>,
    mut flashes: Query<(&mut PointLight, &mut Transform), With<LightningFlash>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut rng: ResMut<EffectRng>,
) {
    for (mut effect, mesh, mut visibility) in &mut bolts {
        if effect.update(&mut rng.0) {
            debug!("Lightning strike");
        }
        if effect.take_dirty() {
            point_buffer::upload(&mut meshes, &mesh.0, effect.bolt());
        }

        *visibility = if effect.is_lit() {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };

        for (mut light, mut transform) in &mut flashes {
            light.intensity = effect.flash() * LIGHTNING_LUMENS;
            transform.translation = effect.bolt_centre();
        }
    }
}

/// Advances a fire effect and uploads its particles.
pub fn advance_fire(
    fire: &mut FireEffect,
    mesh: &Mesh3d,
    meshes: &mut Assets<Mesh>,
    rng: &mut StdRng,
) {
    fire.update(rng);
    if fire.take_dirty() {
        point_buffer::upload(meshes, &mesh.0, fire.positions());
    }
}
