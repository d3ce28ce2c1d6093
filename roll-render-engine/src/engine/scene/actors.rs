use std::f32::consts::TAU;

use bevy::asset::LoadState;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use constants::effects::FIRE_HEIGHT_OFFSET;
use rand::Rng;

use crate::cards::manager::RollRequested;
use crate::engine::assets::scene_settings::{ActorKind, ActorSpec, SceneSettings};
use crate::engine::core::render_actions::RegisterRenderAction;
use crate::engine::effects::fire::FireEffect;
use crate::engine::effects::{EffectRng, advance_fire, spawn_fire};
use crate::engine::loading::model_loader::{load_model, model_ready};
use crate::engine::physics::PhysicsBody;
use crate::engine::physics::debug_mirror::geometry_mesh;
use crate::engine::physics::world::{BodyKind, ColliderSpec, PhysicsWorld, icosahedron_points};
use crate::tools::raycaster::{Interactable, InteractableClicked};

/// Wall footprint at unit scale.
const WALL_SIZE: Vec3 = Vec3::new(4.0, 3.0, 0.3);
const DIE_RADIUS: f32 = 1.0;
/// Dice below this height have fallen off the world.
const DIE_FLOOR: f32 = -20.0;

#[derive(Component, Debug, Clone)]
pub struct Actor {
    pub name: String,
    pub kind: ActorKind,
}

/// A brazier lights its fire once its model has arrived.
#[derive(Component, Debug, Default)]
pub struct Brazier {
    model: Option<Handle<Scene>>,
    fire: Option<Entity>,
}

impl Brazier {
    pub fn fire(&self) -> Option<Entity> {
        self.fire
    }
}

#[derive(Component, Debug, Clone, Copy)]
pub struct Die {
    pub spawn: Vec3,
}

#[derive(SystemParam)]
pub struct ActorSpawner<'w, 's> {
    commands: Commands<'w, 's>,
    asset_server: Res<'w, AssetServer>,
    meshes: ResMut<'w, Assets<Mesh>>,
    materials: ResMut<'w, Assets<StandardMaterial>>,
    physics: ResMut<'w, PhysicsWorld>,
}

impl ActorSpawner<'_, '_> {
    fn base(&mut self, spec: &ActorSpec) -> EntityCommands<'_> {
        self.commands.spawn((
            Actor {
                name: spec.name.clone(),
                kind: spec.kind,
            },
            Transform::from_translation(Vec3::from_array(spec.position))
                .with_scale(Vec3::from_array(spec.scale)),
            Visibility::default(),
            Name::new(spec.name.clone()),
        ))
    }

    fn wall(&mut self, spec: &ActorSpec) {
        let position = Vec3::from_array(spec.position);
        let size = WALL_SIZE * Vec3::from_array(spec.scale);
        if self
            .physics
            .add_body(
                BodyKind::Fixed,
                position + Vec3::Y * size.y * 0.5,
                Quat::IDENTITY,
                &ColliderSpec::Cuboid {
                    half_extents: size * 0.5,
                },
            )
            .is_none()
        {
            warn!("Wall '{}' has no collider", spec.name);
        }

        match &spec.model {
            Some(path) => {
                let scene = load_model(&self.asset_server, path);
                self.base(spec).insert(SceneRoot(scene));
            }
            None => {
                let mesh = self.meshes.add(Cuboid::from_size(WALL_SIZE));
                let material = self.materials.add(StandardMaterial {
                    base_color: Color::srgb(0.45, 0.42, 0.4),
                    perceptual_roughness: 0.95,
                    ..default()
                });
                self.base(spec).with_child((
                    Mesh3d(mesh),
                    MeshMaterial3d(material),
                    Transform::from_xyz(0.0, WALL_SIZE.y * 0.5, 0.0),
                ));
            }
        }
    }

    fn brazier(&mut self, spec: &ActorSpec) {
        let model = spec
            .model
            .as_deref()
            .map(|path| load_model(&self.asset_server, path));
        let placeholder = model.is_none().then(|| {
            (
                Mesh3d(self.meshes.add(Cylinder::new(0.8, 2.0))),
                MeshMaterial3d(self.materials.add(StandardMaterial {
                    base_color: Color::srgb(138.0 / 255.0, 129.0 / 255.0, 124.0 / 255.0),
                    ..default()
                })),
                Transform::from_xyz(0.0, 1.0, 0.0),
            )
        });

        let mut brazier = self.base(spec);
        brazier.insert(Brazier {
            model: model.clone(),
            fire: None,
        });
        if let Some(scene) = model {
            brazier.insert(SceneRoot(scene));
        }
        if let Some(mesh) = placeholder {
            brazier.with_child(mesh);
        }
        let entity = brazier.id();

        self.commands.register_render_action(
            spec.name.clone(),
            spec.order,
            move |mut context: BrazierContext| update_brazier(entity, &mut context),
        );
    }

    fn die(&mut self, spec: &ActorSpec) {
        let position = Vec3::from_array(spec.position);
        let radius = DIE_RADIUS * spec.scale[0];
        let Some(body) = self.physics.add_body(
            BodyKind::Dynamic,
            position,
            Quat::IDENTITY,
            &ColliderSpec::ConvexHull {
                points: icosahedron_points(radius),
            },
        ) else {
            warn!("Die '{}' has a degenerate hull, skipped", spec.name);
            return;
        };

        let mesh = self
            .physics
            .body_geometry(body)
            .map(geometry_mesh)
            .unwrap_or_else(|| Sphere::new(radius).mesh().uv(16, 12));
        let mesh = self.meshes.add(mesh);
        let material = self.materials.add(StandardMaterial {
            base_color: Color::srgb(0.75, 0.08, 0.08),
            perceptual_roughness: 0.4,
            ..default()
        });

        let entity = self
            .commands
            .spawn((
                Actor {
                    name: spec.name.clone(),
                    kind: spec.kind,
                },
                Die { spawn: position },
                PhysicsBody(body),
                Mesh3d(mesh),
                MeshMaterial3d(material),
                Transform::from_translation(position),
                Interactable {
                    size: Vec3::splat(radius * 2.0),
                },
                Name::new(spec.name.clone()),
            ))
            .id();

        self.commands.register_render_action(
            spec.name.clone(),
            spec.order,
            move |mut physics: ResMut<PhysicsWorld>, dice: Query<(&Die, &PhysicsBody)>| {
                recover_die(entity, &mut physics, &dice)
            },
        );
    }
}

pub fn spawn_actors(settings: Res<SceneSettings>, mut spawner: ActorSpawner) {
    for spec in &settings.actors {
        match spec.kind {
            ActorKind::Wall => spawner.wall(spec),
            ActorKind::Brazier => spawner.brazier(spec),
            ActorKind::Die => spawner.die(spec),
        }
    }
    info!("✓ {} actors placed", settings.actors.len());
}

#[derive(SystemParam)]
pub struct BrazierContext<'w, 's> {
    commands: Commands<'w, 's>,
    asset_server: Res<'w, AssetServer>,
    meshes: ResMut<'w, Assets<Mesh>>,
    materials: ResMut<'w, Assets<StandardMaterial>>,
    settings: Res<'w, SceneSettings>,
    rng: ResMut<'w, EffectRng>,
    braziers: Query<'w, 's, (&'static mut Brazier, &'static Transform)>,
    fires: Query<'w, 's, (&'static mut FireEffect, &'static Mesh3d)>,
}

fn brazier_ready(asset_server: &AssetServer, brazier: &Brazier) -> bool {
    let Some(model) = &brazier.model else {
        return true;
    };
    if model_ready(asset_server, model) {
        return true;
    }
    if let Some(LoadState::Failed(err)) = asset_server.get_load_state(model.id()) {
        warn!("Brazier model failed to load ({}), lighting it anyway", err);
        return true;
    }
    false
}

fn update_brazier(entity: Entity, context: &mut BrazierContext) {
    let Ok((mut brazier, transform)) = context.braziers.get_mut(entity) else {
        return;
    };

    match brazier.fire {
        Some(fire) => {
            if let Ok((mut effect, mesh)) = context.fires.get_mut(fire) {
                advance_fire(&mut effect, mesh, &mut context.meshes, &mut context.rng.0);
            }
        }
        None => {
            if !brazier_ready(&context.asset_server, &brazier) {
                return;
            }
            let origin = transform.translation + Vec3::Y * FIRE_HEIGHT_OFFSET;
            brazier.fire = Some(spawn_fire(
                &mut context.commands,
                &mut context.meshes,
                &mut context.materials,
                origin,
                &context.settings.fire,
                &mut context.rng.0,
            ));
            debug!("Brazier fire lit at {}", origin);
        }
    }
}

/// Puts a die that fell off the world back where it started.
fn recover_die(entity: Entity, physics: &mut PhysicsWorld, dice: &Query<(&Die, &PhysicsBody)>) {
    let Ok((die, body)) = dice.get(entity) else {
        return;
    };
    let fallen = physics
        .body_pose(body.0)
        .is_some_and(|(position, _)| position.y < DIE_FLOOR);
    if fallen {
        physics.reset_body(body.0, die.spawn, Quat::IDENTITY);
    }
}

/// Throws every die from its spawn point with a random spin.
pub fn throw_dice(
    mut requests: EventReader<RollRequested>,
    mut physics: ResMut<PhysicsWorld>,
    mut rng: ResMut<EffectRng>,
    dice: Query<(&Die, &PhysicsBody)>,
) {
    if requests.read().count() == 0 {
        return;
    }

    let rng = &mut rng.0;
    for (die, body) in &dice {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            rng.gen_range(0.0..TAU),
            rng.gen_range(0.0..TAU),
            rng.gen_range(0.0..TAU),
        );
        physics.reset_body(body.0, die.spawn, rotation);

        let impulse = Vec3::new(rng.gen_range(-2.0..2.0), 4.0, rng.gen_range(-2.0..2.0));
        let torque = Vec3::new(
            rng.gen_range(-3.0..3.0),
            rng.gen_range(-3.0..3.0),
            rng.gen_range(-3.0..3.0),
        );
        physics.apply_impulse(body.0, impulse, torque);
    }
}

/// Clicking a die rolls initiative.
pub fn roll_on_die_click(
    mut clicks: EventReader<InteractableClicked>,
    dice: Query<(), With<Die>>,
    mut requests: EventWriter<RollRequested>,
) {
    if clicks.read().any(|click| dice.contains(click.entity)) {
        requests.write(RollRequested);
    }
}
