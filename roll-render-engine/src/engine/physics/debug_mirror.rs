use bevy::pbr::NotShadowCaster;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;
use constants::physics::{DEBUG_PARTICLE_COLOUR, DEBUG_PLANE_SIZE, DEBUG_SHAPE_COLOUR};

use crate::engine::effects::point_buffer::create_buffer_mesh;
use crate::engine::physics::PhysicsDebugState;
use crate::engine::physics::shapes::{MeshGeometry, ShapeInstance, ShapeKind};
use crate::engine::physics::world::PhysicsWorld;

/// Creates, places and removes the render meshes mirrored from shapes.
pub trait MirrorBackend {
    /// Returns `None` for shapes that have no debug mesh.
    fn create(&mut self, shape: &ShapeInstance) -> Option<Entity>;
    fn place(&mut self, entity: Entity, shape: &ShapeInstance);
    fn remove(&mut self, entity: Entity);
}

#[derive(Debug, Clone, Copy)]
struct MirrorSlot {
    kind: ShapeKind,
    entity: Option<Entity>,
}

/// Debug meshes, index-aligned with the physics shape list.
#[derive(Resource, Debug, Default)]
pub struct DebugMirror {
    slots: Vec<MirrorSlot>,
}

impl DebugMirror {
    /// Reconciles the mirror with `shapes`: mismatched slots are rebuilt,
    /// every mesh takes its shape's pose and trailing slots are removed.
    pub fn update(&mut self, shapes: &[ShapeInstance], backend: &mut impl MirrorBackend) {
        for (index, shape) in shapes.iter().enumerate() {
            let matches = self
                .slots
                .get(index)
                .is_some_and(|slot| slot.kind == shape.kind);

            if !matches {
                if let Some(stale) = self.slots.get(index).and_then(|slot| slot.entity) {
                    backend.remove(stale);
                }
                let slot = MirrorSlot {
                    kind: shape.kind,
                    entity: backend.create(shape),
                };
                if index < self.slots.len() {
                    self.slots[index] = slot;
                } else {
                    self.slots.push(slot);
                }
            }

            if let Some(entity) = self.slots[index].entity {
                backend.place(entity, shape);
            }
        }

        for stale in self.slots.drain(shapes.len()..) {
            if let Some(entity) = stale.entity {
                backend.remove(entity);
            }
        }
    }

    pub fn clear(&mut self, backend: &mut impl MirrorBackend) {
        self.update(&[], backend);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[derive(Component)]
pub struct DebugMesh;

/// Shared meshes and materials for primitive debug shapes, at unit size.
#[derive(Resource)]
pub struct DebugMeshAssets {
    sphere: Handle<Mesh>,
    cuboid: Handle<Mesh>,
    cylinder: Handle<Mesh>,
    plane: Handle<Mesh>,
    particle: Handle<Mesh>,
    shape_material: Handle<StandardMaterial>,
    particle_material: Handle<StandardMaterial>,
}

impl FromWorld for DebugMeshAssets {
    fn from_world(world: &mut World) -> Self {
        let mut meshes = world.resource_mut::<Assets<Mesh>>();
        let sphere = meshes.add(Sphere::new(1.0).mesh().uv(16, 12));
        let cuboid = meshes.add(Cuboid::new(1.0, 1.0, 1.0));
        let cylinder = meshes.add(Cylinder::new(1.0, 1.0));
        let plane = meshes.add(
            Plane3d::default()
                .mesh()
                .size(DEBUG_PLANE_SIZE, DEBUG_PLANE_SIZE),
        );
        let particle = meshes.add(create_buffer_mesh(
            PrimitiveTopology::PointList,
            &[[0.0; 3]],
        ));

        let mut materials = world.resource_mut::<Assets<StandardMaterial>>();
        let (r, g, b) = DEBUG_SHAPE_COLOUR;
        let shape_material = materials.add(StandardMaterial {
            base_color: Color::srgba(r, g, b, 0.35),
            alpha_mode: AlphaMode::Blend,
            unlit: true,
            ..default()
        });
        let (r, g, b) = DEBUG_PARTICLE_COLOUR;
        let particle_material = materials.add(StandardMaterial {
            base_color: Color::srgb(r, g, b),
            unlit: true,
            ..default()
        });

        Self {
            sphere,
            cuboid,
            cylinder,
            plane,
            particle,
            shape_material,
            particle_material,
        }
    }
}

/// Flat-shaded triangle mesh for generated collider geometry.
pub fn geometry_mesh(geometry: MeshGeometry) -> Mesh {
    let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default());
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, geometry.positions);
    mesh.insert_indices(Indices::U32(geometry.indices));
    mesh.duplicate_vertices();
    mesh.compute_flat_normals();
    mesh
}

struct BevyMirrorBackend<'a, 'w, 's> {
    commands: &'a mut Commands<'w, 's>,
    meshes: &'a mut Assets<Mesh>,
    assets: &'a DebugMeshAssets,
    physics: &'a PhysicsWorld,
}

impl BevyMirrorBackend<'_, '_, '_> {
    fn mesh_for(&mut self, shape: &ShapeInstance) -> Option<Handle<Mesh>> {
        match shape.kind {
            ShapeKind::Sphere => Some(self.assets.sphere.clone()),
            ShapeKind::Box => Some(self.assets.cuboid.clone()),
            ShapeKind::Cylinder => Some(self.assets.cylinder.clone()),
            ShapeKind::Plane => Some(self.assets.plane.clone()),
            ShapeKind::Particle => Some(self.assets.particle.clone()),
            ShapeKind::ConvexHull(_) | ShapeKind::Trimesh(_) | ShapeKind::Heightfield(_) => {
                let geometry = self.physics.collider_geometry(shape.collider)?;
                Some(self.meshes.add(geometry_mesh(geometry)))
            }
            ShapeKind::Unsupported => None,
        }
    }
}

fn shape_transform(shape: &ShapeInstance) -> Transform {
    Transform {
        translation: shape.position,
        rotation: shape.rotation,
        scale: shape.scale,
    }
}

impl MirrorBackend for BevyMirrorBackend<'_, '_, '_> {
    fn create(&mut self, shape: &ShapeInstance) -> Option<Entity> {
        let Some(mesh) = self.mesh_for(shape) else {
            debug!("No debug mesh for {:?}", shape.kind);
            return None;
        };
        let material = if shape.kind == ShapeKind::Particle {
            self.assets.particle_material.clone()
        } else {
            self.assets.shape_material.clone()
        };

        let entity = self
            .commands
            .spawn((
                DebugMesh,
                Mesh3d(mesh),
                MeshMaterial3d(material),
                shape_transform(shape),
                NotShadowCaster,
            ))
            .id();
        Some(entity)
    }

    fn place(&mut self, entity: Entity, shape: &ShapeInstance) {
        self.commands.entity(entity).try_insert(shape_transform(shape));
    }

    fn remove(&mut self, entity: Entity) {
        self.commands.entity(entity).try_despawn();
    }
}

pub fn update_physics_debug(
    mut commands: Commands,
    physics: Res<PhysicsWorld>,
    state: Res<PhysicsDebugState>,
    mut mirror: ResMut<DebugMirror>,
    mut meshes: ResMut<Assets<Mesh>>,
    assets: Res<DebugMeshAssets>,
) {
    let mut backend = BevyMirrorBackend {
        commands: &mut commands,
        meshes: &mut meshes,
        assets: &assets,
        physics: &physics,
    };

    if !state.enabled {
        if !mirror.is_empty() {
            mirror.clear(&mut backend);
        }
        return;
    }

    let shapes = physics.shapes();
    mirror.update(&shapes, &mut backend);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::physics::shapes::GeometryId;
    use rapier3d::prelude::ColliderHandle;

    #[derive(Default)]
    struct RecordingBackend {
        world: World,
        created: Vec<(Entity, ShapeKind)>,
        removed: Vec<Entity>,
        placed: usize,
    }

    impl MirrorBackend for RecordingBackend {
        fn create(&mut self, shape: &ShapeInstance) -> Option<Entity> {
            if shape.kind == ShapeKind::Unsupported {
                return None;
            }
            let entity = self.world.spawn_empty().id();
            self.created.push((entity, shape.kind));
            Some(entity)
        }

        fn place(&mut self, _entity: Entity, _shape: &ShapeInstance) {
            self.placed += 1;
        }

        fn remove(&mut self, entity: Entity) {
            self.removed.push(entity);
        }
    }

    fn shape(kind: ShapeKind) -> ShapeInstance {
        ShapeInstance {
            kind,
            scale: Vec3::ONE,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            collider: ColliderHandle::from_raw_parts(0, 0),
        }
    }

    #[test]
    fn mesh_count_tracks_shape_count() {
        let mut mirror = DebugMirror::default();
        let mut backend = RecordingBackend::default();

        let sizes = [3, 5, 1, 0, 4, 4, 2];
        for size in sizes {
            let shapes = vec![shape(ShapeKind::Sphere); size];
            mirror.update(&shapes, &mut backend);
            assert!(mirror.len() <= shapes.len());
            assert_eq!(mirror.len(), shapes.len());
        }
    }

    #[test]
    fn trailing_meshes_are_removed() {
        let mut mirror = DebugMirror::default();
        let mut backend = RecordingBackend::default();

        mirror.update(
            &[
                shape(ShapeKind::Plane),
                shape(ShapeKind::Box),
                shape(ShapeKind::Sphere),
            ],
            &mut backend,
        );
        let trailing: Vec<Entity> = backend.created[1..].iter().map(|(e, _)| *e).collect();

        mirror.update(&[shape(ShapeKind::Plane)], &mut backend);

        assert_eq!(backend.removed, trailing);
        assert_eq!(backend.created.len(), 3);
    }

    #[test]
    fn kind_mismatch_rebuilds_the_slot() {
        let mut mirror = DebugMirror::default();
        let mut backend = RecordingBackend::default();

        mirror.update(&[shape(ShapeKind::Sphere)], &mut backend);
        let sphere = backend.created[0].0;
        mirror.update(&[shape(ShapeKind::Box)], &mut backend);

        assert_eq!(backend.removed, vec![sphere]);
        assert_eq!(backend.created.len(), 2);
        assert_eq!(backend.created[1].1, ShapeKind::Box);
    }

    #[test]
    fn matching_shapes_are_only_repositioned() {
        let mut mirror = DebugMirror::default();
        let mut backend = RecordingBackend::default();
        let shapes = [shape(ShapeKind::Cylinder), shape(ShapeKind::Particle)];

        for _ in 0..10 {
            mirror.update(&shapes, &mut backend);
        }

        assert_eq!(backend.created.len(), 2);
        assert!(backend.removed.is_empty());
        assert_eq!(backend.placed, 20);
    }

    #[test]
    fn generated_geometry_is_reused_only_for_the_same_geometry() {
        let mut mirror = DebugMirror::default();
        let mut backend = RecordingBackend::default();
        let hull = shape(ShapeKind::ConvexHull(GeometryId(1)));

        mirror.update(&[hull], &mut backend);
        mirror.update(&[hull], &mut backend);
        assert_eq!(backend.created.len(), 1);

        mirror.update(&[shape(ShapeKind::ConvexHull(GeometryId(2)))], &mut backend);
        assert_eq!(backend.created.len(), 2);
        assert_eq!(backend.removed.len(), 1);

        mirror.update(&[shape(ShapeKind::Trimesh(GeometryId(2)))], &mut backend);
        assert_eq!(backend.created.len(), 3);
    }

    #[test]
    fn unsupported_shapes_keep_an_empty_slot() {
        let mut mirror = DebugMirror::default();
        let mut backend = RecordingBackend::default();

        mirror.update(
            &[shape(ShapeKind::Unsupported), shape(ShapeKind::Sphere)],
            &mut backend,
        );
        assert_eq!(mirror.len(), 2);
        assert_eq!(backend.created.len(), 1);

        mirror.clear(&mut backend);
        assert!(mirror.is_empty());
        assert_eq!(backend.removed.len(), 1);
    }
}
