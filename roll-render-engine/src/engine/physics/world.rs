use bevy::math::{Quat, Vec3};
use bevy::prelude::Resource;
use constants::physics::GRAVITY;
use rapier3d::prelude::*;

use crate::engine::physics::conversions::{
    from_rapier_quat, from_rapier_vec, to_rapier_quat, to_rapier_vec,
};
use crate::engine::physics::shapes::{
    MeshGeometry, ShapeInstance, collider_geometry, describe_collider,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Fixed,
    Dynamic,
}

#[derive(Debug, Clone)]
pub enum ColliderSpec {
    Cuboid { half_extents: Vec3 },
    Ball { radius: f32 },
    Cylinder { radius: f32, half_height: f32 },
    /// Infinite ground plane facing +Y.
    HalfSpace,
    ConvexHull { points: Vec<Vec3> },
}

impl ColliderSpec {
    fn build(&self) -> Option<ColliderBuilder> {
        let builder = match self {
            ColliderSpec::Cuboid { half_extents } => {
                ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
            ColliderSpec::Ball { radius } => ColliderBuilder::ball(*radius),
            ColliderSpec::Cylinder {
                radius,
                half_height,
            } => ColliderBuilder::cylinder(*half_height, *radius),
            ColliderSpec::HalfSpace => ColliderBuilder::new(SharedShape::halfspace(Vector::Y)),
            ColliderSpec::ConvexHull { points } => {
                let points: Vec<Vector> = points.iter().map(|p| to_rapier_vec(*p)).collect();
                ColliderBuilder::convex_hull(&points)?
            }
        };
        Some(builder.restitution(0.3).friction(0.8))
    }
}

/// Rapier rigid-body world stepped by the frame loop.
#[derive(Resource)]
pub struct PhysicsWorld {
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    gravity: Vector,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            gravity: Vector::new(0.0, GRAVITY, 0.0),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
        }
    }
}

impl PhysicsWorld {
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            &(),
            &(),
        );
    }

    /// Inserts a body with a single collider. Returns `None` when the
    /// collider cannot be built (e.g. a degenerate convex hull).
    pub fn add_body(
        &mut self,
        kind: BodyKind,
        position: Vec3,
        rotation: Quat,
        collider: &ColliderSpec,
    ) -> Option<RigidBodyHandle> {
        let collider = collider.build()?.build();
        let body_type = match kind {
            BodyKind::Fixed => RigidBodyType::Fixed,
            BodyKind::Dynamic => RigidBodyType::Dynamic,
        };

        let rigid_body = RigidBodyBuilder::new(body_type)
            .translation(to_rapier_vec(position))
            .rotation(to_rapier_vec(rotation.to_scaled_axis()))
            .build();

        let handle = self.rigid_body_set.insert(rigid_body);
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);
        Some(handle)
    }

    pub fn body_pose(&self, handle: RigidBodyHandle) -> Option<(Vec3, Quat)> {
        self.rigid_body_set.get(handle).map(|body| {
            (
                from_rapier_vec(body.translation()),
                from_rapier_quat(*body.rotation()),
            )
        })
    }

    pub fn apply_impulse(&mut self, handle: RigidBodyHandle, impulse: Vec3, torque: Vec3) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.apply_impulse(to_rapier_vec(impulse), true);
            body.apply_torque_impulse(to_rapier_vec(torque), true);
        }
    }

    /// Teleports a body and stops it.
    pub fn reset_body(&mut self, handle: RigidBodyHandle, position: Vec3, rotation: Quat) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_translation(to_rapier_vec(position), true);
            body.set_rotation(to_rapier_quat(rotation), true);
            body.set_linvel(Vector::ZERO, true);
            body.set_angvel(Vector::ZERO, true);
        }
    }

    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    /// Every collider attached to a body, in body order.
    pub fn shapes(&self) -> Vec<ShapeInstance> {
        let mut shapes = Vec::new();
        for (_, body) in self.rigid_body_set.iter() {
            for handle in body.colliders() {
                if let Some(collider) = self.collider_set.get(*handle) {
                    shapes.push(describe_collider(*handle, collider));
                }
            }
        }
        shapes
    }

    pub fn collider_geometry(&self, handle: ColliderHandle) -> Option<MeshGeometry> {
        self.collider_set.get(handle).and_then(collider_geometry)
    }

    /// Generated geometry of the body's first collider, in body space.
    pub fn body_geometry(&self, handle: RigidBodyHandle) -> Option<MeshGeometry> {
        let collider = *self.rigid_body_set.get(handle)?.colliders().first()?;
        self.collider_geometry(collider)
    }
}

/// Vertices of a regular icosahedron with the given circumradius.
pub fn icosahedron_points(radius: f32) -> Vec<Vec3> {
    let phi = (1.0 + 5.0_f32.sqrt()) * 0.5;
    let mut points = Vec::with_capacity(12);
    for a in [-1.0, 1.0] {
        for b in [-phi, phi] {
            points.push(Vec3::new(0.0, a, b));
            points.push(Vec3::new(a, b, 0.0));
            points.push(Vec3::new(b, 0.0, a));
        }
    }
    points
        .into_iter()
        .map(|p| p.normalize() * radius)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::physics::shapes::ShapeKind;

    #[test]
    fn dynamic_ball_falls_onto_ground() {
        let mut world = PhysicsWorld::default();
        world
            .add_body(
                BodyKind::Fixed,
                Vec3::ZERO,
                Quat::IDENTITY,
                &ColliderSpec::HalfSpace,
            )
            .unwrap();
        let ball = world
            .add_body(
                BodyKind::Dynamic,
                Vec3::new(0.0, 5.0, 0.0),
                Quat::IDENTITY,
                &ColliderSpec::Ball { radius: 0.5 },
            )
            .unwrap();

        for _ in 0..180 {
            world.step(1.0 / 60.0);
        }

        let (position, _) = world.body_pose(ball).unwrap();
        assert!(position.y < 4.0);
        assert!(position.y > 0.0);
    }

    #[test]
    fn shapes_follow_body_order_with_scales() {
        let mut world = PhysicsWorld::default();
        world.add_body(
            BodyKind::Fixed,
            Vec3::ZERO,
            Quat::IDENTITY,
            &ColliderSpec::HalfSpace,
        );
        world.add_body(
            BodyKind::Fixed,
            Vec3::new(0.0, 0.0, 4.0),
            Quat::IDENTITY,
            &ColliderSpec::Cuboid {
                half_extents: Vec3::new(1.5, 1.5, 0.25),
            },
        );
        world.add_body(
            BodyKind::Dynamic,
            Vec3::new(0.0, 3.0, 0.0),
            Quat::IDENTITY,
            &ColliderSpec::Ball { radius: 0.75 },
        );
        world.add_body(
            BodyKind::Dynamic,
            Vec3::new(2.0, 3.0, 0.0),
            Quat::IDENTITY,
            &ColliderSpec::Cylinder {
                radius: 0.5,
                half_height: 1.0,
            },
        );

        let shapes = world.shapes();
        assert_eq!(shapes.len(), 4);
        assert_eq!(shapes[0].kind, ShapeKind::Plane);
        assert_eq!(shapes[1].kind, ShapeKind::Box);
        assert_eq!(shapes[1].scale, Vec3::new(3.0, 3.0, 0.5));
        assert_eq!(shapes[1].position, Vec3::new(0.0, 0.0, 4.0));
        assert_eq!(shapes[2].kind, ShapeKind::Sphere);
        assert_eq!(shapes[2].scale, Vec3::splat(0.75));
        assert_eq!(shapes[3].kind, ShapeKind::Cylinder);
        assert_eq!(shapes[3].scale, Vec3::new(0.5, 2.0, 0.5));
    }

    #[test]
    fn tiny_balls_are_particles() {
        let mut world = PhysicsWorld::default();
        world.add_body(
            BodyKind::Dynamic,
            Vec3::ZERO,
            Quat::IDENTITY,
            &ColliderSpec::Ball { radius: 0.0 },
        );
        assert_eq!(world.shapes()[0].kind, ShapeKind::Particle);
    }

    #[test]
    fn convex_hull_exposes_generated_geometry() {
        let mut world = PhysicsWorld::default();
        world
            .add_body(
                BodyKind::Dynamic,
                Vec3::ZERO,
                Quat::IDENTITY,
                &ColliderSpec::ConvexHull {
                    points: icosahedron_points(1.0),
                },
            )
            .unwrap();

        let shape = world.shapes()[0];
        assert!(matches!(shape.kind, ShapeKind::ConvexHull(_)));
        let geometry = world.collider_geometry(shape.collider).unwrap();
        assert_eq!(geometry.positions.len(), 12);
        assert!(!geometry.indices.is_empty());
        assert_eq!(geometry.indices.len() % 3, 0);
    }

    #[test]
    fn reset_body_teleports_and_stops() {
        let mut world = PhysicsWorld::default();
        let die = world
            .add_body(
                BodyKind::Dynamic,
                Vec3::new(0.0, 6.0, 0.0),
                Quat::IDENTITY,
                &ColliderSpec::ConvexHull {
                    points: icosahedron_points(1.0),
                },
            )
            .unwrap();
        for _ in 0..30 {
            world.step(1.0 / 60.0);
        }

        world.reset_body(die, Vec3::new(1.0, 6.0, -7.0), Quat::IDENTITY);
        let (position, _) = world.body_pose(die).unwrap();
        assert_eq!(position, Vec3::new(1.0, 6.0, -7.0));
        assert_eq!(
            world.body_geometry(die).map(|geometry| geometry.positions.len()),
            Some(12)
        );
    }

    #[test]
    fn body_pose_keeps_initial_rotation() {
        let mut world = PhysicsWorld::default();
        let rotation = Quat::from_rotation_y(0.7) * Quat::from_rotation_x(-0.2);
        let body = world
            .add_body(
                BodyKind::Fixed,
                Vec3::new(2.0, 1.0, -3.0),
                rotation,
                &ColliderSpec::Cuboid {
                    half_extents: Vec3::splat(0.5),
                },
            )
            .unwrap();

        world.step(1.0 / 60.0);

        let (position, pose_rotation) = world.body_pose(body).unwrap();
        assert_eq!(position, Vec3::new(2.0, 1.0, -3.0));
        assert!(pose_rotation.dot(rotation).abs() > 0.9999);
        assert!(world.shapes()[0].rotation.dot(rotation).abs() > 0.9999);
    }

    #[test]
    fn icosahedron_has_twelve_points_on_sphere() {
        let points = icosahedron_points(2.0);
        assert_eq!(points.len(), 12);
        assert!(points.iter().all(|p| (p.length() - 2.0).abs() < 1e-4));
    }
}
