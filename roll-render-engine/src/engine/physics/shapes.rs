use bevy::math::{Quat, Vec3};
use constants::physics::PARTICLE_RADIUS_EPSILON;
use rapier3d::prelude::*;

use crate::engine::physics::conversions::{from_rapier_quat, from_rapier_vec};

/// Identity of a generated geometry. Two shapes with the same id share
/// vertex data, so an existing debug mesh can be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryId(pub u64);

impl From<ColliderHandle> for GeometryId {
    fn from(handle: ColliderHandle) -> Self {
        let (index, generation) = handle.into_raw_parts();
        GeometryId((u64::from(generation) << 32) | u64::from(index))
    }
}

/// Discriminant of a debug-renderable shape. Generated geometries carry
/// their geometry id so a changed geometry is never mistaken for a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Sphere,
    Box,
    Cylinder,
    Plane,
    Particle,
    ConvexHull(GeometryId),
    Trimesh(GeometryId),
    Heightfield(GeometryId),
    Unsupported,
}

impl ShapeKind {
    pub fn is_generated(self) -> bool {
        matches!(
            self,
            ShapeKind::ConvexHull(_) | ShapeKind::Trimesh(_) | ShapeKind::Heightfield(_)
        )
    }
}

/// One collider as seen by the debug mirror.
#[derive(Debug, Clone, Copy)]
pub struct ShapeInstance {
    pub kind: ShapeKind,
    pub scale: Vec3,
    pub position: Vec3,
    pub rotation: Quat,
    pub collider: ColliderHandle,
}

/// Vertex data for generated geometries.
#[derive(Debug, Clone, Default)]
pub struct MeshGeometry {
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

pub fn describe_collider(handle: ColliderHandle, collider: &Collider) -> ShapeInstance {
    let pose = collider.position();
    let (kind, scale) = match collider.shape().as_typed_shape() {
        TypedShape::Ball(ball) if ball.radius <= PARTICLE_RADIUS_EPSILON => {
            (ShapeKind::Particle, Vec3::ONE)
        }
        TypedShape::Ball(ball) => (ShapeKind::Sphere, Vec3::splat(ball.radius)),
        TypedShape::Cuboid(cuboid) => (ShapeKind::Box, from_rapier_vec(cuboid.half_extents) * 2.0),
        TypedShape::Cylinder(cylinder) => (
            ShapeKind::Cylinder,
            Vec3::new(cylinder.radius, cylinder.half_height * 2.0, cylinder.radius),
        ),
        TypedShape::HalfSpace(_) => (ShapeKind::Plane, Vec3::ONE),
        TypedShape::ConvexPolyhedron(_) => (ShapeKind::ConvexHull(handle.into()), Vec3::ONE),
        // Trimesh and heightfield scales are baked into their vertices.
        TypedShape::TriMesh(_) => (ShapeKind::Trimesh(handle.into()), Vec3::ONE),
        TypedShape::HeightField(_) => (ShapeKind::Heightfield(handle.into()), Vec3::ONE),
        _ => (ShapeKind::Unsupported, Vec3::ONE),
    };

    ShapeInstance {
        kind,
        scale,
        position: from_rapier_vec(pose.translation),
        rotation: from_rapier_quat(pose.rotation),
        collider: handle,
    }
}

/// Extracts vertex data for convex hulls, trimeshes and heightfields.
pub fn collider_geometry(collider: &Collider) -> Option<MeshGeometry> {
    let (points, triangles) = match collider.shape().as_typed_shape() {
        TypedShape::ConvexPolyhedron(polyhedron) => polyhedron.to_trimesh(),
        TypedShape::TriMesh(trimesh) => (trimesh.vertices().to_vec(), trimesh.indices().to_vec()),
        TypedShape::HeightField(heightfield) => heightfield.to_trimesh(),
        _ => return None,
    };

    Some(MeshGeometry {
        positions: points.iter().map(|p| p.to_array()).collect(),
        indices: triangles.into_iter().flatten().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trimesh_scale_lives_in_its_vertices() {
        let vertices = vec![
            Vector::new(0.0, 0.0, 0.0),
            Vector::new(4.0, 0.0, 0.0),
            Vector::new(4.0, 0.0, 4.0),
            Vector::new(0.0, 0.0, 4.0),
        ];
        let collider = ColliderBuilder::trimesh(vertices, vec![[0, 1, 2], [0, 2, 3]])
            .unwrap()
            .build();
        let mut colliders = ColliderSet::new();
        let handle = colliders.insert(collider);
        let collider = colliders.get(handle).unwrap();

        let shape = describe_collider(handle, collider);
        assert_eq!(shape.kind, ShapeKind::Trimesh(GeometryId::from(handle)));
        assert_eq!(shape.scale, Vec3::ONE);

        let geometry = collider_geometry(collider).unwrap();
        assert_eq!(geometry.positions[2], [4.0, 0.0, 4.0]);
        assert_eq!(geometry.indices, vec![0, 1, 2, 0, 2, 3]);
    }
}
