use bevy::prelude::*;

/// Distance along `direction` to the box of `size` centred on `transform`.
pub fn ray_hits_obb(
    origin: Vec3,
    direction: Vec3,
    transform: &GlobalTransform,
    size: Vec3,
) -> Option<f32> {
    let inverse = transform.compute_matrix().inverse();
    let local_origin = inverse.transform_point3(origin);
    let local_direction = inverse.transform_vector3(direction);
    let half_extents = size * 0.5;
    ray_aabb_hit(local_origin, local_direction, -half_extents, half_extents)
}

// Slab-method ray–AABB intersection. A ray starting inside reports the exit.
pub fn ray_aabb_hit(origin: Vec3, direction: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let mut near = f32::NEG_INFINITY;
    let mut far = f32::INFINITY;

    for axis in 0..3 {
        let (o, d) = (origin[axis], direction[axis]);
        if d.abs() < f32::EPSILON {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let (mut t0, mut t1) = ((min[axis] - o) * inv, (max[axis] - o) * inv);
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        near = near.max(t0);
        far = far.min(t1);
        if near > far {
            return None;
        }
    }

    if far < 0.0 {
        return None;
    }
    Some(if near >= 0.0 { near } else { far })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_hits_box_in_front() {
        let t = ray_aabb_hit(Vec3::new(0.0, 0.0, -5.0), Vec3::Z, -Vec3::ONE, Vec3::ONE);
        assert_eq!(t, Some(4.0));
    }

    #[test]
    fn ray_misses_box_behind() {
        let t = ray_aabb_hit(Vec3::new(0.0, 0.0, 5.0), Vec3::Z, -Vec3::ONE, Vec3::ONE);
        assert_eq!(t, None);
    }

    #[test]
    fn parallel_ray_outside_slab_misses() {
        let t = ray_aabb_hit(Vec3::new(0.0, 3.0, -5.0), Vec3::Z, -Vec3::ONE, Vec3::ONE);
        assert_eq!(t, None);
    }

    #[test]
    fn rotated_box_is_hit_in_local_space() {
        let transform = GlobalTransform::from(
            Transform::from_xyz(0.0, 0.0, 10.0)
                .with_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_4)),
        );
        let t = ray_hits_obb(Vec3::ZERO, Vec3::Z, &transform, Vec3::new(2.0, 2.0, 2.0)).unwrap();
        // The corner of the rotated cube faces the ray.
        assert!((t - (10.0 - 2.0_f32.sqrt())).abs() < 1e-4);
    }
}
