use bevy::math::{Quat, Vec3};
use rapier3d::math::{Rotation, Vector};

// Bevy and rapier pin different glam releases; values cross as arrays.

pub fn to_rapier_vec(v: Vec3) -> Vector {
    Vector::from_array(v.to_array())
}

pub fn from_rapier_vec(v: Vector) -> Vec3 {
    Vec3::from_array(v.to_array())
}

pub fn to_rapier_quat(q: Quat) -> Rotation {
    Rotation::from_array(q.to_array())
}

pub fn from_rapier_quat(q: Rotation) -> Quat {
    Quat::from_array(q.to_array())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quaternion_round_trip_preserves_rotation() {
        let rotation = Quat::from_euler(bevy::math::EulerRot::YXZ, 0.4, -1.1, 0.3);
        let back = from_rapier_quat(to_rapier_quat(rotation));
        assert!(rotation.dot(back).abs() > 0.9999);
    }

    #[test]
    fn vectors_keep_their_components() {
        let v = Vec3::new(1.5, -2.0, 7.25);
        assert_eq!(to_rapier_vec(v).to_array(), [1.5, -2.0, 7.25]);
        assert_eq!(from_rapier_vec(to_rapier_vec(v)), v);
    }
}
