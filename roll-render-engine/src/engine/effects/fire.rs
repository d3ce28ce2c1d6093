use bevy::prelude::*;
use constants::effects::FIRE_CENTRE_PULL;
use rand::Rng;
use std::f32::consts::TAU;

use crate::engine::assets::scene_settings::FireSettings;

/// Flame particles rising from a disc around `origin`.
#[derive(Component, Debug)]
pub struct FireEffect {
    origin: Vec3,
    radius: f32,
    height: f32,
    rise_speed: f32,
    positions: Box<[[f32; 3]]>,
    velocities: Box<[[f32; 3]]>,
    dirty: bool,
}

impl FireEffect {
    pub fn new(origin: Vec3, settings: &FireSettings, rng: &mut impl Rng) -> Self {
        let count = settings.particle_count;
        let mut fire = Self {
            origin,
            radius: settings.radius,
            height: settings.height,
            rise_speed: settings.rise_speed,
            positions: vec![[0.0; 3]; count].into_boxed_slice(),
            velocities: vec![[0.0; 3]; count].into_boxed_slice(),
            dirty: true,
        };

        for index in 0..count {
            fire.respawn(index, rng);
            // Spread the initial particles through the flame body.
            if fire.height > 0.0 {
                fire.positions[index][1] += rng.gen_range(0.0..fire.height);
            }
        }
        fire
    }

    fn respawn(&mut self, index: usize, rng: &mut impl Rng) {
        let angle = rng.gen_range(0.0..TAU);
        let distance = self.radius * rng.gen_range(0.0f32..1.0).sqrt();
        self.positions[index] = [
            self.origin.x + distance * angle.cos(),
            self.origin.y,
            self.origin.z + distance * angle.sin(),
        ];

        let lateral = self.rise_speed * 0.5;
        self.velocities[index] = [
            rng.gen_range(-lateral..=lateral),
            self.height * rng.gen_range(self.rise_speed..=self.rise_speed * 4.0),
            rng.gen_range(-lateral..=lateral),
        ];
    }

    pub fn update(&mut self, rng: &mut impl Rng) {
        for index in 0..self.positions.len() {
            let velocity = self.velocities[index];
            let position = &mut self.positions[index];
            position[0] += velocity[0];
            position[1] += velocity[1];
            position[2] += velocity[2];
            position[0] -= (position[0] - self.origin.x) * FIRE_CENTRE_PULL;
            position[2] -= (position[2] - self.origin.z) * FIRE_CENTRE_PULL;

            if position[1] - self.origin.y > self.height {
                self.respawn(index, rng);
            }
        }
        self.dirty = true;
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn horizontal_distance(position: [f32; 3], origin: Vec3) -> f32 {
        Vec2::new(position[0] - origin.x, position[2] - origin.z).length()
    }

    #[test]
    fn particles_stay_inside_the_flame() {
        let mut rng = StdRng::seed_from_u64(21);
        let origin = Vec3::new(2.0, 3.0, -1.0);
        let settings = FireSettings::default();
        let mut fire = FireEffect::new(origin, &settings, &mut rng);

        for _ in 0..600 {
            fire.update(&mut rng);
            for position in fire.positions() {
                assert!(position[1] >= origin.y);
                assert!(position[1] - origin.y <= settings.height);
                // Lateral velocity can carry a particle slightly past the rim.
                assert!(horizontal_distance(*position, origin) < settings.radius + 1.0);
            }
        }
        assert_eq!(fire.positions().len(), settings.particle_count);
    }

    #[test]
    fn particles_above_the_flame_respawn_in_the_base_disc() {
        let mut rng = StdRng::seed_from_u64(22);
        let origin = Vec3::ZERO;
        let settings = FireSettings::default();
        let mut fire = FireEffect::new(origin, &settings, &mut rng);
        fire.positions[0] = [0.0, settings.height + 1.0, 0.0];

        fire.update(&mut rng);

        let respawned = fire.positions()[0];
        assert_eq!(respawned[1], origin.y);
        assert!(horizontal_distance(respawned, origin) <= settings.radius + 1e-5);
    }
}
