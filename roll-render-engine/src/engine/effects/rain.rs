use bevy::prelude::*;
use constants::effects::{
    RAIN_CEILING, RAIN_DRIFT_STEP, RAIN_FALL_STEP, RAIN_FLOOR, RAIN_HALF_EXTENT, RAIN_RESPAWN_X,
};
use rand::Rng;

/// Falling rain particles drifting along -X.
#[derive(Component, Debug)]
pub struct RainEffect {
    positions: Box<[[f32; 3]]>,
    dirty: bool,
}

impl RainEffect {
    pub fn new(count: usize, rng: &mut impl Rng) -> Self {
        let positions = (0..count)
            .map(|_| {
                [
                    rng.gen_range(-RAIN_HALF_EXTENT..RAIN_HALF_EXTENT),
                    rng.gen_range(RAIN_FLOOR..RAIN_CEILING),
                    rng.gen_range(-RAIN_HALF_EXTENT..RAIN_HALF_EXTENT),
                ]
            })
            .collect();

        Self {
            positions,
            dirty: true,
        }
    }

    pub fn update(&mut self, rng: &mut impl Rng) {
        for position in self.positions.iter_mut() {
            position[1] -= RAIN_FALL_STEP;
            position[0] -= RAIN_DRIFT_STEP;

            if position[1] < RAIN_FLOOR {
                position[1] = RAIN_CEILING;
                position[0] = rng.gen_range(RAIN_RESPAWN_X.0..RAIN_RESPAWN_X.1);
            }
        }
        self.dirty = true;
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns whether the buffer changed since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
