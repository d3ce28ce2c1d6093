use bevy::prelude::*;
use constants::effects::{LIGHTNING_JITTER, LIGHTNING_SKY_HEIGHT, RAIN_HALF_EXTENT};
use rand::Rng;

use crate::engine::assets::scene_settings::LightningSettings;

/// Marks the point light driven by the lightning flash.
#[derive(Component)]
pub struct LightningFlash;

/// A jagged bolt from the sky to the ground plus a decaying flash.
#[derive(Component, Debug)]
pub struct LightningEffect {
    bolt: Box<[[f32; 3]]>,
    flash: f32,
    peak: f32,
    decay: f32,
    strike_chance: f32,
    dirty: bool,
}

impl LightningEffect {
    pub fn new(settings: &LightningSettings) -> Self {
        let points = settings.segments.max(1) + 1;
        Self {
            bolt: vec![[0.0; 3]; points].into_boxed_slice(),
            flash: 0.0,
            peak: settings.peak_intensity,
            decay: settings.decay,
            strike_chance: settings.strike_chance,
            dirty: true,
        }
    }

    /// Decays the flash and maybe strikes. Returns true on a new strike.
    pub fn update(&mut self, rng: &mut impl Rng) -> bool {
        let was_lit = self.is_lit();
        self.flash = (self.flash - self.decay).max(0.0);

        if rng.gen_range(0.0..1.0) < self.strike_chance {
            self.strike(rng);
            return true;
        }

        if was_lit != self.is_lit() {
            self.dirty = true;
        }
        false
    }

    /// Regenerates the bolt polyline and sets the flash to its peak.
    pub fn strike(&mut self, rng: &mut impl Rng) {
        let mut x = rng.gen_range(-RAIN_HALF_EXTENT..RAIN_HALF_EXTENT);
        let mut z = rng.gen_range(-RAIN_HALF_EXTENT..RAIN_HALF_EXTENT);
        let step = LIGHTNING_SKY_HEIGHT / (self.bolt.len() - 1) as f32;

        for (index, point) in self.bolt.iter_mut().enumerate() {
            *point = [x, LIGHTNING_SKY_HEIGHT - step * index as f32, z];
            x += rng.gen_range(-LIGHTNING_JITTER..=LIGHTNING_JITTER);
            z += rng.gen_range(-LIGHTNING_JITTER..=LIGHTNING_JITTER);
        }

        self.flash = self.peak;
        self.dirty = true;
    }

    pub fn flash(&self) -> f32 {
        self.flash
    }

    pub fn is_lit(&self) -> bool {
        self.flash > 0.0
    }

    pub fn bolt(&self) -> &[[f32; 3]] {
        &self.bolt
    }

    /// Point the flash light at the bolt's midpoint.
    pub fn bolt_centre(&self) -> Vec3 {
        let middle = self.bolt[self.bolt.len() / 2];
        Vec3::from_array(middle)
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

    fn settings(strike_chance: f32) -> LightningSettings {
        LightningSettings {
            strike_chance,
            ..LightningSettings::default()
        }
    }

    #[test]
    fn strike_spans_sky_to_ground() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut lightning = LightningEffect::new(&settings(1.0));

        assert!(lightning.update(&mut rng));
        let bolt = lightning.bolt();
        assert_eq!(bolt.len(), LightningSettings::default().segments + 1);
        assert_eq!(bolt[0][1], LIGHTNING_SKY_HEIGHT);
        assert!(bolt[bolt.len() - 1][1].abs() < 1e-3);
        assert_eq!(lightning.flash(), LightningSettings::default().peak_intensity);
    }

    #[test]
    fn flash_decays_to_zero_without_strikes() {
        let mut rng = StdRng::seed_from_u64(10);
        let mut lightning = LightningEffect::new(&settings(0.0));
        lightning.strike(&mut rng);

        for _ in 0..1000 {
            assert!(!lightning.update(&mut rng));
            assert!(lightning.flash() >= 0.0);
        }
        assert!(!lightning.is_lit());
    }

    #[test]
    fn bolt_capacity_is_fixed() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut lightning = LightningEffect::new(&settings(1.0));
        let len = lightning.bolt().len();
        for _ in 0..20 {
            lightning.update(&mut rng);
        }
        assert_eq!(lightning.bolt().len(), len);
    }
}
