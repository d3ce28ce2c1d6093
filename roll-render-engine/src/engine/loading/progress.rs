use bevy::prelude::*;

#[derive(Resource, Default)]
pub struct LoadingProgress {
    pub settings_requested: bool,
    pub settings_resolved: bool,
    /// Settings file was missing or invalid and defaults were used.
    pub used_defaults: bool,
}
