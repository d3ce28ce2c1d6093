use bevy::asset::LoadState;
use bevy::prelude::*;

use crate::engine::assets::scene_settings::SceneSettings;
use crate::engine::loading::progress::LoadingProgress;

pub const SETTINGS_PATH: &str = "scene_settings.json";

#[derive(Resource, Default)]
pub struct SettingsLoader {
    handle: Option<Handle<SceneSettings>>,
}

// Start the loading process
pub fn start_loading(
    mut settings_loader: ResMut<SettingsLoader>,
    mut loading_progress: ResMut<LoadingProgress>,
    asset_server: Res<AssetServer>,
) {
    settings_loader.handle = Some(asset_server.load(SETTINGS_PATH));
    loading_progress.settings_requested = true;
}

/// Publishes the loaded settings as a resource, or the defaults if the
/// file could not be loaded.
pub fn resolve_settings_system(
    mut loading_progress: ResMut<LoadingProgress>,
    settings_loader: Res<SettingsLoader>,
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    settings: Res<Assets<SceneSettings>>,
) {
    if loading_progress.settings_resolved {
        return;
    }

    let Some(handle) = settings_loader.handle.as_ref() else {
        return;
    };

    if let Some(loaded) = settings.get(handle) {
        println!("✓ Scene settings loaded");
        commands.insert_resource(loaded.clone());
        loading_progress.settings_resolved = true;
        return;
    }

    if let Some(LoadState::Failed(err)) = asset_server.get_load_state(handle) {
        warn!("Scene settings failed to load ({}), using defaults", err);
        commands.insert_resource(SceneSettings::default());
        loading_progress.settings_resolved = true;
        loading_progress.used_defaults = true;
    }
}
