use bevy::prelude::*;

/// Requests the first scene of a glTF file. The returned handle can be
/// spawned as a `SceneRoot` immediately; it pops in once loaded.
pub fn load_model(asset_server: &AssetServer, path: &str) -> Handle<Scene> {
    asset_server.load(GltfAssetLabel::Scene(0).from_asset(path.to_string()))
}

pub fn model_ready(asset_server: &AssetServer, handle: &Handle<Scene>) -> bool {
    asset_server.is_loaded_with_dependencies(handle.id())
}
