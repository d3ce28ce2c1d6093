use bevy::prelude::*;

use crate::engine::assets::scene_settings::SceneSettings;

/// Debug mode presents the scene directly, without the dither pass or
/// outlines.
#[derive(Resource, Clone, Debug)]
pub struct RenderModeState {
    pub debug: bool,
}

impl Default for RenderModeState {
    fn default() -> Self {
        Self {
            debug: constants::render_settings::DEBUG_RENDERING,
        }
    }
}

pub fn apply_render_mode_setting(
    settings: Res<SceneSettings>,
    mut render_state: ResMut<RenderModeState>,
) {
    render_state.debug = settings.debug;
}

/// Toggle debug presentation with F1 on native builds.
pub fn render_mode_system(
    mut render_state: ResMut<RenderModeState>,
    #[cfg(not(target_arch = "wasm32"))] keyboard: Res<ButtonInput<KeyCode>>,
) {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if keyboard.just_pressed(KeyCode::F1) {
            render_state.debug = !render_state.debug;
        }
    }

    if render_state.is_changed() {
        info!("Render mode changed: debug = {}", render_state.debug);
    }
}
