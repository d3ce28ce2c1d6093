use bevy::prelude::*;
use bevy::window::PresentMode;

#[cfg(target_arch = "wasm32")]
pub fn create_window_config() -> Window {
    Window {
        canvas: Some("#bevy".into()),
        fit_canvas_to_parent: true,
        prevent_default_event_handling: false,
        present_mode: PresentMode::AutoVsync,
        ..default()
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn create_window_config() -> Window {
    Window {
        title: "Roll for Initiative".into(),
        resolution: (1280., 720.).into(),
        present_mode: PresentMode::AutoVsync,
        ..default()
    }
}
