use bevy::asset::AssetMetaCheck;
use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::pbr::wireframe::{WireframeConfig, WireframePlugin};
use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;
use constants::render_settings::OUTLINE_COLOUR;
// Core loop
use crate::engine::core::app_state::{AppState, transition_to_running};
use crate::engine::core::frame_clock::{FrameClockPlugin, FrameSet, apply_frame_interval_setting};
use crate::engine::core::render_actions::{
    RenderActions, release_render_actions, run_render_actions,
};
use crate::engine::core::window_config::create_window_config;
// Loading
use crate::engine::assets::scene_settings::SceneSettings;
use crate::engine::loading::page_scripts::inject_page_scripts;
use crate::engine::loading::progress::LoadingProgress;
use crate::engine::loading::settings_loader::{
    SettingsLoader, resolve_settings_system, start_loading,
};
use crate::engine::loading::text_loader::load_label_style;
// Scene
use crate::engine::camera::orbit_camera::{
    CameraPreset, OrbitCamera, apply_camera_presets, camera_preset_shortcuts,
    orbit_camera_controls, spawn_main_camera, update_camera_transform,
};
use crate::engine::effects::{EffectRng, seed_effect_rng, spawn_effects};
use crate::engine::physics::debug_mirror::{DebugMeshAssets, DebugMirror, update_physics_debug};
use crate::engine::physics::world::PhysicsWorld;
use crate::engine::physics::{
    PhysicsDebugState, apply_physics_debug_setting, physics_debug_shortcut, step_physics,
    sync_physics_bodies,
};
use crate::engine::scene::actors::{roll_on_die_click, spawn_actors, throw_dice};
use crate::engine::scene::ground::spawn_ground;
use crate::engine::scene::lighting::spawn_lighting;
// Presentation
use crate::engine::render::dither_post_processing::DitherPostProcessPlugin;
use crate::engine::render::outline::{SelectedObjects, update_outline_highlight};
use crate::engine::render::present::present_frame;
use crate::engine::signals::{
    InteractionSignal, PageInteractionSignal, PageSignalQueue, mirror_interaction_signals,
    receive_page_signals,
};
use crate::engine::systems::fps_tracking::fps_notification_system;
use crate::engine::systems::render_mode::{
    RenderModeState, apply_render_mode_setting, render_mode_system,
};
// Interaction, cards and page UI
use crate::cards::manager::{
    CardEvent, CardManager, CardMarkerAssets, RollRequested, open_editor_on_click,
    position_card_labels, roll_initiative, spawn_initial_cards, sync_card_markers,
};
use crate::rpc::web_rpc::WebRpcPlugin;
use crate::tools::raycaster::{
    InteractableClicked, Raycaster, apply_interaction_signals, latch_pointer_clicks,
    update_raycaster,
};
use crate::ui::card_editor::{
    CardEditor, OpenCardEditor, close_card_editor_surface, configure_card_editor,
    follow_card_events, open_card_editor, process_editor_messages, tick_editor_reactivation,
};
use crate::ui::surface::CardEditorSurface;

#[cfg(target_arch = "wasm32")]
use crate::engine::signals::listen_for_page_signals;
#[cfg(not(target_arch = "wasm32"))]
use crate::cards::manager::roll_shortcut;
#[cfg(not(target_arch = "wasm32"))]
use crate::engine::systems::fps_tracking::{fps_text_update_system, spawn_fps_overlay};

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .init_state::<AppState>()
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        // Registers SceneSettings as a loadable asset type from JSON files.
        .add_plugins(JsonAssetPlugin::<SceneSettings>::new(&["json"]))
        .add_plugins(FrameClockPlugin)
        .add_plugins(DitherPostProcessPlugin)
        .add_plugins(WebRpcPlugin)
        .add_plugins(WireframePlugin::default())
        .insert_resource(WireframeConfig {
            global: false,
            default_color: OUTLINE_COLOUR,
        });

    // Initialise resources early
    app.init_resource::<LoadingProgress>()
        .init_resource::<SettingsLoader>()
        .init_resource::<RenderActions>()
        .init_resource::<RenderModeState>()
        .init_resource::<OrbitCamera>()
        .init_resource::<PhysicsWorld>()
        .init_resource::<PhysicsDebugState>()
        .init_resource::<DebugMirror>()
        .init_resource::<DebugMeshAssets>()
        .init_resource::<EffectRng>()
        .init_resource::<Raycaster>()
        .init_resource::<SelectedObjects>()
        .init_resource::<CardManager>()
        .init_resource::<CardMarkerAssets>()
        .init_resource::<CardEditor>()
        .init_resource::<PageSignalQueue>()
        .init_non_send_resource::<CardEditorSurface>()
        .add_event::<InteractionSignal>()
        .add_event::<PageInteractionSignal>()
        .add_event::<CameraPreset>()
        .add_event::<InteractableClicked>()
        .add_event::<CardEvent>()
        .add_event::<RollRequested>()
        .add_event::<OpenCardEditor>();

    app.add_systems(Startup, (spawn_main_camera, start_loading))
        .add_systems(
            Update,
            (resolve_settings_system, transition_to_running)
                .chain()
                .run_if(in_state(AppState::Loading)),
        );

    // Scene construction, in the order the controller builds it.
    app.add_systems(
        OnEnter(AppState::Running),
        (
            (
                apply_frame_interval_setting,
                apply_render_mode_setting,
                apply_physics_debug_setting,
                seed_effect_rng,
                configure_card_editor,
            ),
            spawn_effects,
            spawn_actors,
            (spawn_lighting, spawn_ground),
            (load_label_style, spawn_initial_cards).chain(),
            inject_page_scripts,
            log_scene_ready,
        )
            .chain(),
    );

    // Gated render tick
    app.add_systems(Update, run_render_actions.in_set(FrameSet::RenderActions))
        .add_systems(Update, update_outline_highlight.in_set(FrameSet::Highlight))
        .add_systems(Update, orbit_camera_controls.in_set(FrameSet::Controls))
        .add_systems(Update, update_raycaster.in_set(FrameSet::Raycast))
        .add_systems(Update, present_frame.in_set(FrameSet::Present));

    // Every frame, regardless of the tick
    app.add_systems(
        Update,
        (
            render_mode_system,
            physics_debug_shortcut,
            camera_preset_shortcuts,
            apply_camera_presets,
            update_camera_transform,
            step_physics,
            sync_physics_bodies,
            update_physics_debug,
            receive_page_signals,
            apply_interaction_signals,
            latch_pointer_clicks,
        )
            .chain()
            .in_set(FrameSet::Continuous),
    );

    app.add_systems(
        Update,
        (
            roll_on_die_click,
            open_editor_on_click,
            roll_initiative,
            throw_dice,
            open_card_editor,
            process_editor_messages,
            tick_editor_reactivation,
            sync_card_markers,
            follow_card_events,
            position_card_labels,
            mirror_interaction_signals,
            fps_notification_system,
        )
            .chain()
            .in_set(FrameSet::Ui),
    );

    #[cfg(not(target_arch = "wasm32"))]
    {
        app.add_systems(Startup, spawn_fps_overlay).add_systems(
            Update,
            (
                roll_shortcut.before(roll_initiative),
                fps_text_update_system,
            )
                .in_set(FrameSet::Ui),
        );
    }

    #[cfg(target_arch = "wasm32")]
    app.add_systems(Startup, listen_for_page_signals);

    app.add_systems(Last, teardown_on_exit);

    app
}

fn log_scene_ready(actions: Res<RenderActions>, cards: Res<CardManager>) {
    info!(
        "✓ Scene running with {} render actions and {} cards",
        actions.len(),
        cards.len()
    );
}

/// Releases the render actions and closes the editor once the app is
/// asked to exit.
fn teardown_on_exit(mut exits: EventReader<AppExit>, mut commands: Commands) {
    if exits.read().next().is_none() {
        return;
    }

    commands.queue(|world: &mut World| {
        release_render_actions(world);
        if let Err(err) = world.run_system_cached(close_card_editor_surface) {
            warn!("Card editor was not closed: {}", err);
        }
        info!("✓ Roll scene shut down");
    });
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}
