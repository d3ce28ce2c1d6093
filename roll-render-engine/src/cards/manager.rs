use std::collections::{HashMap, HashSet};

use bevy::prelude::*;
use constants::card::{CARD_ROW_HEIGHT, CARD_SIZE, CARD_SPACING, DIE_FACES};
use rand::Rng;

use crate::cards::card::{Card, CardId};
use crate::engine::assets::scene_settings::SceneSettings;
use crate::engine::camera::orbit_camera::MainCamera;
use crate::engine::effects::EffectRng;
use crate::engine::loading::text_loader::{LabelStyle, spawn_text};
use crate::engine::render::outline::SelectedObjects;
use crate::rpc::web_rpc::WebRpcInterface;
use crate::tools::raycaster::{Interactable, InteractableClicked};
use crate::ui::card_editor::OpenCardEditor;

/// The session's cards, in the order they were added.
#[derive(Resource, Debug, Default)]
pub struct CardManager {
    cards: Vec<Card>,
    next_id: u32,
}

impl CardManager {
    pub fn add(&mut self, name: impl Into<String>, modifier: i32) -> CardId {
        let id = CardId(self.next_id);
        self.next_id += 1;
        self.cards.push(Card::new(id, name, modifier));
        id
    }

    pub fn get(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|card| card.id() == id)
    }

    pub fn get_mut(&mut self, id: CardId) -> Option<&mut Card> {
        self.cards.iter_mut().find(|card| card.id() == id)
    }

    pub fn remove(&mut self, id: CardId) -> Option<Card> {
        let index = self.index_of(id)?;
        Some(self.cards.remove(index))
    }

    pub fn index_of(&self, id: CardId) -> Option<usize> {
        self.cards.iter().position(|card| card.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Card> {
        self.cards.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Something happened to a card that the scene and the page should see.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardEvent {
    Added(CardId),
    Changed(CardId),
    Removed(CardId),
}

/// Rolls initiative for every card.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct RollRequested;

#[derive(Component, Debug, Clone, Copy)]
pub struct CardMarker {
    pub id: CardId,
}

#[derive(Component, Debug, Clone, Copy)]
pub struct CardLabel {
    pub id: CardId,
}

#[derive(Resource)]
pub struct CardMarkerAssets {
    mesh: Handle<Mesh>,
    material: Handle<StandardMaterial>,
}

impl FromWorld for CardMarkerAssets {
    fn from_world(world: &mut World) -> Self {
        let (width, height, depth) = CARD_SIZE;
        let mesh = world
            .resource_mut::<Assets<Mesh>>()
            .add(Cuboid::new(width, height, depth));
        let material = world
            .resource_mut::<Assets<StandardMaterial>>()
            .add(StandardMaterial {
                base_color: Color::srgb(0.92, 0.86, 0.72),
                perceptual_roughness: 0.9,
                ..default()
            });
        Self { mesh, material }
    }
}

/// Centre of the card at `index` in a row of `count`.
pub fn card_slot(index: usize, count: usize) -> Vec3 {
    let offset = (count.saturating_sub(1)) as f32 * 0.5;
    Vec3::new(
        (index as f32 - offset) * CARD_SPACING,
        CARD_ROW_HEIGHT,
        0.0,
    )
}

pub fn label_text(card: &Card) -> String {
    format!("{} ({:+})", card.name, card.modifier)
}

pub fn spawn_initial_cards(
    settings: Res<SceneSettings>,
    mut manager: ResMut<CardManager>,
    mut events: EventWriter<CardEvent>,
) {
    for spec in &settings.cards {
        let id = manager.add(spec.name.clone(), spec.modifier);
        if let (Some(src), Some(card)) = (&spec.image_src, manager.get_mut(id)) {
            card.set_picture(src.clone());
        }
        events.write(CardEvent::Added(id));
    }
    info!("✓ {} cards created", settings.cards.len());
}

/// Keeps one clickable marker and one label per card, and tells the page
/// about every change. Markers are reconciled against the manager, so a
/// card whose `Added` event expired before the scene was running still
/// gets one.
#[allow(clippy::too_many_arguments)]
pub fn sync_card_markers(
    mut commands: Commands,
    mut events: EventReader<CardEvent>,
    manager: Res<CardManager>,
    assets: Res<CardMarkerAssets>,
    style: Option<Res<LabelStyle>>,
    mut markers: Query<(Entity, &CardMarker, &mut Transform)>,
    mut labels: Query<(Entity, &CardLabel, &mut Text)>,
    mut selected: ResMut<SelectedObjects>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    let mut layout_changed = false;
    let default_style = LabelStyle::default();
    let style = style.as_deref().unwrap_or(&default_style);

    for event in events.read() {
        match *event {
            // Spawned below with every other card that lacks a marker.
            CardEvent::Added(_) => {}
            CardEvent::Changed(id) => {
                let Some(card) = manager.get(id) else {
                    continue;
                };
                for (_, label, mut text) in &mut labels {
                    if label.id == id {
                        text.0 = label_text(card);
                    }
                }
                rpc_interface.send_notification("card_updated", serde_json::json!(card.view()));
            }
            CardEvent::Removed(id) => {
                for (entity, marker, _) in &markers {
                    if marker.id == id {
                        selected.forget(entity);
                        commands.entity(entity).try_despawn();
                    }
                }
                for (entity, label, _) in &labels {
                    if label.id == id {
                        commands.entity(entity).try_despawn();
                    }
                }
                rpc_interface.send_notification("card_removed", serde_json::json!({ "id": id }));
                layout_changed = true;
            }
        }
    }

    let marked: HashSet<CardId> = markers.iter().map(|(_, marker, _)| marker.id).collect();
    for (index, card) in manager.iter().enumerate() {
        if marked.contains(&card.id()) {
            continue;
        }
        spawn_card_marker(&mut commands, &assets, style, card, card_slot(index, manager.len()));
        rpc_interface.send_notification("card_updated", serde_json::json!(card.view()));
        layout_changed = true;
    }

    if layout_changed {
        for (_, marker, mut transform) in &mut markers {
            if let Some(index) = manager.index_of(marker.id) {
                transform.translation = card_slot(index, manager.len());
            }
        }
    }
}

fn spawn_card_marker(
    commands: &mut Commands,
    assets: &CardMarkerAssets,
    style: &LabelStyle,
    card: &Card,
    position: Vec3,
) {
    let (width, height, depth) = CARD_SIZE;
    let id = card.id();
    commands.spawn((
        CardMarker { id },
        Mesh3d(assets.mesh.clone()),
        MeshMaterial3d(assets.material.clone()),
        Transform::from_translation(position),
        Interactable {
            size: Vec3::new(width, height, depth),
        },
        Name::new(format!("card:{}", card.name)),
    ));
    let label = spawn_text(commands, style, label_text(card));
    commands.entity(label).insert(CardLabel { id });
}

/// Pins each label above its marker in screen space.
pub fn position_card_labels(
    cameras: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    markers: Query<(&CardMarker, &GlobalTransform)>,
    mut labels: Query<(&CardLabel, &mut Node, &mut Visibility)>,
) {
    let Ok((camera, camera_transform)) = cameras.single() else {
        return;
    };

    let anchors: HashMap<CardId, Vec3> = markers
        .iter()
        .map(|(marker, transform)| {
            (
                marker.id,
                transform.translation() + Vec3::Y * (CARD_SIZE.1 * 0.5 + 0.3),
            )
        })
        .collect();

    for (label, mut node, mut visibility) in &mut labels {
        let screen = anchors
            .get(&label.id)
            .and_then(|anchor| camera.world_to_viewport(camera_transform, *anchor).ok());
        match screen {
            Some(position) => {
                node.left = Val::Px(position.x);
                node.top = Val::Px(position.y);
                *visibility = Visibility::Inherited;
            }
            None => *visibility = Visibility::Hidden,
        }
    }
}

pub fn open_editor_on_click(
    mut clicks: EventReader<InteractableClicked>,
    markers: Query<&CardMarker>,
    mut open: EventWriter<OpenCardEditor>,
) {
    for click in clicks.read() {
        if let Ok(marker) = markers.get(click.entity) {
            open.write(OpenCardEditor { card: marker.id });
        }
    }
}

/// Rolls a die for every card and stores the modified total.
pub fn roll_initiative(
    mut requests: EventReader<RollRequested>,
    mut manager: ResMut<CardManager>,
    mut rng: ResMut<EffectRng>,
    mut events: EventWriter<CardEvent>,
) {
    if requests.read().count() == 0 {
        return;
    }

    for card in manager.iter_mut() {
        let die = rng.0.gen_range(1..=DIE_FACES);
        card.record_roll(die.saturating_add(card.modifier), None);
        events.write(CardEvent::Changed(card.id()));
    }
    info!("→ Rolled initiative for {} cards", manager.len());
}

#[cfg(not(target_arch = "wasm32"))]
pub fn roll_shortcut(keys: Res<ButtonInput<KeyCode>>, mut requests: EventWriter<RollRequested>) {
    if keys.just_pressed(KeyCode::Space) {
        requests.write(RollRequested);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::core::app_state::AppState;
    use bevy::state::app::StatesPlugin;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn card_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<Mesh>()
            .init_asset::<StandardMaterial>()
            .init_resource::<CardManager>()
            .init_resource::<CardMarkerAssets>()
            .init_resource::<SelectedObjects>()
            .init_resource::<WebRpcInterface>()
            .add_event::<CardEvent>()
            .add_systems(Update, sync_card_markers.in_set(MarkerSync));
        app
    }

    #[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
    struct MarkerSync;

    #[test]
    fn ids_stay_unique_after_removal() {
        let mut manager = CardManager::default();
        let first = manager.add("Fighter", 2);
        let second = manager.add("Rogue", 4);
        manager.remove(first);
        let third = manager.add("Cleric", 0);

        assert_ne!(second, third);
        assert_ne!(first, third);
        assert_eq!(manager.len(), 2);
        assert!(manager.get(first).is_none());
        assert_eq!(manager.index_of(third), Some(1));
    }

    #[test]
    fn slots_are_centred_on_the_row() {
        assert_eq!(card_slot(0, 1).x, 0.0);
        assert_eq!(card_slot(0, 3).x, -CARD_SPACING);
        assert_eq!(card_slot(2, 3).x, CARD_SPACING);
        assert_eq!(card_slot(1, 2).y, CARD_ROW_HEIGHT);
    }

    #[test]
    fn markers_follow_the_card_collection() {
        let mut app = card_app();
        let id = app.world_mut().resource_mut::<CardManager>().add("Rogue", 4);
        app.world_mut().send_event(CardEvent::Added(id));
        app.update();

        let mut markers = app.world_mut().query::<&CardMarker>();
        let mut labels = app.world_mut().query::<&CardLabel>();
        assert_eq!(markers.iter(app.world()).count(), 1);
        assert_eq!(labels.iter(app.world()).count(), 1);

        let marker = app
            .world_mut()
            .query_filtered::<Entity, With<CardMarker>>()
            .single(app.world())
            .unwrap();
        app.world_mut()
            .resource_mut::<SelectedObjects>()
            .set([marker]);

        app.world_mut().resource_mut::<CardManager>().remove(id);
        app.world_mut().send_event(CardEvent::Removed(id));
        app.update();

        assert_eq!(markers.iter(app.world()).count(), 0);
        assert_eq!(labels.iter(app.world()).count(), 0);
        assert!(app.world().resource::<SelectedObjects>().entities.is_empty());
    }

    #[test]
    fn cards_added_while_loading_get_markers_once_running() {
        let mut app = card_app();
        app.add_plugins(StatesPlugin)
            .init_state::<AppState>()
            .configure_sets(Update, MarkerSync.run_if(in_state(AppState::Running)));
        let id = app.world_mut().resource_mut::<CardManager>().add("Bard", 1);
        app.world_mut().send_event(CardEvent::Added(id));
        for _ in 0..3 {
            app.update();
        }
        let mut markers = app.world_mut().query::<&CardMarker>();
        assert_eq!(markers.iter(app.world()).count(), 0);

        app.world_mut()
            .resource_mut::<NextState<AppState>>()
            .set(AppState::Running);
        app.update();
        app.update();

        assert_eq!(markers.iter(app.world()).count(), 1);
        let mut labels = app.world_mut().query::<&CardLabel>();
        assert_eq!(labels.iter(app.world()).count(), 1);
    }

    #[test]
    fn changes_rewrite_the_label() {
        let mut app = card_app();
        let id = app.world_mut().resource_mut::<CardManager>().add("Rogue", 4);
        app.world_mut().send_event(CardEvent::Added(id));
        app.update();

        if let Some(card) = app.world_mut().resource_mut::<CardManager>().get_mut(id) {
            card.update_name("Thief");
            card.update_modifier(-1);
        }
        app.world_mut().send_event(CardEvent::Changed(id));
        app.update();

        let text = app
            .world_mut()
            .query::<(&CardLabel, &Text)>()
            .single(app.world())
            .map(|(_, text)| text.0.clone())
            .unwrap();
        assert_eq!(text, "Thief (-1)");
    }

    #[test]
    fn rolls_land_within_die_range_plus_modifier() {
        let mut world = World::new();
        world.init_resource::<Events<RollRequested>>();
        world.init_resource::<Events<CardEvent>>();
        world.insert_resource(EffectRng(StdRng::seed_from_u64(7)));
        let mut manager = CardManager::default();
        manager.add("Fighter", 2);
        manager.add("Rogue", -3);
        world.insert_resource(manager);

        let system = world.register_system(roll_initiative);
        world.send_event(RollRequested);
        world.run_system(system).unwrap();

        for card in world.resource::<CardManager>().iter() {
            let die = card.roll_display();
            assert!((1..=i64::from(DIE_FACES)).contains(&die));
            assert_eq!(card.reroll_display(), "x");
        }
        assert_eq!(world.resource::<Events<CardEvent>>().len(), 2);
    }
}
