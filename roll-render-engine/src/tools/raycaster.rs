use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::engine::camera::orbit_camera::MainCamera;
use crate::engine::render::outline::SelectedObjects;
use crate::engine::signals::{InteractionSignal, PageInteractionSignal};
use crate::tools::ray::ray_hits_obb;

#[derive(Resource, Debug)]
pub struct Raycaster {
    pub active: bool,
    pub hovered: Option<Entity>,
    pending_click: bool,
}

impl Default for Raycaster {
    fn default() -> Self {
        Self {
            active: true,
            hovered: None,
            pending_click: false,
        }
    }
}

/// Pickable box around an entity, in its local space.
#[derive(Component, Debug, Clone, Copy)]
pub struct Interactable {
    pub size: Vec3,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct InteractableClicked {
    pub entity: Entity,
}

/// Nearest candidate hit by the ray, with its distance.
pub fn pick_nearest<'a>(
    origin: Vec3,
    direction: Vec3,
    candidates: impl IntoIterator<Item = (Entity, &'a GlobalTransform, &'a Interactable)>,
) -> Option<(Entity, f32)> {
    candidates
        .into_iter()
        .filter_map(|(entity, transform, interactable)| {
            ray_hits_obb(origin, direction, transform, interactable.size).map(|t| (entity, t))
        })
        .filter(|(_, t)| *t > 0.0)
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

pub fn apply_interaction_signals(
    mut signals: EventReader<InteractionSignal>,
    mut page_signals: EventReader<PageInteractionSignal>,
    mut raycaster: ResMut<Raycaster>,
    mut selected: ResMut<SelectedObjects>,
) {
    let page_signals = page_signals.read().map(|page| page.0);
    for signal in signals.read().copied().chain(page_signals) {
        raycaster.active = signal.is_active();
        if !raycaster.active {
            raycaster.hovered = None;
            raycaster.pending_click = false;
            selected.entities.clear();
        }
    }
}

/// Records clicks every frame so the gated picking pass does not miss them.
pub fn latch_pointer_clicks(
    buttons: Res<ButtonInput<MouseButton>>,
    mut raycaster: ResMut<Raycaster>,
) {
    if raycaster.active && buttons.just_pressed(MouseButton::Left) {
        raycaster.pending_click = true;
    }
}

pub fn update_raycaster(
    mut raycaster: ResMut<Raycaster>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    targets: Query<(Entity, &GlobalTransform, &Interactable)>,
    mut selected: ResMut<SelectedObjects>,
    mut clicks: EventWriter<InteractableClicked>,
) {
    let click = std::mem::take(&mut raycaster.pending_click);
    if !raycaster.active {
        return;
    }

    let Ok(window) = windows.single() else {
        return;
    };
    let Ok((camera, camera_transform)) = cameras.single() else {
        return;
    };

    let hovered = window
        .cursor_position()
        .and_then(|cursor| camera.viewport_to_world(camera_transform, cursor).ok())
        .and_then(|ray| pick_nearest(ray.origin, ray.direction.as_vec3(), &targets))
        .map(|(entity, _)| entity);

    if hovered != raycaster.hovered {
        raycaster.hovered = hovered;
        selected.set(hovered);
    }

    if click {
        if let Some(entity) = hovered {
            clicks.write(InteractableClicked { entity });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_box_wins() {
        let mut world = World::new();
        let far = world.spawn_empty().id();
        let near = world.spawn_empty().id();
        let far_transform = GlobalTransform::from_xyz(0.0, 0.0, 20.0);
        let near_transform = GlobalTransform::from_xyz(0.0, 0.0, 8.0);
        let size = Interactable { size: Vec3::ONE };

        let hit = pick_nearest(
            Vec3::ZERO,
            Vec3::Z,
            [(far, &far_transform, &size), (near, &near_transform, &size)],
        );
        assert_eq!(hit.map(|(entity, _)| entity), Some(near));
    }

    #[test]
    fn nothing_hit_off_axis() {
        let mut world = World::new();
        let entity = world.spawn_empty().id();
        let transform = GlobalTransform::from_xyz(10.0, 0.0, 8.0);
        let size = Interactable { size: Vec3::ONE };

        assert!(pick_nearest(Vec3::ZERO, Vec3::Z, [(entity, &transform, &size)]).is_none());
    }

    #[test]
    fn signals_toggle_the_raycaster_and_clear_selection() {
        let mut world = World::new();
        world.init_resource::<Events<InteractionSignal>>();
        world.init_resource::<Events<PageInteractionSignal>>();
        world.init_resource::<Raycaster>();
        let target = world.spawn_empty().id();
        world.insert_resource(SelectedObjects {
            entities: vec![target],
        });
        let system = world.register_system(apply_interaction_signals);

        world.send_event(InteractionSignal::Deactivate);
        world.run_system(system).unwrap();
        assert!(!world.resource::<Raycaster>().active);
        assert!(world.resource::<SelectedObjects>().entities.is_empty());

        world.send_event(InteractionSignal::Activate);
        world.run_system(system).unwrap();
        assert!(world.resource::<Raycaster>().active);
    }

    #[test]
    fn page_raised_signals_switch_the_raycaster_off() {
        let mut world = World::new();
        world.init_resource::<Events<InteractionSignal>>();
        world.init_resource::<Events<PageInteractionSignal>>();
        world.init_resource::<Raycaster>();
        world.init_resource::<SelectedObjects>();
        let system = world.register_system(apply_interaction_signals);

        world.send_event(PageInteractionSignal(InteractionSignal::Deactivate));
        world.run_system(system).unwrap();
        assert!(!world.resource::<Raycaster>().active);

        world.send_event(PageInteractionSignal(InteractionSignal::Activate));
        world.run_system(system).unwrap();
        assert!(world.resource::<Raycaster>().active);
    }
}
