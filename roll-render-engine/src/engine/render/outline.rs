use bevy::pbr::wireframe::{Wireframe, WireframeColor};
use bevy::prelude::*;
use constants::render_settings::OUTLINE_COLOUR;

use crate::engine::systems::render_mode::RenderModeState;

/// Objects the raycaster currently points at.
#[derive(Resource, Debug, Default)]
pub struct SelectedObjects {
    pub entities: Vec<Entity>,
}

impl SelectedObjects {
    pub fn set(&mut self, entities: impl IntoIterator<Item = Entity>) {
        self.entities.clear();
        self.entities.extend(entities);
    }

    pub fn forget(&mut self, entity: Entity) {
        self.entities.retain(|selected| *selected != entity);
    }
}

#[derive(Component)]
pub struct Outlined;

/// Entities to un-outline and to outline so that `current` becomes `desired`.
pub fn outline_changes(current: &[Entity], desired: &[Entity]) -> (Vec<Entity>, Vec<Entity>) {
    let removed = current
        .iter()
        .copied()
        .filter(|entity| !desired.contains(entity))
        .collect();
    let added = desired
        .iter()
        .copied()
        .filter(|entity| !current.contains(entity))
        .collect();
    (removed, added)
}

/// Mirrors the selection into outline highlights. Nothing is outlined in
/// debug mode, which presents the scene without post-processing.
pub fn update_outline_highlight(
    mut commands: Commands,
    selected: Res<SelectedObjects>,
    render_mode: Res<RenderModeState>,
    outlined: Query<Entity, With<Outlined>>,
    existing: Query<(), With<Transform>>,
) {
    let desired: Vec<Entity> = if render_mode.debug {
        Vec::new()
    } else {
        selected
            .entities
            .iter()
            .copied()
            .filter(|entity| existing.contains(*entity))
            .collect()
    };
    let current: Vec<Entity> = outlined.iter().collect();

    let (removed, added) = outline_changes(&current, &desired);
    for entity in removed {
        commands
            .entity(entity)
            .try_remove::<(Outlined, Wireframe, WireframeColor)>();
    }
    for entity in added {
        commands.entity(entity).try_insert((
            Outlined,
            Wireframe,
            WireframeColor {
                color: OUTLINE_COLOUR,
            },
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changes_only_touch_the_difference() {
        let mut world = World::new();
        let a = world.spawn_empty().id();
        let b = world.spawn_empty().id();
        let c = world.spawn_empty().id();

        let (removed, added) = outline_changes(&[a, b], &[b, c]);
        assert_eq!(removed, vec![a]);
        assert_eq!(added, vec![c]);
    }

    #[test]
    fn debug_mode_clears_outlines() {
        let mut world = World::new();
        world.insert_resource(RenderModeState { debug: false });
        let target = world.spawn(Transform::default()).id();
        world.insert_resource(SelectedObjects {
            entities: vec![target],
        });

        let system = world.register_system(update_outline_highlight);
        world.run_system(system).unwrap();
        assert!(world.entity(target).contains::<Outlined>());
        assert!(world.entity(target).contains::<WireframeColor>());

        world.resource_mut::<RenderModeState>().debug = true;
        world.run_system(system).unwrap();
        assert!(!world.entity(target).contains::<Outlined>());
        assert!(!world.entity(target).contains::<Wireframe>());
    }
}
