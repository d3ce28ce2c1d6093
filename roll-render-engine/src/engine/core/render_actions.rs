use bevy::ecs::system::SystemId;
use bevy::prelude::*;

/// A named per-frame callback. Lower `order` runs first; actions with the
/// same order run in registration order.
#[derive(Debug, Clone)]
pub struct RenderAction {
    pub name: String,
    pub order: i32,
    pub system: SystemId,
}

#[derive(Resource, Debug, Default)]
pub struct RenderActions {
    actions: Vec<RenderAction>,
}

impl RenderActions {
    pub fn register(&mut self, name: impl Into<String>, order: i32, system: SystemId) {
        self.actions.push(RenderAction {
            name: name.into(),
            order,
            system,
        });
        // Stable sort keeps ties in insertion order.
        self.actions.sort_by_key(|action| action.order);
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenderAction> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn name_of(&self, system: SystemId) -> Option<&str> {
        self.actions
            .iter()
            .find(|action| action.system == system)
            .map(|action| action.name.as_str())
    }

    fn take(&mut self) -> Vec<RenderAction> {
        std::mem::take(&mut self.actions)
    }
}

/// Registration entry point shared by `World`, `App` and `Commands`.
pub trait RegisterRenderAction {
    fn register_render_action<M: 'static>(
        &mut self,
        name: impl Into<String>,
        order: i32,
        system: impl IntoSystem<(), (), M> + Send + 'static,
    );
}

impl RegisterRenderAction for World {
    fn register_render_action<M: 'static>(
        &mut self,
        name: impl Into<String>,
        order: i32,
        system: impl IntoSystem<(), (), M> + Send + 'static,
    ) {
        let name = name.into();
        let id = self.register_system(system);
        debug!("Render action registered: {} (order {})", name, order);
        self.get_resource_or_insert_with(RenderActions::default)
            .register(name, order, id);
    }
}

impl RegisterRenderAction for App {
    fn register_render_action<M: 'static>(
        &mut self,
        name: impl Into<String>,
        order: i32,
        system: impl IntoSystem<(), (), M> + Send + 'static,
    ) {
        self.world_mut().register_render_action(name, order, system);
    }
}

impl RegisterRenderAction for Commands<'_, '_> {
    fn register_render_action<M: 'static>(
        &mut self,
        name: impl Into<String>,
        order: i32,
        system: impl IntoSystem<(), (), M> + Send + 'static,
    ) {
        let name = name.into();
        self.queue(move |world: &mut World| {
            world.register_render_action(name, order, system);
        });
    }
}

/// Runs every registered action once, in order. Actions registered while
/// this runs are picked up on the next tick.
pub fn run_render_actions(world: &mut World) {
    let systems: Vec<SystemId> = match world.get_resource::<RenderActions>() {
        Some(actions) => actions.iter().map(|action| action.system).collect(),
        None => return,
    };

    for system in systems {
        if let Err(err) = world.run_system(system) {
            let name = world
                .get_resource::<RenderActions>()
                .and_then(|actions| actions.name_of(system))
                .unwrap_or("<unknown>")
                .to_owned();
            warn!("Render action '{}' failed: {}", name, err);
        }
    }
}

/// Unregisters every action's system and empties the registry.
pub fn release_render_actions(world: &mut World) {
    let actions = match world.get_resource_mut::<RenderActions>() {
        Some(mut actions) => actions.take(),
        None => return,
    };

    for action in actions {
        if let Err(err) = world.unregister_system(action.system) {
            warn!("Could not release render action '{}': {}", action.name, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[derive(Resource, Default)]
    struct Trace(Vec<&'static str>);

    fn world_with_trace() -> World {
        let mut world = World::new();
        world.init_resource::<Trace>();
        world.init_resource::<RenderActions>();
        world
    }

    #[test]
    fn actions_run_in_ascending_order_with_ties_in_insertion_order() {
        let mut world = world_with_trace();
        world.register_render_action("rain", 10, |mut trace: ResMut<Trace>| {
            trace.0.push("rain")
        });
        world.register_render_action("lightning", 9, |mut trace: ResMut<Trace>| {
            trace.0.push("lightning")
        });
        world.register_render_action("fire", 10, |mut trace: ResMut<Trace>| {
            trace.0.push("fire")
        });
        world.register_render_action("early", -1, |mut trace: ResMut<Trace>| {
            trace.0.push("early")
        });

        run_render_actions(&mut world);

        assert_eq!(
            world.resource::<Trace>().0,
            vec!["early", "lightning", "rain", "fire"]
        );
    }

    #[test]
    fn registry_stays_sorted_for_random_orders() {
        let mut world = world_with_trace();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..64 {
            let order = rng.gen_range(-20..20);
            world.register_render_action("noop", order, || {});
        }

        let actions = world.resource::<RenderActions>();
        assert_eq!(actions.len(), 64);
        let orders: Vec<i32> = actions.iter().map(|action| action.order).collect();
        assert!(orders.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn actions_queued_through_commands_register_after_apply() {
        let mut world = world_with_trace();
        let register = world.register_system(|mut commands: Commands| {
            commands.register_render_action("queued", 3, |mut trace: ResMut<Trace>| {
                trace.0.push("queued")
            });
        });
        world.run_system(register).unwrap();

        run_render_actions(&mut world);
        assert_eq!(world.resource::<Trace>().0, vec!["queued"]);
    }

    #[test]
    fn release_empties_registry() {
        let mut world = world_with_trace();
        world.register_render_action("noop", 0, || {});
        release_render_actions(&mut world);

        assert!(world.resource::<RenderActions>().is_empty());
        run_render_actions(&mut world);
        assert!(world.resource::<Trace>().0.is_empty());
    }
}
