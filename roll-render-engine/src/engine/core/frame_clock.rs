use bevy::prelude::*;
use constants::render_settings::FRAME_INTERVAL;

use crate::engine::assets::scene_settings::SceneSettings;
use crate::engine::core::app_state::AppState;

/// Accumulates wall-clock delta and reports when a render tick is due.
///
/// The accumulator keeps its remainder after a tick, so a long stall
/// produces one tick followed by a catch-up on the next frames rather
/// than a burst of ticks in the same frame.
#[derive(Resource, Debug, Clone)]
pub struct FrameClock {
    accumulated: f32,
    interval: f32,
    ready: bool,
    ticks: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(FRAME_INTERVAL)
    }
}

impl FrameClock {
    pub fn new(interval: f32) -> Self {
        Self {
            accumulated: 0.0,
            interval: interval.max(f32::EPSILON),
            ready: false,
            ticks: 0,
        }
    }

    /// Adds `delta` seconds. Returns true when the accumulator has passed
    /// one interval, in which case exactly one interval is consumed.
    pub fn advance(&mut self, delta: f32) -> bool {
        self.accumulated += delta.max(0.0);
        self.ready = self.accumulated > self.interval;
        if self.ready {
            self.accumulated -= self.interval;
            self.ticks += 1;
        }
        self.ready
    }

    pub fn set_interval(&mut self, interval: f32) {
        self.interval = interval.max(f32::EPSILON);
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    pub fn accumulated(&self) -> f32 {
        self.accumulated
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

/// Ordering of the per-frame work. Everything up to `Present` only runs on
/// a render tick; `Continuous` and `Ui` run every frame.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSet {
    Clock,
    RenderActions,
    Highlight,
    Controls,
    Raycast,
    Present,
    Continuous,
    Ui,
}

pub struct FrameClockPlugin;

impl Plugin for FrameClockPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FrameClock>()
            .configure_sets(
                Update,
                (
                    FrameSet::Clock,
                    FrameSet::RenderActions,
                    FrameSet::Highlight,
                    FrameSet::Controls,
                    FrameSet::Raycast,
                    FrameSet::Present,
                    FrameSet::Continuous,
                    FrameSet::Ui,
                )
                    .chain()
                    .run_if(in_state(AppState::Running)),
            )
            .configure_sets(
                Update,
                (
                    FrameSet::RenderActions,
                    FrameSet::Highlight,
                    FrameSet::Controls,
                    FrameSet::Raycast,
                    FrameSet::Present,
                )
                    .run_if(frame_tick_ready),
            )
            .add_systems(Update, advance_frame_clock.in_set(FrameSet::Clock));
    }
}

pub fn advance_frame_clock(time: Res<Time>, mut clock: ResMut<FrameClock>) {
    clock.advance(time.delta_secs());
}

pub fn frame_tick_ready(clock: Res<FrameClock>) -> bool {
    clock.is_ready()
}

pub fn apply_frame_interval_setting(settings: Res<SceneSettings>, mut clock: ResMut<FrameClock>) {
    if settings.frame_interval > 0.0 {
        clock.set_interval(settings.frame_interval);
    } else {
        warn!(
            "Ignoring frame interval {}, keeping {}",
            settings.frame_interval,
            clock.interval()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_fires_only_after_interval_is_exceeded() {
        let mut clock = FrameClock::new(0.1);

        assert!(!clock.advance(0.05));
        assert!(!clock.advance(0.05));
        assert!(clock.advance(0.01));
        assert_eq!(clock.ticks(), 1);
    }

    #[test]
    fn remainder_is_kept_after_a_tick() {
        let mut clock = FrameClock::new(0.1);

        assert!(clock.advance(0.25));
        assert!((clock.accumulated() - 0.15).abs() < 1e-5);

        // The leftover still exceeds one interval, so the next frame ticks
        // even with no new time.
        assert!(clock.advance(0.0));
        assert!(clock.accumulated() < 0.1);
        assert!(!clock.advance(0.0));
    }

    #[test]
    fn accumulator_stays_below_two_intervals_at_steady_rate() {
        let mut clock = FrameClock::new(1.0 / 60.0);
        for _ in 0..1000 {
            clock.advance(1.0 / 144.0);
            assert!(clock.accumulated() < 2.0 * clock.interval());
        }
        assert!(clock.ticks() > 0);
    }

    #[derive(Resource, Default)]
    struct Runs {
        gated: u32,
        continuous: u32,
    }

    fn count_gated(mut runs: ResMut<Runs>) {
        runs.gated += 1;
    }

    fn count_continuous(mut runs: ResMut<Runs>) {
        runs.continuous += 1;
    }

    #[test]
    fn gated_sets_run_on_ticks_and_continuous_every_frame() {
        use bevy::state::app::StatesPlugin;
        use bevy::time::TimeUpdateStrategy;
        use std::time::Duration;

        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin))
            .insert_state(AppState::Running)
            .add_plugins(FrameClockPlugin)
            .insert_resource(FrameClock::new(1.0 / 60.0))
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
                1.0 / 144.0,
            )))
            .init_resource::<Runs>()
            .add_systems(Update, count_gated.in_set(FrameSet::RenderActions))
            .add_systems(Update, count_gated.in_set(FrameSet::Present))
            .add_systems(Update, count_continuous.in_set(FrameSet::Continuous));

        for _ in 0..144 {
            app.update();
        }

        let runs = app.world().resource::<Runs>();
        let ticks = app.world().resource::<FrameClock>().ticks() as u32;
        assert_eq!(runs.continuous, 144);
        assert_eq!(runs.gated, 2 * ticks);
        assert!((55..=60).contains(&ticks));
    }

    #[test]
    fn nothing_runs_while_loading() {
        use bevy::state::app::StatesPlugin;

        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin))
            .init_state::<AppState>()
            .add_plugins(FrameClockPlugin)
            .init_resource::<Runs>()
            .add_systems(Update, count_continuous.in_set(FrameSet::Continuous));

        for _ in 0..10 {
            app.update();
        }

        assert_eq!(app.world().resource::<Runs>().continuous, 0);
        assert_eq!(app.world().resource::<FrameClock>().ticks(), 0);
    }

    #[test]
    fn negative_delta_is_ignored() {
        let mut clock = FrameClock::new(0.1);
        clock.advance(-5.0);
        assert_eq!(clock.accumulated(), 0.0);
    }
}
