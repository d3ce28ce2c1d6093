use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::math::EulerRot;
use bevy::prelude::*;
use constants::camera::{
    CARD_VIEW_POSITION, CARD_VIEW_TARGET, INITIAL_POSITION, INITIAL_TARGET, ORBIT_MAX_DISTANCE,
    ORBIT_MIN_DISTANCE, ORBIT_PITCH_SENSITIVITY, ORBIT_YAW_SENSITIVITY, ORBIT_ZOOM_SENSITIVITY,
    ROLL_VIEW_POSITION, ROLL_VIEW_TARGET, TRANSITION_EPSILON, TRANSITION_SPEED,
};

const PITCH_LIMIT: f32 = 1.55;

#[derive(Component)]
pub struct MainCamera;

/// Named camera placements reachable from the page and the keyboard.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraPreset {
    RollView,
    CardView,
}

impl CameraPreset {
    pub fn placement(self) -> (Vec3, Vec3) {
        match self {
            CameraPreset::RollView => (ROLL_VIEW_POSITION, ROLL_VIEW_TARGET),
            CameraPreset::CardView => (CARD_VIEW_POSITION, CARD_VIEW_TARGET),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    position: Vec3,
    target: Vec3,
}

/// Orbit state around a target point. Yaw and pitch describe the direction
/// from the target to the camera.
#[derive(Resource, Debug, Clone)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    transition: Option<Transition>,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::looking(INITIAL_POSITION, INITIAL_TARGET)
    }
}

impl OrbitCamera {
    pub fn looking(position: Vec3, target: Vec3) -> Self {
        let mut camera = Self {
            target,
            yaw: 0.0,
            pitch: 0.0,
            distance: ORBIT_MIN_DISTANCE,
            transition: None,
        };
        camera.set_look(position, target);
        camera
    }

    fn set_look(&mut self, position: Vec3, target: Vec3) {
        let offset = position - target;
        let distance = offset.length();
        self.target = target;
        if distance <= f32::EPSILON {
            return;
        }
        self.distance = distance;
        self.pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
        if offset.x.abs() > f32::EPSILON || offset.z.abs() > f32::EPSILON {
            self.yaw = offset.x.atan2(offset.z);
        }
    }

    pub fn position(&self) -> Vec3 {
        let horizontal = self.distance * self.pitch.cos();
        self.target
            + Vec3::new(
                horizontal * self.yaw.sin(),
                self.distance * self.pitch.sin(),
                horizontal * self.yaw.cos(),
            )
    }

    pub fn transform(&self) -> Transform {
        Transform {
            translation: self.position(),
            rotation: Quat::from_euler(EulerRot::YXZ, self.yaw, -self.pitch, 0.0),
            ..default()
        }
    }

    /// Starts an interpolated move to `position`, looking at `target`.
    pub fn set_target_position(&mut self, position: Vec3, target: Vec3) {
        self.transition = Some(Transition { position, target });
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Moves toward the pending transition goal. Snaps onto the goal once
    /// both the eye and the target are within epsilon.
    pub fn interpolate(&mut self, delta: f32) {
        let Some(goal) = self.transition else {
            return;
        };

        let t = (TRANSITION_SPEED * delta).clamp(0.0, 1.0);
        let position = self.position().lerp(goal.position, t);
        let target = self.target.lerp(goal.target, t);

        if position.distance(goal.position) < TRANSITION_EPSILON
            && target.distance(goal.target) < TRANSITION_EPSILON
        {
            self.set_look(goal.position, goal.target);
            self.transition = None;
        } else {
            self.set_look(position, target);
        }
    }

    /// Applies user orbit input. Cancels any running transition.
    pub fn apply_orbit(&mut self, drag: Vec2, zoom: f32) {
        if drag != Vec2::ZERO {
            self.transition = None;
            self.yaw -= drag.x * ORBIT_YAW_SENSITIVITY;
            self.pitch = (self.pitch + drag.y * ORBIT_PITCH_SENSITIVITY)
                .clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }
        if zoom.abs() > f32::EPSILON {
            self.transition = None;
            self.distance = (self.distance * (1.0 - zoom * ORBIT_ZOOM_SENSITIVITY))
                .clamp(ORBIT_MIN_DISTANCE, ORBIT_MAX_DISTANCE);
        }
    }
}

pub fn spawn_main_camera(mut commands: Commands, orbit: Res<OrbitCamera>) {
    commands.spawn((
        Camera3d::default(),
        Tonemapping::AcesFitted,
        orbit.transform(),
        MainCamera,
    ));
}

pub fn orbit_camera_controls(
    mut orbit: ResMut<OrbitCamera>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
) {
    let mouse_delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();
    let drag = if mouse_button.pressed(MouseButton::Right) {
        mouse_delta
    } else {
        Vec2::ZERO
    };

    let zoom: f32 = scroll_events
        .read()
        .map(|ev| match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y * 0.05,
        })
        .sum();

    orbit.apply_orbit(drag, zoom);
}

pub fn apply_camera_presets(
    mut presets: EventReader<CameraPreset>,
    mut orbit: ResMut<OrbitCamera>,
) {
    for preset in presets.read() {
        let (position, target) = preset.placement();
        info!("Camera moving to {:?}", preset);
        orbit.set_target_position(position, target);
    }
}

/// Interpolates any running transition and writes the main camera transform.
pub fn update_camera_transform(
    time: Res<Time>,
    mut orbit: ResMut<OrbitCamera>,
    mut cameras: Query<&mut Transform, With<MainCamera>>,
) {
    orbit.interpolate(time.delta_secs());
    let Ok(mut transform) = cameras.single_mut() else {
        return;
    };
    *transform = orbit.transform();
}

/// Keyboard presets on native builds: R for the roll view, C for the card view.
pub fn camera_preset_shortcuts(
    #[cfg(not(target_arch = "wasm32"))] keyboard: Res<ButtonInput<KeyCode>>,
    #[cfg(not(target_arch = "wasm32"))] mut presets: EventWriter<CameraPreset>,
) {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if keyboard.just_pressed(KeyCode::KeyR) {
            presets.write(CameraPreset::RollView);
        }
        if keyboard.just_pressed(KeyCode::KeyC) {
            presets.write(CameraPreset::CardView);
        }
    }
}
