use bevy::prelude::*;
use constants::card::{TEMPLATE_DEVELOP, TEMPLATE_LOCAL_PATH, TEMPLATE_REMOTE_URL};
use constants::effects::{
    FIRE_HEIGHT, FIRE_PARTICLE_COUNT, FIRE_RADIUS, FIRE_RISE_SPEED, LIGHTNING_DECAY,
    LIGHTNING_PEAK_INTENSITY, LIGHTNING_SEGMENTS, LIGHTNING_STRIKE_CHANCE, RAIN_COUNT,
};
use constants::render_settings::{DEBUG_RENDERING, FRAME_INTERVAL};
use serde::{Deserialize, Serialize};

/// Scene configuration as a Bevy asset. Mirrors `scene_settings.json`;
/// missing fields take their defaults.
#[derive(Asset, Debug, Clone, Serialize, Deserialize, TypePath, Resource)]
#[serde(default)]
pub struct SceneSettings {
    /// Render straight to screen, bypassing post-processing.
    pub debug: bool,
    pub frame_interval: f32,
    /// Mirror physics shapes into debug meshes.
    pub physics_debug: bool,
    /// Seed for every effect's random source.
    pub seed: u64,
    pub rain: RainSettings,
    pub lightning: LightningSettings,
    pub fire: FireSettings,
    pub card_template: CardTemplateSettings,
    /// Font used for card labels. Bevy's default font when absent.
    pub font: Option<String>,
    pub text_colour: String,
    /// Texture applied to the ground plane.
    pub ground_texture: Option<String>,
    /// Extra page modules injected at startup (web only).
    pub page_scripts: Vec<String>,
    pub actors: Vec<ActorSpec>,
    pub cards: Vec<CardSpec>,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            debug: DEBUG_RENDERING,
            frame_interval: FRAME_INTERVAL,
            physics_debug: false,
            seed: 0x5EED,
            rain: RainSettings::default(),
            lightning: LightningSettings::default(),
            fire: FireSettings::default(),
            card_template: CardTemplateSettings::default(),
            font: None,
            text_colour: "0xffffff".to_string(),
            ground_texture: None,
            page_scripts: Vec::new(),
            actors: vec![
                ActorSpec {
                    kind: ActorKind::Wall,
                    name: "wall".to_string(),
                    order: 1,
                    position: [0.0, 0.0, 4.0],
                    scale: [3.0, 3.0, 3.0],
                    model: None,
                },
                ActorSpec {
                    kind: ActorKind::Die,
                    name: "d20".to_string(),
                    order: 2,
                    position: [0.0, 6.0, -7.0],
                    scale: [1.0, 1.0, 1.0],
                    model: None,
                },
            ],
            cards: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RainSettings {
    pub enabled: bool,
    pub count: usize,
    pub order: i32,
}

impl Default for RainSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            count: RAIN_COUNT,
            order: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LightningSettings {
    pub enabled: bool,
    pub order: i32,
    pub peak_intensity: f32,
    pub decay: f32,
    pub strike_chance: f32,
    pub segments: usize,
}

impl Default for LightningSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            order: 9,
            peak_intensity: LIGHTNING_PEAK_INTENSITY,
            decay: LIGHTNING_DECAY,
            strike_chance: LIGHTNING_STRIKE_CHANCE,
            segments: LIGHTNING_SEGMENTS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FireSettings {
    pub radius: f32,
    pub height: f32,
    pub particle_count: usize,
    pub rise_speed: f32,
}

impl Default for FireSettings {
    fn default() -> Self {
        Self {
            radius: FIRE_RADIUS,
            height: FIRE_HEIGHT,
            particle_count: FIRE_PARTICLE_COUNT,
            rise_speed: FIRE_RISE_SPEED,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CardTemplateSettings {
    /// Re-fetch the local template on every show.
    pub develop: bool,
    pub local_path: String,
    pub remote_url: String,
}

impl Default for CardTemplateSettings {
    fn default() -> Self {
        Self {
            develop: TEMPLATE_DEVELOP,
            local_path: TEMPLATE_LOCAL_PATH.to_string(),
            remote_url: TEMPLATE_REMOTE_URL.to_string(),
        }
    }
}

impl CardTemplateSettings {
    pub fn source_url(&self) -> &str {
        if self.develop {
            &self.local_path
        } else {
            &self.remote_url
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    Wall,
    Brazier,
    Die,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorSpec {
    pub kind: ActorKind,
    pub name: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub position: [f32; 3],
    #[serde(default = "unit_scale")]
    pub scale: [f32; 3],
    /// glTF model; actors without one use a built-in mesh.
    #[serde(default)]
    pub model: Option<String>,
}

fn unit_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardSpec {
    pub name: String,
    #[serde(default)]
    pub modifier: i32,
    #[serde(default)]
    pub image_src: Option<String>,
}
