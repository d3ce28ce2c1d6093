use bevy::prelude::*;

use crate::engine::assets::scene_settings::SceneSettings;

pub const LABEL_FONT_SIZE: f32 = 18.0;

/// Font and colour shared by every scene label.
#[derive(Resource, Clone, Default)]
pub struct LabelStyle {
    pub font: TextFont,
    pub colour: TextColor,
}

/// Parses colours written as `0xffffff`, `#ffffff` or `ffffff`.
pub fn parse_hex_colour(value: &str) -> Option<Color> {
    let hex = value.trim();
    let hex = hex
        .strip_prefix("0x")
        .or_else(|| hex.strip_prefix('#'))
        .unwrap_or(hex);
    Srgba::hex(hex).ok().map(Color::from)
}

pub fn load_label_style(
    mut commands: Commands,
    settings: Res<SceneSettings>,
    asset_server: Res<AssetServer>,
) {
    let font = settings
        .font
        .as_deref()
        .map(|path| asset_server.load(path.to_string()))
        .unwrap_or_default();

    let colour = parse_hex_colour(&settings.text_colour).unwrap_or_else(|| {
        warn!("Invalid text colour '{}', using white", settings.text_colour);
        Color::WHITE
    });

    commands.insert_resource(LabelStyle {
        font: TextFont {
            font,
            font_size: LABEL_FONT_SIZE,
            ..default()
        },
        colour: TextColor(colour),
    });
}

/// Spawns an absolutely positioned text node. Callers move it by writing
/// the node's `left`/`top`.
pub fn spawn_text(commands: &mut Commands, style: &LabelStyle, text: impl Into<String>) -> Entity {
    commands
        .spawn((
            Text::new(text),
            style.font.clone(),
            style.colour,
            Node {
                position_type: PositionType::Absolute,
                ..default()
            },
        ))
        .id()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colours_accept_all_prefixes() {
        let white = Color::from(Srgba::WHITE);
        assert_eq!(parse_hex_colour("0xffffff"), Some(white));
        assert_eq!(parse_hex_colour("#ffffff"), Some(white));
        assert_eq!(parse_hex_colour("ffffff"), Some(white));
    }

    #[test]
    fn invalid_colour_is_rejected() {
        assert_eq!(parse_hex_colour("0xnothex"), None);
    }
}
