/// Template fetched while developing locally, relative to the page.
pub const TEMPLATE_LOCAL_PATH: &str = "templates/card.html";

/// Template fetched in production builds.
pub const TEMPLATE_REMOTE_URL: &str =
    "https://raw.githubusercontent.com/Roll-for-Initiative/roll-v2/refs/heads/main/templates/card.html";

/// Re-fetch the template on every show instead of caching it.
pub const TEMPLATE_DEVELOP: bool = true;

/// Classes on the editor's root element. `modal` picks up the page's
/// modal styles.
pub const EDITOR_ROOT_CLASSES: &str = "modal card-editor";

/// Delay between hiding the editor and reactivating scene interaction.
pub const REACTIVATE_DELAY_SECS: f32 = 0.5;

/// Width portraits are recompressed to before being stored on a card.
pub const PORTRAIT_WIDTH: u32 = 140;

/// JPEG quality used for recompressed portraits.
pub const PORTRAIT_QUALITY: u8 = 80;

/// Shown in the re-roll field when a card has not been re-rolled.
pub const REROLL_SENTINEL: &str = "x";

/// Faces on the initiative die.
pub const DIE_FACES: i32 = 20;

/// Card marker layout in the card view.
pub const CARD_SIZE: (f32, f32, f32) = (1.5, 2.0, 0.05);
pub const CARD_SPACING: f32 = 1.8;
pub const CARD_ROW_HEIGHT: f32 = 6.0;
