use std::time::Duration;

use bevy::prelude::*;
use constants::card::{PORTRAIT_QUALITY, PORTRAIT_WIDTH, REACTIVATE_DELAY_SECS};

use crate::cards::card::CardId;
use crate::cards::compress::compress_image;
use crate::cards::manager::{CardEvent, CardManager};
use crate::engine::assets::scene_settings::SceneSettings;
use crate::engine::signals::InteractionSignal;
use crate::ui::surface::{CardEditorSurface, EditorInbox, EditorMessage};
use crate::ui::template::{TemplateError, request_template};

/// Opens the editor on a card. Opening while it is already open switches
/// the open modal to that card.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenCardEditor {
    pub card: CardId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorState {
    #[default]
    Hidden,
    /// Waiting for the template.
    Loading { card: CardId },
    Visible { card: CardId },
}

/// What `show` needs the caller to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShowStep {
    Fetch(String),
    Mount(String),
    Rerender,
    Wait,
}

#[derive(Resource)]
pub struct CardEditor {
    state: EditorState,
    template_url: String,
    develop: bool,
    cached_template: Option<String>,
    fields_bound: bool,
    reactivate: Option<Timer>,
    inbox: EditorInbox,
}

impl Default for CardEditor {
    fn default() -> Self {
        let settings = SceneSettings::default();
        Self::new(
            settings.card_template.source_url(),
            settings.card_template.develop,
        )
    }
}

impl CardEditor {
    pub fn new(template_url: impl Into<String>, develop: bool) -> Self {
        Self {
            state: EditorState::Hidden,
            template_url: template_url.into(),
            develop,
            cached_template: None,
            fields_bound: false,
            reactivate: None,
            inbox: EditorInbox::default(),
        }
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn inbox(&self) -> &EditorInbox {
        &self.inbox
    }

    pub fn is_hidden(&self) -> bool {
        self.state == EditorState::Hidden
    }

    pub fn visible_card(&self) -> Option<CardId> {
        match self.state {
            EditorState::Visible { card } => Some(card),
            _ => None,
        }
    }

    /// Points the editor at another template source and drops the cache.
    pub fn set_template_source(&mut self, url: impl Into<String>, develop: bool) {
        self.template_url = url.into();
        self.develop = develop;
        self.cached_template = None;
    }

    pub fn show(&mut self, card: CardId) -> ShowStep {
        match self.state {
            EditorState::Visible { .. } => {
                self.state = EditorState::Visible { card };
                ShowStep::Rerender
            }
            EditorState::Loading { .. } => {
                self.state = EditorState::Loading { card };
                ShowStep::Wait
            }
            EditorState::Hidden => {
                self.reactivate = None;
                match (&self.cached_template, self.develop) {
                    (Some(template), false) => {
                        self.state = EditorState::Visible { card };
                        self.fields_bound = false;
                        ShowStep::Mount(template.clone())
                    }
                    _ => {
                        self.state = EditorState::Loading { card };
                        ShowStep::Fetch(self.template_url.clone())
                    }
                }
            }
        }
    }

    /// Returns the template to mount, or `None` when nothing is waiting for
    /// it or the fetch failed.
    pub fn template_loaded(&mut self, result: Result<String, TemplateError>) -> Option<String> {
        let EditorState::Loading { card } = self.state else {
            return None;
        };

        match result {
            Ok(template) => {
                if !self.develop {
                    self.cached_template = Some(template.clone());
                }
                self.state = EditorState::Visible { card };
                self.fields_bound = false;
                Some(template)
            }
            Err(err) => {
                error!("Card template unavailable: {}", err);
                self.hide();
                None
            }
        }
    }

    /// Returns true when the editor was showing and must be unmounted.
    pub fn hide(&mut self) -> bool {
        if self.is_hidden() {
            return false;
        }
        self.state = EditorState::Hidden;
        self.fields_bound = false;
        self.reactivate = Some(Timer::from_seconds(
            REACTIVATE_DELAY_SECS,
            TimerMode::Once,
        ));
        true
    }

    /// Advances the reactivation delay. True once, when it runs out.
    pub fn tick(&mut self, delta: Duration) -> bool {
        let Some(timer) = self.reactivate.as_mut() else {
            return false;
        };
        if timer.tick(delta).finished() {
            self.reactivate = None;
            true
        } else {
            false
        }
    }
}

fn mount_and_render(
    editor: &mut CardEditor,
    surface: &mut CardEditorSurface,
    manager: &CardManager,
    template: &str,
) {
    let Some(card) = editor.visible_card().and_then(|id| manager.get(id)) else {
        editor.hide();
        return;
    };

    let mounted = surface.0.mount(template).and_then(|()| {
        if !editor.fields_bound {
            surface.0.bind_fields(&editor.inbox)?;
            editor.fields_bound = true;
        }
        surface.0.render(&card.view())
    });

    if let Err(err) = mounted {
        error!("Failed to show card editor: {}", err);
        surface.0.unmount();
        editor.hide();
    }
}

fn rerender(editor: &CardEditor, surface: &mut CardEditorSurface, manager: &CardManager) {
    let Some(card) = editor.visible_card().and_then(|id| manager.get(id)) else {
        return;
    };
    if let Err(err) = surface.0.render(&card.view()) {
        warn!("Failed to refresh card editor: {}", err);
    }
}

pub fn configure_card_editor(settings: Res<SceneSettings>, mut editor: ResMut<CardEditor>) {
    editor.set_template_source(
        settings.card_template.source_url(),
        settings.card_template.develop,
    );
}

pub fn open_card_editor(
    mut requests: EventReader<OpenCardEditor>,
    mut editor: ResMut<CardEditor>,
    mut surface: NonSendMut<CardEditorSurface>,
    manager: Res<CardManager>,
    mut signals: EventWriter<InteractionSignal>,
) {
    for request in requests.read() {
        if manager.get(request.card).is_none() {
            warn!("Cannot edit unknown card {:?}", request.card);
            continue;
        }

        if editor.is_hidden() {
            signals.write(InteractionSignal::Deactivate);
        }

        match editor.show(request.card) {
            ShowStep::Fetch(url) => {
                info!("→ Fetching card template from {}", url);
                request_template(&url, &editor.inbox);
            }
            ShowStep::Mount(template) => {
                mount_and_render(&mut editor, &mut surface, &manager, &template);
            }
            ShowStep::Rerender => rerender(&editor, &mut surface, &manager),
            ShowStep::Wait => {}
        }
    }
}

/// Applies everything the surface queued since the last frame.
pub fn process_editor_messages(
    mut editor: ResMut<CardEditor>,
    mut surface: NonSendMut<CardEditorSurface>,
    mut manager: ResMut<CardManager>,
    mut card_events: EventWriter<CardEvent>,
) {
    let messages = editor.inbox.drain();
    for message in messages {
        if let EditorMessage::TemplateLoaded(result) = message {
            if let Some(template) = editor.template_loaded(result) {
                mount_and_render(&mut editor, &mut surface, &manager, &template);
            }
            continue;
        }

        let Some(id) = editor.visible_card() else {
            continue;
        };

        match message {
            EditorMessage::NameChanged(name) => {
                if let Some(card) = manager.get_mut(id) {
                    card.update_name(name);
                    card_events.write(CardEvent::Changed(id));
                }
            }
            EditorMessage::ModifierChanged(value) => match value.trim().parse::<i32>() {
                Ok(modifier) => {
                    if let Some(card) = manager.get_mut(id) {
                        card.update_modifier(modifier);
                        card_events.write(CardEvent::Changed(id));
                    }
                }
                Err(_) => warn!("Ignoring modifier '{}'", value),
            },
            EditorMessage::ImageSelected(bytes) => {
                match compress_image(&bytes, PORTRAIT_WIDTH, PORTRAIT_QUALITY) {
                    Ok(src) => {
                        if let Some(card) = manager.get_mut(id) {
                            card.set_picture(src);
                            card_events.write(CardEvent::Changed(id));
                        }
                    }
                    Err(err) => warn!("Portrait rejected: {}", err),
                }
            }
            EditorMessage::CloseRequested => {
                if editor.hide() {
                    surface.0.unmount();
                }
            }
            EditorMessage::DeleteRequested => {
                if manager.remove(id).is_some() {
                    card_events.write(CardEvent::Removed(id));
                }
                if editor.hide() {
                    surface.0.unmount();
                }
            }
            EditorMessage::TemplateLoaded(_) => {}
        }
    }
}

/// Keeps the open editor in step with changes made elsewhere, such as
/// rolls recorded over RPC.
pub fn follow_card_events(
    mut events: EventReader<CardEvent>,
    mut editor: ResMut<CardEditor>,
    mut surface: NonSendMut<CardEditorSurface>,
    manager: Res<CardManager>,
) {
    for event in events.read() {
        match *event {
            CardEvent::Changed(id) if editor.visible_card() == Some(id) => {
                rerender(&editor, &mut surface, &manager);
            }
            CardEvent::Removed(id)
                if editor.visible_card() == Some(id)
                    || matches!(editor.state(), EditorState::Loading { card } if card == id) =>
            {
                if editor.hide() {
                    surface.0.unmount();
                }
            }
            _ => {}
        }
    }
}

pub fn tick_editor_reactivation(
    time: Res<Time>,
    mut editor: ResMut<CardEditor>,
    mut signals: EventWriter<InteractionSignal>,
) {
    if editor.tick(time.delta()) {
        signals.write(InteractionSignal::Activate);
    }
}

pub fn close_card_editor_surface(mut surface: NonSendMut<CardEditorSurface>) {
    surface.0.unmount();
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::cards::card::CardView;
    use crate::ui::surface::{EditorSurface, SurfaceError};
    use constants::card::TEMPLATE_LOCAL_PATH;

    #[derive(Default, Clone)]
    struct Calls(Arc<Mutex<Vec<String>>>);

    impl Calls {
        fn count(&self, name: &str) -> usize {
            self.0
                .lock()
                .unwrap()
                .iter()
                .filter(|call| call.starts_with(name))
                .count()
        }

        fn last_render(&self) -> Option<String> {
            self.0
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find(|call| call.starts_with("render"))
                .cloned()
        }
    }

    struct RecordingSurface {
        calls: Calls,
        mounted: bool,
    }

    impl EditorSurface for RecordingSurface {
        fn mount(&mut self, _template: &str) -> Result<(), SurfaceError> {
            self.mounted = true;
            self.calls.0.lock().unwrap().push("mount".into());
            Ok(())
        }

        fn bind_fields(&mut self, _inbox: &EditorInbox) -> Result<(), SurfaceError> {
            self.calls.0.lock().unwrap().push("bind".into());
            Ok(())
        }

        fn render(&mut self, card: &CardView) -> Result<(), SurfaceError> {
            self.calls
                .0
                .lock()
                .unwrap()
                .push(format!("render {} {} {}", card.name, card.modifier, card.roll));
            Ok(())
        }

        fn unmount(&mut self) {
            if self.mounted {
                self.calls.0.lock().unwrap().push("unmount".into());
            }
            self.mounted = false;
        }

        fn is_mounted(&self) -> bool {
            self.mounted
        }
    }

    fn editor_app(develop: bool) -> (App, Calls, CardId) {
        let calls = Calls::default();
        let mut manager = CardManager::default();
        let card = manager.add("Rogue", 4);

        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(manager)
            .insert_resource(CardEditor::new(TEMPLATE_LOCAL_PATH, develop))
            .insert_non_send_resource(CardEditorSurface(Box::new(RecordingSurface {
                calls: calls.clone(),
                mounted: false,
            })))
            .add_event::<OpenCardEditor>()
            .add_event::<CardEvent>()
            .add_event::<InteractionSignal>()
            .add_systems(
                Update,
                (open_card_editor, process_editor_messages, follow_card_events).chain(),
            );
        (app, calls, card)
    }

    fn signals(app: &App) -> Vec<InteractionSignal> {
        let events = app.world().resource::<Events<InteractionSignal>>();
        events.get_cursor().read(events).copied().collect()
    }

    #[test]
    fn showing_twice_binds_fields_once() {
        let (mut app, calls, card) = editor_app(true);

        app.world_mut().send_event(OpenCardEditor { card });
        app.update();
        app.world_mut().send_event(OpenCardEditor { card });
        app.update();

        assert_eq!(calls.count("mount"), 1);
        assert_eq!(calls.count("bind"), 1);
        assert_eq!(calls.count("render"), 2);
        assert_eq!(signals(&app), vec![InteractionSignal::Deactivate]);
        assert_eq!(
            app.world().resource::<CardEditor>().state(),
            EditorState::Visible { card }
        );
    }

    #[test]
    fn field_changes_write_through_to_the_card() {
        let (mut app, calls, card) = editor_app(true);
        app.world_mut().send_event(OpenCardEditor { card });
        app.update();

        let inbox = app.world().resource::<CardEditor>().inbox().clone();
        inbox.push(EditorMessage::NameChanged("Thief".into()));
        inbox.push(EditorMessage::ModifierChanged(" -1 ".into()));
        inbox.push(EditorMessage::ModifierChanged("lots".into()));
        app.update();

        let manager = app.world().resource::<CardManager>();
        let stored = manager.get(card).unwrap();
        assert_eq!(stored.name, "Thief");
        assert_eq!(stored.modifier, -1);
        assert_eq!(calls.last_render().as_deref(), Some("render Thief -1 1"));
    }

    #[test]
    fn delete_removes_the_card_and_hides() {
        let (mut app, calls, card) = editor_app(true);
        app.world_mut().send_event(OpenCardEditor { card });
        app.update();

        let inbox = app.world().resource::<CardEditor>().inbox().clone();
        inbox.push(EditorMessage::DeleteRequested);
        app.update();

        assert!(app.world().resource::<CardManager>().is_empty());
        assert!(app.world().resource::<CardEditor>().is_hidden());
        assert_eq!(calls.count("unmount"), 1);
    }

    #[test]
    fn production_template_is_fetched_once() {
        let mut editor = CardEditor::new("https://example.com/card.html", false);
        let card = CardId(0);

        assert_eq!(
            editor.show(card),
            ShowStep::Fetch("https://example.com/card.html".into())
        );
        assert_eq!(
            editor.template_loaded(Ok("<div></div>".into())).as_deref(),
            Some("<div></div>")
        );
        assert!(editor.hide());
        assert_eq!(editor.show(card), ShowStep::Mount("<div></div>".into()));
    }

    #[test]
    fn develop_template_is_fetched_every_show() {
        let mut editor = CardEditor::new(TEMPLATE_LOCAL_PATH, true);
        let card = CardId(0);

        editor.show(card);
        editor.template_loaded(Ok("<div></div>".into()));
        editor.hide();
        assert_eq!(editor.show(card), ShowStep::Fetch(TEMPLATE_LOCAL_PATH.into()));
    }

    #[test]
    fn failed_fetch_hides_and_schedules_reactivation() {
        let mut editor = CardEditor::new(TEMPLATE_LOCAL_PATH, true);
        editor.show(CardId(2));

        let failed = editor.template_loaded(Err(TemplateError::Status(404)));
        assert!(failed.is_none());
        assert!(editor.is_hidden());
        assert!(editor.tick(Duration::from_secs(1)));
    }

    #[test]
    fn reactivation_waits_for_the_delay() {
        let mut editor = CardEditor::new(TEMPLATE_LOCAL_PATH, true);
        editor.show(CardId(0));
        editor.template_loaded(Ok(String::new()));
        assert!(editor.hide());
        assert!(!editor.hide());

        assert!(!editor.tick(Duration::from_millis(499)));
        assert!(editor.tick(Duration::from_millis(1)));
        assert!(!editor.tick(Duration::from_secs(5)));
    }

    #[test]
    fn showing_again_cancels_pending_reactivation() {
        let mut editor = CardEditor::new(TEMPLATE_LOCAL_PATH, true);
        editor.show(CardId(0));
        editor.template_loaded(Ok(String::new()));
        editor.hide();
        editor.show(CardId(0));

        assert!(!editor.tick(Duration::from_secs(1)));
    }
}
