use constants::card::EDITOR_ROOT_CLASSES;
use js_sys::Uint8Array;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Element, Event, HtmlImageElement, HtmlInputElement};

use crate::cards::card::CardView;
use crate::ui::surface::{EditorInbox, EditorMessage, EditorSurface, SurfaceError};

const NAME_INPUT: &str = ".card-editor__input-name";
const IMAGE_INPUT: &str = ".card-editor__input-image";
const MODIFIER_INPUT: &str = ".card-editor__modifier";
const IMAGE: &str = ".card-editor__image";
const ROLL: &str = ".card-editor__roll";
const REROLL: &str = ".card-editor__reroll";
const CLOSE: &str = ".card-editor__close";
const DELETE: &str = ".card-editor__delete";

struct Listener {
    target: Element,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

/// Card editor modal injected into the page body.
#[derive(Default)]
pub struct DomSurface {
    root: Option<Element>,
    listeners: Vec<Listener>,
}

fn dom_error(err: JsValue) -> SurfaceError {
    SurfaceError::Dom(format!("{err:?}"))
}

impl DomSurface {
    fn root(&self) -> Result<&Element, SurfaceError> {
        self.root.as_ref().ok_or(SurfaceError::NotMounted)
    }

    fn find(&self, selector: &'static str) -> Result<Element, SurfaceError> {
        self.root()?
            .query_selector(selector)
            .map_err(dom_error)?
            .ok_or(SurfaceError::MissingElement(selector))
    }

    fn input(&self, selector: &'static str) -> Result<HtmlInputElement, SurfaceError> {
        self.find(selector)?
            .dyn_into::<HtmlInputElement>()
            .map_err(|_| SurfaceError::MissingElement(selector))
    }

    fn listen(
        &mut self,
        selector: &'static str,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<(), SurfaceError> {
        let target = self.find(selector)?;
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target
            .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
            .map_err(dom_error)?;
        self.listeners.push(Listener {
            target,
            event,
            callback,
        });
        Ok(())
    }
}

impl EditorSurface for DomSurface {
    fn mount(&mut self, template: &str) -> Result<(), SurfaceError> {
        self.unmount();

        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or(SurfaceError::NoDocument)?;
        let body = document.body().ok_or(SurfaceError::NoDocument)?;

        let root = document.create_element("div").map_err(dom_error)?;
        root.set_class_name(EDITOR_ROOT_CLASSES);
        root.set_inner_html(template);
        body.append_child(&root).map_err(dom_error)?;
        self.root = Some(root);
        Ok(())
    }

    fn bind_fields(&mut self, inbox: &EditorInbox) -> Result<(), SurfaceError> {
        let name = self.input(NAME_INPUT)?;
        let sender = inbox.clone();
        self.listen(NAME_INPUT, "change", move |_| {
            sender.push(EditorMessage::NameChanged(name.value()));
        })?;

        let modifier = self.input(MODIFIER_INPUT)?;
        let sender = inbox.clone();
        self.listen(MODIFIER_INPUT, "change", move |_| {
            sender.push(EditorMessage::ModifierChanged(modifier.value()));
        })?;

        let image = self.input(IMAGE_INPUT)?;
        let sender = inbox.clone();
        self.listen(IMAGE_INPUT, "change", move |_| {
            let Some(file) = image.files().and_then(|files| files.get(0)) else {
                return;
            };
            let sender = sender.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match JsFuture::from(file.array_buffer()).await {
                    Ok(buffer) => {
                        let bytes = Uint8Array::new(&buffer).to_vec();
                        sender.push(EditorMessage::ImageSelected(bytes));
                    }
                    Err(err) => web_sys::console::error_1(&err),
                }
            });
        })?;

        let sender = inbox.clone();
        self.listen(CLOSE, "click", move |_| {
            sender.push(EditorMessage::CloseRequested);
        })?;

        let sender = inbox.clone();
        self.listen(DELETE, "click", move |_| {
            sender.push(EditorMessage::DeleteRequested);
        })?;

        Ok(())
    }

    fn render(&mut self, card: &CardView) -> Result<(), SurfaceError> {
        self.input(NAME_INPUT)?.set_value(&card.name);
        self.input(MODIFIER_INPUT)?
            .set_value(&card.modifier.to_string());
        self.find(ROLL)?.set_text_content(Some(&card.roll));
        self.find(REROLL)?.set_text_content(Some(&card.re_roll));

        let image = self
            .find(IMAGE)?
            .dyn_into::<HtmlImageElement>()
            .map_err(|_| SurfaceError::MissingElement(IMAGE))?;
        match &card.image_src {
            Some(src) => image.set_src(src),
            None => image.remove_attribute("src").map_err(dom_error)?,
        }
        Ok(())
    }

    fn unmount(&mut self) {
        for listener in self.listeners.drain(..) {
            let _ = listener.target.remove_event_listener_with_callback(
                listener.event,
                listener.callback.as_ref().unchecked_ref(),
            );
        }
        if let Some(root) = self.root.take() {
            root.remove();
        }
    }

    fn is_mounted(&self) -> bool {
        self.root.is_some()
    }
}
