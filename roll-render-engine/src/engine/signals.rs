use std::sync::{Arc, Mutex};

use bevy::prelude::*;

use crate::rpc::web_rpc::WebRpcInterface;

/// `detail` carried by the events the engine dispatches, so the document
/// listener can tell them apart from the page's own.
#[cfg(target_arch = "wasm32")]
const ENGINE_EVENT_DETAIL: &str = "roll-render-engine";

/// Toggles pointer interaction with the 3D scene while page UI is open.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionSignal {
    Deactivate,
    Activate,
}

impl InteractionSignal {
    /// DOM event name mirrored to page scripts.
    pub fn dom_event_name(self) -> &'static str {
        match self {
            InteractionSignal::Deactivate => "raycaster:inactive",
            InteractionSignal::Activate => "raycaster:active",
        }
    }

    pub fn from_dom_event_name(name: &str) -> Option<Self> {
        match name {
            "raycaster:inactive" => Some(InteractionSignal::Deactivate),
            "raycaster:active" => Some(InteractionSignal::Activate),
            _ => None,
        }
    }

    pub fn is_active(self) -> bool {
        matches!(self, InteractionSignal::Activate)
    }
}

/// A signal raised by page scripts on `document`. Applied like an engine
/// signal but never dispatched back to the page.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInteractionSignal(pub InteractionSignal);

/// Signals captured by the document listener, drained once per frame.
#[derive(Resource, Default, Clone)]
pub struct PageSignalQueue(Arc<Mutex<Vec<InteractionSignal>>>);

impl PageSignalQueue {
    pub fn push(&self, signal: InteractionSignal) {
        if let Ok(mut queue) = self.0.lock() {
            queue.push(signal);
        }
    }

    fn drain(&self) -> Vec<InteractionSignal> {
        self.0
            .lock()
            .map(|mut queue| std::mem::take(&mut *queue))
            .unwrap_or_default()
    }
}

/// Forwards every engine signal to the page as a bubbling `CustomEvent` on
/// `document` and an `interaction_state` notification.
pub fn mirror_interaction_signals(
    mut signals: EventReader<InteractionSignal>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for signal in signals.read() {
        #[cfg(target_arch = "wasm32")]
        {
            if let Err(err) = dispatch_dom_event(signal.dom_event_name()) {
                error!("Failed to dispatch {}: {:?}", signal.dom_event_name(), err);
            }
        }

        debug!("Interaction signal: {}", signal.dom_event_name());
        rpc_interface.send_notification(
            "interaction_state",
            serde_json::json!({
                "active": signal.is_active(),
                "event": signal.dom_event_name(),
            }),
        );
    }
}

pub fn receive_page_signals(
    queue: Res<PageSignalQueue>,
    mut page_signals: EventWriter<PageInteractionSignal>,
) {
    for signal in queue.drain() {
        debug!("Page interaction signal: {}", signal.dom_event_name());
        page_signals.write(PageInteractionSignal(signal));
    }
}

#[cfg(target_arch = "wasm32")]
fn dispatch_dom_event(name: &str) -> Result<(), wasm_bindgen::JsValue> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| wasm_bindgen::JsValue::from_str("document not available"))?;
    let init = web_sys::CustomEventInit::new();
    init.set_bubbles(true);
    init.set_detail(&wasm_bindgen::JsValue::from_str(ENGINE_EVENT_DETAIL));
    let event = web_sys::CustomEvent::new_with_event_init_dict(name, &init)?;
    document.dispatch_event(&event)?;
    Ok(())
}

/// Listens on `document` for `raycaster:*` events raised by page scripts.
#[cfg(target_arch = "wasm32")]
pub fn listen_for_page_signals(queue: Res<PageSignalQueue>) {
    use wasm_bindgen::JsCast;
    use wasm_bindgen::closure::Closure;

    let Some(document) = web_sys::window().and_then(|window| window.document()) else {
        error!("Document not available, page interaction signals disabled");
        return;
    };

    let queue = queue.clone();
    let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
        let from_engine = event
            .dyn_ref::<web_sys::CustomEvent>()
            .and_then(|custom| custom.detail().as_string())
            .is_some_and(|detail| detail == ENGINE_EVENT_DETAIL);
        if from_engine {
            return;
        }
        if let Some(signal) = InteractionSignal::from_dom_event_name(&event.type_()) {
            queue.push(signal);
        }
    }) as Box<dyn FnMut(web_sys::Event)>);

    for signal in [InteractionSignal::Deactivate, InteractionSignal::Activate] {
        if let Err(err) = document
            .add_event_listener_with_callback(signal.dom_event_name(), closure.as_ref().unchecked_ref())
        {
            error!("Failed to listen for {}: {:?}", signal.dom_event_name(), err);
        }
    }

    // JS owns the listener for the lifetime of the page.
    closure.forget();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dom_names_match_page_contract() {
        assert_eq!(
            InteractionSignal::Deactivate.dom_event_name(),
            "raycaster:inactive"
        );
        assert_eq!(InteractionSignal::Activate.dom_event_name(), "raycaster:active");
        assert_eq!(
            InteractionSignal::from_dom_event_name("raycaster:inactive"),
            Some(InteractionSignal::Deactivate)
        );
        assert_eq!(InteractionSignal::from_dom_event_name("click"), None);
    }

    #[test]
    fn queued_page_signals_become_page_events() {
        let mut world = World::new();
        world.init_resource::<Events<PageInteractionSignal>>();
        world.init_resource::<PageSignalQueue>();
        let queue = world.resource::<PageSignalQueue>().clone();
        let system = world.register_system(receive_page_signals);

        queue.push(InteractionSignal::Deactivate);
        queue.push(InteractionSignal::Activate);
        world.run_system(system).unwrap();

        let events = world.resource::<Events<PageInteractionSignal>>();
        let received: Vec<_> = events.get_cursor().read(events).copied().collect();
        assert_eq!(
            received,
            vec![
                PageInteractionSignal(InteractionSignal::Deactivate),
                PageInteractionSignal(InteractionSignal::Activate),
            ]
        );
        assert!(queue.drain().is_empty());
    }
}
