use bevy::diagnostic::DiagnosticsStore;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cards::card::CardId;
use crate::cards::manager::{CardEvent, CardManager};
use crate::engine::camera::orbit_camera::CameraPreset;
use crate::engine::core::app_state::AppState;
use crate::engine::physics::PhysicsDebugState;
use crate::engine::systems::fps_tracking::smoothed_fps;
use crate::engine::systems::render_mode::RenderModeState;
use crate::ui::card_editor::OpenCardEditor;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Outgoing traffic to the host page, flushed once per frame.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Queues a notification; notifications never get a response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }
}

pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            // Page messages wait in the queue until the scene is running.
            .add_systems(
                PreUpdate,
                (process_incoming_messages, handle_rpc_messages)
                    .chain()
                    .run_if(in_state(AppState::Running)),
            )
            .add_systems(PostUpdate, send_outgoing_messages);

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::Arc;
    use std::sync::Mutex;

    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();
            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    match window() {
        Some(window) => {
            if let Err(err) =
                window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
            {
                error!("Failed to register RPC message listener: {:?}", err);
            }
        }
        None => error!("Window object not available, RPC disabled"),
    }

    // JS owns the listener for the lifetime of the page.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

/// Everything a request handler may touch.
#[derive(SystemParam)]
struct RpcContext<'w> {
    diagnostics: Res<'w, DiagnosticsStore>,
    cards: ResMut<'w, CardManager>,
    render_mode: ResMut<'w, RenderModeState>,
    physics_debug: ResMut<'w, PhysicsDebugState>,
    presets: EventWriter<'w, CameraPreset>,
    card_events: EventWriter<'w, CardEvent>,
    editor_requests: EventWriter<'w, OpenCardEditor>,
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut context: RpcContext,
) {
    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                debug!("RPC request: {}", request.method);
                if let Some(response) = handle_rpc_request(&request, &mut context) {
                    rpc_interface.queue_response(response);
                }
            }
            Err(parse_error) => {
                warn!("Discarding malformed RPC message: {}", parse_error);
            }
        }
    }
}

/// Dispatches a request. Requests without an id are notifications and are
/// handled without a response.
fn handle_rpc_request(request: &RpcRequest, context: &mut RpcContext) -> Option<RpcResponse> {
    let params = &request.params;
    let result = match request.method.as_str() {
        "set_card_view" => handle_camera_preset(CameraPreset::CardView, context),
        "set_roll_view" => handle_camera_preset(CameraPreset::RollView, context),
        "set_debug" => handle_set_debug(params, context),
        "add_card" => handle_add_card(params, context),
        "record_roll" => handle_record_roll(params, context),
        "open_card_editor" => handle_open_card_editor(params, context),
        "get_cards" => handle_get_cards(context),
        "get_fps" => handle_get_fps(&context.diagnostics),
        _ => {
            warn!("Unknown RPC method: {}", request.method);
            Err(RpcError::method_not_found(&request.method))
        }
    };

    let id = request.id.clone()?;
    Some(match result {
        Ok(result_value) => RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        },
        Err(error) => create_error_response(id, error),
    })
}

fn parse_params<T: serde::de::DeserializeOwned>(
    params: &serde_json::Value,
    expected: &str,
) -> Result<T, RpcError> {
    serde_json::from_value::<T>(params.clone())
        .map_err(|err| RpcError::invalid_params(&format!("Expected {expected}: {err}")))
}

fn handle_camera_preset(
    preset: CameraPreset,
    context: &mut RpcContext,
) -> Result<serde_json::Value, RpcError> {
    context.presets.write(preset);
    Ok(serde_json::json!({
        "success": true,
        "view": format!("{preset:?}"),
    }))
}

fn handle_set_debug(
    params: &serde_json::Value,
    context: &mut RpcContext,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct DebugParams {
        enabled: bool,
        physics: Option<bool>,
    }

    let parsed: DebugParams = parse_params(params, "'enabled' boolean")?;
    context.render_mode.debug = parsed.enabled;
    if let Some(physics) = parsed.physics {
        context.physics_debug.enabled = physics;
    }

    Ok(serde_json::json!({
        "debug": context.render_mode.debug,
        "physics": context.physics_debug.enabled,
    }))
}

fn handle_add_card(
    params: &serde_json::Value,
    context: &mut RpcContext,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct AddCardParams {
        name: String,
        #[serde(default)]
        modifier: i32,
        image_src: Option<String>,
    }

    let parsed: AddCardParams = parse_params(params, "'name' and optional 'modifier'")?;
    let id = context.cards.add(parsed.name, parsed.modifier);
    if let (Some(src), Some(card)) = (parsed.image_src, context.cards.get_mut(id)) {
        card.set_picture(src);
    }
    context.card_events.write(CardEvent::Added(id));
    info!("Card {:?} added over RPC", id);

    Ok(serde_json::json!({ "id": id }))
}

fn handle_record_roll(
    params: &serde_json::Value,
    context: &mut RpcContext,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct RecordRollParams {
        card_id: u32,
        roll: i32,
        re_roll: Option<i32>,
    }

    let parsed: RecordRollParams = parse_params(params, "'card_id' and 'roll'")?;
    let id = CardId(parsed.card_id);
    let card = context
        .cards
        .get_mut(id)
        .ok_or_else(|| RpcError::invalid_params(&format!("Unknown card: {}", parsed.card_id)))?;
    card.record_roll(parsed.roll, parsed.re_roll);
    let view = card.view();
    context.card_events.write(CardEvent::Changed(id));

    serde_json::to_value(view).map_err(|err| RpcError::internal_error(&err.to_string()))
}

fn handle_open_card_editor(
    params: &serde_json::Value,
    context: &mut RpcContext,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct OpenParams {
        card_id: u32,
    }

    let parsed: OpenParams = parse_params(params, "'card_id'")?;
    let id = CardId(parsed.card_id);
    if context.cards.get(id).is_none() {
        return Err(RpcError::invalid_params(&format!(
            "Unknown card: {}",
            parsed.card_id
        )));
    }
    context.editor_requests.write(OpenCardEditor { card: id });

    Ok(serde_json::json!({ "success": true }))
}

fn handle_get_cards(context: &RpcContext) -> Result<serde_json::Value, RpcError> {
    let cards: Vec<_> = context.cards.iter().map(|card| card.view()).collect();
    serde_json::to_value(cards).map_err(|err| RpcError::internal_error(&err.to_string()))
}

fn handle_get_fps(diagnostics: &DiagnosticsStore) -> Result<serde_json::Value, RpcError> {
    let fps = smoothed_fps(diagnostics).unwrap_or(0.0) as f32;
    Ok(serde_json::json!({ "fps": fps }))
}

fn create_error_response(id: serde_json::Value, error: RpcError) -> RpcResponse {
    RpcResponse {
        jsonrpc: "2.0".to_string(),
        result: None,
        error: Some(error),
        id: Some(id),
    }
}

/// Flushes notifications, then responses.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
    }
}

impl RpcError {
    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: "Method not found".to_string(),
            data: Some(serde_json::json!({ "method": method })),
        }
    }

    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn internal_error(message: &str) -> Self {
        Self {
            code: -32603,
            message: message.to_string(),
            data: None,
        }
    }
}
