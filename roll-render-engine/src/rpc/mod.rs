//! JSON-RPC 2.0 bridge between the host page and the engine.
//!
//! The engine runs inside an iframe (or directly on a page) and talks to
//! its parent window through `postMessage`:
//!
//! ```text
//! Host page (parent)  <──postMessage──>  Engine (iframe)
//!        │                                     │
//!        ├─ Request (with ID) ───────────────> │
//!        │                                     ├─ Handled by a frame system
//!        │ <──────────────── Response (with ID)┤
//!        │                                     │
//!        │ <─────────── Notification (no ID) ──┤
//! ```
//!
//! ## Methods
//!
//! ### Camera
//! - `set_card_view`: move the camera to the card row
//! - `set_roll_view`: move the camera above the dice tray
//!
//! ### Cards
//! - `add_card`: `{ name, modifier?, image_src? }`, returns the new `id`
//! - `record_roll`: `{ card_id, roll, re_roll? }`, totals include the modifier
//! - `open_card_editor`: `{ card_id }`
//! - `get_cards`: every card as shown in the editor
//!
//! ### Diagnostics
//! - `set_debug`: `{ enabled, physics? }`
//! - `get_fps`: current frame rate
//!
//! ## Notifications
//!
//! - `fps_update`: frame rate and render tick count, twice a second
//! - `card_updated`: a card was added or changed
//! - `card_removed`: `{ id }`
//! - `interaction_state`: scene pointer interaction toggled
//!
//! Errors use the standard codes: `-32601` for an unknown method and
//! `-32602` for bad parameters.

/// Message listener, request dispatch and outgoing queue.
pub mod web_rpc;
