use std::sync::{Arc, Mutex};

use bevy::prelude::*;
use thiserror::Error;

use crate::cards::card::CardView;
use crate::ui::template::TemplateError;

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("document is not available")]
    NoDocument,
    #[error("editor is not mounted")]
    NotMounted,
    #[error("template has no element matching '{0}'")]
    MissingElement(&'static str),
    #[error("DOM call failed: {0}")]
    Dom(String),
}

/// Input from the editor surface, queued until the next frame drains it.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorMessage {
    TemplateLoaded(Result<String, TemplateError>),
    NameChanged(String),
    ModifierChanged(String),
    ImageSelected(Vec<u8>),
    CloseRequested,
    DeleteRequested,
}

/// Queue shared between surface callbacks and the frame systems.
#[derive(Clone, Default)]
pub struct EditorInbox(Arc<Mutex<Vec<EditorMessage>>>);

impl EditorInbox {
    pub fn push(&self, message: EditorMessage) {
        if let Ok(mut queue) = self.0.lock() {
            queue.push(message);
        }
    }

    pub fn drain(&self) -> Vec<EditorMessage> {
        if let Ok(mut queue) = self.0.lock() {
            std::mem::take(&mut *queue)
        } else {
            Vec::new()
        }
    }
}

/// Where the card editor is drawn. The browser build injects the template
/// into the page; other builds log what would be shown.
pub trait EditorSurface {
    /// Inserts the template markup as a new modal.
    fn mount(&mut self, template: &str) -> Result<(), SurfaceError>;

    /// Hooks the form fields up to `inbox`.
    fn bind_fields(&mut self, inbox: &EditorInbox) -> Result<(), SurfaceError>;

    /// Fills the fields from `card`.
    fn render(&mut self, card: &CardView) -> Result<(), SurfaceError>;

    /// Removes the modal and every listener bound to it.
    fn unmount(&mut self);

    fn is_mounted(&self) -> bool;
}

/// Non-send: the DOM surface holds JS closures.
pub struct CardEditorSurface(pub Box<dyn EditorSurface>);

impl Default for CardEditorSurface {
    fn default() -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            Self(Box::new(crate::ui::dom_surface::DomSurface::default()))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            Self(Box::new(LogSurface::default()))
        }
    }
}

/// Surface for builds without a page.
#[derive(Default)]
pub struct LogSurface {
    mounted: bool,
}

impl EditorSurface for LogSurface {
    fn mount(&mut self, template: &str) -> Result<(), SurfaceError> {
        info!("Card editor mounted ({} bytes of template)", template.len());
        self.mounted = true;
        Ok(())
    }

    fn bind_fields(&mut self, _inbox: &EditorInbox) -> Result<(), SurfaceError> {
        if self.mounted {
            Ok(())
        } else {
            Err(SurfaceError::NotMounted)
        }
    }

    fn render(&mut self, card: &CardView) -> Result<(), SurfaceError> {
        if !self.mounted {
            return Err(SurfaceError::NotMounted);
        }
        info!(
            "Card editor: {} (modifier {:+}, roll {}, re-roll {})",
            card.name, card.modifier, card.roll, card.re_roll
        );
        Ok(())
    }

    fn unmount(&mut self) {
        if self.mounted {
            info!("Card editor closed");
        }
        self.mounted = false;
    }

    fn is_mounted(&self) -> bool {
        self.mounted
    }
}
