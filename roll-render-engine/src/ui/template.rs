use thiserror::Error;

use crate::ui::surface::{EditorInbox, EditorMessage};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template request failed: {0}")]
    Request(String),
    #[error("template request returned status {0}")]
    Status(u16),
    #[error("could not read template {path}: {reason}")]
    Read { path: String, reason: String },
    #[error("remote template {0} can only be fetched in the browser")]
    Unsupported(String),
}

/// Starts fetching the editor template. The result arrives in `inbox` as
/// [`EditorMessage::TemplateLoaded`].
pub fn request_template(url: &str, inbox: &EditorInbox) {
    #[cfg(target_arch = "wasm32")]
    {
        let url = url.to_string();
        let inbox = inbox.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let result = fetch_text(&url).await;
            inbox.push(EditorMessage::TemplateLoaded(result));
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        inbox.push(EditorMessage::TemplateLoaded(read_local(url)));
    }
}

#[cfg(target_arch = "wasm32")]
async fn fetch_text(url: &str) -> Result<String, TemplateError> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let request_error = |err: wasm_bindgen::JsValue| TemplateError::Request(format!("{err:?}"));

    let window = web_sys::window()
        .ok_or_else(|| TemplateError::Request("window not available".to_string()))?;
    let response: web_sys::Response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(request_error)?
        .dyn_into()
        .map_err(request_error)?;

    if !response.ok() {
        return Err(TemplateError::Status(response.status()));
    }

    let text = JsFuture::from(response.text().map_err(request_error)?)
        .await
        .map_err(request_error)?;
    text.as_string()
        .ok_or_else(|| TemplateError::Request("response body is not text".to_string()))
}

/// Reads a template from the asset directory on native builds.
#[cfg(not(target_arch = "wasm32"))]
fn read_local(url: &str) -> Result<String, TemplateError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        return Err(TemplateError::Unsupported(url.to_string()));
    }

    let root = std::env::var_os("BEVY_ASSET_ROOT")
        .or_else(|| std::env::var_os("CARGO_MANIFEST_DIR"))
        .map(std::path::PathBuf::from)
        .unwrap_or_default();
    let path = root.join("assets").join(url);

    std::fs::read_to_string(&path).map_err(|err| TemplateError::Read {
        path: path.display().to_string(),
        reason: err.to_string(),
    })
}
