use bevy::prelude::*;

use crate::engine::assets::scene_settings::SceneSettings;

/// Appends a `<script type="module">` per configured page script.
pub fn inject_page_scripts(settings: Res<SceneSettings>) {
    for src in &settings.page_scripts {
        #[cfg(target_arch = "wasm32")]
        {
            if let Err(err) = append_module_script(src) {
                error!("Failed to inject page script {}: {:?}", src, err);
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            debug!("Skipping page script {} on native build", src);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn append_module_script(src: &str) -> Result<(), wasm_bindgen::JsValue> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| wasm_bindgen::JsValue::from_str("document not available"))?;
    let script = document.create_element("script")?;
    script.set_attribute("type", "module")?;
    script.set_attribute("src", src)?;
    let body = document
        .body()
        .ok_or_else(|| wasm_bindgen::JsValue::from_str("document has no body"))?;
    body.append_child(&script)?;
    Ok(())
}
