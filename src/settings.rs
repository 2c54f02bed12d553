/// Runtime settings shared by the coordinator and the page agent

use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

use crate::error::PreviewError;

/// Options accepted by `start_coordinator` / `start_page_agent`.
///
/// Every field has a default, so `undefined`, `null` or a partial object
/// are all valid inputs from the JS shims.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Lowers the log level to `Debug` (acknowledgments, skipped triggers).
    pub debug: bool,
    /// Prefix for storage keys, element ids and CSS classes.
    pub storage_prefix: String,
    pub textbox_selector: String,
    pub preview_selector: String,
    pub max_toasts: usize,
    pub toast_timeout_ms: i32,
    pub fade_out_ms: i32,
    /// Script path used for the "open the edit page" link.
    pub edit_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            debug: false,
            storage_prefix: "ws__".to_string(),
            textbox_selector: "#wpTextbox1".to_string(),
            preview_selector: "#wpPreview".to_string(),
            max_toasts: 3,
            toast_timeout_ms: 4000,
            fade_out_ms: 400,
            edit_path: "/w/index.php".to_string(),
        }
    }
}

impl Settings {
    /// Read settings handed over from JavaScript
    pub fn from_js(options: JsValue) -> Result<Settings, PreviewError> {
        if options.is_undefined() || options.is_null() {
            return Ok(Settings::default());
        }
        serde_wasm_bindgen::from_value(options)
            .map_err(|e| PreviewError::Serialization(format!("invalid options: {}", e)))
    }

    pub fn log_level(&self) -> log::Level {
        if self.debug {
            log::Level::Debug
        } else {
            log::Level::Info
        }
    }

    /// Prefixed name for ids, classes and storage keys
    pub fn prefixed(&self, name: &str) -> String {
        format!("{}{}", self.storage_prefix, name)
    }
}
