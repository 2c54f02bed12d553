/// Error types for Wiki Side Preview

use wasm_bindgen::JsValue;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PreviewError {
    #[error("cannot find the article title in {0}")]
    UnrecognizedAddress(String),
    #[error("element {0} not found on this page")]
    MissingElement(String),
    #[error("browser call failed: {0}")]
    Browser(String),
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl PreviewError {
    /// Wrap a rejected promise or a failed DOM call
    pub fn browser(context: &str, value: JsValue) -> Self {
        let detail = value
            .as_string()
            .or_else(|| {
                js_sys::Reflect::get(&value, &JsValue::from_str("message"))
                    .ok()
                    .and_then(|m| m.as_string())
            })
            .unwrap_or_else(|| format!("{:?}", value));
        PreviewError::Browser(format!("{}: {}", context, detail))
    }
}

impl From<serde_wasm_bindgen::Error> for PreviewError {
    fn from(e: serde_wasm_bindgen::Error) -> Self {
        PreviewError::Serialization(e.to_string())
    }
}

impl From<PreviewError> for JsValue {
    fn from(e: PreviewError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}
