/// Typed access to the `chrome.*` extension APIs through `extension.js`
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::coordinator::OpenTab;
use crate::error::PreviewError;
use crate::messages::Reply;

#[wasm_bindgen(module = "/extension.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn queryTabs() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn sendTabMessage(tab_id: i32, message: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn sendRuntimeMessage(message: JsValue) -> Result<JsValue, JsValue>;

    fn listenForMessages(handler: &js_sys::Function);
}

/// All open tabs
pub async fn query_tabs() -> Result<Vec<OpenTab>, PreviewError> {
    let tabs_js = queryTabs()
        .await
        .map_err(|e| PreviewError::browser("tabs.query", e))?;
    Ok(serde_wasm_bindgen::from_value(tabs_js)?)
}

pub async fn send_to_tab<M: Serialize>(tab_id: i32, message: &M) -> Result<Option<Reply>, PreviewError> {
    let message_js = serde_wasm_bindgen::to_value(message)?;
    let reply_js = sendTabMessage(tab_id, message_js)
        .await
        .map_err(|e| PreviewError::browser("tabs.sendMessage", e))?;
    read_reply(reply_js)
}

pub async fn send_to_coordinator<M: Serialize>(message: &M) -> Result<Option<Reply>, PreviewError> {
    let message_js = serde_wasm_bindgen::to_value(message)?;
    let reply_js = sendRuntimeMessage(message_js)
        .await
        .map_err(|e| PreviewError::browser("runtime.sendMessage", e))?;
    read_reply(reply_js)
}

/// Route `runtime.onMessage` to `handler(message, senderTabId)`.
///
/// Whatever the handler returns is passed to `sendResponse`.
pub fn listen_for_messages(handler: &Closure<dyn FnMut(JsValue, JsValue) -> JsValue>) {
    listenForMessages(handler.as_ref().unchecked_ref());
}

pub fn reply_to_js(reply: &Reply) -> JsValue {
    serde_wasm_bindgen::to_value(reply).unwrap_or_else(|e| {
        log::error!("cannot serialize reply: {}", e);
        JsValue::UNDEFINED
    })
}

/// A listener that never answers leaves the reply undefined
fn read_reply(reply_js: JsValue) -> Result<Option<Reply>, PreviewError> {
    if reply_js.is_undefined() || reply_js.is_null() {
        return Ok(None);
    }
    Ok(Some(serde_wasm_bindgen::from_value(reply_js)?))
}
