/// Wiki Side Preview - Chrome Extension for previewing edits in another tab
/// Built with Rust + WASM

mod bridge;
pub mod coordinator;
pub mod error;
pub mod messages;
pub mod settings;
pub mod storage;
pub mod toast_stack;
pub mod ui;
pub mod wiki_url;

use wasm_bindgen::prelude::*;

use crate::error::PreviewError;
use crate::settings::Settings;
use crate::storage::LocalStore;
use crate::ui::agent::PageAgent;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
}

fn init_logging(settings: &Settings) {
    wasm_logger::init(wasm_logger::Config::new(settings.log_level()));
}

// Start the coordinator in the background service worker
#[wasm_bindgen]
pub fn start_coordinator(options: JsValue) -> Result<(), JsValue> {
    let settings = Settings::from_js(options)?;
    init_logging(&settings);
    coordinator::start(settings);
    Ok(())
}

// Entry point for the listener registered by background.js
#[wasm_bindgen]
pub fn handle_coordinator_message(message: JsValue, sender_tab_id: JsValue) -> JsValue {
    coordinator::handle_message(message, sender_tab_id)
}

// Start the page agent on a wiki edit page
#[wasm_bindgen]
pub fn start_page_agent(options: JsValue) -> Result<(), JsValue> {
    let settings = Settings::from_js(options)?;
    init_logging(&settings);

    let agent = attach_agent(settings).map_err(|e| {
        log::error!("preview agent not started: {}", e);
        e
    })?;
    agent.listen_for_messages();
    Ok(())
}

fn attach_agent(settings: Settings) -> Result<std::rc::Rc<PageAgent>, PreviewError> {
    let window = web_sys::window().ok_or_else(|| PreviewError::Browser("no window".to_string()))?;
    let store = LocalStore::open(&window)?;
    let agent = PageAgent::attach(window, settings, Box::new(store))?;
    agent.install()?;
    Ok(agent)
}
