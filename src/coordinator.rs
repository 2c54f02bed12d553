/// Background coordinator: finds the tab that should render a preview
use std::cell::RefCell;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::bridge;
use crate::error::PreviewError;
use crate::messages::{
    self, Notification, NotifyKind, NotifyText, PreviewForward, PreviewRequest, Reply, ToAgent,
    ToCoordinator,
};
use crate::settings::Settings;
use crate::wiki_url::{WikiTitle, edit_form_patterns, edit_link, extract_title};

pub const NOT_FOUND_MESSAGE: &str = "Not found tab for the same Wikipedia page.";

/// The subset of `chrome.tabs.Tab` the coordinator looks at
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpenTab {
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(default)]
    pub url: String,
}

impl OpenTab {
    pub fn new(id: i32, url: &str) -> OpenTab {
        OpenTab {
            id: Some(id),
            url: url.to_string(),
        }
    }
}

/// What the coordinator sends once the tab lookup is done
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Another tab has the edit form open
    Forward { tab_id: i32, message: PreviewForward },
    /// Nothing found; tell the sender, if it is a tab
    NotFound {
        sender: Option<i32>,
        message: Notification,
    },
}

/// First matching tab that is not the sender.
///
/// A tab matches when its address fits one of the edit-form globs and names
/// exactly the requested title.
pub fn select_target(request: &PreviewRequest, sender: Option<i32>, tabs: &[OpenTab], settings: &Settings) -> Option<i32> {
    let patterns = edit_form_patterns(&request.origin, &request.title, &settings.edit_path);

    tabs.iter()
        .filter(|tab| patterns.iter().any(|p| p.matches(&tab.url)))
        .filter(|tab| extract_title(&tab.url).is_some_and(|title| title.raw() == request.title))
        .filter_map(|tab| tab.id)
        .find(|id| Some(*id) != sender)
}

/// Notification pointing the user at the edit form they need to open
pub fn not_found_notification(title: &str, settings: &Settings) -> Notification {
    let title = WikiTitle::new(title);
    let sub = format!(
        "Open <a href=\"{}\" target=\"_blank\">{}</a> in new tab then try again.",
        escape_attribute(&edit_link(title.raw(), &settings.edit_path)),
        escape_html(&edit_link(&title.decoded(), &settings.edit_path))
    );

    Notification {
        kind: NotifyKind::Error,
        message: NotifyText {
            main: NOT_FOUND_MESSAGE.to_string(),
            sub,
        },
    }
}

pub fn plan(request: PreviewRequest, sender: Option<i32>, tabs: &[OpenTab], settings: &Settings) -> Dispatch {
    match select_target(&request, sender, tabs, settings) {
        Some(tab_id) => Dispatch::Forward {
            tab_id,
            message: PreviewForward {
                input_text: request.input_text,
            },
        },
        None => Dispatch::NotFound {
            sender,
            message: not_found_notification(&request.title, settings),
        },
    }
}

/// Synchronous half of the message handler.
///
/// Returns the acknowledgment and, for a preview, the request whose lookup
/// still has to run.
pub fn receive(message: Value) -> (Reply, Option<PreviewRequest>) {
    match messages::decode::<ToCoordinator>(message, ToCoordinator::COMMANDS) {
        Ok(ToCoordinator::Preview(request)) => (Reply::ok(), Some(request)),
        Err(e) => (e.to_reply(false), None),
    }
}

/// `&` is kept as is: the raw title is percent-encoded, so the only `&` in
/// the link is the query separator.
fn escape_attribute(s: &str) -> String {
    s.replace('"', "&quot;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

thread_local! {
    static SETTINGS: RefCell<Settings> = RefCell::new(Settings::default());
}

/// Install the settings used by later messages.
///
/// The listener itself lives in `background.js` and is registered before
/// the module finishes loading.
pub fn start(settings: Settings) {
    SETTINGS.with(|current| *current.borrow_mut() = settings);
    log::info!("coordinator ready");
}

/// Handle one `runtime.onMessage` event; returns the reply for `sendResponse`
pub fn handle_message(message: JsValue, sender: JsValue) -> JsValue {
    let sender = sender.as_f64().map(|id| id as i32);

    let message: Value = match serde_wasm_bindgen::from_value(message) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("undecodable message: {}", e);
            Value::Null
        }
    };

    let (reply, request) = receive(message);
    if let Some(request) = request {
        log::debug!("preview request from tab {:?}: {:?}", sender, request);
        let settings = SETTINGS.with(|current| current.borrow().clone());
        spawn_local(async move {
            if let Err(e) = lookup_and_dispatch(request, sender, &settings).await {
                log::warn!("preview dispatch failed: {}", e);
            }
        });
    }

    bridge::reply_to_js(&reply)
}

async fn lookup_and_dispatch(request: PreviewRequest, sender: Option<i32>, settings: &Settings) -> Result<(), PreviewError> {
    let tabs = bridge::query_tabs().await?;

    match plan(request, sender, &tabs, settings) {
        Dispatch::Forward { tab_id, message } => {
            let reply = bridge::send_to_tab(tab_id, &ToAgent::Preview(message)).await?;
            log::debug!("res: {:?}", reply);
        }
        Dispatch::NotFound { sender: Some(tab_id), message } => {
            let reply = bridge::send_to_tab(tab_id, &ToAgent::Notify(message)).await?;
            log::debug!("res: {:?}", reply);
        }
        Dispatch::NotFound { sender: None, .. } => {
            log::warn!("no target tab, and the request did not come from a tab");
        }
    }

    Ok(())
}
