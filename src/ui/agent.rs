/// Page agent wiring: control, shortcut, send and receive paths
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, HtmlElement, HtmlTextAreaElement, KeyboardEvent, Window};

use super::control::PreviewControl;
use super::toasts::ToastRack;
use crate::bridge;
use crate::error::PreviewError;
use crate::messages::{
    self, Notification, NotifyText, PreviewForward, PreviewRequest, Reply, ToAgent, ToCoordinator,
};
use crate::settings::Settings;
use crate::storage::{KeyValueStore, ScrollPosition, ScrollRecord};
use crate::wiki_url::PageAddress;

pub struct PageAgent {
    settings: Settings,
    window: Window,
    document: Document,
    textbox: HtmlTextAreaElement,
    control: PreviewControl,
    toasts: Rc<RefCell<ToastRack>>,
    scroll: ScrollRecord<Box<dyn KeyValueStore>>,
    in_flight: Cell<bool>,
}

impl PageAgent {
    /// Find the textbox and insert the preview control.
    ///
    /// Fails on pages without the textbox.
    pub fn attach(window: Window, settings: Settings, store: Box<dyn KeyValueStore>) -> Result<Rc<PageAgent>, PreviewError> {
        let document = window
            .document()
            .ok_or_else(|| PreviewError::MissingElement("document".to_string()))?;

        let textbox: HtmlTextAreaElement = document
            .query_selector(&settings.textbox_selector)
            .map_err(|e| PreviewError::browser(&settings.textbox_selector, e))?
            .ok_or_else(|| PreviewError::MissingElement(settings.textbox_selector.clone()))?
            .unchecked_into();

        let control = PreviewControl::create(&document, &settings)?;
        let toasts = ToastRack::new(window.clone(), document.clone(), settings.clone());
        let scroll = ScrollRecord::new(store, &settings.storage_prefix);

        Ok(Rc::new(PageAgent {
            settings,
            window,
            document,
            textbox,
            control,
            toasts,
            scroll,
            in_flight: Cell::new(false),
        }))
    }

    /// Wire DOM listeners and finish a reload started by a preview
    pub fn install(self: &Rc<Self>) -> Result<(), PreviewError> {
        let agent = self.clone();
        self.listen(self.control.element(), "click", move |_| {
            if let Err(e) = agent.control.mark_clicked() {
                log::warn!("{}", e);
            }
            agent.trigger_preview();
        })?;

        let agent = self.clone();
        self.listen(self.control.element(), "mousedown", move |_| {
            if let Err(e) = agent.control.reset_clicked() {
                log::warn!("{}", e);
            }
        })?;

        let agent = self.clone();
        self.listen(&self.document, "scroll", move |_| agent.refresh_visibility())?;

        let agent = self.clone();
        self.listen(&self.window, "resize", move |_| agent.refresh_visibility())?;

        let agent = self.clone();
        self.listen(&self.textbox, "keydown", move |event| {
            let Some(key) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            if key.ctrl_key() && key.key() == "Enter" {
                event.prevent_default();
                agent.trigger_preview();
            }
        })?;

        self.refresh_visibility();

        if let Some(position) = self.scroll.take_pending()? {
            log::debug!("restoring scroll after preview reload: {:?}", position);
            self.scroll_to(position);
        }

        Ok(())
    }

    /// Answer messages from the coordinator for the rest of the page's life
    pub fn listen_for_messages(self: &Rc<Self>) {
        let agent = self.clone();
        let handler = Closure::wrap(Box::new(move |message: JsValue, _sender: JsValue| -> JsValue {
            let message: Value = serde_wasm_bindgen::from_value(message).unwrap_or(Value::Null);
            bridge::reply_to_js(&agent.receive(message))
        }) as Box<dyn FnMut(JsValue, JsValue) -> JsValue>);

        bridge::listen_for_messages(&handler);
        handler.forget();
    }

    /// Dispatch an incoming message.
    ///
    /// The reply is returned right away; applying the message happens on a
    /// later microtask and its failures are only logged or toasted.
    pub fn receive(self: &Rc<Self>, message: Value) -> Reply {
        let message = match messages::decode::<ToAgent>(message, ToAgent::COMMANDS) {
            Ok(message) => message,
            Err(e) => {
                log::debug!("rejecting message: {}", e);
                return e.to_reply(true);
            }
        };

        let reply = Reply::ok_for(message.command());
        let agent = self.clone();
        spawn_local(async move {
            let outcome = match &message {
                ToAgent::Preview(forward) => agent.apply_preview(forward),
                ToAgent::Notify(notification) => agent.notify(notification),
            };
            if let Err(e) = outcome {
                log::warn!("{} failed: {}", message.command(), e);
            }
        });

        reply
    }

    /// Send the textbox content to the coordinator
    pub fn trigger_preview(self: &Rc<Self>) {
        if self.in_flight.get() {
            log::debug!("preview request already in flight");
            return;
        }

        match self.build_request() {
            Ok(request) => {
                self.send_request(request);
            }
            Err(e) => {
                log::warn!("{}", e);
                self.show_local_error("Cannot preview: the article title is not in this page's address.");
            }
        }
    }

    /// Hand `request` to the coordinator.
    ///
    /// Returns false, sending nothing, while a previous request is still
    /// unanswered.
    pub fn send_request(self: &Rc<Self>, request: PreviewRequest) -> bool {
        if self.in_flight.replace(true) {
            log::debug!("preview request already in flight");
            return false;
        }

        let agent = self.clone();
        spawn_local(async move {
            match bridge::send_to_coordinator(&ToCoordinator::Preview(request)).await {
                Ok(reply) => log::debug!("res: {:?}", reply),
                Err(e) => {
                    log::warn!("preview request failed: {}", e);
                    agent.show_local_error("Preview request failed: the extension did not answer.");
                }
            }
            agent.in_flight.set(false);
        });
        true
    }

    pub fn build_request(&self) -> Result<PreviewRequest, PreviewError> {
        let href = self
            .window
            .location()
            .href()
            .map_err(|e| PreviewError::browser("location.href", e))?;
        let address = PageAddress::parse(&href)?;

        Ok(PreviewRequest {
            input_text: self.textbox.value(),
            origin: address.origin,
            title: address.title.raw().to_string(),
        })
    }

    /// Replace the textbox content and press the page's own preview button
    pub fn apply_preview(&self, forward: &PreviewForward) -> Result<(), PreviewError> {
        self.textbox.set_value(&forward.input_text);

        self.scroll.save_before_preview(self.scroll_position())?;

        let preview: HtmlElement = self
            .document
            .query_selector(&self.settings.preview_selector)
            .map_err(|e| PreviewError::browser(&self.settings.preview_selector, e))?
            .ok_or_else(|| PreviewError::MissingElement(self.settings.preview_selector.clone()))?
            .unchecked_into();
        preview.click();

        // Some wikis preview in place without reloading the page
        self.scroll_to(self.scroll.position());
        Ok(())
    }

    pub fn notify(&self, notification: &Notification) -> Result<(), PreviewError> {
        ToastRack::show(&self.toasts, &notification.message).map(|_| ())
    }

    pub fn toasts(&self) -> &Rc<RefCell<ToastRack>> {
        &self.toasts
    }

    pub fn control(&self) -> &PreviewControl {
        &self.control
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.get()
    }

    fn show_local_error(&self, main: &str) {
        let text = NotifyText {
            main: main.to_string(),
            sub: String::new(),
        };
        if let Err(e) = ToastRack::show(&self.toasts, &text) {
            log::warn!("{}", e);
        }
    }

    fn refresh_visibility(&self) {
        let top = self.textbox.get_bounding_client_rect().top();
        let viewport_height = self
            .window
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or(0.0);

        if let Err(e) = self.control.update_visibility(top, viewport_height) {
            log::warn!("{}", e);
        }
    }

    fn scroll_position(&self) -> ScrollPosition {
        ScrollPosition {
            x: self.window.scroll_x().unwrap_or(0.0),
            y: self.window.scroll_y().unwrap_or(0.0),
        }
    }

    fn scroll_to(&self, position: ScrollPosition) {
        self.window.scroll_to_with_x_and_y(position.x, position.y);
    }

    fn listen(&self, target: &web_sys::EventTarget, event: &str, handler: impl FnMut(web_sys::Event) + 'static) -> Result<(), PreviewError> {
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
        target
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(|e| PreviewError::browser(event, e))?;
        closure.forget();
        Ok(())
    }
}
