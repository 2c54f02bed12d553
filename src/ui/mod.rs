/// Page agent: everything that touches the wiki edit page
pub mod agent;
pub mod control;
pub mod toasts;

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement};

use crate::error::PreviewError;

/// Run `f` once after `ms` milliseconds
pub(crate) fn set_timeout(window: &web_sys::Window, ms: i32, f: impl FnOnce() + 'static) -> Result<i32, PreviewError> {
    let callback = Closure::once_into_js(f);
    window
        .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), ms)
        .map_err(|e| PreviewError::browser("setTimeout", e))
}

pub(crate) fn create_element(document: &Document, tag: &str) -> Result<Element, PreviewError> {
    document
        .create_element(tag)
        .map_err(|e| PreviewError::browser(tag, e))
}

pub(crate) fn body(document: &Document) -> Result<HtmlElement, PreviewError> {
    document
        .body()
        .ok_or_else(|| PreviewError::MissingElement("body".to_string()))
}

pub(crate) fn add_class(element: &Element, class: &str) -> Result<(), PreviewError> {
    element
        .class_list()
        .add_1(class)
        .map_err(|e| PreviewError::browser("classList.add", e))
}

pub(crate) fn remove_class(element: &Element, class: &str) -> Result<(), PreviewError> {
    element
        .class_list()
        .remove_1(class)
        .map_err(|e| PreviewError::browser("classList.remove", e))
}
