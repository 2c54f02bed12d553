/// Floating "Preview" button

use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement};

use super::{add_class, body, create_element, remove_class};
use crate::error::PreviewError;
use crate::settings::Settings;

/// The control stays visible while any part of the textbox is on screen
pub fn textbox_in_view(textbox_top: f64, viewport_height: f64) -> bool {
    textbox_top < viewport_height
}

pub struct PreviewControl {
    button: HtmlElement,
    init_class: String,
    hidden_class: String,
    clicked_class: String,
}

impl PreviewControl {
    /// Create the button and append it to the page body
    pub fn create(document: &Document, settings: &Settings) -> Result<PreviewControl, PreviewError> {
        let init_class = settings.prefixed("init");
        let button: HtmlElement = create_element(document, "button")?.unchecked_into();

        button.set_id(&settings.prefixed("preview-button"));
        button.set_class_name(&init_class);
        button.set_title("Preview in another tab [ctrl+Enter]");
        button.set_inner_text("Preview");
        body(document)?
            .append_child(&button)
            .map_err(|e| PreviewError::browser("append preview button", e))?;

        Ok(PreviewControl {
            button,
            init_class,
            hidden_class: settings.prefixed("hidden"),
            clicked_class: settings.prefixed("clicked"),
        })
    }

    pub fn element(&self) -> &HtmlElement {
        &self.button
    }

    pub fn update_visibility(&self, textbox_top: f64, viewport_height: f64) -> Result<(), PreviewError> {
        if textbox_in_view(textbox_top, viewport_height) {
            remove_class(&self.button, &self.hidden_class)?;
            remove_class(&self.button, &self.init_class)
        } else {
            add_class(&self.button, &self.hidden_class)
        }
    }

    pub fn mark_clicked(&self) -> Result<(), PreviewError> {
        add_class(&self.button, &self.clicked_class)
    }

    pub fn reset_clicked(&self) -> Result<(), PreviewError> {
        remove_class(&self.button, &self.clicked_class)
    }
}
