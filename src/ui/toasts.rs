/// Toast notifications rendered on the edit page

use std::cell::RefCell;
use std::rc::Rc;

use web_sys::{Document, Element, Window};

use super::{add_class, body, create_element, set_timeout};
use crate::error::PreviewError;
use crate::messages::NotifyText;
use crate::settings::Settings;
use crate::toast_stack::{ToastId, ToastStack};

/// Owns the toast container and the stack of visible toasts
pub struct ToastRack {
    window: Window,
    document: Document,
    settings: Settings,
    container: Option<Element>,
    stack: ToastStack<Element>,
}

impl ToastRack {
    pub fn new(window: Window, document: Document, settings: Settings) -> Rc<RefCell<ToastRack>> {
        let stack = ToastStack::new(settings.max_toasts);
        Rc::new(RefCell::new(ToastRack {
            window,
            document,
            settings,
            container: None,
            stack,
        }))
    }

    /// Show one toast.
    ///
    /// When the stack is full the oldest toast fades out first. Every toast
    /// removes itself after `toast_timeout_ms`.
    pub fn show(this: &Rc<RefCell<ToastRack>>, text: &NotifyText) -> Result<ToastId, PreviewError> {
        let (id, window, timeout_ms) = {
            let mut rack = this.borrow_mut();
            let container = rack.container()?;
            let toast = rack.build_toast(text)?;

            let (id, evicted) = rack.stack.push(toast.clone());
            if let Some(old) = evicted {
                rack.fade_out(old)?;
            }
            container
                .append_child(&toast)
                .map_err(|e| PreviewError::browser("append toast", e))?;

            (id, rack.window.clone(), rack.settings.toast_timeout_ms)
        };

        let rack = Rc::downgrade(this);
        set_timeout(&window, timeout_ms, move || {
            if let Some(rack) = rack.upgrade() {
                rack.borrow_mut().expire(id);
            }
        })?;

        Ok(id)
    }

    /// Number of toasts on screen, not counting ones fading out
    pub fn visible(&self) -> usize {
        self.stack.len()
    }

    fn expire(&mut self, id: ToastId) {
        if let Some(toast) = self.stack.expire(id) {
            toast.remove();
        }
    }

    fn fade_out(&self, toast: Element) -> Result<(), PreviewError> {
        add_class(&toast, &self.settings.prefixed("fadeout"))?;
        set_timeout(&self.window, self.settings.fade_out_ms, move || toast.remove())?;
        Ok(())
    }

    /// The container is created on the first toast
    fn container(&mut self) -> Result<Element, PreviewError> {
        if let Some(container) = &self.container {
            return Ok(container.clone());
        }

        let id = self.settings.prefixed("toast-container");
        let container = match self.document.get_element_by_id(&id) {
            Some(existing) => existing,
            None => {
                let created = create_element(&self.document, "div")?;
                created.set_id(&id);
                body(&self.document)?
                    .append_child(&created)
                    .map_err(|e| PreviewError::browser("append toast container", e))?;
                created
            }
        };

        self.container = Some(container.clone());
        Ok(container)
    }

    fn build_toast(&self, text: &NotifyText) -> Result<Element, PreviewError> {
        let toast = create_element(&self.document, "div")?;
        toast.set_class_name(&self.settings.prefixed("toast"));

        let main = create_element(&self.document, "div")?;
        main.set_class_name(&self.settings.prefixed("toast-main-message"));
        main.set_text_content(Some(&text.main));
        toast
            .append_child(&main)
            .map_err(|e| PreviewError::browser("append toast message", e))?;

        if !text.sub.is_empty() {
            let sub = create_element(&self.document, "div")?;
            sub.set_class_name(&self.settings.prefixed("toast-sub-message"));
            sub.set_inner_html(&text.sub);
            toast
                .append_child(&sub)
                .map_err(|e| PreviewError::browser("append toast message", e))?;
        }

        Ok(toast)
    }
}
