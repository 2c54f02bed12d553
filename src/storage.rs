/// Scroll position kept across the reload triggered by a preview

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::PreviewError;

/// String key-value storage that survives a page reload
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), PreviewError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreviewError> {
        (**self).set(key, value)
    }
}

/// `window.localStorage`
pub struct LocalStore {
    storage: web_sys::Storage,
}

impl LocalStore {
    pub fn open(window: &web_sys::Window) -> Result<LocalStore, PreviewError> {
        let storage = window
            .local_storage()
            .map_err(|e| PreviewError::browser("localStorage", e))?
            .ok_or_else(|| PreviewError::Browser("localStorage is unavailable".to_string()))?;
        Ok(LocalStore { storage })
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreviewError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| PreviewError::browser(key, e))
    }
}

/// In-memory store that records the order of writes
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
    /// Keys in the order they were written
    writes: RefCell<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.borrow().clone()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreviewError> {
        self.values.borrow_mut().insert(key.to_string(), value.to_string());
        self.writes.borrow_mut().push(key.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollPosition {
    pub x: f64,
    pub y: f64,
}

/// Prefixed keys of the scroll-restore record
#[derive(Debug, Clone)]
pub struct ScrollKeys {
    loading_preview: String,
    scroll_x: String,
    scroll_y: String,
}

impl ScrollKeys {
    pub fn new(prefix: &str) -> ScrollKeys {
        ScrollKeys {
            loading_preview: format!("{}loadingPreview", prefix),
            scroll_x: format!("{}scrollX", prefix),
            scroll_y: format!("{}scrollY", prefix),
        }
    }
}

/// Reads and writes `(loadingPreview, scrollX, scrollY)` in a store
pub struct ScrollRecord<S: KeyValueStore> {
    store: S,
    keys: ScrollKeys,
}

impl<S: KeyValueStore> ScrollRecord<S> {
    pub fn new(store: S, prefix: &str) -> Self {
        ScrollRecord {
            store,
            keys: ScrollKeys::new(prefix),
        }
    }

    /// Remember where the page is before the preview reloads it.
    ///
    /// Writes `scrollX`, `scrollY`, then `loadingPreview = "true"`.
    pub fn save_before_preview(&self, position: ScrollPosition) -> Result<(), PreviewError> {
        self.store.set(&self.keys.scroll_x, &position.x.to_string())?;
        self.store.set(&self.keys.scroll_y, &position.y.to_string())?;
        self.store.set(&self.keys.loading_preview, "true")?;
        Ok(())
    }

    /// Stored coordinates; missing or unparsable values read as 0
    pub fn position(&self) -> ScrollPosition {
        let read = |key: &str| {
            self.store
                .get(key)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite())
                .unwrap_or(0.0)
        };

        ScrollPosition {
            x: read(&self.keys.scroll_x),
            y: read(&self.keys.scroll_y),
        }
    }

    pub fn is_loading_preview(&self) -> bool {
        self.store.get(&self.keys.loading_preview).as_deref() == Some("true")
    }

    /// After a reload: the position to restore if a preview caused it.
    ///
    /// Clears the loading flag so a later plain reload does not scroll.
    pub fn take_pending(&self) -> Result<Option<ScrollPosition>, PreviewError> {
        if !self.is_loading_preview() {
            return Ok(None);
        }

        let position = self.position();
        self.store.set(&self.keys.loading_preview, "false")?;
        Ok(Some(position))
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
