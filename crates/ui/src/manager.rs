//! Where modals find their [`LayerManager`].
//!
//! Lookup order: the `manager` prop, then Leptos context, then the
//! per-thread default shared by the whole page.

use std::cell::RefCell;
use std::rc::Rc;

use layerkit_core::LayerManager;
use leptos::prelude::*;

use crate::dom::WebDocument;

pub type SharedLayerManager = Rc<RefCell<LayerManager<WebDocument>>>;

thread_local! {
    static DEFAULT_MANAGER: SharedLayerManager =
        Rc::new(RefCell::new(LayerManager::new(WebDocument)));
}

/// The page-wide registry used when nothing else is provided.
pub fn default_manager() -> SharedLayerManager {
    DEFAULT_MANAGER.with(Rc::clone)
}

/// Copyable handle to a manager, usable as a prop or context value.
#[derive(Clone, Copy)]
pub struct LayerManagerHandle(StoredValue<SharedLayerManager, LocalStorage>);

impl LayerManagerHandle {
    pub fn new(manager: SharedLayerManager) -> Self {
        Self(StoredValue::new_local(manager))
    }

    /// A fresh registry, isolated from the page default.
    pub fn isolated() -> Self {
        Self::new(Rc::new(RefCell::new(LayerManager::new(WebDocument))))
    }

    pub fn get(&self) -> SharedLayerManager {
        self.0
            .try_get_value()
            .unwrap_or_else(default_manager)
    }
}

/// Makes `manager` the registry for every modal below the current owner.
pub fn provide_layer_manager(manager: LayerManagerHandle) {
    provide_context(manager);
}

pub fn use_layer_manager(explicit: Option<LayerManagerHandle>) -> SharedLayerManager {
    explicit
        .or_else(use_context::<LayerManagerHandle>)
        .map(|handle| handle.get())
        .unwrap_or_else(default_manager)
}
