//! `use_is_focus_visible`: was this focus caused by the keyboard?
//!
//! Document listeners are shared by every user of the hook and removed
//! when the last one unmounts.

use std::cell::RefCell;

use layerkit_core::focus_visible::{FocusTarget, FocusVisible};
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, HtmlElement, HtmlInputElement, HtmlTextAreaElement, VisibilityState};

use crate::dom::{document, now, EventListenerGuard, Listeners};

#[derive(Default)]
struct Registry {
    state: FocusVisible,
    users: usize,
    documents: Vec<(web_sys::Document, Listeners)>,
}

thread_local! {
    static REGISTRY: RefCell<Registry> = RefCell::new(Registry::default());
}

fn with_state(f: impl FnOnce(&mut FocusVisible)) {
    REGISTRY.with(|r| {
        if let Ok(mut r) = r.try_borrow_mut() {
            f(&mut r.state);
        }
    });
}

fn install(doc: &web_sys::Document) -> Listeners {
    let mut listeners = Listeners::default();
    listeners.push(EventListenerGuard::new(doc, "keydown", true, |_| {
        with_state(FocusVisible::on_key_down)
    }));
    for event in ["mousedown", "pointerdown", "touchstart"] {
        listeners.push(EventListenerGuard::new(doc, event, true, |_| {
            with_state(FocusVisible::on_pointer_down)
        }));
    }
    let visibility_doc = doc.clone();
    listeners.push(EventListenerGuard::new(doc, "visibilitychange", true, move |_| {
        let hidden = visibility_doc.visibility_state() == VisibilityState::Hidden;
        with_state(|s| s.on_visibility_change(hidden, now()));
    }));
    listeners
}

/// Listens on `doc` unless something already does. Only while the hook
/// has users.
fn prepare(doc: web_sys::Document) {
    REGISTRY.with(|r| {
        let mut r = r.borrow_mut();
        if r.users == 0 || r.documents.iter().any(|(known, _)| *known == doc) {
            return;
        }
        let listeners = install(&doc);
        r.documents.push((doc, listeners));
    });
}

fn acquire() {
    let first = REGISTRY.with(|r| {
        let mut r = r.borrow_mut();
        r.users += 1;
        r.users == 1
    });
    if first {
        if let Some(doc) = document() {
            prepare(doc);
        }
    }
}

fn release() {
    REGISTRY.with(|r| {
        let mut r = r.borrow_mut();
        r.users = r.users.saturating_sub(1);
        if r.users == 0 {
            r.documents.clear();
        }
    });
}

/// Document-level listeners currently installed by the hook, across every
/// document it was attached to.
pub fn document_listener_count() -> usize {
    REGISTRY.with(|r| r.borrow().documents.iter().map(|(_, l)| l.len()).sum())
}

fn describe(el: &Element) -> FocusTarget {
    let input = el.dyn_ref::<HtmlInputElement>();
    let read_only = match input {
        Some(input) => input.read_only(),
        None => el
            .dyn_ref::<HtmlTextAreaElement>()
            .is_some_and(HtmlTextAreaElement::read_only),
    };
    FocusTarget {
        // Throws where `:focus-visible` is unsupported.
        matches_focus_visible: el.matches(":focus-visible").ok(),
        tag_name: el.tag_name().to_ascii_uppercase(),
        input_type: input.map(HtmlInputElement::type_).unwrap_or_default(),
        read_only,
        content_editable: el
            .dyn_ref::<HtmlElement>()
            .is_some_and(HtmlElement::is_content_editable),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FocusVisibleHandle;

impl FocusVisibleHandle {
    pub fn is_focus_visible(&self, event: &Event) -> bool {
        let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return false;
        };
        let target = describe(&target);
        REGISTRY.with(|r| r.borrow().state.is_focus_visible(&target))
    }

    /// Call when an element showing a focus ring blurs.
    pub fn on_blur_visible(&self) {
        with_state(|s| s.on_blur_visible(now()));
    }

    /// Ref callback: makes sure the document owning `node` is listened to,
    /// for elements rendered into another document such as an iframe.
    pub fn attach(&self, node: &Element) {
        if let Some(doc) = node.owner_document() {
            prepare(doc);
        }
    }
}

pub fn use_is_focus_visible() -> FocusVisibleHandle {
    acquire();
    on_cleanup(release);
    FocusVisibleHandle
}
