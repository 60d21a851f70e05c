//! Browser implementation of the core `Document` trait, plus listener
//! plumbing shared by the components.

use std::cell::Cell;

use layerkit_core::dom::Document;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, EventTarget, HtmlElement};

/// The page's `window.document`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WebDocument;

pub fn document() -> Option<web_sys::Document> {
    web_sys::window().and_then(|w| w.document())
}

/// Milliseconds on the same clock for every caller.
pub fn now() -> f64 {
    js_sys::Date::now()
}

fn collection(items: web_sys::HtmlCollection) -> Vec<Element> {
    (0..items.length()).filter_map(|i| items.item(i)).collect()
}

impl Document for WebDocument {
    type Node = Element;

    fn body(&self) -> Option<Element> {
        document().and_then(|d| d.body()).map(Element::from)
    }

    fn active_element(&self) -> Option<Element> {
        document().and_then(|d| d.active_element())
    }

    fn children(&self, node: &Element) -> Vec<Element> {
        collection(node.children())
    }

    fn parent(&self, node: &Element) -> Option<Element> {
        node.parent_element()
    }

    fn tag_name(&self, node: &Element) -> String {
        node.tag_name().to_ascii_uppercase()
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attribute(&self, node: &Element, name: &str, value: &str) {
        let _ = node.set_attribute(name, value);
    }

    fn remove_attribute(&self, node: &Element, name: &str) {
        let _ = node.remove_attribute(name);
    }

    fn style(&self, node: &Element, property: &str) -> String {
        node.dyn_ref::<HtmlElement>()
            .and_then(|el| el.style().get_property_value(property).ok())
            .unwrap_or_default()
    }

    fn set_style(&self, node: &Element, property: &str, value: &str) {
        if let Some(el) = node.dyn_ref::<HtmlElement>() {
            let _ = el.style().set_property(property, value);
        }
    }

    fn remove_style(&self, node: &Element, property: &str) {
        if let Some(el) = node.dyn_ref::<HtmlElement>() {
            let _ = el.style().remove_property(property);
        }
    }

    fn computed_style(&self, node: &Element, property: &str) -> String {
        web_sys::window()
            .and_then(|w| w.get_computed_style(node).ok().flatten())
            .and_then(|style| style.get_property_value(property).ok())
            .unwrap_or_default()
    }

    fn contains(&self, ancestor: &Element, node: &Element) -> bool {
        ancestor.contains(Some(node.as_ref()))
    }

    fn focus(&self, node: &Element) -> bool {
        let Some(el) = node.dyn_ref::<HtmlElement>() else {
            return false;
        };
        if el.focus().is_err() {
            return false;
        }
        self.active_element().as_ref() == Some(node)
    }

    fn is_overflowing(&self, container: &Element) -> bool {
        let Some(doc) = document() else {
            return false;
        };
        let is_body = doc.body().is_some_and(|body| Element::from(body) == *container);
        if is_body {
            let inner_width = web_sys::window()
                .and_then(|w| w.inner_width().ok())
                .and_then(|v| v.as_f64())
                .unwrap_or_default();
            let client_width = doc
                .document_element()
                .map(|root| f64::from(root.client_width()))
                .unwrap_or_default();
            return inner_width > client_width;
        }
        container.scroll_height() > container.client_height()
    }

    fn scrollbar_size(&self) -> f64 {
        scrollbar_size().unwrap_or_default()
    }

    fn elements_with_class(&self, class: &str) -> Vec<Element> {
        document()
            .map(|d| collection(d.get_elements_by_class_name(class)))
            .unwrap_or_default()
    }
}

/// Measures the platform scrollbar with an off-screen box.
fn scrollbar_size() -> Option<f64> {
    let doc = document()?;
    let body = doc.body()?;
    let gauge: HtmlElement = doc.create_element("div").ok()?.dyn_into().ok()?;
    let _ = gauge.set_attribute(
        "style",
        "width: 99px; height: 99px; position: absolute; top: -9999px; overflow: scroll;",
    );
    body.append_child(&gauge).ok()?;
    let size = gauge.offset_width() - gauge.client_width();
    gauge.remove();
    Some(f64::from(size))
}

thread_local! {
    static LIVE_LISTENERS: Cell<usize> = const { Cell::new(0) };
}

/// Listeners currently attached through [`EventListenerGuard`].
pub fn live_listener_count() -> usize {
    LIVE_LISTENERS.with(Cell::get)
}

/// A DOM listener that is removed when the guard drops.
pub struct EventListenerGuard {
    target: EventTarget,
    event: &'static str,
    capture: bool,
    closure: Closure<dyn FnMut(Event)>,
}

impl EventListenerGuard {
    pub fn new(
        target: &EventTarget,
        event: &'static str,
        capture: bool,
        handler: impl FnMut(Event) + 'static,
    ) -> Option<Self> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target
            .add_event_listener_with_callback_and_bool(
                event,
                closure.as_ref().unchecked_ref(),
                capture,
            )
            .map_err(|err| log::warn!("failed to attach {event} listener: {err:?}"))
            .ok()?;
        LIVE_LISTENERS.with(|n| n.set(n.get() + 1));
        Some(Self {
            target: target.clone(),
            event,
            capture,
            closure,
        })
    }

    pub fn event(&self) -> &'static str {
        self.event
    }
}

impl Drop for EventListenerGuard {
    fn drop(&mut self) {
        let _ = self.target.remove_event_listener_with_callback_and_bool(
            self.event,
            self.closure.as_ref().unchecked_ref(),
            self.capture,
        );
        LIVE_LISTENERS.with(|n| n.set(n.get().saturating_sub(1)));
    }
}

/// Listeners owned together and released together.
#[derive(Default)]
pub struct Listeners(Vec<EventListenerGuard>);

impl Listeners {
    pub fn push(&mut self, guard: Option<EventListenerGuard>) {
        self.0.extend(guard);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}
