//! Floating element positioned against an anchor.

use layerkit_core::anchor::{Anchor, AnchorSource, VirtualElement};
use layerkit_core::dom::Document;
use layerkit_core::geometry::{default_modifiers, Layout, Modifier, Rect};
use layerkit_core::popper::{PopperContent, PopperContext, PopperOptions, PopperState};
use layerkit_core::Placement;
use leptos::html;
use leptos::prelude::*;
use web_sys::Element;

use crate::dom::{EventListenerGuard, Listeners, WebDocument};
use crate::portal::{ContainerFn, Portal};
use crate::transition::TransitionProps;

/// Something on the page to position against.
#[derive(Debug, Clone, PartialEq)]
pub enum AnchorEl {
    Element(Element),
    Virtual(VirtualElement),
}

impl Anchor for AnchorEl {
    fn bounding_rect(&self) -> Rect {
        match self {
            AnchorEl::Element(el) => {
                let r = el.get_bounding_client_rect();
                Rect::new(r.left(), r.top(), r.width(), r.height())
            }
            AnchorEl::Virtual(v) => v.bounding_rect(),
        }
    }
}

impl From<Element> for AnchorEl {
    fn from(el: Element) -> Self {
        AnchorEl::Element(el)
    }
}

/// Re-evaluated on every positioning pass. `None` means not ready.
pub type AnchorFn = Callback<(), Option<AnchorEl>>;

pub type PopperRender = Callback<PopperContext<TransitionProps>, AnyView>;

const UNPOSITIONED: &str = "position: fixed; top: 0px; left: 0px;";

fn viewport() -> Rect {
    let size = |v: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
        v.ok().and_then(|v| v.as_f64()).unwrap_or_default()
    };
    web_sys::window()
        .map(|w| Rect::new(0.0, 0.0, size(w.inner_width()), size(w.inner_height())))
        .unwrap_or_default()
}

fn scroll_parent(node: &Element) -> Option<Element> {
    let mut current = node.parent_element();
    while let Some(el) = current {
        if WebDocument.is_root_element(&el) {
            return None;
        }
        let overflow = format!(
            "{} {}",
            WebDocument.computed_style(&el, "overflow"),
            WebDocument.computed_style(&el, "overflow-y")
        );
        if ["auto", "scroll", "overlay"].iter().any(|v| overflow.contains(v)) {
            return Some(el);
        }
        current = el.parent_element();
    }
    None
}

/// Portaled poppers clamp to the viewport; in-place ones to their
/// nearest scrolling ancestor.
fn boundary(floating: &Element, disable_portal: bool) -> Rect {
    if !disable_portal {
        return viewport();
    }
    scroll_parent(floating)
        .map(|el| AnchorEl::Element(el).bounding_rect())
        .unwrap_or_else(viewport)
}

fn is_rtl(anchor: Option<&AnchorEl>) -> bool {
    let node = match anchor {
        Some(AnchorEl::Element(el)) => Some(el.clone()),
        _ => WebDocument.body(),
    };
    node.is_some_and(|el| WebDocument.computed_style(&el, "direction") == "rtl")
}

#[component]
pub fn Popper(
    #[prop(into)] open: Signal<bool>,
    #[prop(optional)] anchor: Option<AnchorFn>,
    #[prop(optional, into)] placement: MaybeProp<Placement>,
    /// Replaces the default flip + prevent-overflow chain.
    #[prop(optional, into)]
    modifiers: MaybeProp<Vec<Modifier>>,
    #[prop(optional, into)] disable_portal: MaybeProp<bool>,
    #[prop(optional)] container: Option<ContainerFn>,
    /// Content runs a transition; unmounting waits for its `on_exited`.
    #[prop(optional)]
    transition: bool,
    #[prop(optional, into)] keep_mounted: MaybeProp<bool>,
    #[prop(optional, into)] id: MaybeProp<String>,
    #[prop(optional, into)] style: MaybeProp<String>,
    #[prop(optional)] floating_ref: Option<NodeRef<html::Div>>,
    /// Fired after each positioning pass.
    #[prop(optional)]
    on_layout: Option<Callback<Layout>>,
    /// Render-prop content. Takes precedence over `children`.
    #[prop(optional)]
    render: Option<PopperRender>,
    #[prop(optional)] children: Option<ChildrenFn>,
) -> impl IntoView {
    let floating = floating_ref.unwrap_or_default();
    let source = StoredValue::new_local(AnchorSource::supplier(move || {
        anchor.and_then(|anchor| anchor.try_run(()).flatten())
    }));
    let state = StoredValue::new_local(PopperState::<AnchorEl>::new());
    let listeners = StoredValue::new_local(Listeners::default());
    let exited = RwSignal::new(true);
    let layout = RwSignal::new(None::<Layout>);
    let resolved = RwSignal::new(placement.get_untracked().unwrap_or_default());

    let content: Option<PopperContent<ChildrenFn, PopperRender>> = match (render, children) {
        (Some(render), _) => Some(PopperContent::Render(render)),
        (None, Some(children)) => Some(PopperContent::Static(children)),
        (None, None) => None,
    };
    let content = StoredValue::new(content);

    let update_position = move || {
        let Some(node) = floating.get_untracked() else {
            return;
        };
        let node = Element::from(node);
        let rect = AnchorEl::Element(node.clone()).bounding_rect();
        let bounds = boundary(&node, disable_portal.get_untracked().unwrap_or(false));
        let next = state
            .try_update_value(|s| s.session_mut().and_then(|session| session.update(rect, bounds)))
            .flatten();
        let Some(next) = next else {
            return;
        };
        if layout.get_untracked() != Some(next) {
            layout.set(Some(next));
        }
        if resolved.get_untracked() != next.placement {
            resolved.set(next.placement);
        }
        if let Some(on_layout) = on_layout {
            on_layout.run(next);
        }
    };

    let release = move || {
        state.try_update_value(|s| s.close());
        listeners.try_update_value(|l| l.clear());
    };

    let listen = move || {
        if !listeners.with_value(Listeners::is_empty) {
            return;
        }
        let Some(window) = web_sys::window() else {
            return;
        };
        listeners.update_value(|l| {
            l.push(EventListenerGuard::new(&window, "resize", false, move |_| {
                update_position()
            }));
            l.push(EventListenerGuard::new(&window, "scroll", true, move |_| {
                update_position()
            }));
        });
    };

    Effect::new(move |_| {
        let is_open = open.get();
        let mounted = floating.get().is_some();
        let anchor = source.with_value(|s| s.resolve());
        let options = PopperOptions {
            placement: placement.get().unwrap_or_default(),
            modifiers: modifiers.get().unwrap_or_else(default_modifiers),
            rtl: is_rtl(anchor.as_ref()),
            disable_portal: disable_portal.get().unwrap_or(false),
        };

        state.update_value(|s| s.on_open_changed(is_open, transition));
        if !is_open {
            if !transition {
                listeners.update_value(|l| l.clear());
            }
            return;
        }
        if !mounted {
            return;
        }
        let live = state
            .try_update_value(|s| s.ensure(anchor, options).is_some())
            .unwrap_or(false);
        if live {
            listen();
            update_position();
        } else {
            listeners.update_value(|l| l.clear());
        }
    });

    on_cleanup(release);

    let transition_props = TransitionProps {
        shown: open,
        on_enter: Callback::new(move |_| {
            state.update_value(|s| s.on_enter());
            exited.set(false);
        }),
        on_exited: Callback::new(move |_| {
            state.try_update_value(|s| s.on_exited());
            listeners.try_update_value(|l| l.clear());
            exited.set(true);
        }),
    };

    let should_render = move || {
        exited.track();
        let (is_open, keep) = (open.get(), keep_mounted.get().unwrap_or(false));
        state
            .try_with_value(|s| s.should_render(is_open, transition, keep))
            .unwrap_or(false)
    };

    let floating_style = move || {
        let position = layout
            .get()
            .map(|l| l.floating_style())
            .unwrap_or_else(|| UNPOSITIONED.to_string());
        match style.get() {
            Some(extra) => format!("{position} {extra}"),
            None => position,
        }
    };

    let body = move || {
        content.with_value(|content| match content {
            Some(PopperContent::Static(children)) => children(),
            Some(PopperContent::Render(render)) => render.run(PopperContext {
                placement: resolved.get(),
                transition: transition.then_some(transition_props),
            }),
            None => ().into_any(),
        })
    };

    view! {
        <Show when=should_render>
            <Portal container=container disable_portal=disable_portal>
                <div node_ref=floating role="tooltip" id=move || id.get() style=floating_style>
                    {body}
                </div>
            </Portal>
        </Show>
    }
}
