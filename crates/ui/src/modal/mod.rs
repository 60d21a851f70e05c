//! Modal dialogs: portal + backdrop + focus trap, registered with a
//! [`LayerManager`](layerkit_core::LayerManager) while open.

mod backdrop;
mod trap_focus;

pub use backdrop::SimpleBackdrop;
pub use trap_focus::{active_trap_count, TrapFocus};

use gloo_timers::future::TimeoutFuture;
use layerkit_core::aria::aria_hidden;
use layerkit_core::modal::{backdrop_click, escape_key_down, CloseReason, ModalAction, ModalFlags, ModalState};
use layerkit_core::{MountOptions, OverlayRecord};
use leptos::ev;
use leptos::html;
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

use crate::dom::WebDocument;
use crate::manager::{use_layer_manager, LayerManagerHandle};
use crate::portal::{resolve_container, ContainerFn, Portal, PortalMount};
use crate::transition::TransitionProps;

const CONTENT_STYLE: &str = "position: fixed; z-index: 10; inset: 0;";

// Closing removes the modal, and with it the element whose handler is
// running. Leptos' delegated handlers must not be dropped mid-dispatch.
fn defer(f: impl FnOnce() + 'static) {
    spawn_local(async move {
        TimeoutFuture::new(0).await;
        f();
    });
}

#[component]
pub fn Modal(
    #[prop(into)] open: Signal<bool>,
    /// Requested close, with the reason. The owner decides whether to
    /// flip `open`.
    #[prop(optional)]
    on_close: Option<Callback<CloseReason>>,
    #[prop(optional)] on_backdrop_click: Option<Callback<ev::MouseEvent>>,
    #[prop(optional)] on_escape_key_down: Option<Callback<ev::KeyboardEvent>>,
    /// Mount container. Defaults to `<body>`.
    #[prop(optional)]
    container: Option<ContainerFn>,
    /// Wait for the exit transition before unregistering.
    #[prop(optional, into)]
    close_after_transition: MaybeProp<bool>,
    #[prop(optional, into)] disable_auto_focus: MaybeProp<bool>,
    #[prop(optional, into)] disable_backdrop_click: MaybeProp<bool>,
    #[prop(optional, into)] disable_enforce_focus: MaybeProp<bool>,
    #[prop(optional, into)] disable_escape_key_down: MaybeProp<bool>,
    #[prop(optional, into)] disable_portal: MaybeProp<bool>,
    #[prop(optional, into)] disable_restore_focus: MaybeProp<bool>,
    #[prop(optional, into)] disable_scroll_lock: MaybeProp<bool>,
    #[prop(optional, into)] hide_backdrop: MaybeProp<bool>,
    /// Keep the content in the DOM (hidden) while closed.
    #[prop(optional, into)]
    keep_mounted: MaybeProp<bool>,
    #[prop(optional)] manager: Option<LayerManagerHandle>,
    /// Transitioned content. Takes precedence over `children`.
    #[prop(optional)]
    transition: Option<Callback<TransitionProps, AnyView>>,
    #[prop(optional)] children: Option<ChildrenFn>,
) -> impl IntoView {
    let manager = StoredValue::new_local(use_layer_manager(manager));
    let overlay = StoredValue::new_local(OverlayRecord::<Element>::new());
    let state = RwSignal::new(ModalState::new());
    let added = StoredValue::new(false);
    let surface = NodeRef::<html::Div>::new();
    let has_transition = transition.is_some();

    let flags = move || ModalFlags {
        close_after_transition: close_after_transition.get_untracked().unwrap_or(false),
        disable_backdrop_click: disable_backdrop_click.get_untracked().unwrap_or(false),
        disable_escape_key_down: disable_escape_key_down.get_untracked().unwrap_or(false),
        disable_scroll_lock: disable_scroll_lock.get_untracked().unwrap_or(false),
    };

    let is_top = move || {
        manager
            .try_with_value(|m| {
                m.try_borrow()
                    .ok()
                    .and_then(|m| overlay.try_with_value(|o| m.is_top_modal(o)))
            })
            .flatten()
            .unwrap_or(false)
    };

    let sync_surface = move || {
        let node = surface.get_untracked().map(Element::from);
        overlay.with_value(|o| o.set_surface(node));
    };

    let handle_mounted = move || {
        let options = MountOptions {
            disable_scroll_lock: flags().disable_scroll_lock,
        };
        let result = manager.with_value(|m| overlay.with_value(|o| m.borrow_mut().mount(o, options)));
        if let Err(err) = result {
            log::error!("modal: {err}");
        }
        // Chrome does not always start at the top.
        if let Some(node) = surface.get_untracked() {
            node.set_scroll_top(0);
        }
    };

    // The portal host sits in its container once `on_attach` has run for
    // the current render. A host from an earlier render is detached.
    let is_attached = move || {
        overlay
            .try_with_value(|o| o.mount_node().is_some_and(|node| node.is_connected()))
            .unwrap_or(false)
    };

    let register = move |target: &Element| {
        if added.get_value() {
            return;
        }
        sync_surface();
        manager.with_value(|m| overlay.with_value(|o| m.borrow_mut().add(o, target)));
        added.set_value(true);
    };

    let handle_open = move || {
        let Some(target) = resolve_container(container) else {
            log::debug!("modal: container not ready, registering on attach");
            return;
        };
        register(&target);
        // Reopening with the content retained: no new attach will follow.
        if is_attached() {
            handle_mounted();
        }
    };

    let handle_close = move || {
        added.try_set_value(false);
        manager.try_with_value(|m| {
            overlay.try_with_value(|o| {
                if let Ok(mut m) = m.try_borrow_mut() {
                    m.remove(o);
                }
            })
        });
    };

    let on_attach = Callback::new(move |mount: PortalMount| {
        overlay.with_value(|o| o.set_mount_node(Some(mount.host)));
        sync_surface();
        if open.get_untracked() {
            register(&mount.container);
            if is_top() {
                handle_mounted();
                return;
            }
        }
        if let Some(node) = surface.get_untracked() {
            aria_hidden(&WebDocument, &Element::from(node), true);
        }
    });

    Effect::new(move |_| {
        let is_open = open.get();
        let action = state
            .try_update(|s| s.on_open_changed(is_open, has_transition, flags()))
            .flatten();
        match action {
            Some(ModalAction::Add) => handle_open(),
            Some(ModalAction::Remove) => handle_close(),
            None => {}
        }
    });

    on_cleanup(move || {
        if state.try_update(|s| s.on_unmount()).flatten().is_some() {
            handle_close();
        }
    });

    let transition_props = TransitionProps {
        shown: open,
        on_enter: Callback::new(move |_| state.update(|s| s.on_enter())),
        on_exited: Callback::new(move |_| {
            let action = state.try_update(|s| s.on_exited(flags())).flatten();
            if action == Some(ModalAction::Remove) {
                handle_close();
            }
        }),
    };

    let content = Callback::new(move |_: ()| match (transition, children.as_ref()) {
        (Some(render), _) => render.run(transition_props),
        (None, Some(children)) => children(),
        (None, None) => ().into_any(),
    });

    let handle_backdrop_click = move |ev: ev::MouseEvent| {
        let direct = match (ev.target(), ev.current_target()) {
            (Some(target), Some(current)) => target == current,
            _ => false,
        };
        let decision = backdrop_click(direct, flags());
        if !decision.notify {
            return;
        }
        if let Some(on_backdrop_click) = on_backdrop_click {
            on_backdrop_click.run(ev);
        }
        if decision.close {
            if let Some(on_close) = on_close {
                defer(move || on_close.run(CloseReason::BackdropClick));
            }
        }
    };

    let handle_key_down = move |ev: ev::KeyboardEvent| {
        let decision = escape_key_down(&ev.key(), is_top(), flags());
        if !decision.notify {
            return;
        }
        // Outer modals and body listeners must not see this Escape.
        if decision.stop_propagation {
            ev.stop_propagation();
        }
        if let Some(on_escape_key_down) = on_escape_key_down {
            on_escape_key_down.run(ev);
        }
        if decision.close {
            if let Some(on_close) = on_close {
                defer(move || on_close.run(CloseReason::EscapeKeyDown));
            }
        }
    };

    let should_render = move || {
        state.with(|s| s.should_render(open.get(), has_transition, keep_mounted.get().unwrap_or(false)))
    };

    let content_style = move || {
        if state.with(|s| s.is_hidden(open.get(), has_transition)) {
            format!("{CONTENT_STYLE} visibility: hidden;")
        } else {
            CONTENT_STYLE.to_string()
        }
    };

    view! {
        <Show when=should_render>
            <Portal container=container disable_portal=disable_portal on_attach=on_attach>
                <div
                    node_ref=surface
                    role="presentation"
                    class="layerkit-modal"
                    style=content_style
                    on:keydown=handle_key_down
                >
                    <Show when=move || !hide_backdrop.get().unwrap_or(false)>
                        <SimpleBackdrop open=open on_click=Callback::new(handle_backdrop_click) />
                    </Show>
                    <TrapFocus
                        open=open
                        disable_auto_focus=disable_auto_focus
                        disable_enforce_focus=disable_enforce_focus
                        disable_restore_focus=disable_restore_focus
                        is_enabled=Callback::new(move |_| is_top())
                    >
                        {content.run(())}
                    </TrapFocus>
                </div>
            </Portal>
        </Show>
    }
}
