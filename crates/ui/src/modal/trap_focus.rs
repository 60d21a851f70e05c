use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo_timers::callback::Interval;
use layerkit_core::focus_trap::{FocusTrap, FocusTrapOptions, KeyPress, FOCUS_POLL_INTERVAL_MS};
use leptos::html;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, KeyboardEvent};

use crate::dom::{document, EventListenerGuard, Listeners, WebDocument};

type SharedTrap = Rc<RefCell<FocusTrap<Element>>>;

thread_local! {
    static ACTIVE_SESSIONS: Cell<usize> = const { Cell::new(0) };
}

/// Traps currently holding document listeners and a focus poll.
pub fn active_trap_count() -> usize {
    ACTIVE_SESSIONS.with(Cell::get)
}

/// Timers and listeners alive while the trap is active.
struct Session {
    listeners: Listeners,
    poll: Option<Interval>,
}

impl Session {
    fn new() -> Self {
        ACTIVE_SESSIONS.with(|n| n.set(n.get() + 1));
        Self {
            listeners: Listeners::default(),
            poll: None,
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        ACTIVE_SESSIONS.with(|n| n.set(n.get().saturating_sub(1)));
    }
}

// Focus moves made by the trap dispatch `focus` synchronously, re-entering
// these handlers while the trap is borrowed. Those re-entrant calls are
// skipped.
fn contain(trap: &SharedTrap, is_enabled: Callback<(), bool>) {
    let enabled = is_enabled.try_run(()).unwrap_or(false);
    if let Ok(mut trap) = trap.try_borrow_mut() {
        trap.contain(&WebDocument, enabled);
    }
}

fn start(trap: &SharedTrap, is_enabled: Callback<(), bool>) -> Session {
    let mut session = Session::new();
    if let Ok(mut t) = trap.try_borrow_mut() {
        t.activate(&WebDocument);
    }
    let Some(doc) = document() else {
        return session;
    };

    let on_focus = Rc::clone(trap);
    session.listeners.push(EventListenerGuard::new(&doc, "focus", true, move |_| {
        contain(&on_focus, is_enabled);
    }));

    let on_key = Rc::clone(trap);
    session.listeners.push(EventListenerGuard::new(&doc, "keydown", true, move |event| {
        let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        let enabled = is_enabled.try_run(()).unwrap_or(false);
        let key = event.key();
        if let Ok(mut trap) = on_key.try_borrow_mut() {
            trap.handle_key(
                &WebDocument,
                KeyPress {
                    key: &key,
                    shift: event.shift_key(),
                },
                enabled,
            );
        }
    }));

    // Browsers fire nothing when the focused element stops being focusable.
    let on_tick = Rc::clone(trap);
    session.poll = Some(Interval::new(FOCUS_POLL_INTERVAL_MS, move || {
        contain(&on_tick, is_enabled);
    }));
    session
}

fn stop(trap: &SharedTrap, session: Option<Session>) {
    // Listeners go first so restoring focus does not re-enter them.
    drop(session);
    if let Ok(mut trap) = trap.try_borrow_mut() {
        if trap.is_active() {
            trap.deactivate(&WebDocument);
        }
    }
}

/// Keeps keyboard focus inside its children while `open`.
#[component]
pub fn TrapFocus(
    #[prop(into)] open: Signal<bool>,
    #[prop(optional, into)] disable_auto_focus: MaybeProp<bool>,
    #[prop(optional, into)] disable_enforce_focus: MaybeProp<bool>,
    #[prop(optional, into)] disable_restore_focus: MaybeProp<bool>,
    /// False while another overlay is on top of this one.
    is_enabled: Callback<(), bool>,
    children: Children,
) -> impl IntoView {
    let sentinel_start = NodeRef::<html::Div>::new();
    let sentinel_end = NodeRef::<html::Div>::new();
    let root = NodeRef::<html::Div>::new();

    let trap: SharedTrap = Rc::new(RefCell::new(FocusTrap::new(FocusTrapOptions::default())));
    // Capture before anything rendered below can move focus.
    if open.get_untracked() {
        trap.borrow_mut().capture(&WebDocument);
    }
    let trap = StoredValue::new_local(trap);
    let session = StoredValue::new_local(None::<Session>);

    Effect::new(move |was_open: Option<bool>| {
        let is_open = open.get();
        let options = FocusTrapOptions {
            disable_auto_focus: disable_auto_focus.get().unwrap_or(false),
            disable_enforce_focus: disable_enforce_focus.get().unwrap_or(false),
            disable_restore_focus: disable_restore_focus.get().unwrap_or(false),
        };
        let root = root.get().map(Element::from);
        let start_node = sentinel_start.get().map(Element::from);
        let end_node = sentinel_end.get().map(Element::from);
        let Some(trap) = trap.try_get_value() else {
            return is_open;
        };

        {
            let Ok(mut t) = trap.try_borrow_mut() else {
                return is_open;
            };
            if is_open && was_open == Some(false) {
                t.capture(&WebDocument);
            }
            t.set_options(options);
            t.set_root(root.clone());
            t.set_sentinels(start_node, end_node);
        }

        let active = session.with_value(Option::is_some);
        if is_open && !active && root.is_some() {
            session.set_value(Some(start(&trap, is_enabled)));
        } else if !is_open && active {
            let previous = session.try_update_value(Option::take).flatten();
            stop(&trap, previous);
        }
        is_open
    });

    on_cleanup(move || {
        let previous = session.try_update_value(Option::take).flatten();
        if let Some(trap) = trap.try_get_value() {
            stop(&trap, previous);
        }
    });

    view! {
        <div tabindex="0" node_ref=sentinel_start data-layerkit-sentinel="start"></div>
        <div tabindex="-1" node_ref=root class="layerkit-trap-root">
            {children()}
        </div>
        <div tabindex="0" node_ref=sentinel_end data-layerkit-sentinel="end"></div>
    }
}
