//! Hover, focus and long-press label anchored to a single child element.

mod arrow;

pub use arrow::{TooltipArrow, ARROW_SIZE};

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use layerkit_core::geometry::{default_modifiers, Layout, Modifier};
use layerkit_core::placement::Side;
use layerkit_core::popper::PopperContext;
use layerkit_core::shared_ref::SharedRef;
use layerkit_core::tooltip::{
    EnterSource, Hysteresis, Scheduler, SharedHysteresis, TooltipChange, TooltipConfig,
    TooltipMachine, TooltipTimer,
};
use layerkit_core::Placement;
use leptos::html;
use leptos::prelude::*;
use uuid::Uuid;
use web_sys::{Element, Event};

use crate::dom::{now, EventListenerGuard, Listeners};
use crate::focus_visible::{use_is_focus_visible, FocusVisibleHandle};
use crate::popper::{AnchorEl, Popper};
use crate::transition::{Fade, TransitionProps};

const TRANSITION_MS: u32 = 150;

thread_local! {
    static DEFAULT_HYSTERESIS: SharedHysteresis = Hysteresis::shared();
}

/// The hysteresis shared by tooltips that set none of their own.
pub fn default_hysteresis() -> SharedHysteresis {
    DEFAULT_HYSTERESIS.with(Rc::clone)
}

/// Group of tooltips that hand off to each other without delay.
#[derive(Clone, Copy)]
pub struct HysteresisHandle(StoredValue<SharedHysteresis, LocalStorage>);

impl HysteresisHandle {
    pub fn new(shared: SharedHysteresis) -> Self {
        Self(StoredValue::new_local(shared))
    }

    pub fn get(&self) -> SharedHysteresis {
        self.0.try_get_value().unwrap_or_else(default_hysteresis)
    }

    pub fn reset(&self) {
        self.get().borrow_mut().reset();
    }
}

pub fn provide_hysteresis(handle: HysteresisHandle) {
    provide_context(handle);
}

fn use_hysteresis(explicit: Option<HysteresisHandle>) -> SharedHysteresis {
    explicit
        .or_else(use_context::<HysteresisHandle>)
        .map(|handle| handle.get())
        .unwrap_or_else(default_hysteresis)
}

/// Browser timeouts, one per slot. Dropping a `Timeout` clears it.
#[derive(Default)]
struct TimerSlots {
    timers: HashMap<TooltipTimer, Timeout>,
    on_fire: Option<Rc<dyn Fn(TooltipTimer)>>,
}

impl Scheduler for TimerSlots {
    fn schedule(&mut self, timer: TooltipTimer, delay_ms: u32) {
        let Some(on_fire) = self.on_fire.clone() else {
            return;
        };
        self.timers
            .insert(timer, Timeout::new(delay_ms, move || on_fire(timer)));
    }

    fn cancel(&mut self, timer: TooltipTimer) {
        self.timers.remove(&timer);
    }
}

struct Runtime {
    machine: RefCell<TooltipMachine>,
    timers: RefCell<TimerSlots>,
}

impl Runtime {
    fn run(
        &self,
        f: impl FnOnce(&mut TooltipMachine, &mut TimerSlots) -> Option<TooltipChange>,
    ) -> Option<TooltipChange> {
        let (Ok(mut machine), Ok(mut timers)) =
            (self.machine.try_borrow_mut(), self.timers.try_borrow_mut())
        else {
            log::warn!("tooltip: re-entrant event ignored");
            return None;
        };
        f(&mut machine, &mut timers)
    }
}

/// Event entry points shared by the child and the interactive surface.
#[derive(Clone, Copy)]
struct Triggers {
    runtime: StoredValue<Rc<Runtime>, LocalStorage>,
    child: RwSignal<Option<Element>, LocalStorage>,
    open_state: RwSignal<bool>,
    controlled: bool,
    on_open: Option<Callback<()>>,
    on_close: Option<Callback<()>>,
    focus_visible: FocusVisibleHandle,
}

impl Triggers {
    // Changes are applied after the machine is released.
    fn run(
        &self,
        f: impl FnOnce(&mut TooltipMachine, &mut TimerSlots) -> Option<TooltipChange>,
    ) {
        let change = self.runtime.try_with_value(|rt| rt.run(f)).flatten();
        match change {
            Some(TooltipChange::Opened) => {
                if !self.controlled {
                    self.open_state.set(true);
                }
                if let Some(on_open) = self.on_open {
                    on_open.run(());
                }
            }
            Some(TooltipChange::Closed) => {
                if !self.controlled {
                    self.open_state.set(false);
                }
                if let Some(on_close) = self.on_close {
                    on_close.run(());
                }
            }
            None => {}
        }
    }

    fn accepts(&self, source: EnterSource) -> bool {
        self.runtime
            .try_with_value(|rt| rt.machine.try_borrow().map(|m| m.accepts(source)).unwrap_or(false))
            .unwrap_or(false)
    }

    /// Drop the native title early so two tooltips never show at once.
    fn remove_title(&self) {
        if let Some(child) = self.child.try_get_untracked().flatten() {
            let _ = child.remove_attribute("title");
        }
    }

    fn enter(&self, source: EnterSource) {
        if self.accepts(source) {
            self.remove_title();
        }
        self.run(|m, t| m.enter(source, now(), t));
    }

    fn leave(&self) {
        self.run(|m, t| {
            m.leave(t);
            None
        });
    }

    fn focus(&self, event: &Event) {
        let visible = self.focus_visible.is_focus_visible(event);
        if visible && self.accepts(EnterSource::Focus) {
            self.remove_title();
        }
        self.run(|m, t| m.focus(visible, now(), t));
    }

    fn blur(&self) {
        let mut was_visible = false;
        self.run(|m, t| {
            was_visible = m.blur(t);
            None
        });
        if was_visible {
            self.focus_visible.on_blur_visible();
        }
    }

    fn touch_start(&self) {
        self.run(|m, t| {
            m.touch_start(t);
            None
        });
    }

    fn touch_end(&self) {
        self.run(|m, t| {
            m.touch_end(t);
            None
        });
    }

    fn fire(&self, timer: TooltipTimer) {
        if timer == TooltipTimer::Touch {
            self.remove_title();
        }
        self.run(|m, t| {
            t.timers.remove(&timer);
            m.fire(timer, now(), t)
        });
    }

    fn unmount(&self) {
        self.run(|m, t| {
            m.unmount(t);
            None
        });
    }

    fn pending_timers(&self) -> usize {
        self.runtime
            .try_with_value(|rt| rt.timers.try_borrow().map(|t| t.timers.len()).unwrap_or(0))
            .unwrap_or(0)
    }
}

fn listen(target: &Element, triggers: Triggers, config: &TooltipConfig, touch: bool) -> Listeners {
    let mut listeners = Listeners::default();
    if touch && !config.disable_touch_listener {
        listeners.push(EventListenerGuard::new(target, "touchstart", false, move |_| {
            triggers.touch_start()
        }));
        listeners.push(EventListenerGuard::new(target, "touchend", false, move |_| {
            triggers.touch_end()
        }));
    }
    if !config.disable_hover_listener {
        listeners.push(EventListenerGuard::new(target, "mouseover", false, move |_| {
            triggers.enter(EnterSource::Mouse)
        }));
        listeners.push(EventListenerGuard::new(target, "mouseleave", false, move |_| {
            triggers.leave()
        }));
    }
    if !config.disable_focus_listener {
        listeners.push(EventListenerGuard::new(target, "focusin", false, move |event| {
            triggers.focus(&event)
        }));
        listeners.push(EventListenerGuard::new(target, "focusout", false, move |_| {
            triggers.blur()
        }));
    }
    listeners
}

fn content_style(side: Side, interactive: bool) -> String {
    let origin = match side {
        Side::Bottom => "center top",
        Side::Top => "center bottom",
        Side::Right => "left center",
        Side::Left => "right center",
    };
    let (padding, font_size) = if interactive {
        ("8px 16px", "14px")
    } else {
        ("4px 8px", "12px")
    };
    format!(
        "position: relative; background-color: #000; border-radius: 4px; color: #fff; \
         font-family: \"Roboto\", sans-serif; padding: {padding}; font-size: {font_size}; \
         max-width: 300px; overflow-wrap: break-word; transform-origin: {origin};"
    )
}

#[component]
pub fn Tooltip(
    /// Label text. An empty title never opens.
    #[prop(into)]
    title: Signal<String>,
    /// Base settings; the individual props below override it.
    #[prop(optional)]
    config: Option<TooltipConfig>,
    #[prop(optional)] arrow: Option<bool>,
    #[prop(optional)] disable_focus_listener: Option<bool>,
    #[prop(optional)] disable_hover_listener: Option<bool>,
    #[prop(optional)] disable_touch_listener: Option<bool>,
    #[prop(optional)] enter_delay: Option<u32>,
    #[prop(optional)] enter_touch_delay: Option<u32>,
    /// Keep the tooltip open while the pointer is over it.
    #[prop(optional)]
    interactive: Option<bool>,
    #[prop(optional)] leave_delay: Option<u32>,
    #[prop(optional)] leave_touch_delay: Option<u32>,
    #[prop(optional)] placement: Option<Placement>,
    /// Defaults to a generated `tooltip-<uuid>`.
    #[prop(optional, into)]
    id: MaybeProp<String>,
    /// Controlled open state. Fixed as controlled or not at first render.
    #[prop(optional, into)]
    open: MaybeProp<bool>,
    #[prop(optional)] on_open: Option<Callback<()>>,
    #[prop(optional)] on_close: Option<Callback<()>>,
    #[prop(optional)] hysteresis: Option<HysteresisHandle>,
    children: Children,
) -> impl IntoView {
    let base = config.unwrap_or_default();
    let config = TooltipConfig {
        arrow: arrow.unwrap_or(base.arrow),
        disable_focus_listener: disable_focus_listener.unwrap_or(base.disable_focus_listener),
        disable_hover_listener: disable_hover_listener.unwrap_or(base.disable_hover_listener),
        disable_touch_listener: disable_touch_listener.unwrap_or(base.disable_touch_listener),
        enter_delay: enter_delay.unwrap_or(base.enter_delay),
        enter_touch_delay: enter_touch_delay.unwrap_or(base.enter_touch_delay),
        interactive: interactive.unwrap_or(base.interactive),
        leave_delay: leave_delay.unwrap_or(base.leave_delay),
        leave_touch_delay: leave_touch_delay.unwrap_or(base.leave_touch_delay),
        placement: placement.unwrap_or(base.placement),
    };

    let default_id = StoredValue::new(format!("tooltip-{}", Uuid::new_v4()));
    let tooltip_id = move || id.get().unwrap_or_else(|| default_id.get_value());
    let controlled = open.get_untracked().is_some();

    let runtime = StoredValue::new_local(Rc::new(Runtime {
        machine: RefCell::new(TooltipMachine::new(config.clone(), use_hysteresis(hysteresis))),
        timers: RefCell::new(TimerSlots::default()),
    }));
    let triggers = Triggers {
        runtime,
        child: RwSignal::new_local(None),
        open_state: RwSignal::new(false),
        controlled,
        on_open,
        on_close,
        focus_visible: use_is_focus_visible(),
    };
    runtime.with_value(|rt| {
        rt.timers.borrow_mut().on_fire = Some(Rc::new(move |timer: TooltipTimer| triggers.fire(timer)));
    });

    let child = triggers.child;
    let open_state = triggers.open_state;
    let is_open = move || {
        open_state.track();
        let controlled_open = controlled.then(|| open.get().unwrap_or(false));
        let title_empty = title.with(String::is_empty);
        runtime
            .try_with_value(|rt| {
                rt.machine
                    .try_borrow()
                    .map(|m| m.is_open(controlled_open, title_empty))
                    .unwrap_or(false)
            })
            .unwrap_or(false)
    };

    let marker = NodeRef::<html::Template>::new();
    let floating = NodeRef::<html::Div>::new();
    let child_listeners = StoredValue::new_local(Listeners::default());
    let surface_listeners = StoredValue::new_local(Listeners::default());
    let arrow_offset = RwSignal::new(None::<f64>);

    // One ref to the child, fanned out to the trigger listeners and the
    // reactive copy everything else reads.
    let child_ref = StoredValue::new_local(SharedRef::<Element>::new());
    let child_config = config.clone();
    child_ref.with_value(|r| {
        r.observe(move |el: Option<&Element>| {
            if let Some(el) = el {
                triggers.focus_visible.attach(el);
            }
            let listeners = el
                .map(|el| listen(el, triggers, &child_config, true))
                .unwrap_or_default();
            child_listeners.try_set_value(listeners);
        });
        r.observe(move |el: Option<&Element>| {
            child.try_set(el.cloned());
        });
    });

    // The child is the first element rendered after the marker.
    Effect::new(move |_| {
        let Some(marker) = marker.get() else {
            return;
        };
        let Some(el) = marker.next_element_sibling() else {
            log::warn!("tooltip: children rendered no element to attach to");
            return;
        };
        if child.get_untracked().as_ref() != Some(&el) {
            child_ref.with_value(|r| r.set(Some(el)));
        }
    });

    let surface_config = config.clone();
    Effect::new(move |_| {
        let node = floating.get();
        let listeners = match node {
            Some(node) if surface_config.interactive => {
                listen(&Element::from(node), triggers, &surface_config, false)
            }
            _ => Listeners::default(),
        };
        surface_listeners.set_value(listeners);
    });

    Effect::new(move |_| {
        let Some(el) = child.get() else {
            return;
        };
        let shown = is_open();
        let text = title.get();
        let native = runtime
            .try_with_value(|rt| {
                rt.machine
                    .try_borrow()
                    .map(|m| m.show_native_title(shown))
                    .unwrap_or(false)
            })
            .unwrap_or(false);
        if native && !text.is_empty() {
            let _ = el.set_attribute("title", &text);
        } else {
            let _ = el.remove_attribute("title");
        }
        if shown {
            let _ = el.set_attribute("aria-describedby", &tooltip_id());
        } else {
            let _ = el.remove_attribute("aria-describedby");
        }
    });

    on_cleanup(move || {
        triggers.unmount();
        if triggers.pending_timers() > 0 {
            log::warn!("tooltip: timers still pending after unmount");
        }
        child_ref.try_with_value(SharedRef::clear);
        child_listeners.try_update_value(Listeners::clear);
        surface_listeners.try_update_value(Listeners::clear);
    });

    let interactive = config.interactive;
    let show_arrow = config.arrow;
    let gap = if show_arrow { 6.0 } else { 4.0 };
    let mut modifiers = vec![Modifier::Offset {
        skidding: 0.0,
        distance: gap,
    }];
    modifiers.extend(default_modifiers());
    if show_arrow {
        modifiers.push(Modifier::Arrow { size: ARROW_SIZE });
    }
    let popper_style = format!(
        "z-index: 15; pointer-events: {};",
        if interactive { "auto" } else { "none" }
    );

    let on_layout = Callback::new(move |layout: Layout| {
        if arrow_offset.get_untracked() != layout.arrow {
            arrow_offset.set(layout.arrow);
        }
    });

    let render = Callback::new(move |ctx: PopperContext<TransitionProps>| {
        let side = ctx.placement.side();
        let bubble = view! {
            <div class="layerkit-tooltip" style=content_style(side, interactive)>
                {move || title.get()}
                {show_arrow.then(|| view! { <TooltipArrow side=side offset=arrow_offset /> })}
            </div>
        };
        match ctx.transition {
            Some(tp) => view! {
                <Fade
                    shown=tp.shown
                    timeout=TRANSITION_MS
                    on_enter=tp.on_enter
                    on_exited=tp.on_exited
                >
                    {bubble}
                </Fade>
            }
            .into_any(),
            None => bubble.into_any(),
        }
    });

    view! {
        <template node_ref=marker></template>
        {children()}
        <Popper
            open=Signal::derive(move || child.with(Option::is_some) && is_open())
            anchor=Callback::new(move |_| child.get().map(AnchorEl::Element))
            placement=config.placement
            modifiers=modifiers
            transition=true
            id=Signal::derive(move || Some(tooltip_id()))
            style=popper_style
            floating_ref=floating
            on_layout=on_layout
            render=render
        />
    }
}
