//! Demo page exercising every overlay. Mounted by [`crate::start`].

use layerkit_core::popper::PopperContext;
use layerkit_core::tooltip::TooltipConfig;
use layerkit_core::Placement;
use leptos::html;
use leptos::prelude::*;
use web_sys::Element;

use crate::modal::Modal;
use crate::popper::{AnchorEl, Popper};
use crate::tooltip::Tooltip;
use crate::transition::{Fade, TransitionProps};
use crate::CloseReason;

// Hosts keep tooltip defaults in their own settings; this one is inline.
const TOOLTIP_SETTINGS: &str =
    r#"{ "arrow": true, "enter_delay": 100, "leave_delay": 50, "placement": "top" }"#;

const DIALOG_STYLE: &str = "position: absolute; top: 50%; left: 50%; \
    transform: translate(-50%, -50%); background: #fff; padding: 24px; \
    border-radius: 8px; min-width: 320px; display: flex; flex-direction: column; gap: 12px;";

const MENU_STYLE: &str = "margin: 0; padding: 8px 0; list-style: none; background: #fff; \
    border: 1px solid #ccc; border-radius: 4px; box-shadow: 0 2px 8px rgba(0,0,0,.2);";

fn tooltip_settings() -> TooltipConfig {
    serde_json::from_str(TOOLTIP_SETTINGS).unwrap_or_else(|err| {
        log::warn!("showcase: invalid tooltip settings, using defaults: {err}");
        TooltipConfig::default()
    })
}

fn close_with(open: RwSignal<bool>, name: &'static str) -> Callback<CloseReason> {
    Callback::new(move |reason: CloseReason| {
        log::debug!("{name} closed by {}", reason.as_str());
        open.set(false);
    })
}

#[component]
pub fn Showcase() -> impl IntoView {
    let settings = tooltip_settings();
    let dialog_open = RwSignal::new(false);
    let nested_open = RwSignal::new(false);
    let menu_open = RwSignal::new(false);
    let placement_index = RwSignal::new(0usize);
    let menu_anchor = NodeRef::<html::Button>::new();

    let placement = move || Placement::all()[placement_index.get() % Placement::all().len()];
    let anchor = Callback::new(move |_| {
        menu_anchor
            .get_untracked()
            .map(|button| AnchorEl::from(Element::from(button)))
    });

    let nested = Callback::new(move |tp: TransitionProps| {
        view! {
            <Fade shown=tp.shown on_enter=tp.on_enter on_exited=tp.on_exited>
                <div style=DIALOG_STYLE>
                    <h3>"Nested dialog"</h3>
                    <p>"Escape closes only this one."</p>
                    <button on:click=move |_| nested_open.set(false)>"Back"</button>
                </div>
            </Fade>
        }
        .into_any()
    });

    view! {
        <main style="padding: 32px; font-family: sans-serif; display: grid; gap: 32px;">
            <h1>"layerkit"</h1>

            <section>
                <h2>"Tooltip"</h2>
                <Tooltip title="Saves the current draft".to_string() config=settings.clone()>
                    <button>"Save"</button>
                </Tooltip>
                " "
                <Tooltip
                    title="Hover here too; this one stays open".to_string()
                    config=settings
                    interactive=true
                >
                    <button>"Details"</button>
                </Tooltip>
                " "
                <Tooltip title=String::new()>
                    <button title="native only">"No title"</button>
                </Tooltip>
            </section>

            <section>
                <h2>"Popper"</h2>
                <button node_ref=menu_anchor on:click=move |_| menu_open.update(|open| *open = !*open)>
                    "Toggle menu"
                </button>
                " "
                <button on:click=move |_| placement_index.update(|i| *i += 1)>
                    {move || format!("Placement: {}", placement().as_str())}
                </button>
                <Popper
                    open=menu_open
                    anchor=anchor
                    placement=Signal::derive(move || Some(placement()))
                    render=Callback::new(move |ctx: PopperContext<TransitionProps>| {
                        view! {
                            <ul style=MENU_STYLE>
                                <li>{format!("Resolved: {}", ctx.placement.as_str())}</li>
                                <li>"Scroll or resize to reposition"</li>
                            </ul>
                        }
                        .into_any()
                    })
                />
            </section>

            <section>
                <h2>"Modal"</h2>
                <button on:click=move |_| dialog_open.set(true)>"Open dialog"</button>
                <Modal open=dialog_open on_close=close_with(dialog_open, "dialog")>
                    <div style=DIALOG_STYLE>
                        <h3>"Dialog"</h3>
                        <input placeholder="Tab stays inside" />
                        <button on:click=move |_| nested_open.set(true)>"Open nested"</button>
                        <button on:click=move |_| dialog_open.set(false)>"Close"</button>
                    </div>
                </Modal>
                <Modal
                    open=nested_open
                    on_close=close_with(nested_open, "nested dialog")
                    close_after_transition=true
                    transition=nested
                />
            </section>
        </main>
    }
}
