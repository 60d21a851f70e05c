//! Transition contract handed to animated content, and the `Fade`
//! component that fulfils it.

use gloo_timers::callback::Timeout;
use layerkit_core::transition::{
    create, duration, TransitionEvent, TransitionPhase, TransitionState, TransitionTiming,
};
use leptos::prelude::*;

/// What an orchestrating component (Modal, Popper) gives its transition.
/// `on_exited` must fire exactly once per exit; removal waits on it.
#[derive(Clone, Copy)]
pub struct TransitionProps {
    pub shown: Signal<bool>,
    pub on_enter: Callback<()>,
    pub on_exited: Callback<()>,
}

#[component]
pub fn Fade(
    #[prop(into)] shown: Signal<bool>,
    /// Duration in milliseconds. Defaults to the entering-screen duration.
    #[prop(optional)]
    timeout: Option<u32>,
    /// Animate on first render when initially shown. Overlay content is
    /// created already shown, so this defaults to on.
    #[prop(default = true)]
    appear: bool,
    #[prop(optional)] on_enter: Option<Callback<()>>,
    #[prop(optional)] on_entered: Option<Callback<()>>,
    #[prop(optional)] on_exit: Option<Callback<()>>,
    #[prop(optional)] on_exited: Option<Callback<()>>,
    children: Children,
) -> impl IntoView {
    let timeout = timeout.unwrap_or(duration::ENTERING_SCREEN);
    let state = StoredValue::new(TransitionState::new(shown.get_untracked(), appear));
    let phase = RwSignal::new(state.with_value(|s| s.phase()));
    let pending = StoredValue::new_local(None::<Timeout>);

    let dispatch = move |event: TransitionEvent| {
        let callback = match event {
            TransitionEvent::Enter { .. } => on_enter,
            TransitionEvent::Entered => on_entered,
            TransitionEvent::Exit => on_exit,
            TransitionEvent::Exited => on_exited,
            TransitionEvent::Entering | TransitionEvent::Exiting => None,
        };
        if let Some(callback) = callback {
            callback.run(());
        }
    };

    Effect::new(move |_| {
        let is_shown = shown.get();
        let events = state
            .try_update_value(|s| s.set_in(is_shown))
            .unwrap_or_default();
        if events.is_empty() {
            return;
        }
        for event in events {
            dispatch(event);
        }
        phase.set(state.with_value(|s| s.phase()));

        // Replacing the pending timer cancels it.
        pending.set_value(Some(Timeout::new(timeout, move || {
            let finished = state.try_update_value(|s| s.complete()).flatten();
            if let Some(event) = finished {
                phase.set(state.with_value(|s| s.phase()));
                dispatch(event);
            }
        })));
    });

    on_cleanup(move || {
        pending.try_update_value(|timer| timer.take());
    });

    let style = move || {
        let visible = matches!(
            phase.get(),
            TransitionPhase::Entering | TransitionPhase::Entered
        );
        let transition = create(
            &["opacity"],
            TransitionTiming {
                duration: f64::from(timeout),
                ..TransitionTiming::default()
            },
        );
        let hidden = if phase.get() == TransitionPhase::Exited && !shown.get() {
            " visibility: hidden;"
        } else {
            ""
        };
        format!(
            "opacity: {}; transition: {transition};{hidden}",
            if visible { 1 } else { 0 }
        )
    };

    view! { <div class="layerkit-fade" style=style>{children()}</div> }
}
