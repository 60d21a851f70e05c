use leptos::ev;
use leptos::prelude::*;

fn backdrop_style(invisible: bool) -> String {
    let background = if invisible {
        "transparent"
    } else {
        "rgba(0, 0, 0, 0.5)"
    };
    format!(
        "z-index: -1; position: fixed; inset: 0; background-color: {background}; \
         -webkit-tap-highlight-color: transparent;"
    )
}

/// Dimmed full-screen layer behind a modal.
#[component]
pub fn SimpleBackdrop(
    #[prop(into)] open: Signal<bool>,
    /// Keep the click target but drop the tint.
    #[prop(optional, into)]
    invisible: MaybeProp<bool>,
    #[prop(optional)] on_click: Option<Callback<ev::MouseEvent>>,
) -> impl IntoView {
    view! {
        <Show when=move || open.get()>
            <div
                aria-hidden="true"
                class="layerkit-backdrop"
                style=move || backdrop_style(invisible.get().unwrap_or(false))
                on:click=move |ev| {
                    if let Some(on_click) = on_click {
                        on_click.run(ev);
                    }
                }
            ></div>
        </Show>
    }
}
