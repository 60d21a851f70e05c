use layerkit_core::placement::Side;
use leptos::prelude::*;

/// Base width of the arrow triangle, in pixels.
pub const ARROW_SIZE: f64 = 8.0;

fn arrow_style(side: Side, offset: Option<f64>) -> String {
    let half = ARROW_SIZE / 2.0;
    // The arrow sits on the edge facing the anchor and points at it.
    let edge = match side {
        Side::Bottom => format!(
            "top: 0; margin-top: -{half}px; border-width: 0 {half}px {half}px {half}px; \
             border-color: transparent transparent currentcolor transparent;"
        ),
        Side::Top => format!(
            "bottom: 0; margin-bottom: -{half}px; border-width: {half}px {half}px 0 {half}px; \
             border-color: currentcolor transparent transparent transparent;"
        ),
        Side::Right => format!(
            "left: 0; margin-left: -{half}px; border-width: {half}px {half}px {half}px 0; \
             border-color: transparent currentcolor transparent transparent;"
        ),
        Side::Left => format!(
            "right: 0; margin-right: -{half}px; border-width: {half}px 0 {half}px {half}px; \
             border-color: transparent transparent transparent currentcolor;"
        ),
    };
    let along = match (offset, side.is_vertical()) {
        (Some(offset), true) => format!(" left: {}px;", offset.round()),
        (Some(offset), false) => format!(" top: {}px;", offset.round()),
        (None, _) => String::new(),
    };
    format!(
        "position: absolute; width: 0; height: 0; border-style: solid; color: #000; {edge}{along}"
    )
}

#[component]
pub fn TooltipArrow(
    side: Side,
    /// Offset along the edge, from the arrow modifier.
    #[prop(into)]
    offset: Signal<Option<f64>>,
) -> impl IntoView {
    view! {
        <span class="layerkit-tooltip-arrow" style=move || arrow_style(side, offset.get())></span>
    }
}
