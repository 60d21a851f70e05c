//! Leptos overlay components: [`Portal`], [`Modal`], [`Popper`] and
//! [`Tooltip`], built on the DOM-free logic in `layerkit-core`.

pub mod dom;
pub mod focus_visible;
pub mod manager;
pub mod modal;
pub mod popper;
pub mod portal;
#[cfg(feature = "demo")]
pub mod showcase;
pub mod tooltip;
pub mod transition;

pub use layerkit_core::geometry::{Layout, Modifier};
pub use layerkit_core::modal::CloseReason;
pub use layerkit_core::tooltip::TooltipConfig;
pub use layerkit_core::Placement;

pub use manager::{default_manager, provide_layer_manager, LayerManagerHandle};
pub use modal::{Modal, SimpleBackdrop, TrapFocus};
pub use popper::{AnchorEl, Popper};
pub use portal::{Portal, PortalMount};
pub use tooltip::{provide_hysteresis, HysteresisHandle, Tooltip};
pub use transition::{Fade, TransitionProps};

#[cfg(feature = "demo")]
use wasm_bindgen::prelude::wasm_bindgen;

#[cfg(feature = "demo")]
#[wasm_bindgen(start)]
pub fn start() {
    // initializes logging using the `log` crate
    _ = console_log::init_with_level(log::Level::Debug);
    console_error_panic_hook::set_once();

    leptos::mount::mount_to_body(showcase::Showcase);
}
