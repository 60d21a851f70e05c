//! Platform-independent machinery behind the layerkit overlay primitives.
//!
//! Nothing in here touches `web_sys`. DOM access goes through the
//! [`dom::Document`] trait so the registry, focus trap and positioning
//! logic can be driven by a real browser document or by an in-memory fake.

pub mod anchor;
pub mod aria;
pub mod dom;
pub mod error;
pub mod focus_trap;
pub mod focus_visible;
pub mod geometry;
pub mod layer_manager;
pub mod modal;
pub mod placement;
pub mod popper;
pub mod scroll_lock;
pub mod shared_ref;
pub mod tooltip;
pub mod transition;

#[cfg(test)]
pub(crate) mod fake_dom;

pub use error::LayerError;
pub use layer_manager::{LayerManager, MountOptions, OverlayRecord};
pub use placement::Placement;
