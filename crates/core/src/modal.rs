//! Lifecycle and dismissal decisions for modal dialogs.
//!
//! The UI layer owns the DOM; this module decides when an overlay joins or
//! leaves the [`LayerManager`](crate::LayerManager) and whether a backdrop
//! click or an Escape press should close it.

use serde::{Deserialize, Serialize};

/// Why a modal asked to be closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CloseReason {
    BackdropClick,
    EscapeKeyDown,
}

impl CloseReason {
    pub fn as_str(self) -> &'static str {
        match self {
            CloseReason::BackdropClick => "backdropClick",
            CloseReason::EscapeKeyDown => "escapeKeyDown",
        }
    }
}

/// Registration change to apply to the layer manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalAction {
    Add,
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModalFlags {
    pub close_after_transition: bool,
    pub disable_backdrop_click: bool,
    pub disable_escape_key_down: bool,
    pub disable_scroll_lock: bool,
}

#[derive(Debug, Clone)]
pub struct ModalState {
    exited: bool,
    registered: bool,
}

impl Default for ModalState {
    fn default() -> Self {
        Self::new()
    }
}

impl ModalState {
    pub fn new() -> Self {
        Self {
            exited: true,
            registered: false,
        }
    }

    pub fn exited(&self) -> bool {
        self.exited
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Opening always registers. Closing unregisters right away unless a
    /// transition is running and the modal waits for it.
    pub fn on_open_changed(
        &mut self,
        open: bool,
        has_transition: bool,
        flags: ModalFlags,
    ) -> Option<ModalAction> {
        if open {
            if self.registered {
                return None;
            }
            self.registered = true;
            return Some(ModalAction::Add);
        }
        if !self.registered {
            return None;
        }
        if has_transition && flags.close_after_transition {
            return None;
        }
        self.registered = false;
        Some(ModalAction::Remove)
    }

    pub fn on_enter(&mut self) {
        self.exited = false;
    }

    /// Returns `Some(Remove)` when the unregistration was deferred to the
    /// end of the exit transition.
    pub fn on_exited(&mut self, flags: ModalFlags) -> Option<ModalAction> {
        self.exited = true;
        if flags.close_after_transition && self.registered {
            self.registered = false;
            Some(ModalAction::Remove)
        } else {
            None
        }
    }

    /// Unmounting while registered must still unregister.
    pub fn on_unmount(&mut self) -> Option<ModalAction> {
        if self.registered {
            self.registered = false;
            Some(ModalAction::Remove)
        } else {
            None
        }
    }

    pub fn should_render(&self, open: bool, has_transition: bool, keep_mounted: bool) -> bool {
        open || keep_mounted || (has_transition && !self.exited)
    }

    /// Retained but closed content is kept out of layout and the
    /// accessibility tree.
    pub fn is_hidden(&self, open: bool, has_transition: bool) -> bool {
        !open && (!has_transition || self.exited)
    }
}

/// What to do with a backdrop click. Only clicks that land on the backdrop
/// itself count, not ones that bubble up from the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dismissal {
    pub notify: bool,
    pub close: bool,
    pub stop_propagation: bool,
}

pub fn backdrop_click(target_is_backdrop: bool, flags: ModalFlags) -> Dismissal {
    if !target_is_backdrop {
        return Dismissal::default();
    }
    Dismissal {
        notify: true,
        close: !flags.disable_backdrop_click,
        stop_propagation: false,
    }
}

/// Escape is only handled by the topmost modal; the event stops there so
/// outer modals do not also close.
pub fn escape_key_down(key: &str, is_top: bool, flags: ModalFlags) -> Dismissal {
    if key != "Escape" || !is_top {
        return Dismissal::default();
    }
    Dismissal {
        notify: true,
        close: !flags.disable_escape_key_down,
        stop_propagation: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_close_without_transition() {
        let mut state = ModalState::new();
        let flags = ModalFlags::default();

        assert_eq!(state.on_open_changed(true, false, flags), Some(ModalAction::Add));
        assert_eq!(state.on_open_changed(true, false, flags), None);
        assert_eq!(state.on_open_changed(false, false, flags), Some(ModalAction::Remove));
        assert!(!state.should_render(false, false, false));
    }

    #[test]
    fn test_close_after_transition_defers_removal() {
        let mut state = ModalState::new();
        let flags = ModalFlags {
            close_after_transition: true,
            ..ModalFlags::default()
        };

        state.on_open_changed(true, true, flags);
        state.on_enter();
        assert_eq!(state.on_open_changed(false, true, flags), None);
        assert!(state.should_render(false, true, false));
        assert!(!state.is_hidden(false, true));

        assert_eq!(state.on_exited(flags), Some(ModalAction::Remove));
        assert!(!state.should_render(false, true, false));
        assert_eq!(state.on_unmount(), None);
    }

    #[test]
    fn test_keep_mounted_hides_instead_of_unmounting() {
        let mut state = ModalState::new();
        assert!(state.should_render(false, false, true));
        assert!(state.is_hidden(false, false));
        state.on_open_changed(true, false, ModalFlags::default());
        assert!(!state.is_hidden(true, false));
    }

    #[test]
    fn test_unmount_while_open_unregisters() {
        let mut state = ModalState::new();
        state.on_open_changed(true, false, ModalFlags::default());
        assert_eq!(state.on_unmount(), Some(ModalAction::Remove));
    }

    #[test]
    fn test_backdrop_click_only_on_backdrop() {
        let flags = ModalFlags::default();
        assert_eq!(backdrop_click(false, flags), Dismissal::default());

        let hit = backdrop_click(true, flags);
        assert!(hit.notify && hit.close);

        let disabled = backdrop_click(
            true,
            ModalFlags {
                disable_backdrop_click: true,
                ..flags
            },
        );
        assert!(disabled.notify);
        assert!(!disabled.close);
    }

    #[test]
    fn test_escape_only_closes_top_modal() {
        let flags = ModalFlags::default();
        assert_eq!(escape_key_down("Escape", false, flags), Dismissal::default());
        assert_eq!(escape_key_down("Enter", true, flags), Dismissal::default());

        let top = escape_key_down("Escape", true, flags);
        assert!(top.notify && top.close && top.stop_propagation);

        let disabled = escape_key_down(
            "Escape",
            true,
            ModalFlags {
                disable_escape_key_down: true,
                ..flags
            },
        );
        assert!(disabled.notify && disabled.stop_propagation);
        assert!(!disabled.close);
    }

    #[test]
    fn test_close_reason_serializes_camel_case() {
        let json = serde_json::to_string(&CloseReason::EscapeKeyDown).unwrap();
        assert_eq!(json, "\"escapeKeyDown\"");
        assert_eq!(CloseReason::BackdropClick.as_str(), "backdropClick");
    }
}
