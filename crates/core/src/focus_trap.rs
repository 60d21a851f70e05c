//! Keyboard focus containment for an open overlay.
//!
//! Two mechanisms run side by side while a trap is active: a low-frequency
//! poll ([`FocusTrap::contain`], also called from capture-phase `focus`
//! events) and Tab interception ([`FocusTrap::handle_key`]). The poll is
//! not redundant: browsers fire no event when the focused element stops
//! being focusable or the page itself loses focus, so only a periodic
//! check notices focus drifting out.

use crate::dom::Document;

/// Period of the containment poll.
pub const FOCUS_POLL_INTERVAL_MS: u32 = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FocusTrapOptions {
    /// Do not move focus into the trap when it opens.
    pub disable_auto_focus: bool,
    /// Do not pull focus back when it leaves the trap.
    pub disable_enforce_focus: bool,
    /// Do not return focus to the previously focused element on close.
    pub disable_restore_focus: bool,
}

/// Key press as seen by the trap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress<'a> {
    pub key: &'a str,
    pub shift: bool,
}

impl KeyPress<'_> {
    fn is_tab(&self) -> bool {
        self.key == "Tab"
    }
}

/// Where Tab interception sent focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    LeadingSentinel,
    TrailingSentinel,
}

/// One focus-trap session, owned by an open modal.
#[derive(Debug)]
pub struct FocusTrap<N> {
    options: FocusTrapOptions,
    root: Option<N>,
    sentinel_start: Option<N>,
    sentinel_end: Option<N>,
    node_to_restore: Option<N>,
    ignore_next_enforce: bool,
    active: bool,
}

impl<N: Clone + PartialEq> FocusTrap<N> {
    pub fn new(options: FocusTrapOptions) -> Self {
        Self {
            options,
            root: None,
            sentinel_start: None,
            sentinel_end: None,
            node_to_restore: None,
            ignore_next_enforce: false,
            active: false,
        }
    }

    pub fn options(&self) -> FocusTrapOptions {
        self.options
    }

    pub fn set_options(&mut self, options: FocusTrapOptions) {
        self.options = options;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_root(&mut self, root: Option<N>) {
        self.root = root;
    }

    pub fn set_sentinels(&mut self, start: Option<N>, end: Option<N>) {
        self.sentinel_start = start;
        self.sentinel_end = end;
    }

    pub fn node_to_restore(&self) -> Option<&N> {
        self.node_to_restore.as_ref()
    }

    /// Records the element to restore focus to. Must run when the owner
    /// opens, before rendering moves focus anywhere.
    pub fn capture<D: Document<Node = N>>(&mut self, doc: &D) {
        self.node_to_restore = doc.active_element();
    }

    /// Starts the session and moves focus into the root unless it is
    /// already inside.
    pub fn activate<D: Document<Node = N>>(&mut self, doc: &D) {
        self.active = true;
        if self.options.disable_auto_focus {
            return;
        }
        let Some(root) = &self.root else {
            return;
        };
        let inside = doc
            .active_element()
            .is_some_and(|active| doc.contains(root, &active));
        if !inside {
            if doc.attribute(root, "tabindex").is_none() {
                doc.set_attribute(root, "tabindex", "-1");
            }
            doc.focus(root);
        }
    }

    /// Pulls focus back to the root if it drifted out. `is_enabled` is
    /// false while another overlay is on top.
    pub fn contain<D: Document<Node = N>>(&mut self, doc: &D, is_enabled: bool) {
        if !self.active {
            return;
        }
        if self.options.disable_enforce_focus || !is_enabled || self.ignore_next_enforce {
            self.ignore_next_enforce = false;
            return;
        }
        let Some(root) = &self.root else {
            return;
        };
        let inside = doc
            .active_element()
            .is_some_and(|active| doc.contains(root, &active));
        if !inside {
            doc.focus(root);
        }
    }

    /// Tab pressed on the root itself: park focus on a sentinel so the
    /// browser's own traversal lands inside the subtree from the right
    /// edge. Forward Tab goes through the leading sentinel (next stop is the
    /// first element inside), Shift+Tab through the trailing one.
    pub fn handle_key<D: Document<Node = N>>(
        &mut self,
        doc: &D,
        key: KeyPress<'_>,
        is_enabled: bool,
    ) -> Option<Redirect> {
        if !self.active || self.options.disable_enforce_focus || !is_enabled || !key.is_tab() {
            return None;
        }
        let root = self.root.as_ref()?;
        if doc.active_element().as_ref() != Some(root) {
            return None;
        }

        // The focus change below must not be undone by the next poll.
        self.ignore_next_enforce = true;

        if key.shift {
            if let Some(end) = &self.sentinel_end {
                doc.focus(end);
            }
            Some(Redirect::TrailingSentinel)
        } else {
            if let Some(start) = &self.sentinel_start {
                doc.focus(start);
            }
            Some(Redirect::LeadingSentinel)
        }
    }

    /// Ends the session, restoring focus unless disabled.
    pub fn deactivate<D: Document<Node = N>>(&mut self, doc: &D) {
        self.active = false;
        self.ignore_next_enforce = false;
        let node = self.node_to_restore.take();
        if self.options.disable_restore_focus {
            return;
        }
        if let Some(node) = node {
            if !doc.focus(&node) {
                log::debug!("focus trap: previous element no longer focusable");
            }
        }
    }
}
