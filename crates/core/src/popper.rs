//! Positioning sessions for floating elements.
//!
//! A [`PopperSession`] binds one anchor to one floating element and
//! recomputes the layout on demand. [`PopperState`] owns at most one live
//! session and the `exited` flag that keeps the floating element mounted
//! while an exit transition runs.

use crate::anchor::Anchor;
use crate::geometry::{compute_position, default_modifiers, Layout, Modifier, Rect};
use crate::placement::Placement;

/// Inputs that, when changed, require a fresh session.
#[derive(Debug, Clone, PartialEq)]
pub struct PopperOptions {
    pub placement: Placement,
    pub modifiers: Vec<Modifier>,
    /// Ambient text direction is right-to-left.
    pub rtl: bool,
    pub disable_portal: bool,
}

impl Default for PopperOptions {
    fn default() -> Self {
        Self {
            placement: Placement::Bottom,
            modifiers: default_modifiers(),
            rtl: false,
            disable_portal: false,
        }
    }
}

impl PopperOptions {
    /// Placement after right-to-left mirroring.
    pub fn effective_placement(&self) -> Placement {
        if self.rtl {
            self.placement.flip_rtl()
        } else {
            self.placement
        }
    }
}

/// What render-prop content receives on each pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PopperContext<T> {
    pub placement: Placement,
    /// Present when the popper runs a transition.
    pub transition: Option<T>,
}

/// Floating content: a plain value, or a function of the current
/// [`PopperContext`].
#[derive(Debug, Clone)]
pub enum PopperContent<S, R> {
    Static(S),
    Render(R),
}

impl<S, R> PopperContent<S, R> {
    pub fn is_render(&self) -> bool {
        matches!(self, PopperContent::Render(_))
    }
}

#[derive(Debug)]
pub struct PopperSession<A> {
    id: u64,
    anchor: A,
    options: PopperOptions,
    layout: Option<Layout>,
    destroyed: bool,
}

impl<A: Anchor> PopperSession<A> {
    fn new(id: u64, anchor: A, options: PopperOptions) -> Self {
        Self {
            id,
            anchor,
            options,
            layout: None,
            destroyed: false,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn anchor(&self) -> &A {
        &self.anchor
    }

    pub fn options(&self) -> &PopperOptions {
        &self.options
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    /// Placement after boundary adjustments, or the requested one before
    /// the first update.
    pub fn resolved_placement(&self) -> Placement {
        self.layout
            .map(|layout| layout.placement)
            .unwrap_or_else(|| self.options.effective_placement())
    }

    /// Recomputes the layout. Idempotent when nothing moved; does nothing
    /// once destroyed.
    pub fn update(&mut self, floating: Rect, boundary: Rect) -> Option<Layout> {
        if self.destroyed {
            return None;
        }
        let layout = compute_position(
            self.anchor.bounding_rect(),
            floating,
            boundary,
            self.options.effective_placement(),
            &self.options.modifiers,
        );
        self.layout = Some(layout);
        Some(layout)
    }

    pub fn destroy(&mut self) {
        if !self.destroyed {
            log::debug!("popper: destroyed session #{}", self.id);
        }
        self.destroyed = true;
    }
}

#[derive(Debug)]
pub struct PopperState<A> {
    exited: bool,
    session: Option<PopperSession<A>>,
    next_id: u64,
}

impl<A: Anchor + PartialEq> PopperState<A> {
    pub fn new() -> Self {
        Self {
            exited: true,
            session: None,
            next_id: 1,
        }
    }

    pub fn exited(&self) -> bool {
        self.exited
    }

    pub fn session(&self) -> Option<&PopperSession<A>> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut PopperSession<A>> {
        self.session.as_mut()
    }

    /// Whether the live session (if any) was built for this anchor and
    /// these options.
    pub fn is_current(&self, anchor: &A, options: &PopperOptions) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.anchor == *anchor && s.options == *options)
    }

    /// Destroys any previous session, then creates one for `anchor`.
    /// Without an anchor nothing is created: positioning waits.
    pub fn open(
        &mut self,
        anchor: Option<A>,
        options: PopperOptions,
    ) -> Option<&mut PopperSession<A>> {
        self.close();
        let anchor = anchor?;
        let id = self.next_id;
        self.next_id += 1;
        log::debug!("popper: created session #{id}");
        self.session = Some(PopperSession::new(id, anchor, options));
        self.session.as_mut()
    }

    /// Reuses the live session when it still matches, otherwise reopens.
    pub fn ensure(
        &mut self,
        anchor: Option<A>,
        options: PopperOptions,
    ) -> Option<&mut PopperSession<A>> {
        let current = match &anchor {
            Some(anchor) => self.is_current(anchor, &options),
            None => false,
        };
        if current {
            self.session.as_mut()
        } else {
            self.open(anchor, options)
        }
    }

    pub fn close(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.destroy();
        }
    }

    /// Enter transition started.
    pub fn on_enter(&mut self) {
        self.exited = false;
    }

    /// Exit transition finished: the floating element can go.
    pub fn on_exited(&mut self) {
        self.exited = true;
        self.close();
    }

    /// Without a transition there is nothing to wait for on close.
    pub fn on_open_changed(&mut self, open: bool, transition: bool) {
        if !open && !transition {
            self.close();
        }
    }

    pub fn should_render(&self, open: bool, transition: bool, keep_mounted: bool) -> bool {
        open || (transition && !self.exited) || keep_mounted
    }
}

impl<A: Anchor + PartialEq> Default for PopperState<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::VirtualElement;

    fn anchor() -> VirtualElement {
        VirtualElement::fixed(Rect::new(400.0, 300.0, 200.0, 50.0))
    }

    fn floating() -> Rect {
        Rect::new(0.0, 0.0, 100.0, 40.0)
    }

    fn viewport() -> Rect {
        Rect::new(0.0, 0.0, 1000.0, 800.0)
    }

    #[test]
    fn test_requested_placement_is_resolved() {
        let mut state = PopperState::new();
        let options = PopperOptions {
            placement: Placement::Top,
            ..PopperOptions::default()
        };
        let session = state.open(Some(anchor()), options).unwrap();
        let layout = session.update(floating(), viewport()).unwrap();

        assert_eq!(layout.placement, Placement::Top);
        assert_eq!(session.resolved_placement(), Placement::Top);
    }

    #[test]
    fn test_missing_anchor_skips_positioning() {
        let mut state: PopperState<VirtualElement> = PopperState::new();
        assert!(state.open(None, PopperOptions::default()).is_none());
        assert!(state.session().is_none());
    }

    #[test]
    fn test_reopen_destroys_previous_session() {
        let mut state = PopperState::new();
        let first = state
            .open(Some(anchor()), PopperOptions::default())
            .map(|s| s.id())
            .unwrap();
        let other = anchor();

        let second = state
            .ensure(Some(other.clone()), PopperOptions::default())
            .map(|s| s.id())
            .unwrap();
        assert_ne!(first, second);

        let same = state
            .ensure(Some(other), PopperOptions::default())
            .map(|s| s.id())
            .unwrap();
        assert_eq!(same, second);
    }

    #[test]
    fn test_options_change_reopens() {
        let mut state = PopperState::new();
        let anchor = anchor();
        let first = state
            .ensure(Some(anchor.clone()), PopperOptions::default())
            .map(|s| s.id())
            .unwrap();
        let options = PopperOptions {
            disable_portal: true,
            ..PopperOptions::default()
        };
        let second = state
            .ensure(Some(anchor), options)
            .map(|s| s.id())
            .unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_rtl_mirrors_start_end() {
        let mut state = PopperState::new();
        let options = PopperOptions {
            placement: Placement::BottomStart,
            rtl: true,
            ..PopperOptions::default()
        };
        let session = state.open(Some(anchor()), options).unwrap();
        let layout = session.update(floating(), viewport()).unwrap();

        assert_eq!(layout.placement, Placement::BottomEnd);
        assert_eq!(layout.left, 500.0);
    }

    #[test]
    fn test_transition_keeps_session_until_exited() {
        let mut state = PopperState::new();
        state.open(Some(anchor()), PopperOptions::default());
        state.on_enter();

        state.on_open_changed(false, true);
        assert!(state.session().is_some());
        assert!(state.should_render(false, true, false));

        state.on_exited();
        assert!(state.session().is_none());
        assert!(!state.should_render(false, true, false));
    }

    #[test]
    fn test_close_without_transition_is_eager() {
        let mut state = PopperState::new();
        state.open(Some(anchor()), PopperOptions::default());

        state.on_open_changed(false, false);
        assert!(state.session().is_none());
        assert!(!state.should_render(false, false, false));
        assert!(state.should_render(false, false, true));
    }

    #[test]
    fn test_flip_is_surfaced_to_content() {
        let mut state = PopperState::new();
        let options = PopperOptions {
            placement: Placement::Top,
            ..PopperOptions::default()
        };
        let near_top = VirtualElement::fixed(Rect::new(400.0, 10.0, 200.0, 50.0));
        let session = state.open(Some(near_top), options).unwrap();
        session.update(floating(), viewport());

        let context: PopperContext<()> = PopperContext {
            placement: session.resolved_placement(),
            transition: None,
        };
        assert_eq!(context.placement, Placement::Bottom);
    }

    #[test]
    fn test_destroyed_session_ignores_updates() {
        let mut state = PopperState::new();
        let session = state.open(Some(anchor()), PopperOptions::default()).unwrap();
        session.destroy();
        assert!(session.update(floating(), viewport()).is_none());
    }
}
