//! Things a floating element can be positioned against.

use std::fmt;
use std::rc::Rc;

use crate::geometry::Rect;

/// Provides the bounding rectangle of a reference, in viewport coordinates.
pub trait Anchor {
    fn bounding_rect(&self) -> Rect;
}

/// A reference that is not a DOM element: a caret position, a pointer
/// location, a selection range.
#[derive(Clone)]
pub struct VirtualElement {
    rect: Rc<dyn Fn() -> Rect>,
}

impl VirtualElement {
    pub fn new(rect: impl Fn() -> Rect + 'static) -> Self {
        Self { rect: Rc::new(rect) }
    }

    /// A virtual element that never moves.
    pub fn fixed(rect: Rect) -> Self {
        Self::new(move || rect)
    }
}

impl Anchor for VirtualElement {
    fn bounding_rect(&self) -> Rect {
        (self.rect)()
    }
}

impl PartialEq for VirtualElement {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.rect, &other.rect)
    }
}

impl fmt::Debug for VirtualElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("VirtualElement").field(&self.bounding_rect()).finish()
    }
}

/// An anchor given directly, or a supplier re-evaluated on every
/// positioning pass.
pub enum AnchorSource<A> {
    Fixed(A),
    Supplier(Rc<dyn Fn() -> Option<A>>),
}

impl<A: Clone> AnchorSource<A> {
    pub fn supplier(f: impl Fn() -> Option<A> + 'static) -> Self {
        AnchorSource::Supplier(Rc::new(f))
    }

    /// `None` means "not ready yet": positioning is skipped, not failed.
    pub fn resolve(&self) -> Option<A> {
        match self {
            AnchorSource::Fixed(anchor) => Some(anchor.clone()),
            AnchorSource::Supplier(supplier) => supplier(),
        }
    }
}

impl<A: Clone> Clone for AnchorSource<A> {
    fn clone(&self) -> Self {
        match self {
            AnchorSource::Fixed(anchor) => AnchorSource::Fixed(anchor.clone()),
            AnchorSource::Supplier(supplier) => AnchorSource::Supplier(Rc::clone(supplier)),
        }
    }
}

impl<A> From<A> for AnchorSource<A> {
    fn from(anchor: A) -> Self {
        AnchorSource::Fixed(anchor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_supplier_is_reevaluated() {
        let ready = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ready);
        let source = AnchorSource::supplier(move || {
            flag.get()
                .then(|| VirtualElement::fixed(Rect::new(1.0, 2.0, 3.0, 4.0)))
        });

        assert!(source.resolve().is_none());
        ready.set(true);
        let anchor = source.resolve().unwrap();
        assert_eq!(anchor.bounding_rect(), Rect::new(1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn test_virtual_element_identity() {
        let a = VirtualElement::fixed(Rect::default());
        let b = VirtualElement::fixed(Rect::default());
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }
}
