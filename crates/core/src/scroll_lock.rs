//! Reversible style mutations applied while a container hosts overlays.

use crate::dom::{format_px, parse_px, Document, FIXED_CLASS};

#[derive(Debug, Clone)]
struct SavedStyle<N> {
    node: N,
    property: &'static str,
    value: String,
}

/// Inline style values captured before they were overwritten.
///
/// Restoring writes each captured value back, or removes the property when
/// it had no inline value to begin with.
#[derive(Debug, Clone)]
pub struct StylePatch<N> {
    saved: Vec<SavedStyle<N>>,
}

impl<N: Clone> StylePatch<N> {
    pub fn new() -> Self {
        Self { saved: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }

    /// Captures the current inline value of `property`, then sets it.
    pub fn set<D: Document<Node = N>>(
        &mut self,
        doc: &D,
        node: &N,
        property: &'static str,
        value: &str,
    ) {
        self.saved.push(SavedStyle {
            node: node.clone(),
            property,
            value: doc.style(node, property),
        });
        doc.set_style(node, property, value);
    }

    pub fn restore<D: Document<Node = N>>(self, doc: &D) {
        for saved in self.saved.into_iter().rev() {
            if saved.value.is_empty() {
                doc.remove_style(&saved.node, saved.property);
            } else {
                doc.set_style(&saved.node, saved.property, &saved.value);
            }
        }
    }
}

impl<N: Clone> Default for StylePatch<N> {
    fn default() -> Self {
        Self::new()
    }
}

fn padding_right<D: Document>(doc: &D, node: &D::Node) -> f64 {
    parse_px(&doc.computed_style(node, "padding-right"))
}

/// Locks scrolling on `container` and returns the patch that undoes it.
///
/// When a vertical scrollbar is visible its width is added to the right
/// padding of the container and of every [`FIXED_CLASS`] element so the
/// content does not jump. `overflow: hidden` is always forced on the
/// scrolling element: mobile keyboards shrink the viewport without ever
/// showing a scrollbar.
pub fn lock_container<D: Document>(doc: &D, container: &D::Node) -> StylePatch<D::Node> {
    let mut patch = StylePatch::new();

    if doc.is_overflowing(container) {
        // Measure before overflow is hidden.
        let scrollbar = doc.scrollbar_size();

        let padded = format_px(padding_right(doc, container) + scrollbar);
        patch.set(doc, container, "padding-right", &padded);

        for node in doc.elements_with_class(FIXED_CLASS) {
            let padded = format_px(padding_right(doc, &node) + scrollbar);
            patch.set(doc, &node, "padding-right", &padded);
        }
        log::debug!("scroll lock: compensated {scrollbar}px scrollbar");
    }

    let scroll_container = match doc.parent(container) {
        Some(parent)
            if doc.is_root_element(&parent)
                && doc.computed_style(&parent, "overflow-y") == "scroll" =>
        {
            parent
        }
        _ => container.clone(),
    };
    patch.set(doc, &scroll_container, "overflow", "hidden");

    patch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_dom::FakeDocument;

    #[test]
    fn test_lock_and_restore_overflowing_container() {
        let doc = FakeDocument::with_scrollbar(17.0);
        let body = doc.body_node();
        let container = doc.create_in(&body, "div");
        doc.set_style(&container, "padding-right", "20px");
        doc.set_overflowing(&container, true);

        let patch = lock_container(&doc, &container);
        assert_eq!(doc.style(&container, "padding-right"), "37px");
        assert_eq!(doc.style(&container, "overflow"), "hidden");

        patch.restore(&doc);
        assert_eq!(doc.style(&container, "padding-right"), "20px");
        assert_eq!(doc.style(&container, "overflow"), "");
    }

    #[test]
    fn test_no_padding_without_scrollbar() {
        let doc = FakeDocument::new();
        let body = doc.body_node();

        let patch = lock_container(&doc, &body);
        assert_eq!(doc.style(&body, "padding-right"), "");
        assert_eq!(doc.style(&body, "overflow"), "hidden");

        patch.restore(&doc);
        assert_eq!(doc.style(&body, "overflow"), "");
    }

    #[test]
    fn test_fixed_nodes_are_padded() {
        let doc = FakeDocument::with_scrollbar(10.0);
        let body = doc.body_node();
        doc.set_overflowing(&body, true);
        let fixed = doc.create_in(&body, "div");
        doc.add_class(&fixed, FIXED_CLASS);
        doc.set_computed(&fixed, "padding-right", "4px");

        let patch = lock_container(&doc, &body);
        assert_eq!(doc.style(&fixed, "padding-right"), "14px");

        patch.restore(&doc);
        assert_eq!(doc.style(&fixed, "padding-right"), "");
    }

    #[test]
    fn test_root_scroller_receives_overflow() {
        let doc = FakeDocument::new();
        let html = doc.html_node();
        let body = doc.body_node();
        doc.set_computed(&html, "overflow-y", "scroll");

        let patch = lock_container(&doc, &body);
        assert_eq!(doc.style(&html, "overflow"), "hidden");
        assert_eq!(doc.style(&body, "overflow"), "");

        patch.restore(&doc);
        assert_eq!(doc.style(&html, "overflow"), "");
    }
}
