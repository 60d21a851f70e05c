//! `aria-hidden` bookkeeping for sibling content behind an overlay.

use crate::dom::Document;

/// Tags that never carry rendered content and are left untouched.
const SKIPPED_TAGS: [&str; 3] = ["TEMPLATE", "SCRIPT", "STYLE"];

pub fn aria_hidden<D: Document>(doc: &D, node: &D::Node, hidden: bool) {
    if hidden {
        doc.set_attribute(node, "aria-hidden", "true");
    } else {
        doc.remove_attribute(node, "aria-hidden");
    }
}

/// Direct children of `container` that are already `aria-hidden="true"`.
pub fn hidden_siblings<D: Document>(doc: &D, container: &D::Node) -> Vec<D::Node> {
    doc.children(container)
        .into_iter()
        .filter(|node| doc.attribute(node, "aria-hidden").as_deref() == Some("true"))
        .collect()
}

/// Hides (or reveals) every direct child of `container` except the ones in
/// `keep`, `exclude`, and non-content tags.
pub fn aria_hidden_siblings<D: Document>(
    doc: &D,
    container: &D::Node,
    keep: &[Option<D::Node>],
    exclude: &[D::Node],
    hidden: bool,
) {
    for node in doc.children(container) {
        let kept = keep.iter().flatten().any(|k| *k == node);
        if kept || exclude.contains(&node) {
            continue;
        }
        if SKIPPED_TAGS.contains(&doc.tag_name(&node).as_str()) {
            continue;
        }
        aria_hidden(doc, &node, hidden);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_dom::FakeDocument;

    #[test]
    fn test_hides_everything_but_kept_and_skipped_nodes() {
        let doc = FakeDocument::new();
        let body = doc.body_node();
        let a = doc.create_in(&body, "div");
        let script = doc.create_in(&body, "script");
        let surface = doc.create_in(&body, "div");

        aria_hidden_siblings(&doc, &body, &[Some(surface)], &[], true);

        assert!(doc.is_hidden(&a));
        assert!(!doc.is_hidden(&script));
        assert!(!doc.is_hidden(&surface));
    }

    #[test]
    fn test_reveal_leaves_excluded_nodes_hidden() {
        let doc = FakeDocument::new();
        let body = doc.body_node();
        let a = doc.create_in(&body, "div");
        let b = doc.create_in(&body, "div");
        aria_hidden(&doc, &b, true);

        let before = hidden_siblings(&doc, &body);
        assert_eq!(before, vec![b]);

        aria_hidden_siblings(&doc, &body, &[], &[], true);
        aria_hidden_siblings(&doc, &body, &[], &before, false);

        assert!(!doc.is_hidden(&a));
        assert!(doc.is_hidden(&b));
    }
}
