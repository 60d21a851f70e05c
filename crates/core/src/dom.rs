//! The slice of the DOM the overlay machinery needs.

use std::fmt::Debug;

/// Class name marking fixed-position elements that must receive the same
/// scrollbar compensation as a locked container.
pub const FIXED_CLASS: &str = "layerkit-fixed";

/// Document-level access to nodes.
///
/// Every method takes `&self`: implementations either hold no state (the
/// browser document) or use interior mutability (test doubles).
pub trait Document {
    /// Cheap handle to an element. Equality is node identity.
    type Node: Clone + PartialEq + Debug;

    fn body(&self) -> Option<Self::Node>;

    fn active_element(&self) -> Option<Self::Node>;

    /// Direct element children, in document order.
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Upper-case tag name (`DIV`, `HTML`, ...).
    fn tag_name(&self, node: &Self::Node) -> String;

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str);

    fn remove_attribute(&self, node: &Self::Node, name: &str);

    /// Inline style value, empty when unset.
    fn style(&self, node: &Self::Node, property: &str) -> String;

    fn set_style(&self, node: &Self::Node, property: &str, value: &str);

    fn remove_style(&self, node: &Self::Node, property: &str);

    /// Resolved (computed) style value.
    fn computed_style(&self, node: &Self::Node, property: &str) -> String;

    /// Inclusive containment: a node contains itself.
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool;

    /// Moves focus to `node`. Returns `false` when the node cannot take focus.
    fn focus(&self, node: &Self::Node) -> bool;

    /// Whether the root element (`<html>`) is `node`.
    fn is_root_element(&self, node: &Self::Node) -> bool {
        self.tag_name(node) == "HTML"
    }

    /// Whether a vertical scrollbar is currently displayed for `container`.
    fn is_overflowing(&self, container: &Self::Node) -> bool;

    /// Width of the platform scrollbar in CSS pixels.
    fn scrollbar_size(&self) -> f64;

    /// Every element in the document carrying `class`.
    fn elements_with_class(&self, class: &str) -> Vec<Self::Node>;
}

/// Parses a CSS pixel length (`"20px"`, `"20.5px"`, `"0"`), truncating like
/// `parseInt`. Anything unparsable reads as zero.
pub fn parse_px(value: &str) -> f64 {
    let digits: String = value
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '-' || *c == '.')
        .collect();
    digits.parse::<f64>().map(f64::trunc).unwrap_or(0.0)
}

/// Formats a pixel length the way inline styles store it.
pub fn format_px(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}px", value as i64)
    } else {
        format!("{value}px")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_px() {
        assert_eq!(parse_px("20px"), 20.0);
        assert_eq!(parse_px("20.7px"), 20.0);
        assert_eq!(parse_px(" 0 "), 0.0);
        assert_eq!(parse_px(""), 0.0);
        assert_eq!(parse_px("auto"), 0.0);
    }

    #[test]
    fn test_format_px() {
        assert_eq!(format_px(35.0), "35px");
        assert_eq!(format_px(12.5), "12.5px");
    }
}
