//! Anchor-relative positioning math.
//!
//! [`compute_position`] attaches the floating box to the requested edge of
//! the reference box, then runs the modifiers in order. Coordinates are
//! viewport-relative (the floating element is `position: fixed`).

use serde::{Deserialize, Serialize};

use crate::placement::{Alignment, Placement, Side};

/// Default gap kept between a clamped floating element and the boundary.
pub const DEFAULT_OVERFLOW_PADDING: f64 = 5.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// One positioning adjustment. Applied in list order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "camelCase")]
pub enum Modifier {
    /// Push away from the anchor (`distance`) and slide along it (`skidding`).
    Offset { skidding: f64, distance: f64 },
    /// Switch to the opposite side when the requested one has no room and
    /// the opposite side has more.
    Flip,
    /// Keep the floating box inside the boundary.
    PreventOverflow { padding: f64 },
    /// Center an arrow of `size` on the anchor, within the floating box.
    Arrow { size: f64 },
}

/// Modifiers used when the caller provides none.
pub fn default_modifiers() -> Vec<Modifier> {
    vec![
        Modifier::Flip,
        Modifier::PreventOverflow {
            padding: DEFAULT_OVERFLOW_PADDING,
        },
    ]
}

/// Result of one positioning pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Placement actually used, after any flip.
    pub placement: Placement,
    pub left: f64,
    pub top: f64,
    /// Arrow offset along the attached edge, from the floating box start.
    pub arrow: Option<f64>,
}

impl Layout {
    /// Inline style for the floating element.
    pub fn floating_style(&self) -> String {
        format!(
            "position: fixed; top: 0px; left: 0px; transform: translate3d({}px, {}px, 0px); will-change: transform;",
            self.left.round(),
            self.top.round()
        )
    }

    /// Inline style for the arrow element, if an arrow was computed.
    pub fn arrow_style(&self) -> Option<String> {
        let offset = self.arrow?.round();
        Some(if self.placement.side().is_vertical() {
            format!("left: {offset}px;")
        } else {
            format!("top: {offset}px;")
        })
    }
}

fn aligned(start: f64, length: f64, size: f64, alignment: Alignment) -> f64 {
    match alignment {
        Alignment::Start => start,
        Alignment::Center => start + length / 2.0 - size / 2.0,
        Alignment::End => start + length - size,
    }
}

fn attach(reference: &Rect, width: f64, height: f64, placement: Placement) -> (f64, f64) {
    let alignment = placement.alignment();
    match placement.side() {
        Side::Top => (
            aligned(reference.left, reference.width, width, alignment),
            reference.top - height,
        ),
        Side::Bottom => (
            aligned(reference.left, reference.width, width, alignment),
            reference.bottom(),
        ),
        Side::Left => (
            reference.left - width,
            aligned(reference.top, reference.height, height, alignment),
        ),
        Side::Right => (
            reference.right(),
            aligned(reference.top, reference.height, height, alignment),
        ),
    }
}

/// Free space between the reference and the boundary on `side`.
fn room(reference: &Rect, boundary: &Rect, side: Side) -> f64 {
    match side {
        Side::Top => reference.top - boundary.top,
        Side::Bottom => boundary.bottom() - reference.bottom(),
        Side::Left => reference.left - boundary.left,
        Side::Right => boundary.right() - reference.right(),
    }
}

fn clamp_axis(value: f64, min: f64, max: f64) -> f64 {
    if max < min {
        min
    } else {
        value.clamp(min, max)
    }
}

fn offset_distance(modifiers: &[Modifier]) -> f64 {
    modifiers
        .iter()
        .map(|m| match m {
            Modifier::Offset { distance, .. } => *distance,
            _ => 0.0,
        })
        .sum()
}

/// Positions a floating box of `floating`'s size against `reference`.
pub fn compute_position(
    reference: Rect,
    floating: Rect,
    boundary: Rect,
    placement: Placement,
    modifiers: &[Modifier],
) -> Layout {
    run(reference, floating, boundary, placement, modifiers, true)
}

fn run(
    reference: Rect,
    floating: Rect,
    boundary: Rect,
    placement: Placement,
    modifiers: &[Modifier],
    may_flip: bool,
) -> Layout {
    let (width, height) = (floating.width, floating.height);
    let (mut left, mut top) = attach(&reference, width, height, placement);
    let side = placement.side();
    let mut arrow = None;

    for modifier in modifiers {
        match *modifier {
            Modifier::Offset { skidding, distance } => {
                match side {
                    Side::Top => top -= distance,
                    Side::Bottom => top += distance,
                    Side::Left => left -= distance,
                    Side::Right => left += distance,
                }
                if side.is_vertical() {
                    left += skidding;
                } else {
                    top += skidding;
                }
            }
            Modifier::Flip if may_flip => {
                let needed = offset_distance(modifiers)
                    + if side.is_vertical() { height } else { width };
                let here = room(&reference, &boundary, side);
                let there = room(&reference, &boundary, side.opposite());
                if needed > here && there > here {
                    return run(
                        reference,
                        floating,
                        boundary,
                        placement.opposite(),
                        modifiers,
                        false,
                    );
                }
            }
            Modifier::Flip => {}
            Modifier::PreventOverflow { padding } => {
                left = clamp_axis(
                    left,
                    boundary.left + padding,
                    boundary.right() - padding - width,
                );
                top = clamp_axis(
                    top,
                    boundary.top + padding,
                    boundary.bottom() - padding - height,
                );
            }
            Modifier::Arrow { size } => {
                let (anchor_center, start, length) = if side.is_vertical() {
                    (reference.left + reference.width / 2.0, left, width)
                } else {
                    (reference.top + reference.height / 2.0, top, height)
                };
                let offset = anchor_center - start - size / 2.0;
                arrow = Some(clamp_axis(offset, 0.0, length - size));
            }
        }
    }

    Layout {
        placement,
        left,
        top,
        arrow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Rect {
        Rect::new(0.0, 0.0, 1000.0, 800.0)
    }

    fn tip() -> Rect {
        Rect::new(0.0, 0.0, 100.0, 40.0)
    }

    #[test]
    fn test_top_placement_touches_anchor() {
        let anchor = Rect::new(400.0, 300.0, 200.0, 50.0);
        let layout = compute_position(anchor, tip(), viewport(), Placement::Top, &[]);

        assert_eq!(layout.placement, Placement::Top);
        assert_eq!(layout.top, 260.0);
        assert_eq!(layout.left, 450.0);
    }

    #[test]
    fn test_alignment_variants() {
        let anchor = Rect::new(400.0, 300.0, 200.0, 50.0);
        let start = compute_position(anchor, tip(), viewport(), Placement::BottomStart, &[]);
        let end = compute_position(anchor, tip(), viewport(), Placement::BottomEnd, &[]);
        let right = compute_position(anchor, tip(), viewport(), Placement::RightEnd, &[]);

        assert_eq!((start.left, start.top), (400.0, 350.0));
        assert_eq!((end.left, end.top), (500.0, 350.0));
        assert_eq!((right.left, right.top), (600.0, 310.0));
    }

    #[test]
    fn test_flip_when_no_room() {
        let anchor = Rect::new(400.0, 10.0, 200.0, 50.0);
        let layout = compute_position(
            anchor,
            tip(),
            viewport(),
            Placement::TopStart,
            &default_modifiers(),
        );

        assert_eq!(layout.placement, Placement::BottomStart);
        assert_eq!(layout.top, 60.0);
    }

    #[test]
    fn test_no_flip_when_opposite_is_worse() {
        let boundary = Rect::new(0.0, 0.0, 1000.0, 60.0);
        let anchor = Rect::new(400.0, 10.0, 200.0, 45.0);
        let layout = compute_position(anchor, tip(), boundary, Placement::Top, &[Modifier::Flip]);

        assert_eq!(layout.placement, Placement::Top);
    }

    #[test]
    fn test_prevent_overflow_clamps_cross_axis() {
        let anchor = Rect::new(0.0, 300.0, 20.0, 20.0);
        let layout = compute_position(
            anchor,
            tip(),
            viewport(),
            Placement::Bottom,
            &default_modifiers(),
        );

        assert_eq!(layout.placement, Placement::Bottom);
        assert_eq!(layout.left, DEFAULT_OVERFLOW_PADDING);
    }

    #[test]
    fn test_offset_and_arrow() {
        let anchor = Rect::new(0.0, 300.0, 20.0, 20.0);
        let modifiers = [
            Modifier::Offset {
                skidding: 0.0,
                distance: 8.0,
            },
            Modifier::PreventOverflow { padding: 0.0 },
            Modifier::Arrow { size: 10.0 },
        ];
        let layout = compute_position(anchor, tip(), viewport(), Placement::Bottom, &modifiers);

        assert_eq!(layout.top, 328.0);
        assert_eq!(layout.left, 0.0);
        assert_eq!(layout.arrow, Some(5.0));
        assert_eq!(layout.arrow_style().as_deref(), Some("left: 5px;"));
    }

    #[test]
    fn test_floating_style() {
        let layout = Layout {
            placement: Placement::Top,
            left: 10.4,
            top: 20.6,
            arrow: None,
        };
        assert!(layout
            .floating_style()
            .contains("translate3d(10px, 21px, 0px)"));
        assert_eq!(layout.arrow_style(), None);
    }

    #[test]
    fn test_modifier_serde() {
        let json = serde_json::to_string(&Modifier::PreventOverflow { padding: 5.0 }).unwrap();
        assert_eq!(json, r#"{"name":"preventOverflow","padding":5.0}"#);
    }
}
