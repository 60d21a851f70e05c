use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Edge of the anchor the floating element is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Top and bottom placements slide along the horizontal axis.
    pub fn is_vertical(self) -> bool {
        matches!(self, Side::Top | Side::Bottom)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Right => "right",
            Side::Bottom => "bottom",
            Side::Left => "left",
        }
    }
}

/// Position along the attached edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alignment {
    Start,
    Center,
    End,
}

/// Requested or resolved position of a floating element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Placement {
    TopStart,
    Top,
    TopEnd,
    RightStart,
    Right,
    RightEnd,
    BottomStart,
    #[default]
    Bottom,
    BottomEnd,
    LeftStart,
    Left,
    LeftEnd,
}

impl Placement {
    pub fn new(side: Side, alignment: Alignment) -> Self {
        use Alignment::*;
        match (side, alignment) {
            (Side::Top, Start) => Placement::TopStart,
            (Side::Top, Center) => Placement::Top,
            (Side::Top, End) => Placement::TopEnd,
            (Side::Right, Start) => Placement::RightStart,
            (Side::Right, Center) => Placement::Right,
            (Side::Right, End) => Placement::RightEnd,
            (Side::Bottom, Start) => Placement::BottomStart,
            (Side::Bottom, Center) => Placement::Bottom,
            (Side::Bottom, End) => Placement::BottomEnd,
            (Side::Left, Start) => Placement::LeftStart,
            (Side::Left, Center) => Placement::Left,
            (Side::Left, End) => Placement::LeftEnd,
        }
    }

    pub fn side(self) -> Side {
        match self {
            Placement::TopStart | Placement::Top | Placement::TopEnd => Side::Top,
            Placement::RightStart | Placement::Right | Placement::RightEnd => Side::Right,
            Placement::BottomStart | Placement::Bottom | Placement::BottomEnd => Side::Bottom,
            Placement::LeftStart | Placement::Left | Placement::LeftEnd => Side::Left,
        }
    }

    pub fn alignment(self) -> Alignment {
        match self {
            Placement::TopStart
            | Placement::RightStart
            | Placement::BottomStart
            | Placement::LeftStart => Alignment::Start,
            Placement::TopEnd | Placement::RightEnd | Placement::BottomEnd | Placement::LeftEnd => {
                Alignment::End
            }
            _ => Alignment::Center,
        }
    }

    /// Same alignment on the other side of the anchor.
    pub fn opposite(self) -> Self {
        Placement::new(self.side().opposite(), self.alignment())
    }

    /// Mirrors the `-start`/`-end` variants of top and bottom placements
    /// for right-to-left layouts.
    pub fn flip_rtl(self) -> Self {
        match self {
            Placement::BottomEnd => Placement::BottomStart,
            Placement::BottomStart => Placement::BottomEnd,
            Placement::TopEnd => Placement::TopStart,
            Placement::TopStart => Placement::TopEnd,
            other => other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Placement::TopStart => "top-start",
            Placement::Top => "top",
            Placement::TopEnd => "top-end",
            Placement::RightStart => "right-start",
            Placement::Right => "right",
            Placement::RightEnd => "right-end",
            Placement::BottomStart => "bottom-start",
            Placement::Bottom => "bottom",
            Placement::BottomEnd => "bottom-end",
            Placement::LeftStart => "left-start",
            Placement::Left => "left",
            Placement::LeftEnd => "left-end",
        }
    }

    pub fn all() -> [Placement; 12] {
        [
            Placement::TopStart,
            Placement::Top,
            Placement::TopEnd,
            Placement::RightStart,
            Placement::Right,
            Placement::RightEnd,
            Placement::BottomStart,
            Placement::Bottom,
            Placement::BottomEnd,
            Placement::LeftStart,
            Placement::Left,
            Placement::LeftEnd,
        ]
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown placement `{0}`")]
pub struct UnknownPlacement(pub String);

impl FromStr for Placement {
    type Err = UnknownPlacement;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Placement::all()
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPlacement(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        for placement in Placement::all() {
            assert_eq!(placement.as_str().parse::<Placement>(), Ok(placement));
        }
        let err = "middle".parse::<Placement>().unwrap_err();
        assert_eq!(err, UnknownPlacement("middle".to_string()));
        assert_eq!(err.to_string(), "unknown placement `middle`");
        assert_eq!(Placement::default(), Placement::Bottom);
    }

    #[test]
    fn test_serde_uses_kebab_names() {
        let json = serde_json::to_string(&Placement::RightStart).unwrap();
        assert_eq!(json, "\"right-start\"");
        let parsed: Placement = serde_json::from_str("\"top-end\"").unwrap();
        assert_eq!(parsed, Placement::TopEnd);
    }

    #[test]
    fn test_opposite_keeps_alignment() {
        assert_eq!(Placement::TopStart.opposite(), Placement::BottomStart);
        assert_eq!(Placement::Left.opposite(), Placement::Right);
    }

    #[test]
    fn test_rtl_flip_only_mirrors_vertical_variants() {
        assert_eq!(Placement::BottomEnd.flip_rtl(), Placement::BottomStart);
        assert_eq!(Placement::TopStart.flip_rtl(), Placement::TopEnd);
        assert_eq!(Placement::Top.flip_rtl(), Placement::Top);
        assert_eq!(Placement::LeftStart.flip_rtl(), Placement::LeftStart);
    }
}
