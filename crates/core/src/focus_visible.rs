//! Keyboard-vs-pointer focus modality, after the WICG `focus-visible`
//! heuristic.

/// How long after a visible blur a tab switch still counts as keyboard.
pub const BLUR_VISIBLE_WINDOW_MS: f64 = 100.0;

const KEYBOARD_INPUT_TYPES: [&str; 13] = [
    "text",
    "search",
    "url",
    "tel",
    "email",
    "password",
    "number",
    "date",
    "month",
    "week",
    "time",
    "datetime",
    "datetime-local",
];

/// What the detector needs to know about the element receiving focus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusTarget {
    /// Result of `:focus-visible` matching, when the platform supports it.
    pub matches_focus_visible: Option<bool>,
    pub tag_name: String,
    pub input_type: String,
    pub read_only: bool,
    pub content_editable: bool,
}

impl FocusTarget {
    /// Elements that always show a focus ring, whatever the input device.
    pub fn triggers_keyboard_modality(&self) -> bool {
        match self.tag_name.as_str() {
            "INPUT" if !self.read_only => {
                KEYBOARD_INPUT_TYPES.contains(&self.input_type.as_str())
            }
            "TEXTAREA" if !self.read_only => true,
            _ => self.content_editable,
        }
    }
}

/// Modality state for one document.
#[derive(Debug, Clone, PartialEq)]
pub struct FocusVisible {
    had_keyboard_event: bool,
    focus_visible_until: Option<f64>,
}

impl FocusVisible {
    pub fn new() -> Self {
        Self {
            had_keyboard_event: true,
            focus_visible_until: None,
        }
    }

    pub fn on_key_down(&mut self) {
        self.had_keyboard_event = true;
    }

    /// Mouse, pointer and touch presses all switch to pointer modality.
    pub fn on_pointer_down(&mut self) {
        self.had_keyboard_event = false;
    }

    /// A tab switch right after a visible blur keeps keyboard modality so
    /// the ring comes back when the user returns.
    pub fn on_visibility_change(&mut self, hidden: bool, now: f64) {
        if hidden && self.had_focus_visible_recently(now) {
            self.had_keyboard_event = true;
        }
    }

    /// Call when an element that showed a focus ring loses focus.
    pub fn on_blur_visible(&mut self, now: f64) {
        self.focus_visible_until = Some(now + BLUR_VISIBLE_WINDOW_MS);
    }

    pub fn had_focus_visible_recently(&self, now: f64) -> bool {
        self.focus_visible_until.is_some_and(|until| now < until)
    }

    pub fn is_focus_visible(&self, target: &FocusTarget) -> bool {
        if let Some(matches) = target.matches_focus_visible {
            return matches;
        }
        self.had_keyboard_event || target.triggers_keyboard_modality()
    }
}

impl Default for FocusVisible {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button() -> FocusTarget {
        FocusTarget {
            tag_name: "BUTTON".into(),
            ..FocusTarget::default()
        }
    }

    #[test]
    fn test_pointer_then_keyboard() {
        let mut detector = FocusVisible::new();
        assert!(detector.is_focus_visible(&button()));

        detector.on_pointer_down();
        assert!(!detector.is_focus_visible(&button()));

        detector.on_key_down();
        assert!(detector.is_focus_visible(&button()));
    }

    #[test]
    fn test_text_inputs_are_always_visible() {
        let mut detector = FocusVisible::new();
        detector.on_pointer_down();

        let text = FocusTarget {
            tag_name: "INPUT".into(),
            input_type: "text".into(),
            ..FocusTarget::default()
        };
        let checkbox = FocusTarget {
            input_type: "checkbox".into(),
            ..text.clone()
        };
        let read_only = FocusTarget {
            read_only: true,
            ..text.clone()
        };

        assert!(detector.is_focus_visible(&text));
        assert!(!detector.is_focus_visible(&checkbox));
        assert!(!detector.is_focus_visible(&read_only));
    }

    #[test]
    fn test_native_matching_wins() {
        let detector = FocusVisible::new();
        let target = FocusTarget {
            matches_focus_visible: Some(false),
            ..button()
        };
        assert!(!detector.is_focus_visible(&target));
    }

    #[test]
    fn test_tab_switch_after_visible_blur() {
        let mut detector = FocusVisible::new();
        detector.on_pointer_down();
        detector.on_blur_visible(1_000.0);

        detector.on_visibility_change(true, 1_050.0);
        assert!(detector.is_focus_visible(&button()));

        detector.on_pointer_down();
        detector.on_visibility_change(true, 1_200.0);
        assert!(!detector.is_focus_visible(&button()));
    }
}
