//! Enter/exit transition contract and timing helpers.

pub mod duration {
    pub const SHORTEST: u32 = 150;
    pub const SHORTER: u32 = 200;
    pub const SHORT: u32 = 250;
    pub const STANDARD: u32 = 300;
    pub const COMPLEX: u32 = 375;
    pub const ENTERING_SCREEN: u32 = 225;
    pub const LEAVING_SCREEN: u32 = 195;
}

pub mod easing {
    pub const EASE_IN_OUT: &str = "cubic-bezier(0.4, 0, 0.2, 1)";
    pub const EASE_OUT: &str = "cubic-bezier(0.0, 0, 0.2, 1)";
    pub const EASE_IN: &str = "cubic-bezier(0.4, 0, 1, 1)";
    pub const SHARP: &str = "cubic-bezier(0.4, 0, 0.6, 1)";
}

pub fn format_ms(ms: f64) -> String {
    format!("{}ms", ms.round())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionTiming {
    pub duration: f64,
    pub easing: &'static str,
    pub delay: f64,
}

impl Default for TransitionTiming {
    fn default() -> Self {
        Self {
            duration: f64::from(duration::STANDARD),
            easing: easing::EASE_IN_OUT,
            delay: 0.0,
        }
    }
}

/// Builds a CSS `transition` value, one entry per property.
pub fn create(properties: &[&str], timing: TransitionTiming) -> String {
    let properties: &[&str] = if properties.is_empty() { &["all"] } else { properties };
    properties
        .iter()
        .map(|property| {
            format!(
                "{property} {} {} {}",
                format_ms(timing.duration),
                timing.easing,
                format_ms(timing.delay)
            )
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Duration for animating to `height` pixels: grows sub-linearly so tall
/// content does not crawl.
pub fn auto_height_duration(height: f64) -> u32 {
    if height <= 0.0 {
        return 0;
    }
    let constant = height / 36.0;
    ((4.0 + 15.0 * constant.powf(0.25) + constant / 5.0) * 10.0).round() as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    Exited,
    Entering,
    Entered,
    Exiting,
}

/// Callbacks owed to the consumer, in firing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEvent {
    Enter { appearing: bool },
    Entering,
    Entered,
    Exit,
    Exiting,
    Exited,
}

/// Drives one transitioned child. `Exited` is reported exactly once per
/// exit, however many times completion is signalled.
#[derive(Debug, Clone)]
pub struct TransitionState {
    phase: TransitionPhase,
    appeared: bool,
}

impl TransitionState {
    /// `appear` animates a child that starts visible.
    pub fn new(shown: bool, appear: bool) -> Self {
        let phase = if shown && !appear {
            TransitionPhase::Entered
        } else {
            TransitionPhase::Exited
        };
        Self {
            phase,
            appeared: phase == TransitionPhase::Entered,
        }
    }

    pub fn phase(&self) -> TransitionPhase {
        self.phase
    }

    pub fn set_in(&mut self, shown: bool) -> Vec<TransitionEvent> {
        match (shown, self.phase) {
            (true, TransitionPhase::Exited | TransitionPhase::Exiting) => {
                let appearing = !self.appeared;
                self.appeared = true;
                self.phase = TransitionPhase::Entering;
                vec![TransitionEvent::Enter { appearing }, TransitionEvent::Entering]
            }
            (false, TransitionPhase::Entered | TransitionPhase::Entering) => {
                self.phase = TransitionPhase::Exiting;
                vec![TransitionEvent::Exit, TransitionEvent::Exiting]
            }
            _ => Vec::new(),
        }
    }

    /// The running animation finished.
    pub fn complete(&mut self) -> Option<TransitionEvent> {
        match self.phase {
            TransitionPhase::Entering => {
                self.phase = TransitionPhase::Entered;
                Some(TransitionEvent::Entered)
            }
            TransitionPhase::Exiting => {
                self.phase = TransitionPhase::Exited;
                Some(TransitionEvent::Exited)
            }
            _ => None,
        }
    }
}
