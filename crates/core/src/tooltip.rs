//! Tooltip open/close state machine.
//!
//! hidden -> (enter delay) -> shown -> (leave delay) -> hidden. Timers are
//! owned by a [`Scheduler`] so the machine stays clock-free; the UI backs
//! it with browser timeouts and tests with a virtual clock.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::placement::Placement;

/// Grace window after a close during which any tooltip opens instantly.
pub const HYSTERESIS_MS: f64 = 500.0;
/// Synthetic mouse events are ignored for this long after a touch close.
pub const IGNORE_NON_TOUCH_MS: u32 = 150;

/// Timer slots a tooltip can have pending. Scheduling a slot that is
/// already pending replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TooltipTimer {
    Enter,
    Leave,
    Touch,
    Close,
}

impl TooltipTimer {
    pub const ALL: [TooltipTimer; 4] = [
        TooltipTimer::Enter,
        TooltipTimer::Leave,
        TooltipTimer::Touch,
        TooltipTimer::Close,
    ];
}

/// Cancelable one-shot timers, keyed by slot.
pub trait Scheduler {
    fn schedule(&mut self, timer: TooltipTimer, delay_ms: u32);
    fn cancel(&mut self, timer: TooltipTimer);
}

/// Shared "a tooltip was open recently" flag.
///
/// One instance is shared by every tooltip that should hand off instantly
/// to its neighbours. Closing keeps the flag raised until a deadline rather
/// than arming a timer.
#[derive(Debug, Clone, Default)]
pub struct Hysteresis {
    open: bool,
    until: Option<f64>,
}

pub type SharedHysteresis = Rc<RefCell<Hysteresis>>;

impl Hysteresis {
    pub fn shared() -> SharedHysteresis {
        Rc::new(RefCell::new(Self::default()))
    }

    pub fn open(&mut self) {
        self.open = true;
        self.until = None;
    }

    /// Starts the grace window. A close while the window is already shut
    /// keeps it shut.
    pub fn close(&mut self, now: f64, leave_delay: u32) {
        if !self.is_open(now) {
            *self = Self::default();
            return;
        }
        self.until = Some(now + HYSTERESIS_MS + f64::from(leave_delay));
    }

    pub fn is_open(&self, now: f64) -> bool {
        self.open && self.until.map_or(true, |until| now < until)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Tooltip behaviour knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TooltipConfig {
    pub arrow: bool,
    pub disable_focus_listener: bool,
    pub disable_hover_listener: bool,
    pub disable_touch_listener: bool,
    pub enter_delay: u32,
    pub enter_touch_delay: u32,
    pub interactive: bool,
    pub leave_delay: u32,
    pub leave_touch_delay: u32,
    pub placement: Placement,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            arrow: false,
            disable_focus_listener: false,
            disable_hover_listener: false,
            disable_touch_listener: false,
            enter_delay: 0,
            enter_touch_delay: 700,
            interactive: false,
            leave_delay: 0,
            leave_touch_delay: 1500,
            placement: Placement::Bottom,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterSource {
    Mouse,
    Focus,
    Touch,
}

/// Requests surfaced to the owner. In controlled mode these are the only
/// effect; otherwise the machine's own open state follows them too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipChange {
    Opened,
    Closed,
}

#[derive(Debug)]
pub struct TooltipMachine {
    config: TooltipConfig,
    hysteresis: SharedHysteresis,
    open: bool,
    ignore_non_touch: bool,
    child_focus_visible: bool,
}

impl TooltipMachine {
    pub fn new(config: TooltipConfig, hysteresis: SharedHysteresis) -> Self {
        Self {
            config,
            hysteresis,
            open: false,
            ignore_non_touch: false,
            child_focus_visible: false,
        }
    }

    pub fn config(&self) -> &TooltipConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: TooltipConfig) {
        self.config = config;
    }

    /// Uncontrolled open state.
    pub fn is_open_state(&self) -> bool {
        self.open
    }

    /// Effective open state. An empty title never shows a surface.
    pub fn is_open(&self, controlled: Option<bool>, title_empty: bool) -> bool {
        !title_empty && controlled.unwrap_or(self.open)
    }

    /// The native `title` attribute is a fallback while nothing is shown.
    pub fn show_native_title(&self, open: bool) -> bool {
        !open && !self.config.disable_hover_listener
    }

    /// Mouse and focus input is ignored for a moment after a touch, since
    /// browsers emulate mouse events afterwards.
    pub fn accepts(&self, source: EnterSource) -> bool {
        !self.ignore_non_touch || source == EnterSource::Touch
    }

    pub fn enter(
        &mut self,
        source: EnterSource,
        now: f64,
        sched: &mut impl Scheduler,
    ) -> Option<TooltipChange> {
        if !self.accepts(source) {
            return None;
        }
        sched.cancel(TooltipTimer::Enter);
        sched.cancel(TooltipTimer::Leave);

        let skip_delay = self.hysteresis.borrow().is_open(now);
        if self.config.enter_delay > 0 && !skip_delay {
            sched.schedule(TooltipTimer::Enter, self.config.enter_delay);
            None
        } else {
            Some(self.open_now())
        }
    }

    /// Focus only opens the tooltip when it came from the keyboard.
    pub fn focus(
        &mut self,
        focus_visible: bool,
        now: f64,
        sched: &mut impl Scheduler,
    ) -> Option<TooltipChange> {
        if !focus_visible {
            return None;
        }
        self.child_focus_visible = true;
        self.enter(EnterSource::Focus, now, sched)
    }

    pub fn leave(&mut self, sched: &mut impl Scheduler) {
        sched.cancel(TooltipTimer::Enter);
        sched.cancel(TooltipTimer::Leave);
        sched.schedule(TooltipTimer::Leave, self.config.leave_delay);
    }

    /// Returns `true` when the focus-visible tracker must be told the
    /// keyboard-focused child lost focus.
    pub fn blur(&mut self, sched: &mut impl Scheduler) -> bool {
        let was_visible = std::mem::take(&mut self.child_focus_visible);
        self.leave(sched);
        was_visible
    }

    pub fn touch_start(&mut self, sched: &mut impl Scheduler) {
        self.ignore_non_touch = true;
        sched.cancel(TooltipTimer::Leave);
        sched.cancel(TooltipTimer::Close);
        sched.cancel(TooltipTimer::Touch);
        sched.schedule(TooltipTimer::Touch, self.config.enter_touch_delay);
    }

    pub fn touch_end(&mut self, sched: &mut impl Scheduler) {
        sched.cancel(TooltipTimer::Touch);
        sched.cancel(TooltipTimer::Leave);
        sched.schedule(TooltipTimer::Leave, self.config.leave_touch_delay);
    }

    /// Called by the scheduler's owner when `timer` elapses.
    pub fn fire(
        &mut self,
        timer: TooltipTimer,
        now: f64,
        sched: &mut impl Scheduler,
    ) -> Option<TooltipChange> {
        match timer {
            TooltipTimer::Enter => Some(self.open_now()),
            TooltipTimer::Leave => Some(self.close_now(now, sched)),
            TooltipTimer::Touch => self.enter(EnterSource::Touch, now, sched),
            TooltipTimer::Close => {
                self.ignore_non_touch = false;
                None
            }
        }
    }

    pub fn unmount(&mut self, sched: &mut impl Scheduler) {
        for timer in TooltipTimer::ALL {
            sched.cancel(timer);
        }
    }

    fn open_now(&mut self) -> TooltipChange {
        self.hysteresis.borrow_mut().open();
        self.open = true;
        TooltipChange::Opened
    }

    fn close_now(&mut self, now: f64, sched: &mut impl Scheduler) -> TooltipChange {
        self.hysteresis
            .borrow_mut()
            .close(now, self.config.leave_delay);
        self.open = false;
        sched.cancel(TooltipTimer::Close);
        sched.schedule(TooltipTimer::Close, IGNORE_NON_TOUCH_MS);
        TooltipChange::Closed
    }
}
