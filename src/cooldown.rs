//! Resend-cooldown timers. Each control gets at most one countdown at a
//! time; while it runs the control is disabled and its label shows the
//! remaining seconds. Timing is abstracted behind [`Scheduler`] so the flow
//! logic stays deterministic under test.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use rust_i18n::t;

use crate::config::COOLDOWN_FAILSAFE_MARGIN_MS;
use crate::view::{ControlId, FlowView};

/// Clock plus one-shot and recurring callbacks. Dropping a handle cancels
/// its timer (the `gloo_timers` contract).
pub trait Scheduler: Clone + 'static {
    type Handle;

    /// Milliseconds on a monotonic-enough clock.
    fn now_ms(&self) -> f64;

    fn interval(&self, period_ms: u32, callback: Box<dyn FnMut()>) -> Self::Handle;

    fn timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Self::Handle;
}

struct Active<H> {
    deadline_ms: f64,
    base_label: String,
    _tick: H,
    _failsafe: H,
}

struct Inner<S: Scheduler> {
    scheduler: S,
    view: Rc<dyn FlowView>,
    active: RefCell<HashMap<ControlId, Active<S::Handle>>>,
}

impl<S: Scheduler> Inner<S> {
    fn remaining_secs(&self, control: &ControlId) -> Option<u32> {
        let deadline = self.active.borrow().get(control)?.deadline_ms;
        let remaining = ((deadline - self.scheduler.now_ms()) / 1000.0).round();
        Some(remaining.max(0.0) as u32)
    }

    /// Cancel all pending timers for `control`, re-enable it and restore the
    /// base label. Reached from the tick hitting zero or from the fail-safe,
    /// whichever fires first; the loser finds the entry gone.
    fn complete(self: &Rc<Self>, control: &ControlId) {
        let removed = self.active.borrow_mut().remove(control);
        if let Some(entry) = removed {
            self.view.set_control_enabled(control, true);
            self.view.set_control_label(control, &entry.base_label);
        }
    }

    fn tick(self: &Rc<Self>, control: &ControlId) {
        let Some(remaining) = self.remaining_secs(control) else {
            return;
        };
        if remaining > 0 {
            self.view
                .set_control_label(control, &t!("resend_in", seconds = remaining));
        } else {
            self.complete(control);
        }
    }
}

/// Owns the countdown state for every resend control of one flow.
pub struct CooldownTimer<S: Scheduler> {
    inner: Rc<Inner<S>>,
}

impl<S: Scheduler> Clone for CooldownTimer<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: Scheduler> CooldownTimer<S> {
    pub fn new(scheduler: S, view: Rc<dyn FlowView>) -> Self {
        Self {
            inner: Rc::new(Inner {
                scheduler,
                view,
                active: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// Start (or restart) the countdown on `control`. Any countdown already
    /// running on it is cancelled first, so two timers never compete. There
    /// is deliberately no cancel operation: a cooldown ends only by expiry.
    pub fn start(&self, control: &ControlId, duration_secs: u32, base_label: &str) {
        let inner = &self.inner;
        inner.active.borrow_mut().remove(control);

        let deadline_ms = inner.scheduler.now_ms() + f64::from(duration_secs) * 1000.0;
        inner.view.set_control_enabled(control, false);
        inner
            .view
            .set_control_label(control, &t!("resend_in", seconds = duration_secs));

        let weak: Weak<Inner<S>> = Rc::downgrade(inner);
        let tick_control = control.clone();
        let tick = inner.scheduler.interval(
            1_000,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.tick(&tick_control);
                }
            }),
        );

        let weak: Weak<Inner<S>> = Rc::downgrade(inner);
        let failsafe_control = control.clone();
        let failsafe = inner.scheduler.timeout(
            duration_secs * 1_000 + COOLDOWN_FAILSAFE_MARGIN_MS,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.complete(&failsafe_control);
                }
            }),
        );

        inner.active.borrow_mut().insert(
            control.clone(),
            Active {
                deadline_ms,
                base_label: base_label.to_string(),
                _tick: tick,
                _failsafe: failsafe,
            },
        );
    }

    pub fn is_active(&self, control: &ControlId) -> bool {
        self.inner.active.borrow().contains_key(control)
    }

    pub fn remaining_secs(&self, control: &ControlId) -> Option<u32> {
        self.inner.remaining_secs(control)
    }
}

#[cfg(target_arch = "wasm32")]
pub mod browser {
    //! Browser timers, same ownership rules as the dashboard clock: keep the
    //! handle alive, drop it to cancel.

    use gloo_timers::callback::{Interval, Timeout};

    use super::Scheduler;

    #[derive(Clone, Default)]
    pub struct BrowserScheduler;

    pub enum BrowserHandle {
        Interval(Interval),
        Timeout(Timeout),
    }

    impl Scheduler for BrowserScheduler {
        type Handle = BrowserHandle;

        fn now_ms(&self) -> f64 {
            js_sys::Date::now()
        }

        fn interval(&self, period_ms: u32, mut callback: Box<dyn FnMut()>) -> Self::Handle {
            BrowserHandle::Interval(Interval::new(period_ms, move || callback()))
        }

        fn timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Self::Handle {
            BrowserHandle::Timeout(Timeout::new(delay_ms, callback))
        }
    }
}
