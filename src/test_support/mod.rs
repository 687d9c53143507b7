//! Host-test doubles: a hand-driven scheduler standing in for browser
//! timers, and a view adapter that records everything the core tells it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::cooldown::Scheduler;
use crate::flow::VerificationStep;
use crate::view::{ControlId, FlowId, FlowView};

type Callback = Rc<RefCell<Box<dyn FnMut()>>>;

struct Timer {
    due_ms: f64,
    period_ms: Option<f64>,
    callback: Callback,
}

#[derive(Default)]
struct SchedulerState {
    now_ms: f64,
    next_id: u64,
    timers: HashMap<u64, Timer>,
}

/// Deterministic scheduler: time moves only through [`advance_ms`], firing
/// due callbacks in timestamp order along the way.
///
/// [`advance_ms`]: ManualScheduler::advance_ms
#[derive(Clone, Default)]
pub struct ManualScheduler {
    state: Rc<RefCell<SchedulerState>>,
}

pub struct ManualHandle {
    id: u64,
    state: Weak<RefCell<SchedulerState>>,
}

impl Drop for ManualHandle {
    fn drop(&mut self) {
        if let Some(state) = self.state.upgrade() {
            state.borrow_mut().timers.remove(&self.id);
        }
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&self, due_ms: f64, period_ms: Option<f64>, callback: Callback) -> ManualHandle {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state.timers.insert(
            id,
            Timer {
                due_ms,
                period_ms,
                callback,
            },
        );
        ManualHandle {
            id,
            state: Rc::downgrade(&self.state),
        }
    }

    pub fn advance_secs(&self, secs: u64) {
        self.advance_ms(secs as f64 * 1000.0);
    }

    pub fn advance_ms(&self, ms: f64) {
        let target = self.state.borrow().now_ms + ms;
        loop {
            // Earliest timer due within the window; ties break by creation
            // order so interleavings are reproducible.
            let next = {
                let state = self.state.borrow();
                state
                    .timers
                    .iter()
                    .filter(|(_, timer)| timer.due_ms <= target)
                    .min_by(|(a_id, a), (b_id, b)| {
                        a.due_ms
                            .partial_cmp(&b.due_ms)
                            .expect("timer deadlines are finite")
                            .then(a_id.cmp(b_id))
                    })
                    .map(|(id, timer)| (*id, timer.due_ms, timer.period_ms, timer.callback.clone()))
            };
            let Some((id, due_ms, period_ms, callback)) = next else {
                break;
            };
            {
                let mut state = self.state.borrow_mut();
                state.now_ms = state.now_ms.max(due_ms);
                match period_ms {
                    Some(period) => {
                        if let Some(timer) = state.timers.get_mut(&id) {
                            timer.due_ms = due_ms + period;
                        }
                    }
                    None => {
                        state.timers.remove(&id);
                    }
                }
            }
            // Run outside the borrow: the callback may start or cancel timers.
            (callback.borrow_mut())();
        }
        self.state.borrow_mut().now_ms = target;
    }
}

impl Scheduler for ManualScheduler {
    type Handle = ManualHandle;

    fn now_ms(&self) -> f64 {
        self.state.borrow().now_ms
    }

    fn interval(&self, period_ms: u32, callback: Box<dyn FnMut()>) -> Self::Handle {
        let due = self.now_ms() + f64::from(period_ms);
        self.register(
            due,
            Some(f64::from(period_ms)),
            Rc::new(RefCell::new(callback)),
        )
    }

    fn timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Self::Handle {
        let due = self.now_ms() + f64::from(delay_ms);
        let mut once = Some(callback);
        self.register(
            due,
            None,
            Rc::new(RefCell::new(Box::new(move || {
                if let Some(callback) = once.take() {
                    callback();
                }
            }))),
        )
    }
}

#[derive(Default)]
struct ViewState {
    steps: HashMap<FlowId, VerificationStep>,
    field_errors: HashMap<(FlowId, String), Option<String>>,
    labels: HashMap<ControlId, String>,
    enabled: HashMap<ControlId, bool>,
    enable_log: Vec<(ControlId, bool)>,
    navigations: Vec<String>,
}

/// Records every render instruction for later assertion.
#[derive(Default)]
pub struct RecordingView {
    state: RefCell<ViewState>,
}

impl RecordingView {
    pub fn step(&self, flow: FlowId) -> Option<VerificationStep> {
        self.state.borrow().steps.get(&flow).copied()
    }

    pub fn field_error(&self, flow: FlowId, field: &str) -> Option<String> {
        self.state
            .borrow()
            .field_errors
            .get(&(flow, field.to_string()))
            .cloned()
            .flatten()
    }

    /// Shorthand for the shared per-flow message area.
    pub fn message(&self, flow: FlowId) -> Option<String> {
        self.field_error(flow, "message")
    }

    pub fn label(&self, control: &ControlId) -> Option<String> {
        self.state.borrow().labels.get(control).cloned()
    }

    pub fn enabled(&self, control: &ControlId) -> Option<bool> {
        self.state.borrow().enabled.get(control).copied()
    }

    /// Enable/disable history for one control.
    pub fn enable_events(&self, control: &ControlId) -> Vec<bool> {
        self.state
            .borrow()
            .enable_log
            .iter()
            .filter(|(id, _)| id == control)
            .map(|(_, enabled)| *enabled)
            .collect()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.borrow().navigations.clone()
    }

    pub fn last_navigation(&self) -> Option<String> {
        self.state.borrow().navigations.last().cloned()
    }
}

impl FlowView for RecordingView {
    fn render_step(&self, flow: FlowId, step: VerificationStep) {
        self.state.borrow_mut().steps.insert(flow, step);
    }

    fn set_field_error(&self, flow: FlowId, field: &str, message: Option<&str>) {
        self.state
            .borrow_mut()
            .field_errors
            .insert((flow, field.to_string()), message.map(str::to_string));
    }

    fn set_control_enabled(&self, control: &ControlId, enabled: bool) {
        let mut state = self.state.borrow_mut();
        state.enabled.insert(control.clone(), enabled);
        state.enable_log.push((control.clone(), enabled));
    }

    fn set_control_label(&self, control: &ControlId, label: &str) {
        self.state
            .borrow_mut()
            .labels
            .insert(control.clone(), label.to_string());
    }

    fn navigate_to(&self, url: &str) {
        self.state.borrow_mut().navigations.push(url.to_string());
    }
}
