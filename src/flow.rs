//! The shared multi-step verification state machine. Registration, login
//! 2FA, password reset, password change and backup-email verification are
//! all the same machine with a different [`FlowBinding`]: field validation,
//! endpoints and redirect extraction vary, the control flow does not.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rust_i18n::t;

use crate::api::ApiError;
use crate::config::RESEND_COOLDOWN_SECS;
use crate::cooldown::{CooldownTimer, Scheduler};
use crate::view::{ControlId, FlowId, FlowView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerificationStep {
    /// Collecting the primary inputs (credentials, email, new password).
    #[default]
    Initial,
    /// A code was dispatched to `subject_email`; waiting for it.
    CodeSent,
    /// Terminal. In practice immediately followed by navigation away.
    Completed,
}

/// Format check for confirmation codes: fixed-length digit strings, with a
/// single trim and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeRule {
    pub min_len: usize,
    pub max_len: usize,
}

impl CodeRule {
    /// Emailed codes are six digits.
    pub const STANDARD: CodeRule = CodeRule {
        min_len: 6,
        max_len: 6,
    };
    /// The login second factor predates the fixed length and accepts 6-8.
    pub const LEGACY: CodeRule = CodeRule {
        min_len: 6,
        max_len: 8,
    };

    pub fn matches(&self, raw: &str) -> bool {
        let code = raw.trim();
        (self.min_len..=self.max_len).contains(&code.chars().count())
            && !code.is_empty()
            && code.chars().all(|c| c.is_ascii_digit())
    }
}

/// Server verdict on the primary step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimaryOutcome {
    /// A code was dispatched; move to code entry.
    CodeSent { email: String },
    /// Short-circuit straight to completion (login without a second factor).
    Completed { redirect: Option<String> },
}

/// Server verdict on the code step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeOutcome {
    /// Done; leave the page.
    Navigate { redirect: Option<String> },
    /// Done, but the user stays here: reset to Initial and show `notice`
    /// (password change on the settings page).
    Rearm { notice: String },
}

/// Everything that varies between concrete flows. Implementations are
/// declarative bindings; they hold no step state of their own.
#[allow(async_fn_in_trait)]
pub trait FlowBinding {
    /// Input of the primary step (a form snapshot).
    type Primary;

    fn flow_id(&self) -> FlowId;

    fn code_rule(&self) -> CodeRule {
        CodeRule::STANDARD
    }

    fn submit_control(&self) -> ControlId;
    fn confirm_control(&self) -> ControlId;
    fn resend_control(&self) -> ControlId;

    fn resend_base_label(&self) -> String {
        t!("resend_code").to_string()
    }

    /// Route used when a completing response omits its redirect.
    fn fallback_redirect(&self) -> String;

    /// Collect **every** failing condition, not just the first.
    fn validate_primary(&self, input: &Self::Primary) -> Result<(), Vec<String>>;

    async fn submit_primary(&self, input: &Self::Primary) -> Result<PrimaryOutcome, ApiError>;

    async fn submit_code(&self, email: &str, code: &str) -> Result<CodeOutcome, ApiError>;

    async fn request_resend(&self, email: &str) -> Result<(), ApiError>;
}

#[derive(Debug, Default)]
struct VerificationSession {
    step: VerificationStep,
    subject_email: String,
    last_error: Option<String>,
    code_input: String,
    /// Generation counter. Bumped on every reset so a response resolving
    /// for an abandoned session is discarded instead of resurrecting it.
    epoch: u64,
}

/// One in-progress flow instance. Owns its session and cooldown state
/// exclusively; dies with the hosting view.
pub struct VerificationFlow<B: FlowBinding, S: Scheduler> {
    binding: B,
    view: Rc<dyn FlowView>,
    cooldown: CooldownTimer<S>,
    session: RefCell<VerificationSession>,
    busy: Cell<bool>,
}

impl<B: FlowBinding, S: Scheduler> VerificationFlow<B, S> {
    pub fn new(binding: B, view: Rc<dyn FlowView>, scheduler: S) -> Self {
        Self {
            binding,
            cooldown: CooldownTimer::new(scheduler, Rc::clone(&view)),
            view,
            session: RefCell::new(VerificationSession::default()),
            busy: Cell::new(false),
        }
    }

    pub fn step(&self) -> VerificationStep {
        self.session.borrow().step
    }

    pub fn subject_email(&self) -> String {
        self.session.borrow().subject_email.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.session.borrow().last_error.clone()
    }

    pub fn code_input(&self) -> String {
        self.session.borrow().code_input.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    pub fn binding(&self) -> &B {
        &self.binding
    }

    /// Submit the primary step. Validation failures stay local; otherwise
    /// the binding's request decides the transition.
    pub async fn submit_primary(&self, input: &B::Primary) {
        if self.busy.get() {
            log::debug!("{:?}: submit ignored, request in flight", self.flow_id());
            return;
        }
        if self.step() != VerificationStep::Initial {
            return;
        }
        if let Err(problems) = self.binding.validate_primary(input) {
            self.show_error(&problems.join("\n"));
            return;
        }
        self.clear_message();

        let submit = self.binding.submit_control();
        let epoch = self.begin_busy(&submit);
        let result = self.binding.submit_primary(input).await;
        if !self.end_busy(epoch, &submit) {
            return;
        }

        match result {
            Ok(PrimaryOutcome::CodeSent { email }) => {
                {
                    let mut session = self.session.borrow_mut();
                    session.step = VerificationStep::CodeSent;
                    session.subject_email = email;
                    session.code_input.clear();
                    session.last_error = None;
                }
                log::debug!("{:?}: code dispatched", self.flow_id());
                self.clear_message();
                self.view
                    .render_step(self.flow_id(), VerificationStep::CodeSent);
                self.view
                    .set_control_enabled(&self.binding.confirm_control(), false);
            }
            Ok(PrimaryOutcome::Completed { redirect }) => self.complete(redirect),
            Err(error) => self.fail(error),
        }
    }

    /// Record a keystroke in the code field. Clears the message and keeps
    /// the confirm control in sync with the format check.
    pub fn set_code_input(&self, raw: &str) {
        {
            let mut session = self.session.borrow_mut();
            session.code_input = raw.to_string();
            session.last_error = None;
        }
        self.view.set_field_error(self.flow_id(), "message", None);
        let ready = self.step() == VerificationStep::CodeSent
            && !self.busy.get()
            && self.binding.code_rule().matches(raw);
        self.view
            .set_control_enabled(&self.binding.confirm_control(), ready);
    }

    /// Submit the confirmation code. A malformed code is rejected locally
    /// with no network call.
    pub async fn submit_code(&self) {
        if self.busy.get() {
            log::debug!("{:?}: confirm ignored, request in flight", self.flow_id());
            return;
        }
        if self.step() != VerificationStep::CodeSent {
            return;
        }
        let code = self.session.borrow().code_input.trim().to_string();
        if !self.binding.code_rule().matches(&code) {
            self.show_error(&t!("invalid_code"));
            return;
        }
        self.clear_message();

        let email = self.subject_email();
        let confirm = self.binding.confirm_control();
        let epoch = self.begin_busy(&confirm);
        let result = self.binding.submit_code(&email, &code).await;
        if !self.end_busy(epoch, &confirm) {
            return;
        }

        match result {
            Ok(CodeOutcome::Navigate { redirect }) => self.complete(redirect),
            Ok(CodeOutcome::Rearm { notice }) => {
                self.reset_session();
                self.view
                    .render_step(self.flow_id(), VerificationStep::Initial);
                self.view
                    .set_control_enabled(&self.binding.confirm_control(), false);
                self.view
                    .set_field_error(self.flow_id(), "message", Some(&notice));
            }
            Err(error) => self.fail(error),
        }
    }

    /// Ask the server to dispatch the code again. The cooldown starts
    /// before the request goes out and is never rolled back on failure;
    /// that is the anti-spam policy, not an accident.
    pub async fn request_resend(&self) {
        if self.step() != VerificationStep::CodeSent {
            return;
        }
        let control = self.binding.resend_control();
        if self.cooldown.is_active(&control) {
            log::debug!("{:?}: resend blocked by cooldown", self.flow_id());
            return;
        }
        self.cooldown.start(
            &control,
            RESEND_COOLDOWN_SECS,
            &self.binding.resend_base_label(),
        );

        let email = self.subject_email();
        let epoch = self.session.borrow().epoch;
        let result = self.binding.request_resend(&email).await;
        if self.session.borrow().epoch != epoch {
            log::debug!("{:?}: discarding stale resend response", self.flow_id());
            return;
        }
        match result {
            Ok(()) => self.show_notice(&t!("code_sent")),
            Err(error) => self.fail(error),
        }
    }

    /// Mandatory reset when the hosting view is shown again: a user never
    /// resumes mid code entry after closing the dialog. Running cooldowns
    /// are left to expire on their own.
    pub fn host_reopened(&self) {
        self.reset_session();
        self.view
            .render_step(self.flow_id(), VerificationStep::Initial);
        self.view.set_field_error(self.flow_id(), "message", None);
        self.view
            .set_control_enabled(&self.binding.confirm_control(), false);
        self.view
            .set_control_enabled(&self.binding.submit_control(), true);
    }

    pub fn resend_cooldown_active(&self) -> bool {
        self.cooldown.is_active(&self.binding.resend_control())
    }

    fn flow_id(&self) -> FlowId {
        self.binding.flow_id()
    }

    fn reset_session(&self) {
        let mut session = self.session.borrow_mut();
        let epoch = session.epoch + 1;
        *session = VerificationSession {
            epoch,
            ..VerificationSession::default()
        };
        drop(session);
        self.busy.set(false);
    }

    fn begin_busy(&self, control: &ControlId) -> u64 {
        self.busy.set(true);
        self.view.set_control_enabled(control, false);
        self.session.borrow().epoch
    }

    /// Release the busy guard, unless the session was reset while the
    /// request was in flight: then the response belongs to a dead session
    /// and must not touch anything.
    fn end_busy(&self, epoch: u64, control: &ControlId) -> bool {
        if self.session.borrow().epoch != epoch {
            log::debug!("{:?}: discarding stale response", self.flow_id());
            return false;
        }
        self.busy.set(false);
        self.view.set_control_enabled(control, true);
        true
    }

    fn complete(&self, redirect: Option<String>) {
        self.session.borrow_mut().step = VerificationStep::Completed;
        log::debug!("{:?}: completed", self.flow_id());
        self.view
            .render_step(self.flow_id(), VerificationStep::Completed);
        let url = redirect.unwrap_or_else(|| self.binding.fallback_redirect());
        self.view.navigate_to(&url);
    }

    fn fail(&self, error: ApiError) {
        match error {
            ApiError::Network(detail) => {
                log::warn!("{:?}: transport error: {detail}", self.flow_id());
                self.show_error(&t!("network_error"));
            }
            other => self.show_error(&other.to_string()),
        }
    }

    fn show_error(&self, message: &str) {
        self.session.borrow_mut().last_error = Some(message.to_string());
        self.view
            .set_field_error(self.flow_id(), "message", Some(message));
    }

    fn show_notice(&self, message: &str) {
        self.session.borrow_mut().last_error = None;
        self.view
            .set_field_error(self.flow_id(), "message", Some(message));
    }

    fn clear_message(&self) {
        self.session.borrow_mut().last_error = None;
        self.view.set_field_error(self.flow_id(), "message", None);
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::*;
    use crate::test_support::{ManualScheduler, RecordingView};
    use std::collections::VecDeque;

    struct StubBinding {
        validation: Vec<String>,
        primary: RefCell<VecDeque<Result<PrimaryOutcome, ApiError>>>,
        code: RefCell<VecDeque<Result<CodeOutcome, ApiError>>>,
        primary_calls: Cell<u32>,
        resend_calls: Cell<u32>,
        gate: Option<Rc<tokio::sync::Notify>>,
    }

    impl StubBinding {
        fn new() -> Self {
            Self {
                validation: Vec::new(),
                primary: RefCell::new(VecDeque::new()),
                code: RefCell::new(VecDeque::new()),
                primary_calls: Cell::new(0),
                resend_calls: Cell::new(0),
                gate: None,
            }
        }
    }

    impl FlowBinding for StubBinding {
        type Primary = ();

        fn flow_id(&self) -> FlowId {
            FlowId::Registration
        }

        fn submit_control(&self) -> ControlId {
            ControlId::new("submit")
        }

        fn confirm_control(&self) -> ControlId {
            ControlId::new("confirm")
        }

        fn resend_control(&self) -> ControlId {
            ControlId::new("resend")
        }

        fn fallback_redirect(&self) -> String {
            "/fallback".into()
        }

        fn validate_primary(&self, _input: &()) -> Result<(), Vec<String>> {
            if self.validation.is_empty() {
                Ok(())
            } else {
                Err(self.validation.clone())
            }
        }

        async fn submit_primary(&self, _input: &()) -> Result<PrimaryOutcome, ApiError> {
            self.primary_calls.set(self.primary_calls.get() + 1);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.primary
                .borrow_mut()
                .pop_front()
                .expect("unexpected primary submit")
        }

        async fn submit_code(&self, _email: &str, _code: &str) -> Result<CodeOutcome, ApiError> {
            self.code
                .borrow_mut()
                .pop_front()
                .expect("unexpected code submit")
        }

        async fn request_resend(&self, _email: &str) -> Result<(), ApiError> {
            self.resend_calls.set(self.resend_calls.get() + 1);
            Ok(())
        }
    }

    fn flow_with(
        binding: StubBinding,
    ) -> (
        Rc<RecordingView>,
        ManualScheduler,
        VerificationFlow<StubBinding, ManualScheduler>,
    ) {
        rust_i18n::set_locale("en");
        let view = Rc::new(RecordingView::default());
        let scheduler = ManualScheduler::new();
        let flow = VerificationFlow::new(binding, view.clone() as Rc<dyn FlowView>, scheduler.clone());
        (view, scheduler, flow)
    }

    fn code_sent(primary: &VerificationFlow<StubBinding, ManualScheduler>) {
        primary
            .binding()
            .primary
            .borrow_mut()
            .push_back(Ok(PrimaryOutcome::CodeSent {
                email: "a@b.com".into(),
            }));
    }

    #[tokio::test]
    async fn failed_validation_reports_every_problem_and_stays_initial() {
        let mut binding = StubBinding::new();
        binding.validation = vec!["Email is required".into(), "Password must not be empty".into()];
        let (view, _scheduler, flow) = flow_with(binding);

        flow.submit_primary(&()).await;

        assert_eq!(flow.step(), VerificationStep::Initial);
        assert_eq!(flow.binding().primary_calls.get(), 0, "no network call");
        let message = view.message(FlowId::Registration).unwrap();
        assert!(message.contains("Email is required"));
        assert!(message.contains("Password must not be empty"));
    }

    #[tokio::test]
    async fn accepted_primary_moves_to_code_sent_and_records_email() {
        let (view, _scheduler, flow) = flow_with(StubBinding::new());
        code_sent(&flow);

        flow.submit_primary(&()).await;

        assert_eq!(flow.step(), VerificationStep::CodeSent);
        assert_eq!(flow.subject_email(), "a@b.com");
        assert!(flow.last_error().is_none());
        assert_eq!(view.step(FlowId::Registration), Some(VerificationStep::CodeSent));
        assert_eq!(view.enabled(&ControlId::new("confirm")), Some(false));
    }

    #[tokio::test]
    async fn server_rejection_keeps_initial_with_message() {
        let (view, _scheduler, flow) = flow_with(StubBinding::new());
        flow.binding().primary.borrow_mut().push_back(Err(ApiError::Server {
            status: 400,
            message: "Email is already taken".into(),
        }));

        flow.submit_primary(&()).await;

        assert_eq!(flow.step(), VerificationStep::Initial);
        assert_eq!(
            view.message(FlowId::Registration).as_deref(),
            Some("Email is already taken")
        );
    }

    #[tokio::test]
    async fn transport_error_surfaces_generic_message_and_changes_nothing() {
        let (view, _scheduler, flow) = flow_with(StubBinding::new());
        flow.binding()
            .primary
            .borrow_mut()
            .push_back(Err(ApiError::network("connection refused")));

        flow.submit_primary(&()).await;

        assert_eq!(flow.step(), VerificationStep::Initial);
        assert_eq!(
            view.message(FlowId::Registration).as_deref(),
            Some("Network error. Please retry.")
        );
    }

    #[tokio::test]
    async fn malformed_code_is_rejected_locally() {
        let (view, _scheduler, flow) = flow_with(StubBinding::new());
        code_sent(&flow);
        flow.submit_primary(&()).await;

        flow.set_code_input("12AB56");
        flow.submit_code().await;

        assert_eq!(flow.step(), VerificationStep::CodeSent);
        assert_eq!(view.message(FlowId::Registration).as_deref(), Some("Invalid code"));
        assert!(flow.binding().code.borrow().is_empty(), "queue untouched");
    }

    #[tokio::test]
    async fn accepted_code_completes_and_navigates() {
        let (view, _scheduler, flow) = flow_with(StubBinding::new());
        code_sent(&flow);
        flow.submit_primary(&()).await;
        flow.binding()
            .code
            .borrow_mut()
            .push_back(Ok(CodeOutcome::Navigate {
                redirect: Some("/dashboard".into()),
            }));

        flow.set_code_input("123456");
        flow.submit_code().await;

        assert_eq!(flow.step(), VerificationStep::Completed);
        assert_eq!(view.last_navigation().as_deref(), Some("/dashboard"));
    }

    #[tokio::test]
    async fn missing_redirect_falls_back_to_configured_route() {
        let (view, _scheduler, flow) = flow_with(StubBinding::new());
        code_sent(&flow);
        flow.submit_primary(&()).await;
        flow.binding()
            .code
            .borrow_mut()
            .push_back(Ok(CodeOutcome::Navigate { redirect: None }));

        flow.set_code_input("123456");
        flow.submit_code().await;

        assert_eq!(view.last_navigation().as_deref(), Some("/fallback"));
    }

    #[tokio::test]
    async fn rejected_code_stays_in_code_sent_with_server_message() {
        let (view, _scheduler, flow) = flow_with(StubBinding::new());
        code_sent(&flow);
        flow.submit_primary(&()).await;
        flow.binding().code.borrow_mut().push_back(Err(ApiError::Server {
            status: 401,
            message: "Code expired".into(),
        }));

        flow.set_code_input("123456");
        flow.submit_code().await;

        assert_eq!(flow.step(), VerificationStep::CodeSent);
        assert_eq!(flow.subject_email(), "a@b.com");
        assert_eq!(view.message(FlowId::Registration).as_deref(), Some("Code expired"));
    }

    #[tokio::test]
    async fn rearm_outcome_resets_to_initial_with_notice() {
        let (view, _scheduler, flow) = flow_with(StubBinding::new());
        code_sent(&flow);
        flow.submit_primary(&()).await;
        flow.binding().code.borrow_mut().push_back(Ok(CodeOutcome::Rearm {
            notice: "Password changed".into(),
        }));

        flow.set_code_input("123456");
        flow.submit_code().await;

        assert_eq!(flow.step(), VerificationStep::Initial);
        assert!(flow.subject_email().is_empty());
        assert_eq!(view.message(FlowId::Registration).as_deref(), Some("Password changed"));
        assert!(view.navigations().is_empty());
    }

    #[tokio::test]
    async fn resend_starts_cooldown_before_request_and_keeps_it_on_success() {
        let (_view, _scheduler, flow) = flow_with(StubBinding::new());
        code_sent(&flow);
        flow.submit_primary(&()).await;

        flow.request_resend().await;

        assert!(flow.resend_cooldown_active());
        assert_eq!(flow.binding().resend_calls.get(), 1);
    }

    #[tokio::test]
    async fn second_resend_within_cooldown_is_blocked() {
        let (_view, scheduler, flow) = flow_with(StubBinding::new());
        code_sent(&flow);
        flow.submit_primary(&()).await;

        flow.request_resend().await;
        scheduler.advance_secs(30);
        flow.request_resend().await;

        assert_eq!(flow.binding().resend_calls.get(), 1, "one request reached the server");
        assert!(flow.resend_cooldown_active());

        scheduler.advance_secs(30);
        flow.request_resend().await;
        assert_eq!(flow.binding().resend_calls.get(), 2, "allowed again after expiry");
    }

    #[tokio::test]
    async fn code_input_sync_gates_the_confirm_control() {
        let (view, _scheduler, flow) = flow_with(StubBinding::new());
        code_sent(&flow);
        flow.submit_primary(&()).await;

        flow.set_code_input("12345");
        assert_eq!(view.enabled(&ControlId::new("confirm")), Some(false));
        flow.set_code_input("123456");
        assert_eq!(view.enabled(&ControlId::new("confirm")), Some(true));
        flow.set_code_input(" 123456 ");
        assert_eq!(view.enabled(&ControlId::new("confirm")), Some(true), "single trim");
    }

    #[tokio::test]
    async fn host_reopened_resets_everything() {
        let (view, _scheduler, flow) = flow_with(StubBinding::new());
        code_sent(&flow);
        flow.submit_primary(&()).await;
        flow.set_code_input("123456");

        flow.host_reopened();

        assert_eq!(flow.step(), VerificationStep::Initial);
        assert!(flow.subject_email().is_empty());
        assert!(flow.code_input().is_empty());
        assert!(flow.last_error().is_none());
        assert_eq!(view.step(FlowId::Registration), Some(VerificationStep::Initial));
        assert_eq!(view.enabled(&ControlId::new("confirm")), Some(false));
    }

    #[tokio::test]
    async fn concurrent_submit_is_ignored_while_busy() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let gate = Rc::new(tokio::sync::Notify::new());
                let mut binding = StubBinding::new();
                binding.gate = Some(gate.clone());
                let (_view, _scheduler, flow) = flow_with(binding);
                code_sent(&flow);
                let flow = Rc::new(flow);

                let pending = tokio::task::spawn_local({
                    let flow = Rc::clone(&flow);
                    async move { flow.submit_primary(&()).await }
                });
                tokio::task::yield_now().await;
                assert!(flow.is_busy());

                // Re-entrant submit while the first is in flight.
                flow.submit_primary(&()).await;
                assert_eq!(flow.binding().primary_calls.get(), 1);

                gate.notify_one();
                pending.await.unwrap();
                assert_eq!(flow.step(), VerificationStep::CodeSent);
            })
            .await;
    }

    #[tokio::test]
    async fn response_for_a_reset_session_is_discarded() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let gate = Rc::new(tokio::sync::Notify::new());
                let mut binding = StubBinding::new();
                binding.gate = Some(gate.clone());
                let (view, _scheduler, flow) = flow_with(binding);
                code_sent(&flow);
                let flow = Rc::new(flow);

                let pending = tokio::task::spawn_local({
                    let flow = Rc::clone(&flow);
                    async move { flow.submit_primary(&()).await }
                });
                tokio::task::yield_now().await;

                // The dialog is closed and reopened before the reply lands.
                flow.host_reopened();
                gate.notify_one();
                pending.await.unwrap();

                assert_eq!(flow.step(), VerificationStep::Initial, "stale reply ignored");
                assert!(flow.subject_email().is_empty());
                assert!(!flow.is_busy());
                assert_eq!(view.step(FlowId::Registration), Some(VerificationStep::Initial));
            })
            .await;
    }

    #[test]
    fn code_rules_check_length_and_digits_after_one_trim() {
        assert!(CodeRule::STANDARD.matches("123456"));
        assert!(CodeRule::STANDARD.matches(" 123456 "));
        assert!(!CodeRule::STANDARD.matches("12345"));
        assert!(!CodeRule::STANDARD.matches("1234567"));
        assert!(!CodeRule::STANDARD.matches("12AB56"));
        assert!(!CodeRule::STANDARD.matches(""));

        assert!(CodeRule::LEGACY.matches("12345678"));
        assert!(CodeRule::LEGACY.matches("123456"));
        assert!(!CodeRule::LEGACY.matches("123456789"));
    }
}
