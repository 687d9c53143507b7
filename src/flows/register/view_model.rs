use std::cell::{RefCell, RefMut};
use std::rc::Rc;

use crate::api::{ApiClient, ApiError};
use crate::config;
use crate::cooldown::Scheduler;
use crate::flow::{CodeOutcome, FlowBinding, PrimaryOutcome, VerificationFlow, VerificationStep};
use crate::view::{ControlId, FlowId, FlowView};

use super::repository::RegistrationRepository;
use super::utils::{validate_registration, RegistrationForm};

pub struct RegistrationBinding {
    repository: RegistrationRepository,
}

impl FlowBinding for RegistrationBinding {
    type Primary = RegistrationForm;

    fn flow_id(&self) -> FlowId {
        FlowId::Registration
    }

    fn submit_control(&self) -> ControlId {
        ControlId::new("register-submit")
    }

    fn confirm_control(&self) -> ControlId {
        ControlId::new("register-confirm")
    }

    fn resend_control(&self) -> ControlId {
        ControlId::new("register-resend")
    }

    fn fallback_redirect(&self) -> String {
        config::DASHBOARD_ROUTE.to_string()
    }

    fn validate_primary(&self, form: &RegistrationForm) -> Result<(), Vec<String>> {
        validate_registration(form)
    }

    async fn submit_primary(&self, form: &RegistrationForm) -> Result<PrimaryOutcome, ApiError> {
        // The server echoes the normalized address; that is the one the
        // confirmation step keys on.
        let accepted = self.repository.register(form).await?;
        Ok(PrimaryOutcome::CodeSent {
            email: accepted.email,
        })
    }

    async fn submit_code(&self, email: &str, code: &str) -> Result<CodeOutcome, ApiError> {
        let reply = self.repository.confirm(email, code).await?;
        Ok(CodeOutcome::Navigate {
            redirect: reply.redirect,
        })
    }

    async fn request_resend(&self, email: &str) -> Result<(), ApiError> {
        self.repository.resend(email).await
    }
}

/// Registration page: form entry, then emailed-code confirmation.
pub struct RegistrationViewModel<S: Scheduler> {
    form: RefCell<RegistrationForm>,
    flow: VerificationFlow<RegistrationBinding, S>,
}

impl<S: Scheduler> RegistrationViewModel<S> {
    pub fn new(view: Rc<dyn FlowView>, scheduler: S) -> Self {
        Self::new_with_client(Rc::new(ApiClient::new()), view, scheduler)
    }

    pub fn new_with_client(client: Rc<ApiClient>, view: Rc<dyn FlowView>, scheduler: S) -> Self {
        let binding = RegistrationBinding {
            repository: RegistrationRepository::new_with_client(client),
        };
        Self {
            form: RefCell::new(RegistrationForm::default()),
            flow: VerificationFlow::new(binding, view, scheduler),
        }
    }

    pub fn form(&self) -> RefMut<'_, RegistrationForm> {
        self.form.borrow_mut()
    }

    pub fn step(&self) -> VerificationStep {
        self.flow.step()
    }

    pub fn pending_email(&self) -> String {
        self.flow.subject_email()
    }

    pub async fn submit(&self) {
        let snapshot = self.form.borrow().clone();
        self.flow.submit_primary(&snapshot).await;
    }

    pub fn set_code_input(&self, raw: &str) {
        self.flow.set_code_input(raw);
    }

    pub async fn confirm(&self) {
        self.flow.submit_code().await;
    }

    pub async fn resend(&self) {
        self.flow.request_resend().await;
    }

    pub fn reopened(&self) {
        self.flow.host_reopened();
    }
}
