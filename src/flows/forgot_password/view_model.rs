use std::cell::{RefCell, RefMut};
use std::rc::Rc;

use rust_i18n::t;

use crate::api::{ApiClient, ApiError};
use crate::config;
use crate::cooldown::Scheduler;
use crate::flow::{CodeOutcome, FlowBinding, PrimaryOutcome, VerificationFlow, VerificationStep};
use crate::view::{ControlId, FlowId, FlowView};

use super::repository::ForgotPasswordRepository;

pub struct ForgotPasswordBinding {
    repository: ForgotPasswordRepository,
}

impl FlowBinding for ForgotPasswordBinding {
    type Primary = String;

    fn flow_id(&self) -> FlowId {
        FlowId::ForgotPassword
    }

    fn submit_control(&self) -> ControlId {
        ControlId::new("forgot-submit")
    }

    fn confirm_control(&self) -> ControlId {
        ControlId::new("forgot-confirm")
    }

    fn resend_control(&self) -> ControlId {
        ControlId::new("forgot-resend")
    }

    fn fallback_redirect(&self) -> String {
        config::DEFAULT_ROUTE.to_string()
    }

    fn validate_primary(&self, email: &String) -> Result<(), Vec<String>> {
        if email.trim().is_empty() {
            Err(vec![t!("email_required").to_string()])
        } else {
            Ok(())
        }
    }

    /// The endpoint answers 200 whether or not the account exists, so a
    /// success always moves to code entry.
    async fn submit_primary(&self, email: &String) -> Result<PrimaryOutcome, ApiError> {
        let email = email.trim().to_string();
        self.repository.send_code(&email).await?;
        Ok(PrimaryOutcome::CodeSent { email })
    }

    async fn submit_code(&self, email: &str, code: &str) -> Result<CodeOutcome, ApiError> {
        let reply = self.repository.verify(email, code).await?;
        Ok(CodeOutcome::Navigate {
            redirect: reply.redirect,
        })
    }

    async fn request_resend(&self, email: &str) -> Result<(), ApiError> {
        self.repository.send_code(email).await
    }
}

/// Forgot-password page: an email, a code, then off to the reset form.
pub struct ForgotPasswordViewModel<S: Scheduler> {
    email: RefCell<String>,
    flow: VerificationFlow<ForgotPasswordBinding, S>,
}

impl<S: Scheduler> ForgotPasswordViewModel<S> {
    pub fn new(view: Rc<dyn FlowView>, scheduler: S) -> Self {
        Self::new_with_client(Rc::new(ApiClient::new()), view, scheduler)
    }

    pub fn new_with_client(client: Rc<ApiClient>, view: Rc<dyn FlowView>, scheduler: S) -> Self {
        let binding = ForgotPasswordBinding {
            repository: ForgotPasswordRepository::new_with_client(client),
        };
        Self {
            email: RefCell::new(String::new()),
            flow: VerificationFlow::new(binding, view, scheduler),
        }
    }

    pub fn email(&self) -> RefMut<'_, String> {
        self.email.borrow_mut()
    }

    pub fn step(&self) -> VerificationStep {
        self.flow.step()
    }

    pub async fn submit(&self) {
        let email = self.email.borrow().clone();
        self.flow.submit_primary(&email).await;
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
