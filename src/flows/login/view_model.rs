use std::cell::{RefCell, RefMut};
use std::rc::Rc;

use crate::api::{ApiClient, ApiError, LoginReply};
use crate::config;
use crate::cooldown::Scheduler;
use crate::flow::{
    CodeOutcome, CodeRule, FlowBinding, PrimaryOutcome, VerificationFlow, VerificationStep,
};
use crate::view::{ControlId, FlowId, FlowView};

use super::repository::LoginRepository;
use super::utils::{validate_credentials, LoginForm};

pub struct LoginBinding {
    repository: LoginRepository,
}

impl FlowBinding for LoginBinding {
    type Primary = LoginForm;

    fn flow_id(&self) -> FlowId {
        FlowId::Login
    }

    fn code_rule(&self) -> CodeRule {
        CodeRule::LEGACY
    }

    fn submit_control(&self) -> ControlId {
        ControlId::new("login-submit")
    }

    fn confirm_control(&self) -> ControlId {
        ControlId::new("login-confirm")
    }

    fn resend_control(&self) -> ControlId {
        ControlId::new("login-resend")
    }

    fn fallback_redirect(&self) -> String {
        config::DASHBOARD_ROUTE.to_string()
    }

    fn validate_primary(&self, form: &LoginForm) -> Result<(), Vec<String>> {
        validate_credentials(form)
    }

    /// Three accepted shapes: an HTTP redirect and `{status:"ok"}` both end
    /// the flow at once; `{status:"2fa_required"}` asks for the code.
    async fn submit_primary(&self, form: &LoginForm) -> Result<PrimaryOutcome, ApiError> {
        let email = form.email.trim().to_string();
        match self.repository.login(&email, &form.password).await? {
            LoginReply::Redirect(url) => Ok(PrimaryOutcome::Completed {
                redirect: Some(url),
            }),
            LoginReply::Ok { redirect } => Ok(PrimaryOutcome::Completed { redirect }),
            LoginReply::TwoFactorRequired => Ok(PrimaryOutcome::CodeSent { email }),
        }
    }

    async fn submit_code(&self, email: &str, code: &str) -> Result<CodeOutcome, ApiError> {
        let reply = self.repository.second_factor(email, code).await?;
        Ok(CodeOutcome::Navigate {
            redirect: reply.redirect,
        })
    }

    async fn request_resend(&self, email: &str) -> Result<(), ApiError> {
        self.repository.resend_second_factor(email).await
    }
}

/// Login page: credentials, then the second factor when the account asks
/// for one.
pub struct LoginViewModel<S: Scheduler> {
    form: RefCell<LoginForm>,
    flow: VerificationFlow<LoginBinding, S>,
}

impl<S: Scheduler> LoginViewModel<S> {
    pub fn new(view: Rc<dyn FlowView>, scheduler: S) -> Self {
        Self::new_with_client(Rc::new(ApiClient::new()), view, scheduler)
    }

    pub fn new_with_client(client: Rc<ApiClient>, view: Rc<dyn FlowView>, scheduler: S) -> Self {
        let binding = LoginBinding {
            repository: LoginRepository::new_with_client(client),
        };
        Self {
            form: RefCell::new(LoginForm::default()),
            flow: VerificationFlow::new(binding, view, scheduler),
        }
    }

    pub fn form(&self) -> RefMut<'_, LoginForm> {
        self.form.borrow_mut()
    }

    pub fn step(&self) -> VerificationStep {
        self.flow.step()
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
