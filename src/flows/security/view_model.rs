use std::cell::{RefCell, RefMut};
use std::rc::Rc;

use rust_i18n::t;

use crate::api::{ApiClient, ApiError};
use crate::config;
use crate::cooldown::Scheduler;
use crate::flow::{CodeOutcome, FlowBinding, PrimaryOutcome, VerificationFlow, VerificationStep};
use crate::view::{ControlId, FlowId, FlowView};

use super::repository::SecurityRepository;
use super::utils::{validate_password_change, PasswordChangeForm};

/// Password change shares the live form with its view model: the confirm
/// request sends whatever the fields hold at that moment, so an edit after
/// the code was sent still has to pass the match check.
pub struct PasswordChangeBinding {
    repository: SecurityRepository,
    form: Rc<RefCell<PasswordChangeForm>>,
}

impl FlowBinding for PasswordChangeBinding {
    type Primary = PasswordChangeForm;

    fn flow_id(&self) -> FlowId {
        FlowId::PasswordChange
    }

    fn submit_control(&self) -> ControlId {
        ControlId::new("password-send-code")
    }

    fn confirm_control(&self) -> ControlId {
        ControlId::new("password-confirm")
    }

    fn resend_control(&self) -> ControlId {
        ControlId::new("password-resend")
    }

    fn fallback_redirect(&self) -> String {
        config::SECURITY_SETTINGS_ROUTE.to_string()
    }

    fn validate_primary(&self, form: &PasswordChangeForm) -> Result<(), Vec<String>> {
        validate_password_change(form)
    }

    async fn submit_primary(&self, form: &PasswordChangeForm) -> Result<PrimaryOutcome, ApiError> {
        self.repository
            .send_password_code(&form.new_password_value())
            .await?;
        // The code goes to the account's own address; the server knows it.
        Ok(PrimaryOutcome::CodeSent {
            email: String::new(),
        })
    }

    async fn submit_code(&self, _email: &str, code: &str) -> Result<CodeOutcome, ApiError> {
        let form = self.form.borrow().clone();
        if !form.passwords_match() {
            return Err(ApiError::validation(t!("passwords_do_not_match")));
        }
        self.repository
            .change_password(&form.new_password_value(), code)
            .await?;
        Ok(CodeOutcome::Rearm {
            notice: t!("password_changed").to_string(),
        })
    }

    async fn request_resend(&self, _email: &str) -> Result<(), ApiError> {
        let form = self.form.borrow().clone();
        self.repository
            .send_password_code(&form.new_password_value())
            .await
    }
}

/// Password-change panel: request a code, then confirm. Success re-arms
/// the panel in place instead of navigating.
pub struct PasswordChangeViewModel<S: Scheduler> {
    form: Rc<RefCell<PasswordChangeForm>>,
    flow: VerificationFlow<PasswordChangeBinding, S>,
}

impl<S: Scheduler> PasswordChangeViewModel<S> {
    pub fn new(view: Rc<dyn FlowView>, scheduler: S) -> Self {
        Self::new_with_client(Rc::new(ApiClient::new()), view, scheduler)
    }

    pub fn new_with_client(client: Rc<ApiClient>, view: Rc<dyn FlowView>, scheduler: S) -> Self {
        let form = Rc::new(RefCell::new(PasswordChangeForm::default()));
        let binding = PasswordChangeBinding {
            repository: SecurityRepository::new_with_client(client),
            form: Rc::clone(&form),
        };
        Self {
            form,
            flow: VerificationFlow::new(binding, view, scheduler),
        }
    }

    pub fn form(&self) -> RefMut<'_, PasswordChangeForm> {
        self.form.borrow_mut()
    }

    pub fn step(&self) -> VerificationStep {
        self.flow.step()
    }

    pub async fn send_code(&self) {
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

/// One backup-email slot. Verification ends with a reload of the settings
/// page so the slot list re-renders from the server.
pub struct BackupEmailBinding {
    slot: u8,
    repository: SecurityRepository,
}

impl BackupEmailBinding {
    fn control(&self, suffix: &str) -> ControlId {
        ControlId::new(format!("backup-email-{}-{suffix}", self.slot))
    }
}

impl FlowBinding for BackupEmailBinding {
    type Primary = String;

    fn flow_id(&self) -> FlowId {
        FlowId::BackupEmail(self.slot)
    }

    fn submit_control(&self) -> ControlId {
        self.control("submit")
    }

    fn confirm_control(&self) -> ControlId {
        self.control("confirm")
    }

    fn resend_control(&self) -> ControlId {
        self.control("resend")
    }

    fn fallback_redirect(&self) -> String {
        config::SECURITY_SETTINGS_ROUTE.to_string()
    }

    fn validate_primary(&self, email: &String) -> Result<(), Vec<String>> {
        if email.trim().is_empty() {
            Err(vec![t!("email_required").to_string()])
        } else {
            Ok(())
        }
    }

    async fn submit_primary(&self, email: &String) -> Result<PrimaryOutcome, ApiError> {
        let email = email.trim().to_string();
        self.repository.send_email_code(self.slot, &email).await?;
        Ok(PrimaryOutcome::CodeSent { email })
    }

    async fn submit_code(&self, _email: &str, code: &str) -> Result<CodeOutcome, ApiError> {
        self.repository.confirm_email(self.slot, code).await?;
        Ok(CodeOutcome::Navigate { redirect: None })
    }

    async fn request_resend(&self, email: &str) -> Result<(), ApiError> {
        self.repository.send_email_code(self.slot, email).await
    }
}

pub struct BackupEmailViewModel<S: Scheduler> {
    slot: u8,
    email: RefCell<String>,
    repository: SecurityRepository,
    view: Rc<dyn FlowView>,
    flow: VerificationFlow<BackupEmailBinding, S>,
}

impl<S: Scheduler> BackupEmailViewModel<S> {
    pub fn new(slot: u8, view: Rc<dyn FlowView>, scheduler: S) -> Self {
        Self::new_with_client(Rc::new(ApiClient::new()), slot, view, scheduler)
    }

    pub fn new_with_client(
        client: Rc<ApiClient>,
        slot: u8,
        view: Rc<dyn FlowView>,
        scheduler: S,
    ) -> Self {
        let repository = SecurityRepository::new_with_client(client);
        let binding = BackupEmailBinding {
            slot,
            repository: repository.clone(),
        };
        Self {
            slot,
            email: RefCell::new(String::new()),
            repository,
            view: Rc::clone(&view),
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

    /// Remove the verified address in this slot, then reload the page.
    pub async fn delete(&self) {
        match self.repository.delete_email(self.slot).await {
            Ok(()) => self.view.navigate_to(config::SECURITY_SETTINGS_ROUTE),
            Err(ApiError::Network(detail)) => {
                log::warn!("backup email {}: transport error: {detail}", self.slot);
                self.view.set_field_error(
                    FlowId::BackupEmail(self.slot),
                    "message",
                    Some(&t!("network_error")),
                );
            }
            Err(other) => {
                self.view.set_field_error(
                    FlowId::BackupEmail(self.slot),
                    "message",
                    Some(&other.to_string()),
                );
            }
        }
    }
}
