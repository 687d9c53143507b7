use std::cell::{Cell, RefCell, RefMut};
use std::rc::Rc;

use rust_i18n::t;

use crate::api::{ApiClient, ApiError};
use crate::config;
use crate::view::{ControlId, FlowId, FlowView};

use super::repository::ResetPasswordRepository;
use super::utils::{validate_new_password, ResetPasswordForm};

/// The reset form is a single submit, no code step, so it does not ride
/// the verification machine; it keeps the same validation and error
/// conventions by hand.
pub struct ResetPasswordViewModel {
    repository: ResetPasswordRepository,
    view: Rc<dyn FlowView>,
    form: RefCell<ResetPasswordForm>,
    busy: Cell<bool>,
}

impl ResetPasswordViewModel {
    pub fn new(view: Rc<dyn FlowView>) -> Self {
        Self::new_with_client(Rc::new(ApiClient::new()), view)
    }

    pub fn new_with_client(client: Rc<ApiClient>, view: Rc<dyn FlowView>) -> Self {
        Self {
            repository: ResetPasswordRepository::new_with_client(client),
            view,
            form: RefCell::new(ResetPasswordForm::default()),
            busy: Cell::new(false),
        }
    }

    pub fn form(&self) -> RefMut<'_, ResetPasswordForm> {
        self.form.borrow_mut()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    pub async fn submit(&self) {
        if self.busy.get() {
            log::debug!("reset password: submit ignored, request in flight");
            return;
        }
        let form = self.form.borrow().clone();
        if let Err(problems) = validate_new_password(&form) {
            self.show_message(Some(&problems.join("\n")));
            return;
        }
        self.show_message(None);

        let control = ControlId::new("reset-submit");
        self.busy.set(true);
        self.view.set_control_enabled(&control, false);
        let result = self.repository.set_new_password(&form).await;
        self.busy.set(false);
        self.view.set_control_enabled(&control, true);

        match result {
            Ok(reply) => {
                let url = reply
                    .redirect
                    .unwrap_or_else(|| config::DEFAULT_ROUTE.to_string());
                self.view.navigate_to(&url);
            }
            Err(ApiError::Network(detail)) => {
                log::warn!("reset password: transport error: {detail}");
                self.show_message(Some(&t!("network_error")));
            }
            Err(other) => self.show_message(Some(&other.to_string())),
        }
    }

    fn show_message(&self, message: Option<&str>) {
        self.view
            .set_field_error(FlowId::ResetPassword, "message", message);
    }
}
