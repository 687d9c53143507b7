use std::rc::Rc;

use crate::api::{ApiClient, ApiError, NewPasswordRequest, RedirectReply};

use super::utils::ResetPasswordForm;

#[derive(Clone)]
pub struct ResetPasswordRepository {
    client: Rc<ApiClient>,
}

impl ResetPasswordRepository {
    pub fn new_with_client(client: Rc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn set_new_password(
        &self,
        form: &ResetPasswordForm,
    ) -> Result<RedirectReply, ApiError> {
        self.client
            .forgot_new_password(&NewPasswordRequest {
                token: form.token.clone(),
                password: form.password.clone(),
                password_confirm: form.password_confirm.clone(),
            })
            .await
    }
}
