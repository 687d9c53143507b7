use std::rc::Rc;

use crate::api::{ApiClient, ApiError, RedirectReply, RegisterAccepted, RegisterRequest};

use super::utils::RegistrationForm;

#[derive(Clone)]
pub struct RegistrationRepository {
    client: Rc<ApiClient>,
}

impl RegistrationRepository {
    pub fn new_with_client(client: Rc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn register(&self, form: &RegistrationForm) -> Result<RegisterAccepted, ApiError> {
        let request = RegisterRequest {
            email: form.email.trim().to_string(),
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            phone: form.phone_value(),
            password: form.password.clone(),
        };
        self.client.register(&request).await
    }

    pub async fn confirm(&self, email: &str, code: &str) -> Result<RedirectReply, ApiError> {
        self.client.register_confirm(email, code).await
    }

    pub async fn resend(&self, email: &str) -> Result<(), ApiError> {
        self.client.register_resend_code(email).await
    }
}
