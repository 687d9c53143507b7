use std::rc::Rc;

use crate::api::{ApiClient, ApiError, RedirectReply};

#[derive(Clone)]
pub struct ForgotPasswordRepository {
    client: Rc<ApiClient>,
}

impl ForgotPasswordRepository {
    pub fn new_with_client(client: Rc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn send_code(&self, email: &str) -> Result<(), ApiError> {
        self.client.forgot_send_code(email).await
    }

    pub async fn verify(&self, email: &str, code: &str) -> Result<RedirectReply, ApiError> {
        self.client.forgot_verify(email, code).await
    }
}
