use std::rc::Rc;

use crate::api::{ApiClient, ApiError, LoginReply, RedirectReply};

#[derive(Clone)]
pub struct LoginRepository {
    client: Rc<ApiClient>,
}

impl LoginRepository {
    pub fn new_with_client(client: Rc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginReply, ApiError> {
        self.client.login(email, password).await
    }

    pub async fn second_factor(&self, email: &str, code: &str) -> Result<RedirectReply, ApiError> {
        self.client.login_2fa(email, code).await
    }

    pub async fn resend_second_factor(&self, email: &str) -> Result<(), ApiError> {
        self.client.login_2fa_resend(email).await
    }
}
