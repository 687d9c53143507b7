use std::rc::Rc;

use crate::api::{ApiClient, ApiError};

#[derive(Clone)]
pub struct SecurityRepository {
    client: Rc<ApiClient>,
}

impl SecurityRepository {
    pub fn new_with_client(client: Rc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn send_password_code(&self, new_password: &str) -> Result<(), ApiError> {
        self.client.security_send_code(new_password, None).await
    }

    pub async fn change_password(&self, new_password: &str, code: &str) -> Result<(), ApiError> {
        self.client.security_change_password(new_password, code).await
    }

    pub async fn send_email_code(&self, slot: u8, email: &str) -> Result<(), ApiError> {
        self.client.email_send_code(slot, email).await
    }

    pub async fn confirm_email(&self, slot: u8, code: &str) -> Result<(), ApiError> {
        self.client.email_confirm(slot, code).await
    }

    pub async fn delete_email(&self, slot: u8) -> Result<(), ApiError> {
        self.client.email_delete(slot).await
    }
}
