use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{Client, Response};
use rust_i18n::t;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::types::*;
use crate::config;

/// Thin client over the server endpoints. Every method performs one request
/// and classifies the reply into `Result<T, ApiError>`; nothing else in the
/// crate inspects HTTP responses.
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiClient {
    pub fn new() -> Self {
        Self::new_with_base_url(config::api_base_url())
    }

    pub fn new_with_base_url(base_url: impl Into<String>) -> Self {
        // Redirects are data here: a 302 from /login is the success
        // discriminator, so the client must not follow it.
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("http client");
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ---- registration ----

    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterAccepted, ApiError> {
        let response = self
            .client
            .post(self.url("/register"))
            .form(request)
            .send()
            .await
            .map_err(transport)?;
        classify_json(response).await
    }

    pub async fn register_confirm(
        &self,
        email: &str,
        code: &str,
    ) -> Result<RedirectReply, ApiError> {
        let response = self
            .client
            .post(self.url("/register/confirm"))
            .json(&ConfirmCodeRequest {
                email: email.to_string(),
                code: code.to_string(),
            })
            .send()
            .await
            .map_err(transport)?;
        classify_json(response).await
    }

    pub async fn register_resend_code(&self, email: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/register/resend-code"))
            .json(&ResendCodeRequest {
                email: email.to_string(),
            })
            .send()
            .await
            .map_err(transport)?;
        classify_ok(response).await
    }

    // ---- login ----

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginReply, ApiError> {
        let response = self
            .client
            .post(self.url("/login"))
            .form(&[("email", email), ("password", password)])
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if status.is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .unwrap_or(config::DASHBOARD_ROUTE)
                .to_string();
            return Ok(LoginReply::Redirect(location));
        }
        if !status.is_success() {
            return Err(error_from(response).await);
        }

        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        if body.get("status").and_then(Value::as_str) == Some("2fa_required") {
            Ok(LoginReply::TwoFactorRequired)
        } else {
            Ok(LoginReply::Ok {
                redirect: body
                    .get("redirect")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            })
        }
    }

    pub async fn login_2fa(&self, email: &str, code: &str) -> Result<RedirectReply, ApiError> {
        let response = self
            .client
            .post(self.url("/login/2fa"))
            .json(&ConfirmCodeRequest {
                email: email.to_string(),
                code: code.to_string(),
            })
            .send()
            .await
            .map_err(transport)?;
        classify_json(response).await
    }

    pub async fn login_2fa_resend(&self, email: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/login/2fa/resend"))
            .json(&ResendCodeRequest {
                email: email.to_string(),
            })
            .send()
            .await
            .map_err(transport)?;
        classify_ok(response).await
    }

    // ---- password reset ----

    pub async fn forgot_send_code(&self, email: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/forgot/send-code"))
            .json(&ResendCodeRequest {
                email: email.to_string(),
            })
            .send()
            .await
            .map_err(transport)?;
        classify_ok(response).await
    }

    pub async fn forgot_verify(&self, email: &str, code: &str) -> Result<RedirectReply, ApiError> {
        let response = self
            .client
            .post(self.url("/forgot/verify"))
            .json(&ConfirmCodeRequest {
                email: email.to_string(),
                code: code.to_string(),
            })
            .send()
            .await
            .map_err(transport)?;
        classify_json(response).await
    }

    pub async fn forgot_new_password(
        &self,
        request: &NewPasswordRequest,
    ) -> Result<RedirectReply, ApiError> {
        let response = self
            .client
            .post(self.url("/forgot/new-password"))
            .json(request)
            .send()
            .await
            .map_err(transport)?;
        classify_json(response).await
    }

    // ---- security settings ----

    pub async fn security_send_code(
        &self,
        new_password: &str,
        slot: Option<u8>,
    ) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/settings/security/send-code"))
            .json(&SecurityCodeRequest {
                new_password: new_password.to_string(),
                slot,
            })
            .send()
            .await
            .map_err(transport)?;
        classify_ok(response).await
    }

    pub async fn security_change_password(
        &self,
        new_password: &str,
        code: &str,
    ) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/settings/security/change-password"))
            .json(&ChangePasswordRequest {
                new_password: new_password.to_string(),
                code: code.to_string(),
            })
            .send()
            .await
            .map_err(transport)?;
        classify_ok(response).await
    }

    pub async fn email_send_code(&self, slot: u8, email: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/settings/security/emails/send-code"))
            .json(&EmailCodeRequest {
                slot,
                email: email.to_string(),
            })
            .send()
            .await
            .map_err(transport)?;
        classify_ok(response).await
    }

    pub async fn email_confirm(&self, slot: u8, code: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/settings/security/emails/confirm"))
            .json(&EmailConfirmRequest {
                slot,
                code: code.to_string(),
            })
            .send()
            .await
            .map_err(transport)?;
        classify_ok(response).await
    }

    pub async fn email_delete(&self, slot: u8) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/settings/security/emails/delete"))
            .json(&EmailDeleteRequest { slot })
            .send()
            .await
            .map_err(transport)?;
        classify_ok(response).await
    }

    // ---- language ----

    pub async fn set_language(&self, lang: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/set-language"))
            .json(&SetLanguageRequest {
                lang: lang.to_string(),
            })
            .send()
            .await
            .map_err(transport)?;
        classify_ok(response).await
    }
}

fn transport(error: reqwest::Error) -> ApiError {
    ApiError::network(format!("Request failed: {error}"))
}

async fn classify_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    if response.status().is_success() {
        response
            .json()
            .await
            .map_err(|error| ApiError::network(format!("Failed to parse response: {error}")))
    } else {
        Err(error_from(response).await)
    }
}

async fn classify_ok(response: Response) -> Result<(), ApiError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(error_from(response).await)
    }
}

/// Extract a user-facing message from an error response: `{message|detail}`
/// when the body claims to be JSON, the raw text otherwise, and a generic
/// localized message when neither yields anything.
async fn error_from(response: Response) -> ApiError {
    let status = response.status().as_u16();
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("json"));

    let message = if is_json {
        match response.json::<Value>().await {
            Ok(body) => body
                .get("message")
                .or_else(|| body.get("detail"))
                .and_then(Value::as_str)
                .map(str::to_string),
            Err(_) => None,
        }
    } else {
        response
            .text()
            .await
            .ok()
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
    };

    ApiError::Server {
        status,
        message: message.unwrap_or_else(|| t!("server_error", status = status).to_string()),
    }
}
