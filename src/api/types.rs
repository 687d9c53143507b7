use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub password: String,
}

/// `{status:"ok", next:"enter_code", email}` — the server normalizes the
/// email (trim + lowercase), so the flow records this one, not the input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterAccepted {
    pub status: String,
    pub next: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmCodeRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResendCodeRequest {
    pub email: String,
}

/// Success body of the code-confirming endpoints; `redirect` may be absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RedirectReply {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub redirect: Option<String>,
}

/// Classified outcome of the login request: an HTTP redirect,
/// `{status:"ok", redirect}`, or `{status:"2fa_required"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginReply {
    Redirect(String),
    TwoFactorRequired,
    Ok { redirect: Option<String> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPasswordRequest {
    pub token: String,
    pub password: String,
    pub password_confirm: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityCodeRequest {
    pub new_password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub new_password: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailCodeRequest {
    pub slot: u8,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfirmRequest {
    pub slot: u8,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailDeleteRequest {
    pub slot: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetLanguageRequest {
    pub lang: String,
}

/// Everything a request can fail with, classified once at the API boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Local, pre-network rejection; never reaches the server.
    #[error("{0}")]
    Validation(String),
    /// HTTP >= 400 with a human-readable message, safe to show verbatim.
    #[error("{message}")]
    Server { status: u16, message: String },
    /// The request itself failed; the user sees a generic localized message.
    #[error("{0}")]
    Network(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn network(message: impl Into<String>) -> Self {
        ApiError::Network(message.into())
    }
}
