//! Flow core for the Wild Boar web frontend.
//!
//! Registration, login (with an emailed second factor), password reset,
//! password change and backup-email verification all share one multi-step
//! verification state machine. This crate owns that machine together with
//! the password policy and the resend-cooldown timer; rendering is done by
//! an injected [`view::FlowView`] adapter, and the server is an opaque
//! collaborator behind [`api::ApiClient`].

rust_i18n::i18n!("locales", fallback = "ru");

pub mod api;
pub mod config;
pub mod cooldown;
pub mod flow;
pub mod flows;
pub mod i18n;
pub mod password;
pub mod view;

#[cfg(all(test, not(target_arch = "wasm32")))]
pub mod test_support;

pub use api::{ApiClient, ApiError};
pub use cooldown::{CooldownTimer, Scheduler};
pub use flow::{CodeRule, FlowBinding, VerificationFlow, VerificationStep};
pub use view::{ControlId, FlowId, FlowView};
