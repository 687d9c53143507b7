//! Contract between the flow core and the rendering layer. The core never
//! touches a document object; everything it needs from the UI goes through
//! [`FlowView`], injected per orchestrator.

use std::fmt;

/// Identifies one multi-step flow instance on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowId {
    Registration,
    Login,
    ForgotPassword,
    ResetPassword,
    PasswordChange,
    /// Backup-email verification, one instance per slot.
    BackupEmail(u8),
}

/// Identifies a single interactive control (a button, in practice).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ControlId(String);

impl ControlId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Adapter implemented by the UI layer. All methods are fire-and-forget
/// render instructions; the core keeps the authoritative state.
pub trait FlowView {
    /// Show the markup for `step` and hide the other steps of `flow`.
    fn render_step(&self, flow: FlowId, step: crate::flow::VerificationStep);

    /// Set or clear (`None`) the message for a named field. The shared
    /// per-flow message area uses the field name `"message"`.
    fn set_field_error(&self, flow: FlowId, field: &str, message: Option<&str>);

    fn set_control_enabled(&self, control: &ControlId, enabled: bool);

    fn set_control_label(&self, control: &ControlId, label: &str);

    /// Full navigation, also used to force a reload of the current route.
    fn navigate_to(&self, url: &str);
}
