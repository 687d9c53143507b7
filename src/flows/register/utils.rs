use rust_i18n::t;

use crate::password;

/// Snapshot of the registration form at submit time.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub terms_accepted: bool,
}

impl RegistrationForm {
    /// Empty phone means "not provided", not an empty string on the wire.
    pub fn phone_value(&self) -> Option<String> {
        let phone = self.phone.trim();
        if phone.is_empty() {
            None
        } else {
            Some(phone.to_string())
        }
    }
}

/// Check the whole form and report every problem at once.
pub fn validate_registration(form: &RegistrationForm) -> Result<(), Vec<String>> {
    let mut problems = Vec::new();
    if form.first_name.trim().is_empty() {
        problems.push(t!("first_name_required").to_string());
    }
    if form.last_name.trim().is_empty() {
        problems.push(t!("last_name_required").to_string());
    }
    if form.email.trim().is_empty() {
        problems.push(t!("email_required").to_string());
    }
    problems.extend(password::policy_errors(&form.password));
    if !form.terms_accepted {
        problems.push(t!("terms_required").to_string());
    }
    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems)
    }
}
