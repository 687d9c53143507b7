use rust_i18n::t;

/// Password-change panel on the security settings page. Validation here is
/// deliberately just the match check; the server owns the policy for
/// already-authenticated changes.
#[derive(Debug, Clone, Default)]
pub struct PasswordChangeForm {
    pub new_password: String,
    pub confirm_password: String,
}

impl PasswordChangeForm {
    pub fn new_password_value(&self) -> String {
        self.new_password.trim().to_string()
    }

    /// Both fields non-empty after trimming, and equal.
    pub fn passwords_match(&self) -> bool {
        let a = self.new_password.trim();
        let b = self.confirm_password.trim();
        !a.is_empty() && a == b
    }
}

pub fn validate_password_change(form: &PasswordChangeForm) -> Result<(), Vec<String>> {
    if form.passwords_match() {
        Ok(())
    } else {
        Err(vec![t!("passwords_do_not_match").to_string()])
    }
}
