use rust_i18n::t;

use crate::password;

/// The post-verification reset form. The token arrives in the page URL and
/// is never typed by the user.
#[derive(Debug, Clone, Default)]
pub struct ResetPasswordForm {
    pub token: String,
    pub password: String,
    pub password_confirm: String,
}

/// Full password policy plus the confirmation match, everything reported
/// together.
pub fn validate_new_password(form: &ResetPasswordForm) -> Result<(), Vec<String>> {
    let mut problems = password::policy_errors(&form.password);
    if form.password != form.password_confirm {
        problems.push(t!("passwords_do_not_match").to_string());
    }
    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems)
    }
}
