use rust_i18n::t;

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Presence checks only. The password policy applies when a password is
/// set, never when one is used.
pub fn validate_credentials(form: &LoginForm) -> Result<(), Vec<String>> {
    let mut problems = Vec::new();
    if form.email.trim().is_empty() {
        problems.push(t!("email_required").to_string());
    }
    if form.password.is_empty() {
        problems.push(t!("password_empty").to_string());
    }
    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems)
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::*;

    #[test]
    fn both_fields_are_required() {
        rust_i18n::set_locale("en");
        let problems = validate_credentials(&LoginForm::default()).unwrap_err();
        assert_eq!(problems.len(), 2);
    }

    #[test]
    fn whitespace_email_counts_as_missing_but_password_is_taken_verbatim() {
        rust_i18n::set_locale("en");
        let form = LoginForm {
            email: "   ".into(),
            password: " ".into(),
        };
        let problems = validate_credentials(&form).unwrap_err();
        assert_eq!(problems, vec!["Email is required".to_string()]);
    }

    #[test]
    fn weak_password_is_fine_for_login() {
        let form = LoginForm {
            email: "a@b.com".into(),
            password: "pw".into(),
        };
        assert!(validate_credentials(&form).is_ok());
    }
}
