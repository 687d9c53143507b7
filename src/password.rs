//! Password-strength policy: six independent rules, all of which must hold
//! for a password to be accepted. Evaluation is pure and cheap enough to run
//! on every keystroke.

use rust_i18n::t;

/// The rules, in the order error messages are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordRule {
    Len,
    Digit,
    Lower,
    Upper,
    Special,
    NoSpace,
}

pub const RULES: [PasswordRule; 6] = [
    PasswordRule::Len,
    PasswordRule::Digit,
    PasswordRule::Lower,
    PasswordRule::Upper,
    PasswordRule::Special,
    PasswordRule::NoSpace,
];

impl PasswordRule {
    pub fn message_key(self) -> &'static str {
        match self {
            PasswordRule::Len => "password_min_length",
            PasswordRule::Digit => "password_digit",
            PasswordRule::Lower => "password_lower",
            PasswordRule::Upper => "password_upper",
            PasswordRule::Special => "password_special",
            PasswordRule::NoSpace => "password_no_spaces",
        }
    }

    pub fn message(self) -> String {
        t!(self.message_key()).to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuleResults {
    pub len: bool,
    pub digit: bool,
    pub lower: bool,
    pub upper: bool,
    pub special: bool,
    pub nospace: bool,
}

impl RuleResults {
    fn holds(&self, rule: PasswordRule) -> bool {
        match rule {
            PasswordRule::Len => self.len,
            PasswordRule::Digit => self.digit,
            PasswordRule::Lower => self.lower,
            PasswordRule::Upper => self.upper,
            PasswordRule::Special => self.special,
            PasswordRule::NoSpace => self.nospace,
        }
    }

    pub fn is_acceptable(&self) -> bool {
        RULES.iter().all(|rule| self.holds(*rule))
    }

    /// Failing rules in table order.
    pub fn missing(&self) -> Vec<PasswordRule> {
        RULES
            .iter()
            .copied()
            .filter(|rule| !self.holds(*rule))
            .collect()
    }
}

/// Evaluate all six rules over `password`. Length counts characters, not
/// bytes; passwords are not ASCII-only.
pub fn evaluate(password: &str) -> RuleResults {
    RuleResults {
        len: password.chars().count() >= 8,
        digit: password.chars().any(|c| c.is_ascii_digit()),
        lower: password.chars().any(|c| c.is_ascii_lowercase()),
        upper: password.chars().any(|c| c.is_ascii_uppercase()),
        special: password.chars().any(|c| !c.is_ascii_alphanumeric()),
        nospace: !password.chars().any(char::is_whitespace),
    }
}

pub fn is_acceptable(password: &str) -> bool {
    evaluate(password).is_acceptable()
}

/// One localized message per failing rule, table order. Empty when the
/// password is acceptable.
pub fn policy_errors(password: &str) -> Vec<String> {
    evaluate(password)
        .missing()
        .into_iter()
        .map(PasswordRule::message)
        .collect()
}
