//! Field validation rules
//!
//! [`validate`] is a pure function of the value, the rule set and the
//! [`ValidationContext`]. Every rule is checked independently and all
//! failures are reported, in a fixed order.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\S+@\S+\.\S+$").expect("email pattern is valid")
});

static NUMERIC_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]+$").expect("numeric pattern is valid")
});

pub const MSG_REQUIRED: &str = "Field is required";
pub const MSG_EMAIL: &str = "Email is not valid";
pub const MSG_NUMERIC: &str = "Enter numeric value";
pub const MSG_POSITIVE: &str = "Amount must be a positive number";
pub const MSG_PASSWORD_REPEAT: &str = "Password not matching";

/// Rule set attached to a form field. Absent rules are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub is_email: bool,
    pub is_numeric: bool,
    /// Amount fields: the value must parse as an integer greater than zero
    pub positive: bool,
    /// Must equal the sibling password field
    pub password_repeat: bool,
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn email(mut self) -> Self {
        self.is_email = true;
        self
    }

    pub fn numeric(mut self) -> Self {
        self.is_numeric = true;
        self
    }

    pub fn positive(mut self) -> Self {
        self.positive = true;
        self
    }

    pub fn password_repeat(mut self) -> Self {
        self.password_repeat = true;
        self
    }
}

/// Values from sibling fields that some rules compare against
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationContext<'a> {
    pub password: Option<&'a str>,
}

impl<'a> ValidationContext<'a> {
    pub fn with_password(password: &'a str) -> Self {
        Self {
            password: Some(password),
        }
    }
}

/// Outcome of validating one value
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Verdict {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Validate `value` against `rules`.
pub fn validate(value: &str, rules: &Rules, ctx: &ValidationContext<'_>) -> Verdict {
    let mut errors = Vec::new();
    let length = value.chars().count();

    if rules.required && value.trim().is_empty() {
        errors.push(MSG_REQUIRED.to_string());
    }

    if let Some(min) = rules.min_length {
        if length < min {
            errors.push(format!("Minimum length is {}", min));
        }
    }

    if let Some(max) = rules.max_length {
        if length > max {
            errors.push(format!("Maximum length is {}", max));
        }
    }

    if rules.is_email && !EMAIL_PATTERN.is_match(value) {
        errors.push(MSG_EMAIL.to_string());
    }

    if rules.is_numeric && !NUMERIC_PATTERN.is_match(value) {
        errors.push(MSG_NUMERIC.to_string());
    }

    if rules.positive && !value.trim().parse::<i64>().map(|n| n > 0).unwrap_or(false) {
        errors.push(MSG_POSITIVE.to_string());
    }

    if rules.password_repeat && Some(value) != ctx.password {
        errors.push(MSG_PASSWORD_REPEAT.to_string());
    }

    Verdict {
        valid: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(value: &str, rules: &Rules) -> Verdict {
        validate(value, rules, &ValidationContext::default())
    }

    #[test]
    fn test_no_rules_is_always_valid() {
        let verdict = check("", &Rules::new());
        assert!(verdict.valid);
        assert!(verdict.errors.is_empty());
    }

    #[test]
    fn test_required_trims_whitespace() {
        let rules = Rules::new().required();
        assert_eq!(check("   ", &rules).errors, vec![MSG_REQUIRED]);
        assert!(check(" a ", &rules).valid);
    }

    #[test]
    fn test_min_and_max_length() {
        let rules = Rules::new().min_length(3).max_length(5);
        assert_eq!(check("ab", &rules).errors, vec!["Minimum length is 3"]);
        assert!(check("abc", &rules).valid);
        assert!(check("abcde", &rules).valid);
        assert_eq!(check("abcdef", &rules).errors, vec!["Maximum length is 5"]);
    }

    #[test]
    fn test_max_length_accepts_short_values() {
        let rules = Rules::new().max_length(10);
        assert!(check("short", &rules).valid);
        assert!(check("", &rules).valid);
    }

    #[test]
    fn test_length_counts_characters() {
        let rules = Rules::new().max_length(3);
        assert!(check("äöü", &rules).valid);
    }

    #[test]
    fn test_email_shape() {
        let rules = Rules::new().email();
        assert!(check("a@b.com", &rules).valid);
        assert!(!check("a@b", &rules).valid);
        assert!(!check("a b@c.com", &rules).valid);
        assert!(!check("@b.com", &rules).valid);
    }

    #[test]
    fn test_numeric_and_positive() {
        let rules = Rules::new().numeric().positive();
        assert!(check("50", &rules).valid);
        assert_eq!(check("0", &rules).errors, vec![MSG_POSITIVE]);
        assert_eq!(check("-5", &rules).errors, vec![MSG_NUMERIC, MSG_POSITIVE]);
        assert_eq!(check("12a", &rules).errors.len(), 2);
    }

    #[test]
    fn test_numeric_rejects_non_ascii_digits() {
        assert!(!check("١٢", &Rules::new().numeric()).valid);
    }

    #[test]
    fn test_password_repeat_uses_context() {
        let rules = Rules::new().password_repeat();
        let ctx = ValidationContext::with_password("secret1");
        assert!(validate("secret1", &rules, &ctx).valid);
        assert_eq!(validate("secret2", &rules, &ctx).errors, vec![MSG_PASSWORD_REPEAT]);
        assert!(!validate("secret1", &rules, &ValidationContext::default()).valid);
    }

    #[test]
    fn test_failures_accumulate_one_per_rule() {
        let rules = Rules::new().required().min_length(6).email();
        let verdict = check("", &rules);
        assert!(!verdict.valid);
        assert_eq!(
            verdict.errors,
            vec![MSG_REQUIRED.to_string(), "Minimum length is 6".to_string(), MSG_EMAIL.to_string()]
        );
    }

    #[test]
    fn test_validate_is_referentially_transparent() {
        let rules = Rules::new().required().min_length(6);
        assert_eq!(check("abc", &rules), check("abc", &rules));
    }
}
