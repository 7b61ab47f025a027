use std::sync::LazyLock;

use regex::Regex;

use crate::auth::{AuthErrors, AuthForm, AuthMode};

pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// Loose shape check: something, `@`, something, `.`, something.
pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub(crate) fn validate_form(mode: AuthMode, form: &AuthForm) -> AuthErrors {
    let mut errors = AuthErrors::default();

    if form.email.is_empty() {
        errors.email = Some("Email is required".to_string());
    } else if !validate_email(&form.email) {
        errors.email = Some("Invalid email".to_string());
    }

    if form.password.is_empty() {
        errors.password = Some("Password is required".to_string());
    } else if form.password.chars().count() < MIN_PASSWORD_LEN {
        errors.password = Some("Minimum 8 characters".to_string());
    }

    if mode == AuthMode::Register {
        if form.full_name.is_empty() {
            errors.full_name = Some("Full name required".to_string());
        }
        if form.confirm_password.is_empty() {
            errors.confirm_password = Some("Confirm password".to_string());
        } else if form.password != form.confirm_password {
            errors.confirm_password = Some("Passwords do not match".to_string());
        }
    }

    errors
}
