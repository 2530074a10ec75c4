use serde::Deserialize;
use validator::ValidateEmail;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MIN_PHONE_LEN: usize = 5;

/// Validates that the input looks like a valid email address
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    !email.is_empty() && email.validate_email()
}

/// Signup form as posted by the marketing site. Missing fields deserialize as
/// empty strings so they fail validation with a field-specific message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub business_name: String,
    pub phone: String,
}

/// Checks fields in form order and returns the first problem found.
pub fn validate_signup(form: &SignupForm) -> Result<(), &'static str> {
    if !is_valid_email(&form.email) {
        return Err("Invalid email address");
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err("Password must be at least 8 characters");
    }
    if form.business_name.trim().is_empty() {
        return Err("Business name is required");
    }
    if form.phone.trim().chars().count() < MIN_PHONE_LEN {
        return Err("Phone number is required");
    }
    Ok(())
}
