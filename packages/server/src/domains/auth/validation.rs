use lazy_static::lazy_static;
use regex::Regex;

use crate::domains::auth::code::{CODE_MAX, CODE_MIN};
use crate::domains::auth::errors::AuthError;

lazy_static! {
    // E.164: leading +, no leading zero, at most 15 digits
    static ref E164_REGEX: Regex = Regex::new(r"^\+[1-9]\d{1,14}$").unwrap();

    static ref SESSION_ID_REGEX: Regex = Regex::new(r"^[0-9a-f]{64}$").unwrap();
}

pub fn validate_phone(phone: &str) -> Result<(), AuthError> {
    if phone.is_empty() {
        return Err(AuthError::InvalidInput("phone number required".to_string()));
    }
    if !E164_REGEX.is_match(phone) {
        return Err(AuthError::InvalidInput(
            "phone number must be in E.164 format (e.g. +15551234567)".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_session_id(session_id: &str) -> Result<(), AuthError> {
    if !SESSION_ID_REGEX.is_match(session_id) {
        return Err(AuthError::InvalidInput(
            "sessionId must be 64 lowercase hex characters".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_code(code: i32) -> Result<(), AuthError> {
    if !(CODE_MIN..=CODE_MAX).contains(&code) {
        return Err(AuthError::InvalidInput(format!(
            "code must be between {CODE_MIN} and {CODE_MAX}"
        )));
    }
    Ok(())
}
