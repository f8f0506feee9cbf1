/// Input validators for account fields.
///
/// Every required field is rejected when empty or whitespace-only; email and
/// username additionally carry format and length rules. Validators return the
/// trimmed (and for usernames, lowercased) value that should be persisted.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MAX_FULLNAME_LENGTH: usize = 256;
const MAX_USERNAME_LENGTH: usize = 64;

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();

    // Letters, digits, dot, underscore, hyphen
    static ref USERNAME_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9._-]+$").unwrap();
}

/// Validates an email address and returns the trimmed value.
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email".to_string()));
    }

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email".to_string(), MAX_EMAIL_LENGTH));
    }

    if !EMAIL_REGEX.is_match(trimmed) || trimmed.matches('@').count() != 1 {
        return Err(ValidationError::InvalidFormat("email".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Validates a username and returns the trimmed, lowercased value.
///
/// Usernames are stored lowercase so that lookups are case-insensitive.
pub fn is_valid_username(username: &str) -> Result<String, ValidationError> {
    let trimmed = username.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("username".to_string()));
    }

    if trimmed.len() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::TooLong(
            "username".to_string(),
            MAX_USERNAME_LENGTH,
        ));
    }

    if !USERNAME_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("username".to_string()));
    }

    Ok(trimmed.to_lowercase())
}

/// Validates a display name and returns the trimmed value.
pub fn is_valid_fullname(fullname: &str) -> Result<String, ValidationError> {
    let trimmed = fullname.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("fullname".to_string()));
    }

    if trimmed.len() > MAX_FULLNAME_LENGTH {
        return Err(ValidationError::TooLong(
            "fullname".to_string(),
            MAX_FULLNAME_LENGTH,
        ));
    }

    if trimmed.contains('\0') || trimmed.chars().any(|c| c.is_control()) {
        return Err(ValidationError::InvalidFormat("fullname".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Validates a password is present (non-empty, not whitespace-only).
///
/// No strength policy is enforced beyond presence; the value is hashed with
/// bcrypt before storage, which caps usable input at 72 bytes.
pub fn is_valid_password(password: &str) -> Result<String, ValidationError> {
    if password.trim().is_empty() {
        return Err(ValidationError::EmptyField("password".to_string()));
    }

    if password.len() > 72 {
        return Err(ValidationError::TooLong("password".to_string(), 72));
    }

    Ok(password.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        assert!(is_valid_email("user@example.com").is_ok());
        assert!(is_valid_email("test.email@domain.co.uk").is_ok());
        assert!(is_valid_email("user+tag@example.com").is_ok());
    }

    #[test]
    fn test_invalid_email_format() {
        assert!(is_valid_email("invalid").is_err());
        assert!(is_valid_email("user@").is_err());
        assert!(is_valid_email("@example.com").is_err());
        assert!(is_valid_email("user@@example.com").is_err());
    }

    #[test]
    fn test_email_length_limit() {
        let too_long = format!("{}@example.com", "a".repeat(250));
        assert!(is_valid_email(&too_long).is_err());
    }

    #[test]
    fn test_username_is_lowercased() {
        assert_eq!(is_valid_username("Alice").unwrap(), "alice");
        assert_eq!(is_valid_username("  John_Doe-99  ").unwrap(), "john_doe-99");
    }

    #[test]
    fn test_invalid_username() {
        assert!(is_valid_username("").is_err());
        assert!(is_valid_username("   ").is_err());
        assert!(is_valid_username("has spaces").is_err());
        assert!(is_valid_username("semi;colon").is_err());
        assert!(is_valid_username(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_valid_fullname() {
        assert!(is_valid_fullname("John Doe").is_ok());
        assert!(is_valid_fullname("Jean-Pierre").is_ok());
        assert!(is_valid_fullname("O'Brien").is_ok());
    }

    #[test]
    fn test_fullname_rejects_empty_and_control_chars() {
        assert!(is_valid_fullname("").is_err());
        assert!(is_valid_fullname("   ").is_err());
        assert!(is_valid_fullname("Name\0with\0null").is_err());
        assert!(is_valid_fullname(&"a".repeat(257)).is_err());
    }

    #[test]
    fn test_password_presence_only() {
        assert!(is_valid_password("p1").is_ok());
        assert!(is_valid_password("").is_err());
        assert!(is_valid_password("   ").is_err());
        assert!(is_valid_password(&"a".repeat(73)).is_err());
    }
}
