//! Input validation helpers shared by handlers and repositories.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::AppError;

/// Characters rejected in organization names.
fn org_name_disallowed() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"[~!_.@#$%^&*()+{}"\[\]:;'/]"#).expect("org name pattern is valid")
    })
}

/// Validate an organization name: non-empty, at most 255 characters, no
/// special characters.
pub fn validate_org_name(name: &str) -> Result<(), AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput(
            "Organization name is required".to_string(),
        ));
    }
    if trimmed.len() > 255 {
        return Err(AppError::InvalidInput(
            "Organization name must be at most 255 characters".to_string(),
        ));
    }
    if org_name_disallowed().is_match(trimmed) {
        return Err(AppError::InvalidInput(
            "Organization name should not contain special characters".to_string(),
        ));
    }
    Ok(())
}

/// Normalize an email for storage and lookup: trimmed and lowercased.
/// Email identity is case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Minimal structural email check; full validation is left to the mail
/// system at delivery time.
pub fn validate_email(email: &str) -> Result<(), AppError> {
    let normalized = normalize_email(email);
    let mut parts = normalized.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(AppError::InvalidInput(format!(
            "Invalid email address: {}",
            email
        ))),
    }
}

const MIN_PASSWORD_LENGTH: usize = 8;

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::InvalidInput(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_org_name_accepts_plain_names() {
        assert!(validate_org_name("Acme").is_ok());
        assert!(validate_org_name("Acme Inc").is_ok());
        assert!(validate_org_name("acme-2024").is_ok());
    }

    #[test]
    fn test_org_name_rejects_special_characters() {
        for name in ["acme!", "a@b", "acme#1", "acme(2)", "a:b", "a/b", "a[b]"] {
            assert!(validate_org_name(name).is_err(), "{} should be rejected", name);
        }
    }

    #[test]
    fn test_org_name_rejects_empty() {
        assert!(validate_org_name("").is_err());
        assert!(validate_org_name("   ").is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Jane@Example.COM "), "jane@example.com");
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("jane@example.com").is_ok());
        assert!(validate_email("jane").is_err());
        assert!(validate_email("jane@host").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("a@b@c.com").is_err());
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("longenough").is_ok());
    }
}
