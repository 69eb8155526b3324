//! Input normalization and validation applied before any network call.
//!
//! A value that fails here never produces a request; the caller surfaces the
//! error and leaves its form populated for a manual retry.

pub const USERNAME_MIN_CHARS: usize = 4;
pub const PASSWORD_MIN_CHARS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("username must be at least {USERNAME_MIN_CHARS} characters")]
    UsernameTooShort,
    #[error("tag must be at least {USERNAME_MIN_CHARS} characters")]
    TagTooShort,
    #[error("password must be at least {PASSWORD_MIN_CHARS} characters")]
    PasswordTooShort,
    #[error("application name must not be empty")]
    EmptyApplicationName,
}

pub fn normalize_username(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.chars().count() < USERNAME_MIN_CHARS {
        return Err(ValidationError::UsernameTooShort);
    }
    Ok(trimmed.to_string())
}

/// Strip one leading `@` and every character outside `[A-Za-z0-9_-]`, then
/// apply the same minimum-length rule as usernames.
pub fn normalize_user_tag(raw: &str) -> Result<String, ValidationError> {
    let stripped = raw.trim().strip_prefix('@').unwrap_or(raw.trim());
    let filtered = stripped
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '_' || *ch == '-')
        .collect::<String>();
    if filtered.chars().count() < USERNAME_MIN_CHARS {
        return Err(ValidationError::TagTooShort);
    }
    Ok(filtered)
}

pub fn normalize_password(raw: &str) -> Result<String, ValidationError> {
    if raw.chars().count() < PASSWORD_MIN_CHARS {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(raw.to_string())
}

pub fn normalize_application_name(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyApplicationName);
    }
    Ok(trimmed.to_string())
}
