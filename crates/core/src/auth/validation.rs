use super::{AuthError, Credentials};

pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 30;
pub const MIN_PASSWORD_LEN: usize = 8;

/// Validates a username and returns it trimmed.
///
/// Usernames are 3 to 30 characters of ASCII letters, digits, `_`, `.`
/// and `-`.
///
/// ```
/// use bookshelf_core::auth::validate_username;
///
/// assert_eq!(validate_username("  machado ").unwrap(), "machado");
/// assert!(validate_username("no spaces").is_err());
/// ```
pub fn validate_username(username: &str) -> Result<&str, AuthError> {
    let username = username.trim();

    if username.len() < MIN_USERNAME_LEN {
        return Err(AuthError::InvalidUsername("too short"));
    }
    if username.len() > MAX_USERNAME_LEN {
        return Err(AuthError::InvalidUsername("too long"));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(AuthError::InvalidUsername("unsupported characters"));
    }

    Ok(username)
}

/// Validates a password's length, in characters.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

/// Validates registration input and returns the normalized username.
pub fn validate_credentials(credentials: &Credentials) -> Result<&str, AuthError> {
    if credentials.username.trim().is_empty() || credentials.password.is_empty() {
        return Err(AuthError::MissingCredentials);
    }
    let username = validate_username(&credentials.username)?;
    validate_password(&credentials.password)?;
    Ok(username)
}
