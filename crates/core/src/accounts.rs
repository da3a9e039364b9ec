//! Account field rules shared by sign-up and profile updates.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 40;
pub const PASSWORD_MIN_LEN: usize = 8;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_.]+$").expect("valid username regex"));

/// Usernames are 3 to 40 characters of letters, digits, `_` and `.`.
pub fn validate_username(username: &str) -> Result<(), CoreError> {
    let len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(CoreError::Validation(format!(
            "Username must be between {USERNAME_MIN_LEN} and {USERNAME_MAX_LEN} characters"
        )));
    }
    if !USERNAME_RE.is_match(username) {
        return Err(CoreError::Validation(
            "Username may only contain letters, numbers, '_' and '.'".into(),
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), CoreError> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(CoreError::Validation(format!(
            "Password must be at least {PASSWORD_MIN_LEN} characters"
        )));
    }
    Ok(())
}

/// Placeholder e-mail written over a soft-deleted account.
pub fn deleted_email(id: &uuid::Uuid) -> String {
    format!("deleted-{id}@deleted.local")
}

/// Placeholder username written over a soft-deleted account.
pub fn deleted_username(id: &uuid::Uuid) -> String {
    format!("deleted_{}", id.simple())
}
