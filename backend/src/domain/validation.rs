//! Field-level input checks shared by the domain constructors.

use super::Error;

/// Reject `value` unless its character count lies in `min..=max`.
pub(crate) fn check_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), Error> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(Error::bad_request(format!(
            "{field} must be between {min} and {max} characters long"
        )));
    }
    Ok(())
}

/// Reject blank strings.
pub(crate) fn check_not_blank(field: &str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::bad_request(format!("{field} must not be empty")));
    }
    Ok(())
}
