//! User data model.
//!
//! Credentials are hashed by the authentication collaborator; this core only
//! persists the opaque hash.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::check_length;
use super::{Error, UserId};

const USERNAME_MIN: usize = 5;
const USERNAME_MAX: usize = 16;
const EMAIL_MAX: usize = 127;

/// Authorization role stored alongside a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular account.
    #[default]
    User,
    /// May curate catalog content.
    Editor,
    /// Full access.
    Admin,
}

impl Role {
    /// Stored representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Editor => "editor",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "editor" => Ok(Self::Editor),
            "admin" => Ok(Self::Admin),
            other => Err(Error::bad_request(format!("unknown role {other}"))),
        }
    }
}

/// A live user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store id.
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// Unique contact address.
    pub email: String,
    /// Authorization role.
    pub role: Role,
    /// Free-form profile text.
    pub bio: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Registration payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Login name, 5 to 16 characters.
    pub username: String,
    /// Contact address.
    pub email: String,
    /// Opaque password hash.
    pub password_hash: String,
    /// Initial role.
    pub role: Role,
}

impl NewUser {
    /// Check username and email shape.
    ///
    /// # Errors
    ///
    /// Returns a bad-request [`Error`] describing the first invalid field.
    pub fn validate(&self) -> Result<(), Error> {
        check_length("username", &self.username, USERNAME_MIN, USERNAME_MAX)?;
        validate_email(&self.email)?;
        if self.password_hash.is_empty() {
            return Err(Error::bad_request("password hash must not be empty"));
        }
        Ok(())
    }
}

fn validate_email(email: &str) -> Result<(), Error> {
    check_length("email", email, 3, EMAIL_MAX)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(Error::bad_request("email must be a valid address")),
    }
}
