//! Stars: people credited on movies.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::validation::check_not_blank;
use super::{Error, StarId};

/// A live star.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Star {
    /// Store id.
    pub id: StarId,
    /// Given name.
    pub first_name: String,
    /// Optional middle name.
    pub middle_name: Option<String>,
    /// Family name.
    pub last_name: String,
    /// Date of birth.
    pub birth_date: NaiveDate,
    /// Place of birth.
    pub birth_place: Option<String>,
    /// Date of death.
    pub death_date: Option<NaiveDate>,
    /// Free-form biography.
    pub bio: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Fields written on create and on update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarDraft {
    /// Given name, required.
    pub first_name: String,
    /// Optional middle name.
    pub middle_name: Option<String>,
    /// Family name, required.
    pub last_name: String,
    /// Date of birth.
    pub birth_date: NaiveDate,
    /// Place of birth.
    pub birth_place: Option<String>,
    /// Date of death, if any.
    pub death_date: Option<NaiveDate>,
    /// Free-form biography.
    pub bio: Option<String>,
}

impl StarDraft {
    /// Check required names and date ordering.
    ///
    /// # Errors
    ///
    /// Returns a bad-request [`Error`] describing the first invalid field.
    pub fn validate(&self) -> Result<(), Error> {
        check_not_blank("first_name", &self.first_name)?;
        check_not_blank("last_name", &self.last_name)?;
        if let Some(death) = self.death_date
            && death < self.birth_date
        {
            return Err(Error::bad_request("death_date must not precede birth_date"));
        }
        Ok(())
    }
}
