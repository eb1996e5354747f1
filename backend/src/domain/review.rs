//! Reviews: one rating and write-up per (movie, user) pair.
//!
//! Every review mutation recomputes the parent movie's average rating inside
//! the same transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::check_length;
use super::{Error, MovieId, ReviewId, UserId};

const TITLE_MIN: usize = 3;
const TITLE_MAX: usize = 255;
const CONTENT_MIN: usize = 20;
const CONTENT_MAX: usize = 2000;

/// Score between 1 and 10 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Rating(i32);

impl Rating {
    /// Lowest accepted score.
    pub const MIN: i32 = 1;
    /// Highest accepted score.
    pub const MAX: i32 = 10;

    /// Validate a raw score.
    ///
    /// # Errors
    ///
    /// Returns a bad-request [`Error`] outside `1..=10`.
    pub fn new(raw: i32) -> Result<Self, Error> {
        if (Self::MIN..=Self::MAX).contains(&raw) {
            Ok(Self(raw))
        } else {
            Err(Error::bad_request(format!(
                "rating must be between {} and {}",
                Self::MIN,
                Self::MAX
            )))
        }
    }

    /// Raw score.
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for Rating {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for i32 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

/// A live review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Store id.
    pub id: ReviewId,
    /// Reviewed movie.
    pub movie_id: MovieId,
    /// Author.
    pub user_id: UserId,
    /// Score.
    pub rating: Rating,
    /// Headline.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    /// Reviewed movie.
    pub movie_id: MovieId,
    /// Author.
    pub user_id: UserId,
    /// Score.
    pub rating: Rating,
    /// Headline, 3 to 255 characters.
    pub title: String,
    /// Body, 20 to 2000 characters.
    pub content: String,
}

impl NewReview {
    /// Check title and content lengths.
    ///
    /// # Errors
    ///
    /// Returns a bad-request [`Error`] describing the first invalid field.
    pub fn validate(&self) -> Result<(), Error> {
        validate_text(&self.title, &self.content)
    }
}

/// Replacement fields for an owner's review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewUpdate {
    /// New score.
    pub rating: Rating,
    /// New headline.
    pub title: String,
    /// New body.
    pub content: String,
}

impl ReviewUpdate {
    /// Check title and content lengths.
    ///
    /// # Errors
    ///
    /// Returns a bad-request [`Error`] describing the first invalid field.
    pub fn validate(&self) -> Result<(), Error> {
        validate_text(&self.title, &self.content)
    }
}

fn validate_text(title: &str, content: &str) -> Result<(), Error> {
    check_length("title", title, TITLE_MIN, TITLE_MAX)?;
    check_length("content", content, CONTENT_MIN, CONTENT_MAX)
}

/// Listing filter; at least one side must be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewFilter {
    movie_id: Option<MovieId>,
    user_id: Option<UserId>,
}

impl ReviewFilter {
    /// Build a filter.
    ///
    /// # Errors
    ///
    /// Returns a bad-request [`Error`] when both ids are absent.
    pub fn new(movie_id: Option<MovieId>, user_id: Option<UserId>) -> Result<Self, Error> {
        if movie_id.is_none() && user_id.is_none() {
            return Err(Error::bad_request(
                "either movie_id or user_id must be provided",
            ));
        }
        Ok(Self { movie_id, user_id })
    }

    /// Movie restriction.
    pub const fn movie_id(&self) -> Option<MovieId> {
        self.movie_id
    }

    /// Author restriction.
    pub const fn user_id(&self) -> Option<UserId> {
        self.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(10, true)]
    #[case(11, false)]
    fn rating_bounds(#[case] raw: i32, #[case] ok: bool) {
        assert_eq!(Rating::new(raw).is_ok(), ok);
    }

    #[rstest]
    fn rating_deserialization_is_validated() {
        assert!(serde_json::from_str::<Rating>("7").is_ok());
        assert!(serde_json::from_str::<Rating>("12").is_err());
    }

    #[rstest]
    #[case("Ok", "a body that is long enough to pass", false)]
    #[case("Fine", "too short", false)]
    #[case("Fine", "a body that is long enough to pass", true)]
    fn review_text_lengths(#[case] title: &str, #[case] content: &str, #[case] ok: bool) {
        let update = ReviewUpdate {
            rating: Rating::new(5).expect("valid rating"),
            title: title.to_owned(),
            content: content.to_owned(),
        };
        assert_eq!(update.validate().is_ok(), ok);
    }

    #[rstest]
    fn empty_filter_is_bad_request() {
        let err = ReviewFilter::new(None, None).expect_err("no ids");
        assert_eq!(err.code(), ErrorCode::BadRequest);
        assert_eq!(err.message(), "either movie_id or user_id must be provided");
    }

    #[rstest]
    fn single_sided_filter_is_accepted() {
        let filter = ReviewFilter::new(None, Some(UserId::new(3))).expect("user filter");
        assert_eq!(filter.user_id(), Some(UserId::new(3)));
        assert!(filter.movie_id().is_none());
    }
}
