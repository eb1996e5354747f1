//! Movies: the versioned aggregate root of the catalog.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{check_length, check_not_blank};
use super::{Error, Genre, GenreId, MovieId, Star, StarId};

const TITLE_MIN: usize = 1;
const TITLE_MAX: usize = 255;

/// Listing projection of a live movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    /// Store id.
    pub id: MovieId,
    /// Display title.
    pub title: String,
    /// Release date.
    pub release_date: NaiveDate,
    /// Mean rating of live reviews; absent until the first review.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_rating: Option<f64>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Full movie with description, version token and ordered associations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    /// Scalar columns shared with listings.
    #[serde(flatten)]
    pub movie: Movie,
    /// Long-form description.
    pub description: String,
    /// Optimistic-concurrency token; starts at 0.
    pub version: u32,
    /// Genres in display order.
    pub genres: Vec<Genre>,
    /// Credits in display order.
    pub cast: Vec<MovieCredit>,
}

/// A star credited on a movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieCredit {
    /// The credited star.
    pub star: Star,
    /// Credit role.
    pub role: String,
    /// Character name or other credit detail.
    pub details: Option<String>,
}

/// Requested credit on create or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastEntry {
    /// Credited star.
    pub star_id: StarId,
    /// Credit role.
    pub role: String,
    /// Optional credit detail.
    pub details: Option<String>,
}

impl CastEntry {
    /// Build an entry.
    pub fn new(star_id: StarId, role: impl Into<String>, details: Option<&str>) -> Self {
        Self {
            star_id,
            role: role.into(),
            details: details.map(str::to_owned),
        }
    }
}

/// Payload for creating a movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMovie {
    /// Display title, 1 to 255 characters.
    pub title: String,
    /// Release date.
    pub release_date: NaiveDate,
    /// Long-form description.
    #[serde(default)]
    pub description: String,
    /// Genres in display order.
    #[serde(default)]
    pub genres: Vec<GenreId>,
    /// Credits in display order.
    #[serde(default)]
    pub cast: Vec<CastEntry>,
}

impl NewMovie {
    /// Check title length and credit roles.
    ///
    /// # Errors
    ///
    /// Returns a bad-request [`Error`] describing the first invalid field.
    pub fn validate(&self) -> Result<(), Error> {
        validate_movie(&self.title, &self.cast)
    }
}

/// Full replacement of a movie's scalars and associations, guarded by the
/// version the caller last observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieUpdate {
    /// Display title, 1 to 255 characters.
    pub title: String,
    /// Release date.
    pub release_date: NaiveDate,
    /// Long-form description.
    #[serde(default)]
    pub description: String,
    /// Version the caller last read.
    pub version: u32,
    /// Desired genres in display order.
    #[serde(default)]
    pub genres: Vec<GenreId>,
    /// Desired credits in display order.
    #[serde(default)]
    pub cast: Vec<CastEntry>,
}

impl MovieUpdate {
    /// Check title length and credit roles.
    ///
    /// # Errors
    ///
    /// Returns a bad-request [`Error`] describing the first invalid field.
    pub fn validate(&self) -> Result<(), Error> {
        validate_movie(&self.title, &self.cast)
    }
}

fn validate_movie(title: &str, cast: &[CastEntry]) -> Result<(), Error> {
    check_not_blank("title", title)?;
    check_length("title", title, TITLE_MIN, TITLE_MAX)?;
    cast.iter()
        .try_for_each(|entry| check_not_blank("cast role", &entry.role))
}

/// Optional listing filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieFilter {
    /// Only movies crediting this star.
    pub star_id: Option<StarId>,
    /// Full-text search terms; results are ordered by relevance.
    pub search_term: Option<String>,
}

impl MovieFilter {
    /// Restrict to movies crediting `star_id`.
    pub fn with_star(mut self, star_id: StarId) -> Self {
        self.star_id = Some(star_id);
        self
    }

    /// Restrict to movies matching `term`; blank terms are ignored.
    pub fn with_search(mut self, term: &str) -> Self {
        let trimmed = term.trim();
        self.search_term = (!trimmed.is_empty()).then(|| trimmed.to_owned());
        self
    }

    /// Whether no filter is set, i.e. the listing is the shared default view.
    pub fn is_unfiltered(&self) -> bool {
        self.star_id.is_none() && self.search_term.is_none()
    }
}
