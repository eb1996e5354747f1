//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

use crate::domain::{
    Error, Genre, GenreId, Movie, MovieDetails, MovieGenreLink, MovieId, MovieStarLink, Rating,
    Review, ReviewId, Star, StarDraft, StarId, User, UserId,
};

use super::optimistic::cast_version;
use super::schema::{genres, movie_genres, movie_stars, movies, reviews, stars, users};

// ---------------------------------------------------------------------------
// Movies
// ---------------------------------------------------------------------------

/// Listing projection of the movies table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = movies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MovieRow {
    pub id: i32,
    pub title: String,
    pub release_date: NaiveDate,
    pub avg_rating: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Self {
            id: MovieId::new(row.id),
            title: row.title,
            release_date: row.release_date,
            avg_rating: row.avg_rating,
            created_at: row.created_at,
        }
    }
}

/// Scalar columns of a movie including description and version.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = movies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MovieDetailsRow {
    #[diesel(embed)]
    pub movie: MovieRow,
    pub description: String,
    pub version: i32,
}

impl MovieDetailsRow {
    pub(crate) fn into_details(self, genres: Vec<Genre>, cast: Vec<crate::domain::MovieCredit>) -> MovieDetails {
        MovieDetails {
            movie: self.movie.into(),
            description: self.description,
            version: cast_version(self.version),
            genres,
            cast,
        }
    }
}

/// Insertable struct for creating movie records; version defaults to 0.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = movies)]
pub(crate) struct NewMovieRow<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub release_date: NaiveDate,
}

// ---------------------------------------------------------------------------
// Associations
// ---------------------------------------------------------------------------

/// Row of the movie_genres table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = movie_genres)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MovieGenreRow {
    pub movie_id: i32,
    pub genre_id: i32,
    pub order_no: i32,
}

impl From<MovieGenreRow> for MovieGenreLink {
    fn from(row: MovieGenreRow) -> Self {
        Self {
            movie_id: MovieId::new(row.movie_id),
            genre_id: GenreId::new(row.genre_id),
            order_no: row.order_no,
        }
    }
}

impl From<&MovieGenreLink> for MovieGenreRow {
    fn from(link: &MovieGenreLink) -> Self {
        Self {
            movie_id: link.movie_id.get(),
            genre_id: link.genre_id.get(),
            order_no: link.order_no,
        }
    }
}

/// Row of the movie_stars table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = movie_stars)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MovieStarRow {
    pub movie_id: i32,
    pub star_id: i32,
    pub role: String,
    pub details: Option<String>,
    pub order_no: i32,
}

impl From<MovieStarRow> for MovieStarLink {
    fn from(row: MovieStarRow) -> Self {
        Self {
            movie_id: MovieId::new(row.movie_id),
            star_id: StarId::new(row.star_id),
            role: row.role,
            details: row.details,
            order_no: row.order_no,
        }
    }
}

/// Insertable struct for a movie credit.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = movie_stars)]
pub(crate) struct NewMovieStarRow<'a> {
    pub movie_id: i32,
    pub star_id: i32,
    pub role: &'a str,
    pub details: Option<&'a str>,
    pub order_no: i32,
}

impl<'a> From<&'a MovieStarLink> for NewMovieStarRow<'a> {
    fn from(link: &'a MovieStarLink) -> Self {
        Self {
            movie_id: link.movie_id.get(),
            star_id: link.star_id.get(),
            role: &link.role,
            details: link.details.as_deref(),
            order_no: link.order_no,
        }
    }
}

// ---------------------------------------------------------------------------
// Genres
// ---------------------------------------------------------------------------

/// Row struct for reading from the genres table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = genres)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GenreRow {
    pub id: i32,
    pub name: String,
}

impl From<GenreRow> for Genre {
    fn from(row: GenreRow) -> Self {
        Self {
            id: GenreId::new(row.id),
            name: row.name,
        }
    }
}

/// Insertable struct for creating genre records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = genres)]
pub(crate) struct NewGenreRow<'a> {
    pub name: &'a str,
}

// ---------------------------------------------------------------------------
// Stars
// ---------------------------------------------------------------------------

/// Row struct for reading from the stars table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = stars)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct StarRow {
    pub id: i32,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub birth_place: Option<String>,
    pub death_date: Option<NaiveDate>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<StarRow> for Star {
    fn from(row: StarRow) -> Self {
        Self {
            id: StarId::new(row.id),
            first_name: row.first_name,
            middle_name: row.middle_name,
            last_name: row.last_name,
            birth_date: row.birth_date,
            birth_place: row.birth_place,
            death_date: row.death_date,
            bio: row.bio,
            created_at: row.created_at,
        }
    }
}

/// Star columns written on insert and full update; `None` clears a column.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = stars)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct StarValues<'a> {
    pub first_name: &'a str,
    pub middle_name: Option<&'a str>,
    pub last_name: &'a str,
    pub birth_date: NaiveDate,
    pub birth_place: Option<&'a str>,
    pub death_date: Option<NaiveDate>,
    pub bio: Option<&'a str>,
}

impl<'a> From<&'a StarDraft> for StarValues<'a> {
    fn from(draft: &'a StarDraft) -> Self {
        Self {
            first_name: &draft.first_name,
            middle_name: draft.middle_name.as_deref(),
            last_name: &draft.last_name,
            birth_date: draft.birth_date,
            birth_place: draft.birth_place.as_deref(),
            death_date: draft.death_date,
            bio: draft.bio.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table; the hash is never loaded.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: String,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = Error;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse()
            .map_err(|_| Error::internal(format!("user {} has unknown role {}", row.id, row.role)))?;
        Ok(Self {
            id: UserId::new(row.id),
            username: row.username,
            email: row.email,
            role,
            bio: row.bio,
            created_at: row.created_at,
        })
    }
}

/// Insertable struct for creating user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub pass_hash: &'a str,
    pub role: &'a str,
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

/// Row struct for reading from the reviews table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReviewRow {
    pub id: i32,
    pub movie_id: i32,
    pub user_id: i32,
    pub rating: i32,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = Error;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let rating = Rating::new(row.rating)
            .map_err(|_| Error::internal(format!("review {} has rating {}", row.id, row.rating)))?;
        Ok(Self {
            id: ReviewId::new(row.id),
            movie_id: MovieId::new(row.movie_id),
            user_id: UserId::new(row.user_id),
            rating,
            title: row.title,
            content: row.content,
            created_at: row.created_at,
        })
    }
}

/// Insertable struct for creating review records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reviews)]
pub(crate) struct NewReviewRow<'a> {
    pub movie_id: i32,
    pub user_id: i32,
    pub rating: i32,
    pub title: &'a str,
    pub content: &'a str,
}

/// Changeset for an owner's review edit.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = reviews)]
pub(crate) struct ReviewChangeset<'a> {
    pub rating: i32,
    pub title: &'a str,
    pub content: &'a str,
}
