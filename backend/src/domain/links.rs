//! Movie association values reconciled against the store.
//!
//! Identity is the key returned by `key()`; every other field participates
//! only in whole-value equality, so a changed `order_no` or `details` makes
//! the stored link stale.

use super::{CastEntry, GenreId, MovieId, StarId};

/// Row of `movie_genres`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MovieGenreLink {
    /// Parent movie.
    pub movie_id: MovieId,
    /// Linked genre.
    pub genre_id: GenreId,
    /// Position in the movie's genre list.
    pub order_no: i32,
}

impl MovieGenreLink {
    /// Identity within `movie_genres`.
    pub fn key(&self) -> (MovieId, GenreId) {
        (self.movie_id, self.genre_id)
    }
}

/// Row of `movie_stars`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MovieStarLink {
    /// Parent movie.
    pub movie_id: MovieId,
    /// Credited star.
    pub star_id: StarId,
    /// Credit role, e.g. `actor` or `director`.
    pub role: String,
    /// Character name or other credit detail.
    pub details: Option<String>,
    /// Position in the movie's cast list.
    pub order_no: i32,
}

impl MovieStarLink {
    /// Identity within `movie_stars`; one star may hold several roles.
    pub fn key(&self) -> (MovieId, StarId, String) {
        (self.movie_id, self.star_id, self.role.clone())
    }
}

fn order_no(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}

/// Desired genre links for `movie_id`, ordered as given.
pub fn genre_links(movie_id: MovieId, genres: &[GenreId]) -> Vec<MovieGenreLink> {
    genres
        .iter()
        .enumerate()
        .map(|(index, genre_id)| MovieGenreLink {
            movie_id,
            genre_id: *genre_id,
            order_no: order_no(index),
        })
        .collect()
}

/// Desired cast links for `movie_id`, ordered as given.
pub fn cast_links(movie_id: MovieId, cast: &[CastEntry]) -> Vec<MovieStarLink> {
    cast.iter()
        .enumerate()
        .map(|(index, entry)| MovieStarLink {
            movie_id,
            star_id: entry.star_id,
            role: entry.role.clone(),
            details: entry.details.clone(),
            order_no: order_no(index),
        })
        .collect()
}
