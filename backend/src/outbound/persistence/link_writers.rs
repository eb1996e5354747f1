//! Store-side writers for movie associations.
//!
//! Each writer borrows the transaction connection and issues single-row
//! deletes and inserts against one association table. A foreign-key failure
//! on insert means the referenced genre or star does not exist and is
//! reported as NotFound for that subject.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::{Error, LinkWriter, MovieGenreLink, MovieId, MovieStarLink};

use super::error_mapping::{is_foreign_key_violation, map_diesel_error};
use super::models::{MovieGenreRow, MovieStarRow, NewMovieStarRow};
use super::schema::{movie_genres, movie_stars};

const GENRE_FK: &str = "movie_genres_genre_id_fkey";
const STAR_FK: &str = "movie_stars_star_id_fkey";

/// Load a movie's genre links in display order.
pub async fn load_genre_links(
    conn: &mut AsyncPgConnection,
    movie_id: MovieId,
) -> Result<Vec<MovieGenreLink>, Error> {
    let rows: Vec<MovieGenreRow> = movie_genres::table
        .filter(movie_genres::movie_id.eq(movie_id.get()))
        .order(movie_genres::order_no.asc())
        .select(MovieGenreRow::as_select())
        .load(conn)
        .await
        .map_err(|err| map_diesel_error(err, "load genre links"))?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Load a movie's cast links in display order.
pub async fn load_cast_links(
    conn: &mut AsyncPgConnection,
    movie_id: MovieId,
) -> Result<Vec<MovieStarLink>, Error> {
    let rows: Vec<MovieStarRow> = movie_stars::table
        .filter(movie_stars::movie_id.eq(movie_id.get()))
        .order(movie_stars::order_no.asc())
        .select(MovieStarRow::as_select())
        .load(conn)
        .await
        .map_err(|err| map_diesel_error(err, "load cast links"))?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Writes `movie_genres` rows.
pub struct GenreLinkWriter<'c> {
    conn: &'c mut AsyncPgConnection,
}

impl<'c> GenreLinkWriter<'c> {
    /// Borrow a connection, normally the open transaction's.
    pub fn new(conn: &'c mut AsyncPgConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl LinkWriter<MovieGenreLink> for GenreLinkWriter<'_> {
    async fn remove(&mut self, link: &MovieGenreLink) -> Result<(), Error> {
        diesel::delete(
            movie_genres::table
                .filter(movie_genres::movie_id.eq(link.movie_id.get()))
                .filter(movie_genres::genre_id.eq(link.genre_id.get())),
        )
        .execute(&mut *self.conn)
        .await
        .map(|_| ())
        .map_err(|err| map_diesel_error(err, "remove genre link"))
    }

    async fn add(&mut self, link: &MovieGenreLink) -> Result<(), Error> {
        diesel::insert_into(movie_genres::table)
            .values(MovieGenreRow::from(link))
            .execute(&mut *self.conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                if is_foreign_key_violation(&err, GENRE_FK) {
                    Error::not_found("genre", "id", link.genre_id)
                } else {
                    map_diesel_error(err, "add genre link")
                }
            })
    }
}

/// Writes `movie_stars` rows.
pub struct CastLinkWriter<'c> {
    conn: &'c mut AsyncPgConnection,
}

impl<'c> CastLinkWriter<'c> {
    /// Borrow a connection, normally the open transaction's.
    pub fn new(conn: &'c mut AsyncPgConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl LinkWriter<MovieStarLink> for CastLinkWriter<'_> {
    async fn remove(&mut self, link: &MovieStarLink) -> Result<(), Error> {
        diesel::delete(
            movie_stars::table
                .filter(movie_stars::movie_id.eq(link.movie_id.get()))
                .filter(movie_stars::star_id.eq(link.star_id.get()))
                .filter(movie_stars::role.eq(&link.role)),
        )
        .execute(&mut *self.conn)
        .await
        .map(|_| ())
        .map_err(|err| map_diesel_error(err, "remove cast link"))
    }

    async fn add(&mut self, link: &MovieStarLink) -> Result<(), Error> {
        diesel::insert_into(movie_stars::table)
            .values(NewMovieStarRow::from(link))
            .execute(&mut *self.conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                if is_foreign_key_violation(&err, STAR_FK) {
                    Error::not_found("star", "id", link.star_id)
                } else {
                    map_diesel_error(err, "add cast link")
                }
            })
    }
}
