//! Movie average-rating maintenance.
//!
//! Every review write locks the parent movie row first and recomputes the
//! average from scratch as its last statement, inside the same transaction.
//! The lock serializes concurrent review writes on one movie, so each
//! recomputation sees every review committed before it.

use diesel::prelude::*;
use diesel::sql_types::Integer;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::{Error, MovieId};

use super::error_mapping::map_diesel_error;
use super::optimistic::{UpdateResult, classify_affected_rows};
use super::schema::movies;

const RECALCULATE_AVERAGE_RATING: &str = "\
    UPDATE movies \
    SET avg_rating = ( \
        SELECT avg(rating)::float8 FROM reviews \
        WHERE movie_id = $1 AND deleted_at IS NULL \
    ) \
    WHERE id = $1";

/// Take the row lock on a live movie (`SELECT … FOR UPDATE`).
///
/// # Errors
///
/// Returns NotFound when the movie is missing or soft-deleted.
pub async fn lock_movie(conn: &mut AsyncPgConnection, movie_id: MovieId) -> Result<(), Error> {
    movies::table
        .filter(movies::id.eq(movie_id.get()))
        .filter(movies::deleted_at.is_null())
        .select(movies::id)
        .for_update()
        .first::<i32>(conn)
        .await
        .optional()
        .map_err(|err| map_diesel_error(err, "lock movie"))?
        .map(|_| ())
        .ok_or_else(|| Error::not_found("movie", "id", movie_id))
}

/// Set the movie's `avg_rating` to the mean of its live reviews (NULL when
/// none remain).
///
/// # Errors
///
/// Returns NotFound when no movie row has this id.
pub async fn recalculate_average_rating(
    conn: &mut AsyncPgConnection,
    movie_id: MovieId,
) -> Result<(), Error> {
    let updated = diesel::sql_query(RECALCULATE_AVERAGE_RATING)
        .bind::<Integer, _>(movie_id.get())
        .execute(conn)
        .await
        .map_err(|err| map_diesel_error(err, "recalculate average rating"))?;

    match classify_affected_rows(updated) {
        UpdateResult::Success => Ok(()),
        UpdateResult::ZeroRows => Err(Error::not_found("movie", "id", movie_id)),
    }
}
