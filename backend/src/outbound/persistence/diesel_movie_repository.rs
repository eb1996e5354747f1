//! PostgreSQL-backed movie repository using Diesel ORM.
//!
//! Writes run inside a transaction scope: the versioned scalar update (or
//! insert) comes first, then both association sets are reconciled against
//! the desired lists, then the full record is re-read on the same
//! connection so the caller sees exactly what was committed.

use chrono::{DateTime, Utc};
use diesel::dsl::sql;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::{Bool, Float, Text};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use pagination::{Page, PageParams};
use tracing::debug;

use crate::domain::{
    CastEntry, Error, GenreId, Movie, MovieCredit, MovieDetails, MovieFilter, MovieGenreLink,
    MovieId, MovieStarLink, MovieUpdate, NewMovie, cast_links, genre_links, reconcile_links,
};

use super::average_rating::lock_movie;
use super::batch::{PageWindow, execute_batch, into_page};
use super::context::DbContext;
use super::error_mapping::map_diesel_error;
use super::link_writers::{CastLinkWriter, GenreLinkWriter, load_cast_links, load_genre_links};
use super::models::{GenreRow, MovieDetailsRow, MovieRow, NewMovieRow, StarRow};
use super::optimistic::{
    RowPresence, UpdateResult, cast_version_for_db, classify_affected_rows, delete_failure,
    disambiguate_update_failure,
};
use super::schema::{genres, movie_genres, movie_stars, movies, stars};

const SUBJECT: &str = "movie";

/// Diesel-backed movie repository.
#[derive(Debug, Clone, Copy, Default)]
pub struct DieselMovieRepository;

impl DieselMovieRepository {
    /// Create a repository handle.
    pub fn new() -> Self {
        Self
    }

    /// Insert a movie with its genres and cast and return the stored record.
    ///
    /// # Errors
    ///
    /// Returns NotFound when a referenced genre or star is missing or
    /// deleted, and Internal for store failures.
    pub async fn create(&self, ctx: &mut DbContext, movie: &NewMovie) -> Result<MovieDetails, Error> {
        ctx.transaction(|ctx| {
            async move {
                let mut conn = ctx.connection().await?;
                ensure_genres_exist(&mut conn, &movie.genres).await?;
                ensure_stars_exist(&mut conn, &movie.cast).await?;

                let id: i32 = diesel::insert_into(movies::table)
                    .values(NewMovieRow {
                        title: &movie.title,
                        description: &movie.description,
                        release_date: movie.release_date,
                    })
                    .returning(movies::id)
                    .get_result(&mut *conn)
                    .await
                    .map_err(|err| map_diesel_error(err, "insert movie"))?;
                let movie_id = MovieId::new(id);

                reconcile_associations(&mut conn, movie_id, &movie.genres, &movie.cast).await?;
                load_details(&mut conn, movie_id).await
            }
            .scope_boxed()
        })
        .await
    }

    /// Fetch a live movie with its live genres and cast in display order.
    ///
    /// # Errors
    ///
    /// Returns NotFound when the movie is missing or deleted.
    pub async fn get_by_id(&self, ctx: &mut DbContext, id: MovieId) -> Result<MovieDetails, Error> {
        let mut conn = ctx.connection().await?;
        load_details(&mut conn, id).await
    }

    /// Page through live movies, optionally restricted to one star's
    /// credits and to a full-text search.
    ///
    /// With a search term, rows are ranked by relevance with `id` as the
    /// tie-break; otherwise they are ordered by `id`.
    ///
    /// # Errors
    ///
    /// Returns Internal for store failures.
    pub async fn list(
        &self,
        ctx: &mut DbContext,
        filter: &MovieFilter,
        params: PageParams,
    ) -> Result<Page<Movie>, Error> {
        let window = PageWindow::from_params(&params);
        let mut conn = ctx.connection().await?;

        let page_query = filtered_movies(filter)
            .select(MovieRow::as_select())
            .offset(window.offset)
            .limit(window.limit);
        let page_query = match filter.search_term.as_deref() {
            Some(term) => page_query.order((
                sql::<Float>("ts_rank_cd(search_vector, websearch_to_tsquery('english', ")
                    .bind::<Text, _>(term)
                    .sql("))")
                    .desc(),
                movies::id.asc(),
            )),
            None => page_query.order(movies::id.asc()),
        };
        let count_query = filtered_movies(filter).count();

        let (rows, total) = execute_batch(
            page_query.load::<MovieRow>(&mut *conn),
            count_query.get_result::<i64>(&mut *conn),
            "list movies",
        )
        .await?;
        into_page(params, rows, total)
    }

    /// Apply a versioned update of the scalar fields and replace both
    /// association sets.
    ///
    /// The version is checked and bumped by a single conditional `UPDATE`.
    /// When it matches nothing, a probe decides between NotFound (missing or
    /// deleted) and VersionMismatch (live but stale).
    ///
    /// # Errors
    ///
    /// Returns NotFound, VersionMismatch, or Internal.
    pub async fn update(
        &self,
        ctx: &mut DbContext,
        id: MovieId,
        update: &MovieUpdate,
    ) -> Result<MovieDetails, Error> {
        ctx.transaction(|ctx| {
            async move {
                let mut conn = ctx.connection().await?;
                let updated = diesel::update(
                    movies::table
                        .filter(movies::id.eq(id.get()))
                        .filter(movies::deleted_at.is_null())
                        .filter(movies::version.eq(cast_version_for_db(update.version))),
                )
                .set((
                    movies::title.eq(&update.title),
                    movies::description.eq(&update.description),
                    movies::release_date.eq(update.release_date),
                    movies::version.eq(movies::version + 1),
                ))
                .execute(&mut *conn)
                .await
                .map_err(|err| map_diesel_error(err, "update movie"))?;

                if classify_affected_rows(updated) == UpdateResult::ZeroRows {
                    let presence = probe_movie(&mut conn, id).await?;
                    debug!(movie_id = %id, ?presence, version = update.version, "movie update matched no row");
                    return Err(disambiguate_update_failure(
                        presence,
                        SUBJECT,
                        "id",
                        id,
                        update.version,
                    ));
                }

                ensure_genres_exist(&mut conn, &update.genres).await?;
                ensure_stars_exist(&mut conn, &update.cast).await?;
                reconcile_associations(&mut conn, id, &update.genres, &update.cast).await?;
                load_details(&mut conn, id).await
            }
            .scope_boxed()
        })
        .await
    }

    /// Soft-delete a movie and remove its associations.
    ///
    /// # Errors
    ///
    /// Returns NotFound when the movie is missing or already deleted.
    pub async fn delete(&self, ctx: &mut DbContext, id: MovieId) -> Result<(), Error> {
        ctx.transaction(|ctx| {
            async move {
                let mut conn = ctx.connection().await?;
                let deleted = diesel::update(
                    movies::table
                        .filter(movies::id.eq(id.get()))
                        .filter(movies::deleted_at.is_null()),
                )
                .set(movies::deleted_at.eq(Some(Utc::now())))
                .execute(&mut *conn)
                .await
                .map_err(|err| map_diesel_error(err, "delete movie"))?;

                if classify_affected_rows(deleted) == UpdateResult::ZeroRows {
                    return Err(delete_failure(SUBJECT, "id", id));
                }
                reconcile_associations(&mut conn, id, &[], &[]).await
            }
            .scope_boxed()
        })
        .await
    }

    /// Take the row lock on a live movie for the rest of the enclosing
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns NotFound when the movie is missing or deleted.
    pub async fn lock(&self, ctx: &mut DbContext, id: MovieId) -> Result<(), Error> {
        let mut conn = ctx.connection().await?;
        lock_movie(&mut conn, id).await
    }
}

/// Live movies matching `filter`, without projection or ordering.
fn filtered_movies(filter: &MovieFilter) -> movies::BoxedQuery<'_, Pg> {
    let mut query = movies::table
        .filter(movies::deleted_at.is_null())
        .into_boxed();
    if let Some(star_id) = filter.star_id {
        query = query.filter(
            movies::id.eq_any(
                movie_stars::table
                    .filter(movie_stars::star_id.eq(star_id.get()))
                    .select(movie_stars::movie_id),
            ),
        );
    }
    if let Some(term) = filter.search_term.as_deref() {
        query = query.filter(
            sql::<Bool>("search_vector @@ websearch_to_tsquery('english', ")
                .bind::<Text, _>(term)
                .sql(")"),
        );
    }
    query
}

async fn probe_movie(conn: &mut AsyncPgConnection, id: MovieId) -> Result<RowPresence, Error> {
    let deleted_at = movies::table
        .find(id.get())
        .select(movies::deleted_at)
        .first::<Option<DateTime<Utc>>>(conn)
        .await
        .optional()
        .map_err(|err| map_diesel_error(err, "probe movie"))?;
    Ok(RowPresence::from_probe(deleted_at))
}

async fn load_details(conn: &mut AsyncPgConnection, id: MovieId) -> Result<MovieDetails, Error> {
    let row = movies::table
        .find(id.get())
        .filter(movies::deleted_at.is_null())
        .select(MovieDetailsRow::as_select())
        .first::<MovieDetailsRow>(conn)
        .await
        .optional()
        .map_err(|err| map_diesel_error(err, "load movie"))?
        .ok_or_else(|| Error::not_found(SUBJECT, "id", id))?;

    let genre_rows: Vec<GenreRow> = movie_genres::table
        .inner_join(genres::table)
        .filter(movie_genres::movie_id.eq(id.get()))
        .filter(genres::deleted_at.is_null())
        .order(movie_genres::order_no.asc())
        .select(GenreRow::as_select())
        .load(conn)
        .await
        .map_err(|err| map_diesel_error(err, "load movie genres"))?;

    let cast_rows: Vec<(StarRow, String, Option<String>)> = movie_stars::table
        .inner_join(stars::table)
        .filter(movie_stars::movie_id.eq(id.get()))
        .filter(stars::deleted_at.is_null())
        .order(movie_stars::order_no.asc())
        .select((StarRow::as_select(), movie_stars::role, movie_stars::details))
        .load(conn)
        .await
        .map_err(|err| map_diesel_error(err, "load movie cast"))?;

    let genres = genre_rows.into_iter().map(Into::into).collect();
    let cast = cast_rows
        .into_iter()
        .map(|(star, role, details)| MovieCredit {
            star: star.into(),
            role,
            details,
        })
        .collect();
    Ok(row.into_details(genres, cast))
}

/// Reject references to genres that are missing or soft-deleted.
async fn ensure_genres_exist(conn: &mut AsyncPgConnection, ids: &[GenreId]) -> Result<(), Error> {
    if ids.is_empty() {
        return Ok(());
    }
    let wanted: Vec<i32> = ids.iter().map(|id| id.get()).collect();
    let found: Vec<i32> = genres::table
        .filter(genres::id.eq_any(&wanted))
        .filter(genres::deleted_at.is_null())
        .select(genres::id)
        .load(conn)
        .await
        .map_err(|err| map_diesel_error(err, "check genres"))?;
    match wanted.iter().find(|id| !found.contains(id)) {
        Some(missing) => Err(Error::not_found("genre", "id", missing)),
        None => Ok(()),
    }
}

/// Reject credits naming stars that are missing or soft-deleted.
async fn ensure_stars_exist(conn: &mut AsyncPgConnection, cast: &[CastEntry]) -> Result<(), Error> {
    if cast.is_empty() {
        return Ok(());
    }
    let wanted: Vec<i32> = cast.iter().map(|entry| entry.star_id.get()).collect();
    let found: Vec<i32> = stars::table
        .filter(stars::id.eq_any(&wanted))
        .filter(stars::deleted_at.is_null())
        .select(stars::id)
        .load(conn)
        .await
        .map_err(|err| map_diesel_error(err, "check stars"))?;
    match wanted.iter().find(|id| !found.contains(id)) {
        Some(missing) => Err(Error::not_found("star", "id", missing)),
        None => Ok(()),
    }
}

/// Bring both association tables in line with the desired lists.
async fn reconcile_associations(
    conn: &mut AsyncPgConnection,
    movie_id: MovieId,
    genres: &[GenreId],
    cast: &[CastEntry],
) -> Result<(), Error> {
    let stored_genres = load_genre_links(conn, movie_id).await?;
    let genre_summary = reconcile_links(
        &stored_genres,
        &genre_links(movie_id, genres),
        MovieGenreLink::key,
        &mut GenreLinkWriter::new(conn),
    )
    .await?;

    let stored_cast = load_cast_links(conn, movie_id).await?;
    let cast_summary = reconcile_links(
        &stored_cast,
        &cast_links(movie_id, cast),
        MovieStarLink::key,
        &mut CastLinkWriter::new(conn),
    )
    .await?;

    debug!(
        %movie_id,
        genres_removed = genre_summary.removed,
        genres_added = genre_summary.added,
        cast_removed = cast_summary.removed,
        cast_added = cast_summary.added,
        "movie associations reconciled"
    );
    Ok(())
}
