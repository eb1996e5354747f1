//! PostgreSQL-backed review repository using Diesel ORM.
//!
//! Every review mutation runs in one transaction that locks the parent movie
//! row, writes the review, and recomputes the movie's average rating last.
//! The lock serializes concurrent review writes for the same movie.

use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use pagination::{Page, PageParams};

use crate::domain::{Error, MovieId, NewReview, Review, ReviewFilter, ReviewId, ReviewUpdate, UserId};

use super::average_rating::{lock_movie, recalculate_average_rating};
use super::batch::{PageWindow, execute_batch, into_page};
use super::context::DbContext;
use super::error_mapping::{is_foreign_key_violation, is_unique_violation, map_diesel_error};
use super::models::{NewReviewRow, ReviewChangeset, ReviewRow};
use super::schema::{reviews, users};

const SUBJECT: &str = "review";
const LIVE_PAIR_INDEX: &str = "reviews_movie_user_live_key";
const MOVIE_FK: &str = "reviews_movie_id_fkey";
const USER_FK: &str = "reviews_user_id_fkey";

/// Diesel-backed review repository.
#[derive(Debug, Clone, Copy, Default)]
pub struct DieselReviewRepository;

impl DieselReviewRepository {
    /// Create a repository handle.
    pub fn new() -> Self {
        Self
    }

    /// Insert a review and refresh the movie's average rating.
    ///
    /// # Errors
    ///
    /// Returns NotFound when the movie or author is missing or deleted,
    /// AlreadyExists when the author already has a live review of the movie,
    /// and Internal for store failures.
    pub async fn create(&self, ctx: &mut DbContext, review: &NewReview) -> Result<Review, Error> {
        ctx.transaction(|ctx| {
            async move {
                let mut conn = ctx.connection().await?;
                lock_movie(&mut conn, review.movie_id).await?;
                ensure_user_exists(&mut conn, review.user_id).await?;

                let row: ReviewRow = diesel::insert_into(reviews::table)
                    .values(NewReviewRow {
                        movie_id: review.movie_id.get(),
                        user_id: review.user_id.get(),
                        rating: review.rating.get(),
                        title: &review.title,
                        content: &review.content,
                    })
                    .returning(ReviewRow::as_returning())
                    .get_result(&mut *conn)
                    .await
                    .map_err(|err| map_insert_error(err, review.movie_id, review.user_id))?;

                recalculate_average_rating(&mut conn, review.movie_id).await?;
                Review::try_from(row)
            }
            .scope_boxed()
        })
        .await
    }

    /// Fetch a live review.
    ///
    /// # Errors
    ///
    /// Returns NotFound when the review is missing or deleted.
    pub async fn get_by_id(&self, ctx: &mut DbContext, id: ReviewId) -> Result<Review, Error> {
        let mut conn = ctx.connection().await?;
        let row = find_live(&mut conn, id)
            .await?
            .ok_or_else(|| Error::not_found(SUBJECT, "id", id))?;
        Review::try_from(row)
    }

    /// Page through live reviews of a movie, of a user, or both, ordered by
    /// id.
    ///
    /// # Errors
    ///
    /// Returns Internal for store failures.
    pub async fn list(
        &self,
        ctx: &mut DbContext,
        filter: &ReviewFilter,
        params: PageParams,
    ) -> Result<Page<Review>, Error> {
        let window = PageWindow::from_params(&params);
        let mut conn = ctx.connection().await?;

        let page_query = filtered_reviews(filter)
            .select(ReviewRow::as_select())
            .order(reviews::id.asc())
            .offset(window.offset)
            .limit(window.limit);
        let count_query = filtered_reviews(filter).count();

        let (rows, total) = execute_batch(
            page_query.load::<ReviewRow>(&mut *conn),
            count_query.get_result::<i64>(&mut *conn),
            "list reviews",
        )
        .await?;
        into_page(params, rows, total)
    }

    /// Edit a review on behalf of its author and refresh the movie's
    /// average rating.
    ///
    /// # Errors
    ///
    /// Returns NotFound when the review is missing or deleted, Forbidden when
    /// `user_id` is not its author, and Internal for store failures.
    pub async fn update(
        &self,
        ctx: &mut DbContext,
        id: ReviewId,
        user_id: UserId,
        update: &ReviewUpdate,
    ) -> Result<Review, Error> {
        ctx.transaction(|ctx| {
            async move {
                let mut conn = ctx.connection().await?;
                let movie_id = parent_movie(&mut conn, id).await?;
                lock_movie(&mut conn, movie_id).await?;

                let row: Option<ReviewRow> = diesel::update(
                    reviews::table
                        .filter(reviews::id.eq(id.get()))
                        .filter(reviews::user_id.eq(user_id.get()))
                        .filter(reviews::deleted_at.is_null()),
                )
                .set(ReviewChangeset {
                    rating: update.rating.get(),
                    title: &update.title,
                    content: &update.content,
                })
                .returning(ReviewRow::as_returning())
                .get_result(&mut *conn)
                .await
                .optional()
                .map_err(|err| map_diesel_error(err, "update review"))?;
                let Some(row) = row else {
                    return Err(ownership_failure(&mut conn, id, user_id).await);
                };

                recalculate_average_rating(&mut conn, movie_id).await?;
                Review::try_from(row)
            }
            .scope_boxed()
        })
        .await
    }

    /// Soft-delete a review on behalf of its author and refresh the movie's
    /// average rating.
    ///
    /// # Errors
    ///
    /// Returns NotFound when the review is missing or deleted, Forbidden when
    /// `user_id` is not its author, and Internal for store failures.
    pub async fn delete(&self, ctx: &mut DbContext, id: ReviewId, user_id: UserId) -> Result<(), Error> {
        ctx.transaction(|ctx| {
            async move {
                let mut conn = ctx.connection().await?;
                let movie_id = parent_movie(&mut conn, id).await?;
                lock_movie(&mut conn, movie_id).await?;

                let deleted = diesel::update(
                    reviews::table
                        .filter(reviews::id.eq(id.get()))
                        .filter(reviews::user_id.eq(user_id.get()))
                        .filter(reviews::deleted_at.is_null()),
                )
                .set(reviews::deleted_at.eq(Some(chrono::Utc::now())))
                .execute(&mut *conn)
                .await
                .map_err(|err| map_diesel_error(err, "delete review"))?;
                if deleted == 0 {
                    return Err(ownership_failure(&mut conn, id, user_id).await);
                }

                recalculate_average_rating(&mut conn, movie_id).await
            }
            .scope_boxed()
        })
        .await
    }
}

fn filtered_reviews(filter: &ReviewFilter) -> reviews::BoxedQuery<'static, Pg> {
    let mut query = reviews::table
        .filter(reviews::deleted_at.is_null())
        .into_boxed();
    if let Some(movie_id) = filter.movie_id() {
        query = query.filter(reviews::movie_id.eq(movie_id.get()));
    }
    if let Some(user_id) = filter.user_id() {
        query = query.filter(reviews::user_id.eq(user_id.get()));
    }
    query
}

async fn find_live(conn: &mut AsyncPgConnection, id: ReviewId) -> Result<Option<ReviewRow>, Error> {
    reviews::table
        .find(id.get())
        .filter(reviews::deleted_at.is_null())
        .select(ReviewRow::as_select())
        .first(conn)
        .await
        .optional()
        .map_err(|err| map_diesel_error(err, "load review"))
}

/// Movie of a live review; read before the movie lock is taken.
async fn parent_movie(conn: &mut AsyncPgConnection, id: ReviewId) -> Result<MovieId, Error> {
    reviews::table
        .find(id.get())
        .filter(reviews::deleted_at.is_null())
        .select(reviews::movie_id)
        .first::<i32>(conn)
        .await
        .optional()
        .map_err(|err| map_diesel_error(err, "load review movie"))?
        .map(MovieId::new)
        .ok_or_else(|| Error::not_found(SUBJECT, "id", id))
}

/// Classify an owner-scoped write that matched no row.
async fn ownership_failure(conn: &mut AsyncPgConnection, id: ReviewId, user_id: UserId) -> Error {
    match find_live(conn, id).await {
        Err(err) => err,
        Ok(None) => Error::not_found(SUBJECT, "id", id),
        Ok(Some(row)) if row.user_id != user_id.get() => Error::forbidden(format!(
            "review with id {id} is not owned by user with id {user_id}"
        )),
        Ok(Some(_)) => Error::internal(format!(
            "owner-scoped write on review {id} matched no row for its author"
        )),
    }
}

async fn ensure_user_exists(conn: &mut AsyncPgConnection, user_id: UserId) -> Result<(), Error> {
    users::table
        .find(user_id.get())
        .filter(users::deleted_at.is_null())
        .select(users::id)
        .first::<i32>(conn)
        .await
        .optional()
        .map_err(|err| map_diesel_error(err, "check review author"))?
        .map(|_| ())
        .ok_or_else(|| Error::not_found("user", "id", user_id))
}

fn map_insert_error(error: diesel::result::Error, movie_id: MovieId, user_id: UserId) -> Error {
    if is_unique_violation(&error, LIVE_PAIR_INDEX) {
        Error::already_exists(SUBJECT, "(movie_id,user_id)", format!("({movie_id},{user_id})"))
    } else if is_foreign_key_violation(&error, MOVIE_FK) {
        Error::not_found("movie", "id", movie_id)
    } else if is_foreign_key_violation(&error, USER_FK) {
        Error::not_found("user", "id", user_id)
    } else {
        map_diesel_error(error, "insert review")
    }
}
