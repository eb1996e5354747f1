//! PostgreSQL-backed star repository using Diesel ORM.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageParams};

use crate::domain::{Error, Star, StarDraft, StarId};

use super::batch::{PageWindow, execute_batch, into_page};
use super::context::DbContext;
use super::error_mapping::map_diesel_error;
use super::models::{StarRow, StarValues};
use super::schema::stars;

const SUBJECT: &str = "star";

/// Diesel-backed star repository.
#[derive(Debug, Clone, Copy, Default)]
pub struct DieselStarRepository;

impl DieselStarRepository {
    /// Create a repository handle.
    pub fn new() -> Self {
        Self
    }

    /// Insert a star.
    ///
    /// # Errors
    ///
    /// Returns Internal for store failures.
    pub async fn create(&self, ctx: &mut DbContext, draft: &StarDraft) -> Result<Star, Error> {
        let mut conn = ctx.connection().await?;
        diesel::insert_into(stars::table)
            .values(StarValues::from(draft))
            .returning(StarRow::as_returning())
            .get_result::<StarRow>(&mut *conn)
            .await
            .map(Into::into)
            .map_err(|err| map_diesel_error(err, "insert star"))
    }

    /// Fetch a live star.
    ///
    /// # Errors
    ///
    /// Returns NotFound when the star is missing or deleted.
    pub async fn get_by_id(&self, ctx: &mut DbContext, id: StarId) -> Result<Star, Error> {
        let mut conn = ctx.connection().await?;
        stars::table
            .find(id.get())
            .filter(stars::deleted_at.is_null())
            .select(StarRow::as_select())
            .first::<StarRow>(&mut *conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "load star"))?
            .map(Into::into)
            .ok_or_else(|| Error::not_found(SUBJECT, "id", id))
    }

    /// Page through live stars ordered by id.
    ///
    /// # Errors
    ///
    /// Returns Internal for store failures.
    pub async fn list(&self, ctx: &mut DbContext, params: PageParams) -> Result<Page<Star>, Error> {
        let window = PageWindow::from_params(&params);
        let mut conn = ctx.connection().await?;

        let page_query = stars::table
            .filter(stars::deleted_at.is_null())
            .order(stars::id.asc())
            .offset(window.offset)
            .limit(window.limit)
            .select(StarRow::as_select());
        let count_query = stars::table.filter(stars::deleted_at.is_null()).count();

        let (rows, total) = execute_batch(
            page_query.load::<StarRow>(&mut *conn),
            count_query.get_result::<i64>(&mut *conn),
            "list stars",
        )
        .await?;
        into_page(params, rows, total)
    }

    /// Replace every editable field of a live star.
    ///
    /// # Errors
    ///
    /// Returns NotFound when the star is missing or deleted.
    pub async fn update(&self, ctx: &mut DbContext, id: StarId, draft: &StarDraft) -> Result<Star, Error> {
        let mut conn = ctx.connection().await?;
        diesel::update(
            stars::table
                .filter(stars::id.eq(id.get()))
                .filter(stars::deleted_at.is_null()),
        )
        .set(StarValues::from(draft))
        .returning(StarRow::as_returning())
        .get_result::<StarRow>(&mut *conn)
        .await
        .optional()
        .map_err(|err| map_diesel_error(err, "update star"))?
        .map(Into::into)
        .ok_or_else(|| Error::not_found(SUBJECT, "id", id))
    }

    /// Soft-delete a star. Credits stay stored but stop appearing in movie
    /// reads.
    ///
    /// # Errors
    ///
    /// Returns NotFound when the star is missing or already deleted.
    pub async fn delete(&self, ctx: &mut DbContext, id: StarId) -> Result<(), Error> {
        let mut conn = ctx.connection().await?;
        let deleted = diesel::update(
            stars::table
                .filter(stars::id.eq(id.get()))
                .filter(stars::deleted_at.is_null()),
        )
        .set(stars::deleted_at.eq(Some(chrono::Utc::now())))
        .execute(&mut *conn)
        .await
        .map_err(|err| map_diesel_error(err, "delete star"))?;
        if deleted == 0 {
            return Err(Error::not_found(SUBJECT, "id", id));
        }
        Ok(())
    }
}
