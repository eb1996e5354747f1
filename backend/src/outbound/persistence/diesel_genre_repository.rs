//! PostgreSQL-backed genre repository using Diesel ORM.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::{Error, Genre, GenreId, GenreName};

use super::context::DbContext;
use super::error_mapping::{is_unique_violation, map_diesel_error};
use super::models::{GenreRow, NewGenreRow};
use super::schema::genres;

const SUBJECT: &str = "genre";
const LIVE_NAME_INDEX: &str = "genres_name_live_key";

/// Diesel-backed genre repository.
#[derive(Debug, Clone, Copy, Default)]
pub struct DieselGenreRepository;

fn map_write_error(error: diesel::result::Error, name: &GenreName, operation: &str) -> Error {
    if is_unique_violation(&error, LIVE_NAME_INDEX) {
        Error::already_exists(SUBJECT, "name", name.as_str())
    } else {
        map_diesel_error(error, operation)
    }
}

impl DieselGenreRepository {
    /// Create a repository handle.
    pub fn new() -> Self {
        Self
    }

    /// Insert a genre.
    ///
    /// # Errors
    ///
    /// Returns AlreadyExists when a live genre has the same name.
    pub async fn create(&self, ctx: &mut DbContext, name: &GenreName) -> Result<Genre, Error> {
        let mut conn = ctx.connection().await?;
        diesel::insert_into(genres::table)
            .values(NewGenreRow {
                name: name.as_str(),
            })
            .returning(GenreRow::as_returning())
            .get_result::<GenreRow>(&mut *conn)
            .await
            .map(Into::into)
            .map_err(|err| map_write_error(err, name, "insert genre"))
    }

    /// Fetch a live genre.
    ///
    /// # Errors
    ///
    /// Returns NotFound when the genre is missing or deleted.
    pub async fn get_by_id(&self, ctx: &mut DbContext, id: GenreId) -> Result<Genre, Error> {
        let mut conn = ctx.connection().await?;
        genres::table
            .find(id.get())
            .filter(genres::deleted_at.is_null())
            .select(GenreRow::as_select())
            .first::<GenreRow>(&mut *conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "load genre"))?
            .map(Into::into)
            .ok_or_else(|| Error::not_found(SUBJECT, "id", id))
    }

    /// All live genres ordered by id.
    ///
    /// # Errors
    ///
    /// Returns Internal for store failures.
    pub async fn list_all(&self, ctx: &mut DbContext) -> Result<Vec<Genre>, Error> {
        let mut conn = ctx.connection().await?;
        let rows: Vec<GenreRow> = genres::table
            .filter(genres::deleted_at.is_null())
            .order(genres::id.asc())
            .select(GenreRow::as_select())
            .load(&mut *conn)
            .await
            .map_err(|err| map_diesel_error(err, "list genres"))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Rename a live genre.
    ///
    /// # Errors
    ///
    /// Returns NotFound when the genre is missing or deleted and
    /// AlreadyExists when another live genre has the new name.
    pub async fn update(&self, ctx: &mut DbContext, id: GenreId, name: &GenreName) -> Result<Genre, Error> {
        let mut conn = ctx.connection().await?;
        diesel::update(
            genres::table
                .filter(genres::id.eq(id.get()))
                .filter(genres::deleted_at.is_null()),
        )
        .set(genres::name.eq(name.as_str()))
        .returning(GenreRow::as_returning())
        .get_result::<GenreRow>(&mut *conn)
        .await
        .optional()
        .map_err(|err| map_write_error(err, name, "update genre"))?
        .map(Into::into)
        .ok_or_else(|| Error::not_found(SUBJECT, "id", id))
    }

    /// Soft-delete a genre. Its movie links stay stored but stop appearing
    /// in movie reads.
    ///
    /// # Errors
    ///
    /// Returns NotFound when the genre is missing or already deleted.
    pub async fn delete(&self, ctx: &mut DbContext, id: GenreId) -> Result<(), Error> {
        let mut conn = ctx.connection().await?;
        let deleted = diesel::update(
            genres::table
                .filter(genres::id.eq(id.get()))
                .filter(genres::deleted_at.is_null()),
        )
        .set(genres::deleted_at.eq(Some(chrono::Utc::now())))
        .execute(&mut *conn)
        .await
        .map_err(|err| map_diesel_error(err, "delete genre"))?;
        if deleted == 0 {
            return Err(Error::not_found(SUBJECT, "id", id));
        }
        Ok(())
    }
}
