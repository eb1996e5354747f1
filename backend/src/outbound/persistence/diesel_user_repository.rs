//! PostgreSQL-backed user repository using Diesel ORM.
//!
//! Usernames and emails are unique among live users through two partial
//! unique indexes; the violated index name tells which field clashed.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::{Error, NewUser, Role, User, UserId};

use super::context::DbContext;
use super::error_mapping::{is_unique_violation, map_diesel_error};
use super::models::{NewUserRow, UserRow};
use super::schema::users;

const SUBJECT: &str = "user";
const LIVE_USERNAME_INDEX: &str = "users_username_live_key";
const LIVE_EMAIL_INDEX: &str = "users_email_live_key";

/// Diesel-backed user repository.
#[derive(Debug, Clone, Copy, Default)]
pub struct DieselUserRepository;

impl DieselUserRepository {
    /// Create a repository handle.
    pub fn new() -> Self {
        Self
    }

    /// Insert a user.
    ///
    /// # Errors
    ///
    /// Returns AlreadyExists naming `username` or `email` when a live user
    /// already holds it.
    pub async fn create(&self, ctx: &mut DbContext, user: &NewUser) -> Result<User, Error> {
        let mut conn = ctx.connection().await?;
        let row = diesel::insert_into(users::table)
            .values(NewUserRow {
                username: &user.username,
                email: &user.email,
                pass_hash: &user.password_hash,
                role: user.role.as_str(),
            })
            .returning(UserRow::as_returning())
            .get_result::<UserRow>(&mut *conn)
            .await
            .map_err(|err| {
                if is_unique_violation(&err, LIVE_USERNAME_INDEX) {
                    Error::already_exists(SUBJECT, "username", &user.username)
                } else if is_unique_violation(&err, LIVE_EMAIL_INDEX) {
                    Error::already_exists(SUBJECT, "email", &user.email)
                } else {
                    map_diesel_error(err, "insert user")
                }
            })?;
        User::try_from(row)
    }

    /// Fetch a live user by id.
    ///
    /// # Errors
    ///
    /// Returns NotFound when the user is missing or deleted.
    pub async fn get_by_id(&self, ctx: &mut DbContext, id: UserId) -> Result<User, Error> {
        let mut conn = ctx.connection().await?;
        let row = users::table
            .find(id.get())
            .filter(users::deleted_at.is_null())
            .select(UserRow::as_select())
            .first::<UserRow>(&mut *conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "load user"))?
            .ok_or_else(|| Error::not_found(SUBJECT, "id", id))?;
        User::try_from(row)
    }

    /// Fetch a live user by username.
    ///
    /// # Errors
    ///
    /// Returns NotFound when no live user has that username.
    pub async fn get_by_username(&self, ctx: &mut DbContext, username: &str) -> Result<User, Error> {
        let mut conn = ctx.connection().await?;
        let row = users::table
            .filter(users::username.eq(username))
            .filter(users::deleted_at.is_null())
            .select(UserRow::as_select())
            .first::<UserRow>(&mut *conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "load user by username"))?
            .ok_or_else(|| Error::not_found(SUBJECT, "username", username))?;
        User::try_from(row)
    }

    /// Set or clear a live user's bio.
    ///
    /// # Errors
    ///
    /// Returns NotFound when the user is missing or deleted.
    pub async fn update_bio(&self, ctx: &mut DbContext, id: UserId, bio: Option<&str>) -> Result<User, Error> {
        let mut conn = ctx.connection().await?;
        let row = diesel::update(
            users::table
                .filter(users::id.eq(id.get()))
                .filter(users::deleted_at.is_null()),
        )
        .set(users::bio.eq(bio))
        .returning(UserRow::as_returning())
        .get_result::<UserRow>(&mut *conn)
        .await
        .optional()
        .map_err(|err| map_diesel_error(err, "update user bio"))?
        .ok_or_else(|| Error::not_found(SUBJECT, "id", id))?;
        User::try_from(row)
    }

    /// Change a live user's role.
    ///
    /// # Errors
    ///
    /// Returns NotFound when the user is missing or deleted.
    pub async fn set_role(&self, ctx: &mut DbContext, id: UserId, role: Role) -> Result<User, Error> {
        let mut conn = ctx.connection().await?;
        let row = diesel::update(
            users::table
                .filter(users::id.eq(id.get()))
                .filter(users::deleted_at.is_null()),
        )
        .set(users::role.eq(role.as_str()))
        .returning(UserRow::as_returning())
        .get_result::<UserRow>(&mut *conn)
        .await
        .optional()
        .map_err(|err| map_diesel_error(err, "set user role"))?
        .ok_or_else(|| Error::not_found(SUBJECT, "id", id))?;
        User::try_from(row)
    }

    /// Soft-delete a user, freeing the username and email for reuse.
    ///
    /// # Errors
    ///
    /// Returns NotFound when the user is missing or already deleted.
    pub async fn delete(&self, ctx: &mut DbContext, id: UserId) -> Result<(), Error> {
        let mut conn = ctx.connection().await?;
        let deleted = diesel::update(
            users::table
                .filter(users::id.eq(id.get()))
                .filter(users::deleted_at.is_null()),
        )
        .set(users::deleted_at.eq(Some(chrono::Utc::now())))
        .execute(&mut *conn)
        .await
        .map_err(|err| map_diesel_error(err, "delete user"))?;
        if deleted == 0 {
            return Err(Error::not_found(SUBJECT, "id", id));
        }
        Ok(())
    }
}
