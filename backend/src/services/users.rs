//! User account commands and queries.
//!
//! Password hashing happens before these calls; only the hash is stored.

use tracing::info;

use crate::domain::{Error, NewUser, Role, User, UserId};
use crate::outbound::persistence::{DbContext, DieselUserRepository};

/// User service.
#[derive(Debug, Clone, Default)]
pub struct UserService {
    users: DieselUserRepository,
}

impl UserService {
    /// Create the service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account.
    ///
    /// # Errors
    ///
    /// Returns BadRequest for invalid input and AlreadyExists when the
    /// username or email is taken by a live user.
    pub async fn register(&self, ctx: &mut DbContext, user: &NewUser) -> Result<User, Error> {
        user.validate()?;
        let created = self.users.create(ctx, user).await?;
        info!(user_id = %created.id, role = %created.role, "user registered");
        Ok(created)
    }

    /// Fetch a user by id.
    ///
    /// # Errors
    ///
    /// Returns NotFound when the user is missing or deleted.
    pub async fn get(&self, ctx: &mut DbContext, id: UserId) -> Result<User, Error> {
        self.users.get_by_id(ctx, id).await
    }

    /// Fetch a user by username.
    ///
    /// # Errors
    ///
    /// Returns NotFound when no live user has the username.
    pub async fn get_by_username(&self, ctx: &mut DbContext, username: &str) -> Result<User, Error> {
        self.users.get_by_username(ctx, username.trim()).await
    }

    /// Set or clear a user's bio. Blank text clears it.
    ///
    /// # Errors
    ///
    /// Returns NotFound when the user is missing or deleted.
    pub async fn update_bio(&self, ctx: &mut DbContext, id: UserId, bio: Option<&str>) -> Result<User, Error> {
        let bio = bio.map(str::trim).filter(|text| !text.is_empty());
        let user = self.users.update_bio(ctx, id, bio).await?;
        info!(user_id = %id, "user bio updated");
        Ok(user)
    }

    /// Change a user's role.
    ///
    /// # Errors
    ///
    /// Returns NotFound when the user is missing or deleted.
    pub async fn set_role(&self, ctx: &mut DbContext, id: UserId, role: Role) -> Result<User, Error> {
        let user = self.users.set_role(ctx, id, role).await?;
        info!(user_id = %id, %role, "user role changed");
        Ok(user)
    }

    /// Soft-delete a user.
    ///
    /// # Errors
    ///
    /// Returns NotFound when the user is missing or already deleted.
    pub async fn delete(&self, ctx: &mut DbContext, id: UserId) -> Result<(), Error> {
        self.users.delete(ctx, id).await?;
        info!(user_id = %id, "user deleted");
        Ok(())
    }
}
