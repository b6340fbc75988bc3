//! User business logic - identity lookups and role checks.
//!
//! Authentication itself happens outside this crate; callers arrive here with a user id
//! that has already been resolved from their credentials.

use crate::{
    entities::{User, UserRole, user},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};

/// Creates a user account.
///
/// # Errors
/// Returns an error if the name or email is blank, or the insert fails (e.g. duplicate email).
pub async fn create_user(
    db: &DatabaseConnection,
    name: String,
    email: String,
    role: UserRole,
) -> Result<user::Model> {
    if name.trim().is_empty() || email.trim().is_empty() {
        return Err(Error::Validation {
            message: "User name and email cannot be empty".to_string(),
        });
    }

    user::ActiveModel {
        name: Set(name.trim().to_string()),
        email: Set(email.trim().to_lowercase()),
        role: Set(role),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Retrieves a user by id, returning None if absent.
pub async fn get_user_by_id<C>(db: &C, user_id: i64) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Retrieves a user by id, failing with [`Error::UserNotFound`] if absent.
pub async fn require_user<C>(db: &C, user_id: i64) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    get_user_by_id(db, user_id)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })
}

/// Retrieves a user and checks that they hold the admin role.
///
/// # Errors
/// [`Error::UserNotFound`] for unknown ids, [`Error::Forbidden`] for non-admins.
pub async fn require_admin<C>(db: &C, user_id: i64, action: &'static str) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    let user = require_user(db, user_id).await?;
    if user.is_admin() {
        Ok(user)
    } else {
        Err(Error::Forbidden { user_id, action })
    }
}
