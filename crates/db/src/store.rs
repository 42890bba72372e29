//! Principal store seams and their Postgres implementations.
//!
//! Handlers only see [`AdminStore`] and [`UserStore`]; the two kinds never
//! share a table, so a lookup in one store can never resolve an id from the
//! other.

use async_trait::async_trait;
use happyhome_core::types::DbId;

use crate::models::admin::{Admin, CreateAdmin, UpdateAdmin};
use crate::models::user::{CreateUser, UpdateUser, User};
use crate::repositories::{AdminRepo, UserRepo};
use crate::DbPool;

/// PostgreSQL `unique_violation`.
const PG_UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique field (currently only `email`) already holds this value.
    #[error("Duplicate value for unique field '{field}'")]
    Duplicate { field: &'static str },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Map unique-constraint violations on `*_email` constraints to
    /// [`StoreError::Duplicate`]; everything else stays a database error.
    fn classify(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(PG_UNIQUE_VIOLATION)
                && db_err.constraint().is_some_and(|c| c.ends_with("_email"))
            {
                return Self::Duplicate { field: "email" };
            }
        }
        Self::Database(err)
    }
}

#[async_trait]
pub trait AdminStore: Send + Sync {
    async fn find_by_id(&self, id: DbId) -> Result<Option<Admin>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, StoreError>;

    async fn create(&self, input: &CreateAdmin) -> Result<Admin, StoreError>;

    /// Returns `None` if the admin no longer exists.
    async fn update(&self, id: DbId, input: &UpdateAdmin) -> Result<Option<Admin>, StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: DbId) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn create(&self, input: &CreateUser) -> Result<User, StoreError>;

    /// Returns `None` if the user no longer exists.
    async fn update(&self, id: DbId, input: &UpdateUser) -> Result<Option<User>, StoreError>;

    /// Newest first.
    async fn list(&self) -> Result<Vec<User>, StoreError>;

    /// Delete the user together with their reviews and wishlists.
    /// Returns `false` if no such user exists.
    async fn delete(&self, id: DbId) -> Result<bool, StoreError>;

    /// Confirm the backing storage is reachable.
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Postgres
// ---------------------------------------------------------------------------

/// [`AdminStore`] over the `admins` table.
#[derive(Clone)]
pub struct PgAdminStore {
    pool: DbPool,
}

impl PgAdminStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminStore for PgAdminStore {
    async fn find_by_id(&self, id: DbId) -> Result<Option<Admin>, StoreError> {
        Ok(AdminRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, StoreError> {
        Ok(AdminRepo::find_by_email(&self.pool, email).await?)
    }

    async fn create(&self, input: &CreateAdmin) -> Result<Admin, StoreError> {
        AdminRepo::create(&self.pool, input)
            .await
            .map_err(StoreError::classify)
    }

    async fn update(&self, id: DbId, input: &UpdateAdmin) -> Result<Option<Admin>, StoreError> {
        AdminRepo::update(&self.pool, id, input)
            .await
            .map_err(StoreError::classify)
    }
}

/// [`UserStore`] over the `users` table.
#[derive(Clone)]
pub struct PgUserStore {
    pool: DbPool,
}

impl PgUserStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: DbId) -> Result<Option<User>, StoreError> {
        Ok(UserRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(UserRepo::find_by_email(&self.pool, email).await?)
    }

    async fn create(&self, input: &CreateUser) -> Result<User, StoreError> {
        UserRepo::create(&self.pool, input)
            .await
            .map_err(StoreError::classify)
    }

    async fn update(&self, id: DbId, input: &UpdateUser) -> Result<Option<User>, StoreError> {
        UserRepo::update(&self.pool, id, input)
            .await
            .map_err(StoreError::classify)
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(UserRepo::list(&self.pool).await?)
    }

    async fn delete(&self, id: DbId) -> Result<bool, StoreError> {
        let deleted = UserRepo::delete(&self.pool, id).await?;
        if deleted {
            tracing::info!(user_id = %id, "User deleted with reviews and wishlists");
        }
        Ok(deleted)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(crate::health_check(&self.pool).await?)
    }
}
