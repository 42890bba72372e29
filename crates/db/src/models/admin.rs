//! Admin entity model and DTOs.

use happyhome_core::principal::{PrincipalInfo, PrincipalKind};
use happyhome_core::roles::ROLE_ADMIN;
use happyhome_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Full row from the `admins` table.
///
/// Contains the password hash -- convert with [`Admin::info`] before
/// returning it to a client.
#[derive(Debug, Clone, FromRow)]
pub struct Admin {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Admin {
    pub fn info(&self) -> PrincipalInfo {
        PrincipalInfo {
            id: self.id,
            kind: PrincipalKind::Admin,
            name: self.name.clone(),
            email: self.email.clone(),
            role: ROLE_ADMIN.to_string(),
            phone: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateAdmin {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Only non-`None` fields are applied.
#[derive(Debug, Clone, Default)]
pub struct UpdateAdmin {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}
