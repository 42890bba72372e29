//! In-process principal stores.
//!
//! Same contract as the Postgres stores, including email uniqueness, so the
//! API can run its full request path without a database (integration tests,
//! local experiments).

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use happyhome_core::types::{new_id, DbId};
use tokio::sync::RwLock;

use crate::models::admin::{Admin, CreateAdmin, UpdateAdmin};
use crate::models::user::{CreateUser, UpdateUser, User};
use crate::store::{AdminStore, StoreError, UserStore};

#[derive(Debug, Default)]
pub struct MemoryAdminStore {
    admins: RwLock<HashMap<DbId, Admin>>,
}

impl MemoryAdminStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AdminStore for MemoryAdminStore {
    async fn find_by_id(&self, id: DbId) -> Result<Option<Admin>, StoreError> {
        Ok(self.admins.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, StoreError> {
        Ok(self
            .admins
            .read()
            .await
            .values()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn create(&self, input: &CreateAdmin) -> Result<Admin, StoreError> {
        let mut admins = self.admins.write().await;
        if admins.values().any(|a| a.email == input.email) {
            return Err(StoreError::Duplicate { field: "email" });
        }
        let now = Utc::now();
        let admin = Admin {
            id: new_id(),
            name: input.name.clone(),
            email: input.email.clone(),
            password_hash: input.password_hash.clone(),
            created_at: now,
            updated_at: now,
        };
        admins.insert(admin.id, admin.clone());
        Ok(admin)
    }

    async fn update(&self, id: DbId, input: &UpdateAdmin) -> Result<Option<Admin>, StoreError> {
        let mut admins = self.admins.write().await;
        if let Some(email) = &input.email {
            if admins.values().any(|a| a.id != id && &a.email == email) {
                return Err(StoreError::Duplicate { field: "email" });
            }
        }
        let Some(admin) = admins.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &input.name {
            admin.name.clone_from(name);
        }
        if let Some(email) = &input.email {
            admin.email.clone_from(email);
        }
        if let Some(hash) = &input.password_hash {
            admin.password_hash.clone_from(hash);
        }
        admin.updated_at = Utc::now();
        Ok(Some(admin.clone()))
    }
}

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<DbId, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: DbId) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(&self, input: &CreateUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == input.email) {
            return Err(StoreError::Duplicate { field: "email" });
        }
        let now = Utc::now();
        let user = User {
            id: new_id(),
            name: input.name.clone(),
            email: input.email.clone(),
            password_hash: input.password_hash.clone(),
            phone: input.phone.clone(),
            role: input.role.clone(),
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, id: DbId, input: &UpdateUser) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;
        if let Some(email) = &input.email {
            if users.values().any(|u| u.id != id && &u.email == email) {
                return Err(StoreError::Duplicate { field: "email" });
            }
        }
        let Some(user) = users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &input.name {
            user.name.clone_from(name);
        }
        if let Some(email) = &input.email {
            user.email.clone_from(email);
        }
        if let Some(phone) = &input.phone {
            user.phone = Some(phone.clone());
        }
        if let Some(hash) = &input.password_hash {
            user.password_hash.clone_from(hash);
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        // UUIDv7 ids break ties between rows created in the same instant.
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(users)
    }

    async fn delete(&self, id: DbId) -> Result<bool, StoreError> {
        Ok(self.users.write().await.remove(&id).is_some())
    }
}
