use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{AccountStore, ResourceKind, StoreError, UniqueField, UserLookup};
use crate::auth::repo_types::{NewUser, User};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    owners: HashMap<(ResourceKind, Uuid), Uuid>,
}

/// In-memory store with the same uniqueness and cascade rules as the schema.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.inner.lock().unwrap().users.len()
    }

    pub fn add_resource(&self, kind: ResourceKind, owner: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        self.inner.lock().unwrap().owners.insert((kind, id), owner);
        id
    }

    fn taken(inner: &Inner, skip: Option<Uuid>, field: UniqueField, value: &str) -> bool {
        inner.users.values().any(|u| {
            Some(u.id) != skip
                && match field {
                    UniqueField::Username => u.username == value,
                    UniqueField::Email => u.email == value,
                    _ => false,
                }
        })
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_user(&self, lookup: UserLookup<'_>) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let user = match lookup {
            UserLookup::Id(id) => inner.users.get(&id).cloned(),
            UserLookup::Username(name) => inner.users.values().find(|u| u.username == name).cloned(),
            UserLookup::Email(email) => inner.users.values().find(|u| u.email == email).cloned(),
        };
        Ok(user)
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if Self::taken(&inner, None, UniqueField::Username, &user.username) {
            return Err(StoreError::Conflict(UniqueField::Username));
        }
        if Self::taken(&inner, None, UniqueField::Email, &user.email) {
            return Err(StoreError::Conflict(UniqueField::Email));
        }
        let row = User {
            id: user.id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        inner.users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_user_password(&self, id: Uuid, password_hash: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(match inner.users.get_mut(&id) {
            Some(u) => {
                u.password_hash = password_hash.to_string();
                true
            }
            None => false,
        })
    }

    async fn update_user_email(&self, id: Uuid, email: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if Self::taken(&inner, Some(id), UniqueField::Email, email) {
            return Err(StoreError::Conflict(UniqueField::Email));
        }
        Ok(match inner.users.get_mut(&id) {
            Some(u) => {
                u.email = email.to_string();
                true
            }
            None => false,
        })
    }

    async fn update_username(&self, id: Uuid, username: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if Self::taken(&inner, Some(id), UniqueField::Username, username) {
            return Err(StoreError::Conflict(UniqueField::Username));
        }
        Ok(match inner.users.get_mut(&id) {
            Some(u) => {
                u.username = username.to_string();
                true
            }
            None => false,
        })
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let removed = inner.users.remove(&id).is_some();
        inner.owners.retain(|_, owner| *owner != id);
        Ok(removed)
    }

    async fn owner_of(&self, kind: ResourceKind, id: Uuid) -> Result<Option<Uuid>, StoreError> {
        Ok(self.inner.lock().unwrap().owners.get(&(kind, id)).copied())
    }
}
