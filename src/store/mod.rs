//! Account storage seam used by the authorization core.
//!
//! Handlers never talk to the pool for account data directly; they go through
//! [`AccountStore`], which `PgStore` implements over a leased connection and
//! the test suite implements in memory.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, User};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

/// Column protected by a UNIQUE constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
    Favourite,
    Note,
}

impl UniqueField {
    fn from_constraint(name: &str) -> Option<Self> {
        match name {
            "users_username_key" => Some(Self::Username),
            "users_email_key" => Some(Self::Email),
            "favourites_user_place_key" => Some(Self::Favourite),
            "notes_user_place_key" => Some(Self::Note),
            _ => None,
        }
    }
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Username => "username",
            Self::Email => "email",
            Self::Favourite => "favourite",
            Self::Note => "note",
        })
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated on {0}")]
    Conflict(UniqueField),

    /// Pool exhausted or connection lost; the caller may retry with a new request.
    #[error("storage unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),

    #[error("storage error: {0}")]
    Backend(#[source] sqlx::Error),
}

const UNIQUE_VIOLATION: &str = "23505";

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
                if let Some(field) = db.constraint().and_then(UniqueField::from_constraint) {
                    return StoreError::Conflict(field);
                }
            }
        }
        match e {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::WorkerCrashed => StoreError::Unavailable(e),
            other => StoreError::Backend(other),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum UserLookup<'a> {
    Id(Uuid),
    Username(&'a str),
    Email(&'a str),
}

/// Entities whose rows carry the id of the user that owns them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Place,
    Favourite,
    Note,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Place => "place",
            Self::Favourite => "favourite",
            Self::Note => "note",
        })
    }
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_user(&self, lookup: UserLookup<'_>) -> Result<Option<User>, StoreError>;

    /// Inserts atomically; a duplicate username or email yields
    /// [`StoreError::Conflict`] and leaves the table untouched.
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn update_user_password(&self, id: Uuid, password_hash: &str) -> Result<bool, StoreError>;

    async fn update_user_email(&self, id: Uuid, email: &str) -> Result<bool, StoreError>;

    async fn update_username(&self, id: Uuid, username: &str) -> Result<bool, StoreError>;

    async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Owner of a user-scoped resource; `None` when the row is absent or
    /// belongs to nobody (catalogue places).
    async fn owner_of(&self, kind: ResourceKind, id: Uuid) -> Result<Option<Uuid>, StoreError>;
}
