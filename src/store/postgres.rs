use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{AccountStore, ResourceKind, StoreError, UserLookup};
use crate::auth::repo_types::{NewUser, User};

/// Postgres-backed [`AccountStore`]. Every call leases one connection from the
/// pool; the lease is returned when it drops, on success and error alike.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn find_user(&self, lookup: UserLookup<'_>) -> Result<Option<User>, StoreError> {
        let sql = match lookup {
            UserLookup::Id(_) => {
                "SELECT id, username, email, password_hash, created_at FROM users WHERE id = $1"
            }
            UserLookup::Username(_) => {
                "SELECT id, username, email, password_hash, created_at FROM users WHERE username = $1"
            }
            UserLookup::Email(_) => {
                "SELECT id, username, email, password_hash, created_at FROM users WHERE email = $1"
            }
        };
        let query = sqlx::query_as::<_, User>(sql);
        let query = match lookup {
            UserLookup::Id(id) => query.bind(id),
            UserLookup::Username(username) => query.bind(username),
            UserLookup::Email(email) => query.bind(email),
        };
        let mut conn = self.pool.acquire().await?;
        let user = query.fetch_optional(&mut *conn).await?;
        Ok(user)
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&mut *conn)
        .await?;
        debug!(user_id = %user.id, "user row inserted");
        Ok(user)
    }

    async fn update_user_password(&self, id: Uuid, password_hash: &str) -> Result<bool, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_user_email(&self, id: Uuid, email: &str) -> Result<bool, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query("UPDATE users SET email = $1 WHERE id = $2")
            .bind(email)
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_username(&self, id: Uuid, username: &str) -> Result<bool, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query("UPDATE users SET username = $1 WHERE id = $2")
            .bind(username)
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut conn = self.pool.acquire().await?;
        // favourites, notes and owned places go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn owner_of(&self, kind: ResourceKind, id: Uuid) -> Result<Option<Uuid>, StoreError> {
        let sql = match kind {
            ResourceKind::Place => "SELECT owner_id FROM places WHERE id = $1",
            ResourceKind::Favourite => "SELECT user_id FROM favourites WHERE id = $1",
            ResourceKind::Note => "SELECT user_id FROM notes WHERE id = $1",
        };
        let mut conn = self.pool.acquire().await?;
        let owner = sqlx::query_scalar::<_, Option<Uuid>>(sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(owner.flatten())
    }
}
