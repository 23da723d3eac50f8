use sqlx::PgPool;
use uuid::Uuid;

use super::{
    dto::PlaceInput,
    repo_types::{Category, Place},
};

const PLACE_COLUMNS: &str = "id, owner_id, name, image_name, description, contact, address, gps, \
                             meals, accommodation, sport, hiking, fun, events, created_at";

/// Catalogue places, optionally narrowed to one category.
pub async fn list_catalogue(db: &PgPool, category: Option<Category>) -> sqlx::Result<Vec<Place>> {
    let filter = category
        .map(|c| format!(" AND {} = TRUE", c.column()))
        .unwrap_or_default();
    let sql = format!("SELECT {PLACE_COLUMNS} FROM places WHERE owner_id IS NULL{filter} ORDER BY name");
    sqlx::query_as::<_, Place>(&sql).fetch_all(db).await
}

/// A place the user may read: any catalogue place, or one they own.
pub async fn find_visible(db: &PgPool, id: Uuid, user_id: Uuid) -> sqlx::Result<Option<Place>> {
    let sql = format!(
        "SELECT {PLACE_COLUMNS} FROM places WHERE id = $1 AND (owner_id IS NULL OR owner_id = $2)"
    );
    sqlx::query_as::<_, Place>(&sql)
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await
}

pub async fn list_owned(db: &PgPool, owner_id: Uuid) -> sqlx::Result<Vec<Place>> {
    let sql = format!("SELECT {PLACE_COLUMNS} FROM places WHERE owner_id = $1 ORDER BY created_at DESC");
    sqlx::query_as::<_, Place>(&sql)
        .bind(owner_id)
        .fetch_all(db)
        .await
}

pub async fn find_owned(db: &PgPool, id: Uuid, owner_id: Uuid) -> sqlx::Result<Option<Place>> {
    let sql = format!("SELECT {PLACE_COLUMNS} FROM places WHERE id = $1 AND owner_id = $2");
    sqlx::query_as::<_, Place>(&sql)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(db)
        .await
}

pub async fn insert_owned(db: &PgPool, owner_id: Uuid, input: &PlaceInput) -> sqlx::Result<Place> {
    let sql = format!(
        r#"
        INSERT INTO places (id, owner_id, name, image_name, description, contact, address, gps,
                            meals, accommodation, sport, hiking, fun, events)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        RETURNING {PLACE_COLUMNS}
        "#
    );
    sqlx::query_as::<_, Place>(&sql)
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(input.name.trim())
        .bind(&input.image_name)
        .bind(&input.description)
        .bind(&input.contact)
        .bind(&input.address)
        .bind(input.gps.trim())
        .bind(input.meals)
        .bind(input.accommodation)
        .bind(input.sport)
        .bind(input.hiking)
        .bind(input.fun)
        .bind(input.events)
        .fetch_one(db)
        .await
}

/// Replaces every editable column. The owner predicate keeps the write
/// scoped even if called without a prior ownership check.
pub async fn update_owned(
    db: &PgPool,
    id: Uuid,
    owner_id: Uuid,
    input: &PlaceInput,
) -> sqlx::Result<Option<Place>> {
    let sql = format!(
        r#"
        UPDATE places
           SET name = $3, image_name = $4, description = $5, contact = $6, address = $7,
               gps = $8, meals = $9, accommodation = $10, sport = $11, hiking = $12,
               fun = $13, events = $14
         WHERE id = $1 AND owner_id = $2
        RETURNING {PLACE_COLUMNS}
        "#
    );
    sqlx::query_as::<_, Place>(&sql)
        .bind(id)
        .bind(owner_id)
        .bind(input.name.trim())
        .bind(&input.image_name)
        .bind(&input.description)
        .bind(&input.contact)
        .bind(&input.address)
        .bind(input.gps.trim())
        .bind(input.meals)
        .bind(input.accommodation)
        .bind(input.sport)
        .bind(input.hiking)
        .bind(input.fun)
        .bind(input.events)
        .fetch_optional(db)
        .await
}

pub async fn delete_owned(db: &PgPool, id: Uuid, owner_id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM places WHERE id = $1 AND owner_id = $2")
        .bind(id)
        .bind(owner_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
