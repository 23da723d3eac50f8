use sqlx::PgPool;
use uuid::Uuid;

use super::dto::{Favourite, FavouritePlace};

pub async fn list_for_user(db: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<FavouritePlace>> {
    sqlx::query_as::<_, FavouritePlace>(
        r#"
        SELECT f.id AS favourite_id, f.created_at AS favourited_at,
               p.id, p.owner_id, p.name, p.image_name, p.description, p.contact, p.address,
               p.gps, p.meals, p.accommodation, p.sport, p.hiking, p.fun, p.events, p.created_at
          FROM favourites f
          JOIN places p ON p.id = f.place_id
         WHERE f.user_id = $1
         ORDER BY f.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

/// Fails with `favourites_user_place_key` when the pair already exists.
pub async fn insert(db: &PgPool, user_id: Uuid, place_id: Uuid) -> sqlx::Result<Favourite> {
    sqlx::query_as::<_, Favourite>(
        r#"
        INSERT INTO favourites (id, user_id, place_id)
        VALUES ($1, $2, $3)
        RETURNING id, place_id, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(place_id)
    .fetch_one(db)
    .await
}

pub async fn delete(db: &PgPool, id: Uuid, user_id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM favourites WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
