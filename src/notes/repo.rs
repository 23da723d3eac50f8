use sqlx::PgPool;
use uuid::Uuid;

use super::dto::Note;

/// One note per user and place; a second write replaces the body and keeps the id.
pub async fn upsert(db: &PgPool, user_id: Uuid, place_id: Uuid, body: &str) -> sqlx::Result<Note> {
    sqlx::query_as::<_, Note>(
        r#"
        INSERT INTO notes (id, user_id, place_id, body)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT ON CONSTRAINT notes_user_place_key
        DO UPDATE SET body = EXCLUDED.body, updated_at = now()
        RETURNING id, place_id, body, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(place_id)
    .bind(body)
    .fetch_one(db)
    .await
}

pub async fn find(db: &PgPool, id: Uuid, user_id: Uuid) -> sqlx::Result<Option<Note>> {
    sqlx::query_as::<_, Note>(
        "SELECT id, place_id, body, updated_at FROM notes WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await
}

pub async fn delete(db: &PgPool, id: Uuid, user_id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::{insert_place, insert_user, test_pool};

    #[tokio::test]
    #[ignore = "Requires database setup"]
    async fn upsert_keeps_the_note_id_and_replaces_the_body() {
        let db = test_pool().await;
        let user = insert_user(&db).await;
        let place = insert_place(&db, None).await;

        let first = upsert(&db, user, place, "quiet on mondays").await.unwrap();
        let second = upsert(&db, user, place, "closed on mondays").await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.body, "closed on mondays");
        assert!(second.updated_at >= first.updated_at);

        let other = insert_user(&db).await;
        let theirs = upsert(&db, other, place, "mine").await.unwrap();
        assert_ne!(theirs.id, first.id);
        assert!(find(&db, first.id, other).await.unwrap().is_none());

        assert!(delete(&db, first.id, user).await.unwrap());
        assert!(find(&db, first.id, user).await.unwrap().is_none());
    }
}
