use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{Note, UpsertNoteRequest},
    repo,
};
use crate::{
    auth::{dto::MessageResponse, guard::ensure_owner, AuthUser},
    error::AppError,
    places,
    state::AppState,
    store::ResourceKind,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notes", put(upsert_note))
        .route("/notes/:id", get(get_note).delete(delete_note))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id, place_id = %payload.place_id))]
pub async fn upsert_note(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<UpsertNoteRequest>,
) -> Result<Json<Note>, AppError> {
    let body = payload.body()?;
    if places::find_visible(&state.db, payload.place_id, user.id)
        .await?
        .is_none()
    {
        return Err(AppError::resource_not_found());
    }
    let note = repo::upsert(&state.db, user.id, payload.place_id, body).await?;
    info!(note_id = %note.id, "note saved");
    Ok(Json(note))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_note(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Note>, AppError> {
    ensure_owner(state.store.as_ref(), ResourceKind::Note, id, user.id).await?;
    repo::find(&state.db, id, user.id)
        .await?
        .map(Json)
        .ok_or_else(AppError::resource_not_found)
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_note(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    ensure_owner(state.store.as_ref(), ResourceKind::Note, id, user.id).await?;
    if !repo::delete(&state.db, id, user.id).await? {
        return Err(AppError::resource_not_found());
    }
    info!(note_id = %id, "note deleted");
    Ok(Json(MessageResponse::new("Note deleted")))
}
