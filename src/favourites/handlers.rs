use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{AddFavouriteRequest, Favourite, FavouritePlace},
    repo,
};
use crate::{
    auth::{dto::MessageResponse, guard::ensure_owner, AuthUser},
    error::AppError,
    places::{self, dto::ItemsResponse},
    state::AppState,
    store::ResourceKind,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/favourites", get(list_favourites).post(add_favourite))
        .route("/favourites/:id", delete(remove_favourite))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_favourites(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<ItemsResponse<FavouritePlace>>, AppError> {
    let items = repo::list_for_user(&state.db, user.id).await?;
    Ok(Json(ItemsResponse { items }))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn add_favourite(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<AddFavouriteRequest>,
) -> Result<(StatusCode, Json<Favourite>), AppError> {
    // Someone else's private place must look the same as a missing one.
    if places::find_visible(&state.db, payload.place_id, user.id)
        .await?
        .is_none()
    {
        return Err(AppError::resource_not_found());
    }
    let favourite = repo::insert(&state.db, user.id, payload.place_id).await?;
    info!(favourite_id = %favourite.id, place_id = %favourite.place_id, "favourite added");
    Ok((StatusCode::CREATED, Json(favourite)))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove_favourite(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    ensure_owner(state.store.as_ref(), ResourceKind::Favourite, id, user.id).await?;
    if !repo::delete(&state.db, id, user.id).await? {
        return Err(AppError::resource_not_found());
    }
    info!(favourite_id = %id, "favourite removed");
    Ok(Json(MessageResponse::new("Favourite removed")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn favourite_place_flattens_place_fields() {
        let now = time::OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let fav = FavouritePlace {
            favourite_id: Uuid::nil(),
            favourited_at: now,
            place: crate::places::repo_types::Place {
                id: Uuid::nil(),
                owner_id: None,
                name: "Sheraton".into(),
                image_name: None,
                description: None,
                contact: None,
                address: None,
                gps: "48.1, 17.1".into(),
                meals: true,
                accommodation: true,
                sport: false,
                hiking: false,
                fun: false,
                events: false,
                created_at: now,
            },
        };
        let json = serde_json::to_value(&fav).unwrap();
        assert_eq!(json["place"]["name"], "Sheraton");
        assert_eq!(json["favourited_at"], "2023-11-14T22:13:20Z");
    }

    #[test]
    fn add_request_rejects_unknown_fields() {
        let res = serde_json::from_value::<AddFavouriteRequest>(serde_json::json!({
            "place_id": Uuid::nil(), "user_id": Uuid::nil()
        }));
        assert!(res.is_err());
    }
}
