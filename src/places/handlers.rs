use axum::{
    extract::{Path, Query, State},
    http::{header::LOCATION, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{CategoryQuery, ItemsResponse, NearbyQuery, PlaceInput},
    geo::{haversine_km, parse_gps},
    repo,
    repo_types::Place,
};
use crate::{
    auth::{dto::MessageResponse, guard::ensure_owner, AuthUser},
    error::AppError,
    state::AppState,
    store::ResourceKind,
};

pub fn browse_routes() -> Router<AppState> {
    Router::new()
        .route("/places", get(list_places))
        .route("/places/nearby", get(nearby_places))
        .route("/places/:id", get(get_place))
}

pub fn owned_routes() -> Router<AppState> {
    Router::new()
        .route("/my-places", get(list_my_places).post(create_my_place))
        .route(
            "/my-places/:id",
            get(get_my_place).put(edit_my_place).delete(delete_my_place),
        )
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_places(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(q): Query<CategoryQuery>,
) -> Result<Json<ItemsResponse<Place>>, AppError> {
    let items = repo::list_catalogue(&state.db, q.category).await?;
    Ok(Json(ItemsResponse { items }))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn nearby_places(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(q): Query<NearbyQuery>,
) -> Result<Json<ItemsResponse<Place>>, AppError> {
    let origin = parse_gps(&q.gps).ok_or_else(|| AppError::bad_request("gps must be \"lat, lon\""))?;
    if !q.radius_km.is_finite() || q.radius_km <= 0.0 {
        return Err(AppError::bad_request("radius_km must be positive"));
    }

    let mut within: Vec<(f64, Place)> = repo::list_catalogue(&state.db, None)
        .await?
        .into_iter()
        .filter_map(|p| {
            let d = haversine_km(origin, parse_gps(&p.gps)?);
            (d <= q.radius_km).then_some((d, p))
        })
        .collect();
    within.sort_by(|a, b| a.0.total_cmp(&b.0));

    Ok(Json(ItemsResponse {
        items: within.into_iter().map(|(_, p)| p).collect(),
    }))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_place(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Place>, AppError> {
    repo::find_visible(&state.db, id, user.id)
        .await?
        .map(Json)
        .ok_or_else(AppError::resource_not_found)
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_my_places(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<ItemsResponse<Place>>, AppError> {
    let items = repo::list_owned(&state.db, user.id).await?;
    Ok(Json(ItemsResponse { items }))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn create_my_place(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<PlaceInput>,
) -> Result<(StatusCode, [(axum::http::HeaderName, String); 1], Json<Place>), AppError> {
    payload.validate()?;
    let place = repo::insert_owned(&state.db, user.id, &payload).await?;
    info!(place_id = %place.id, "place created");
    Ok((
        StatusCode::CREATED,
        [(LOCATION, format!("/api/my-places/{}", place.id))],
        Json(place),
    ))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_my_place(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Place>, AppError> {
    ensure_owner(state.store.as_ref(), ResourceKind::Place, id, user.id).await?;
    repo::find_owned(&state.db, id, user.id)
        .await?
        .map(Json)
        .ok_or_else(AppError::resource_not_found)
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn edit_my_place(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<PlaceInput>,
) -> Result<Json<Place>, AppError> {
    ensure_owner(state.store.as_ref(), ResourceKind::Place, id, user.id).await?;
    payload.validate()?;
    let place = repo::update_owned(&state.db, id, user.id, &payload)
        .await?
        .ok_or_else(AppError::resource_not_found)?;
    info!(place_id = %place.id, "place edited");
    Ok(Json(place))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_my_place(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    ensure_owner(state.store.as_ref(), ResourceKind::Place, id, user.id).await?;
    if !repo::delete_owned(&state.db, id, user.id).await? {
        return Err(AppError::resource_not_found());
    }
    info!(place_id = %id, "place deleted");
    Ok(Json(MessageResponse::new("Place deleted")))
}
