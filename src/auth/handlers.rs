use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{
            EditProfileRequest, ForgottenPasswordRequest, LoginRequest, MessageResponse,
            PublicUser, SignupRequest, TokenResponse,
        },
        extractors::AuthUser,
        services,
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/forgotten-password", put(forgotten_password))
}

pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/profile", patch(edit_profile))
        .route("/account", delete(delete_account))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<PublicUser>), AppError> {
    let user = services::signup(state.store.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let jwt_token = services::login(state.store.as_ref(), &state.jwt, payload).await?;
    Ok(Json(TokenResponse {
        jwt_token,
        token_type: "Bearer",
        expires_in: state.jwt.ttl.as_secs(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn forgotten_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgottenPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    services::forgotten_password(state.store.as_ref(), payload).await?;
    Ok(Json(MessageResponse::new("Password updated successfully")))
}

#[instrument(skip(user), fields(user_id = %user.id))]
pub async fn get_me(AuthUser(user): AuthUser) -> Json<PublicUser> {
    Json(user.into())
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn edit_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<EditProfileRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let change = services::edit_profile(state.store.as_ref(), &user, payload).await?;
    Ok(Json(MessageResponse::new(change.message())))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_account(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<MessageResponse>, AppError> {
    services::delete_account(state.store.as_ref(), &user).await?;
    Ok(Json(MessageResponse::new("Account deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_serialization_omits_hash() {
        let user = crate::auth::repo_types::User {
            id: uuid::Uuid::new_v4(),
            username: "John".into(),
            email: "test@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            created_at: time::OffsetDateTime::now_utc(),
        };
        let raw = serde_json::to_string(&user).unwrap();
        assert!(!raw.contains("argon2"));

        let json = serde_json::to_string(&PublicUser::from(user)).unwrap();
        assert!(json.contains("test@example.com"));
        assert!(json.contains("John"));
    }
}
