use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::{debug, warn};

use super::repo_types::User;
use crate::{error::AppError, state::AppState, store::UserLookup};

/// Authenticated caller, resolved to an existing user row.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let auth = headers.get(AUTHORIZATION)?.to_str().ok()?;
    auth.strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Token first, storage second: a forged or expired token never costs a
/// database round-trip.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<User, AppError> {
    let token = bearer_token(headers).ok_or(AppError::Unauthenticated)?;

    let user_id = state.jwt.validate(token).map_err(|reason| {
        debug!(%reason, "bearer token rejected");
        AppError::Unauthenticated
    })?;

    match state.store.find_user(UserLookup::Id(user_id)).await? {
        Some(user) => Ok(user),
        None => {
            warn!(%user_id, "valid token for missing user");
            Err(AppError::user_not_found())
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(state, &parts.headers).await.map(AuthUser)
    }
}
