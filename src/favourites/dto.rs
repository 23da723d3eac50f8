use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::places::repo_types::Place;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddFavouriteRequest {
    pub place_id: Uuid,
}

/// A favourite joined with the place it points at.
#[derive(Debug, Serialize, FromRow)]
pub struct FavouritePlace {
    pub favourite_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub favourited_at: OffsetDateTime,
    #[sqlx(flatten)]
    pub place: Place,
}

#[derive(Debug, Serialize, FromRow)]
pub struct Favourite {
    pub id: Uuid,
    pub place_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
