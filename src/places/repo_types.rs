use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Place row. `owner_id` is NULL for catalogue places.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Place {
    pub id: Uuid,
    pub owner_id: Option<Uuid>,
    pub name: String,
    pub image_name: Option<String>,
    pub description: Option<String>,
    pub contact: Option<String>,
    pub address: Option<String>,
    pub gps: String, // "lat, lon"
    pub meals: bool,
    pub accommodation: bool,
    pub sport: bool,
    pub hiking: bool,
    pub fun: bool,
    pub events: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Meals,
    #[serde(alias = "accomodation")]
    Accommodation,
    Sport,
    Hiking,
    Fun,
    Events,
}

impl Category {
    /// Boolean column backing the category. Only these fixed names are ever
    /// interpolated into SQL.
    pub fn column(self) -> &'static str {
        match self {
            Category::Meals => "meals",
            Category::Accommodation => "accommodation",
            Category::Sport => "sport",
            Category::Hiking => "hiking",
            Category::Fun => "fun",
            Category::Events => "events",
        }
    }
}
