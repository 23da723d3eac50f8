use serde::{Deserialize, Serialize};

use super::{geo::parse_gps, repo_types::Category};
use crate::error::AppError;

const MAX_TEXT_LEN: usize = 255;

#[derive(Debug, Serialize)]
pub struct ItemsResponse<T> {
    pub items: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryQuery {
    pub category: Option<Category>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NearbyQuery {
    pub gps: String,
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
}
fn default_radius_km() -> f64 { 2.0 }

/// Body for creating or replacing a user-owned place.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlaceInput {
    pub name: String,
    pub gps: String,
    #[serde(default)]
    pub image_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub meals: bool,
    #[serde(default, alias = "accomodation")]
    pub accommodation: bool,
    #[serde(default)]
    pub sport: bool,
    #[serde(default)]
    pub hiking: bool,
    #[serde(default)]
    pub fun: bool,
    #[serde(default)]
    pub events: bool,
}

impl PlaceInput {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::bad_request("name is required"));
        }
        if parse_gps(&self.gps).is_none() {
            return Err(AppError::bad_request("gps must be \"lat, lon\""));
        }
        let fields = [
            ("name", Some(&self.name)),
            ("image_name", self.image_name.as_ref()),
            ("contact", self.contact.as_ref()),
            ("address", self.address.as_ref()),
        ];
        for (field, value) in fields {
            if value.is_some_and(|v| v.chars().count() > MAX_TEXT_LEN) {
                return Err(AppError::bad_request(format!(
                    "{field} must be at most {MAX_TEXT_LEN} characters"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> PlaceInput {
        serde_json::from_value(serde_json::json!({
            "name": "Sheraton",
            "gps": "48.14061834357159, 17.12233203794686",
            "meals": true,
            "accomodation": true
        }))
        .unwrap()
    }

    #[test]
    fn accepts_minimal_body_with_legacy_spelling() {
        let p = input();
        assert!(p.accommodation);
        assert!(!p.sport);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn rejects_unknown_fields() {
        let res = serde_json::from_value::<PlaceInput>(serde_json::json!({
            "name": "x", "gps": "1, 2", "owner_id": "someone"
        }));
        assert!(res.is_err());
    }

    #[test]
    fn rejects_bad_gps() {
        let mut p = input();
        p.gps = "somewhere".into();
        assert!(p.validate().is_err());
    }

    #[test]
    fn nearby_radius_defaults_to_two_km() {
        let q: NearbyQuery = serde_json::from_value(serde_json::json!({ "gps": "1, 2" })).unwrap();
        assert_eq!(q.radius_km, 2.0);
    }
}
