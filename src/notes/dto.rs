use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;

pub const MAX_NOTE_LEN: usize = 2000;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpsertNoteRequest {
    pub place_id: Uuid,
    pub note: String,
}

impl UpsertNoteRequest {
    /// Trimmed body, or a 400 if it is blank or too long.
    pub fn body(&self) -> Result<&str, AppError> {
        let body = self.note.trim();
        if body.is_empty() {
            return Err(AppError::bad_request("note must not be empty"));
        }
        if body.chars().count() > MAX_NOTE_LEN {
            return Err(AppError::bad_request(format!(
                "note must be at most {MAX_NOTE_LEN} characters"
            )));
        }
        Ok(body)
    }
}

#[derive(Debug, Serialize, FromRow)]
pub struct Note {
    pub id: Uuid,
    pub place_id: Uuid,
    pub body: String,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}
