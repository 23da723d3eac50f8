use tracing::debug;
use uuid::Uuid;

use crate::{
    error::AppError,
    store::{AccountStore, ResourceKind},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    Authorized,
    Forbidden,
    NotFound,
}

impl Ownership {
    pub fn evaluate(owner: Option<Uuid>, caller: Uuid) -> Self {
        match owner {
            Some(owner) if owner == caller => Ownership::Authorized,
            Some(_) => Ownership::Forbidden,
            None => Ownership::NotFound,
        }
    }
}

/// Lets the request through only if `caller` owns the resource. A missing
/// resource and someone else's resource produce the same rejection.
pub async fn ensure_owner(
    store: &dyn AccountStore,
    kind: ResourceKind,
    id: Uuid,
    caller: Uuid,
) -> Result<(), AppError> {
    let owner = store.owner_of(kind, id).await?;
    match Ownership::evaluate(owner, caller) {
        Ownership::Authorized => Ok(()),
        outcome => {
            debug!(%kind, resource_id = %id, user_id = %caller, ?outcome, "ownership check refused");
            Err(AppError::resource_not_found())
        }
    }
}
