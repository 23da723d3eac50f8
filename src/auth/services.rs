use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::{EditProfileRequest, ForgottenPasswordRequest, LoginRequest, SignupRequest},
    jwt::JwtKeys,
    password::{hash_password_blocking, verify_credentials},
    repo_types::{NewUser, User},
};
use crate::{
    error::AppError,
    store::{AccountStore, UserLookup},
};

const MAX_FIELD_LEN: usize = 255;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,7}$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::bad_request(format!("{field} is required")));
    }
    if value.chars().count() > MAX_FIELD_LEN {
        return Err(AppError::bad_request(format!(
            "{field} must be at most {MAX_FIELD_LEN} characters"
        )));
    }
    Ok(())
}

fn check_new_password(password: &str, confirm_password: &str) -> Result<(), AppError> {
    require("password", password)?;
    if password != confirm_password {
        return Err(AppError::bad_request("Passwords do not match"));
    }
    Ok(())
}

fn check_email(email: &str) -> Result<(), AppError> {
    require("email", email)?;
    if !is_valid_email(email) {
        return Err(AppError::bad_request("Invalid email"));
    }
    Ok(())
}

async fn hash(password: &str) -> Result<String, AppError> {
    hash_password_blocking(password)
        .await
        .map_err(AppError::Internal)
}

/// Creates the account. Uniqueness is decided by the insert itself, so two
/// racing signups for the same username or email cannot both succeed.
pub async fn signup(store: &dyn AccountStore, req: SignupRequest) -> Result<User, AppError> {
    let username = req.username.trim().to_string();
    let email = normalize_email(&req.email);

    require("username", &username)?;
    check_email(&email)?;
    check_new_password(&req.password, &req.confirm_password)?;

    let new_user = NewUser {
        id: Uuid::new_v4(),
        username,
        email,
        password_hash: hash(&req.password).await?,
    };
    let user = store.insert_user(new_user).await.map_err(|e| {
        warn!(error = %e, "signup rejected");
        AppError::from(e)
    })?;

    info!(user_id = %user.id, "user registered");
    Ok(user)
}

/// Unknown username and wrong password fail identically.
pub async fn login(
    store: &dyn AccountStore,
    keys: &JwtKeys,
    req: LoginRequest,
) -> Result<String, AppError> {
    let username = req.username.trim();
    require("username", username)?;
    require("password", &req.password)?;

    let user = store.find_user(UserLookup::Username(username)).await?;
    let stored = user.as_ref().map(|u| u.password_hash.as_str());
    let verified = verify_credentials(&req.password, stored).await;
    let user = match user {
        Some(u) if verified => u,
        _ => {
            warn!("login rejected");
            return Err(AppError::InvalidCredentials);
        }
    };

    let token = keys.issue(user.id).map_err(AppError::Internal)?;
    info!(user_id = %user.id, "user logged in");
    Ok(token)
}

/// Unknown email fails the same way a bad login does.
pub async fn forgotten_password(
    store: &dyn AccountStore,
    req: ForgottenPasswordRequest,
) -> Result<(), AppError> {
    let email = normalize_email(&req.email);
    require("email", &email)?;
    check_new_password(&req.password, &req.confirm_password)?;

    let Some(user) = store.find_user(UserLookup::Email(&email)).await? else {
        warn!("password reset for unknown email");
        return Err(AppError::InvalidCredentials);
    };

    let password_hash = hash(&req.password).await?;
    if !store.update_user_password(user.id, &password_hash).await? {
        return Err(AppError::InvalidCredentials);
    }
    info!(user_id = %user.id, "password reset");
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileChange {
    Nothing,
    Username,
    Email,
    Password,
}

impl ProfileChange {
    pub fn message(self) -> &'static str {
        match self {
            ProfileChange::Nothing => "No changes were made.",
            ProfileChange::Username => "Username updated successfully.",
            ProfileChange::Email => "Email updated successfully.",
            ProfileChange::Password => "Password updated successfully.",
        }
    }
}

fn requested_change(req: &EditProfileRequest) -> Result<ProfileChange, AppError> {
    let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
    let wants_username = present(&req.username);
    let wants_email = present(&req.email);
    let wants_password = present(&req.password) || present(&req.confirm_password);

    match (wants_username, wants_email, wants_password) {
        (false, false, false) => Ok(ProfileChange::Nothing),
        (true, false, false) => Ok(ProfileChange::Username),
        (false, true, false) => Ok(ProfileChange::Email),
        (false, false, true) => Ok(ProfileChange::Password),
        _ => Err(AppError::bad_request(
            "Only one of username, email or password can be changed at once",
        )),
    }
}

/// Applies one change to the caller's own record.
pub async fn edit_profile(
    store: &dyn AccountStore,
    user: &User,
    req: EditProfileRequest,
) -> Result<ProfileChange, AppError> {
    let change = requested_change(&req)?;
    let updated = match change {
        ProfileChange::Nothing => return Ok(change),
        ProfileChange::Username => {
            let username = req.username.as_deref().unwrap_or_default().trim();
            require("username", username)?;
            store.update_username(user.id, username).await?
        }
        ProfileChange::Email => {
            let email = normalize_email(req.email.as_deref().unwrap_or_default());
            check_email(&email)?;
            store.update_user_email(user.id, &email).await?
        }
        ProfileChange::Password => {
            let password = req.password.as_deref().unwrap_or_default();
            let confirm = req.confirm_password.as_deref().unwrap_or_default();
            check_new_password(password, confirm)?;
            let password_hash = hash(password).await?;
            store.update_user_password(user.id, &password_hash).await?
        }
    };

    if !updated {
        return Err(AppError::user_not_found());
    }
    info!(user_id = %user.id, ?change, "profile updated");
    Ok(change)
}

pub async fn delete_account(store: &dyn AccountStore, user: &User) -> Result<(), AppError> {
    if !store.delete_user(user.id).await? {
        return Err(AppError::user_not_found());
    }
    info!(user_id = %user.id, "account deleted");
    Ok(())
}
