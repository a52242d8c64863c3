//! # Login Routes
//!
//! Staff registration, login and password reset under `/login`.
//!
//! ```text
//! POST /login/register        {email, password, jobrole}   → 201
//! POST /login/logindata       {email, password}            → 200 {user}
//! POST /login/reset-password  {email, newPassword}         → 200
//! ```
//!
//! Passwords are stored as argon2 PHC strings. Unknown email and wrong
//! password produce the same 401 so the endpoint can't be used to probe
//! which accounts exist.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::task;
use tracing::{info, warn};

use grocery_core::validation::{validate_email, validate_job_role, validate_password};
use grocery_core::User;

use crate::error::ApiError;
use crate::routes::MessageResponse;
use crate::state::AppState;

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, alias = "jobRole")]
    pub jobrole: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub new_password: String,
}

/// Public view of a user (no hash).
#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: i64,
    pub email: String,
    pub jobrole: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        UserDto {
            id: user.id,
            email: user.email,
            jobrole: user.job_role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub user: UserDto,
}

// =============================================================================
// Router
// =============================================================================

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/logindata", post(login))
        .route("/reset-password", post(reset_password))
}

// =============================================================================
// Handlers
// =============================================================================

async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(req) = payload?;
    let email = req.email.trim();

    validate_email(email)?;
    validate_password(&req.password)?;
    validate_job_role(&req.jobrole)?;

    let users = state.db.users();
    if users.find_by_email(email).await?.is_some() {
        return Err(ApiError::validation("Email already registered"));
    }

    let hash = hash_password(req.password.clone()).await?;
    users
        .insert(email, &hash, req.jobrole.trim())
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                ApiError::validation("Email already registered")
            } else {
                e.into()
            }
        })?;

    info!(email = %email, "User registered");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Registration successful")),
    ))
}

async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = payload?;
    let invalid = || ApiError::unauthorized("Invalid email or password");

    let user = state
        .db
        .users()
        .find_by_email(req.email.trim())
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(req.password, user.password_hash.clone()).await? {
        warn!(email = %user.email, "Failed login");
        return Err(invalid());
    }

    info!(email = %user.email, "User logged in");
    Ok(Json(LoginResponse {
        message: "Login successful",
        user: user.into(),
    }))
}

async fn reset_password(
    State(state): State<AppState>,
    payload: Result<Json<ResetPasswordRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(req) = payload?;
    let email = req.email.trim();

    validate_email(email)?;
    validate_password(&req.new_password)?;

    let users = state.db.users();
    if users.find_by_email(email).await?.is_none() {
        return Err(ApiError::not_found("User", email));
    }

    let hash = hash_password(req.new_password.clone()).await?;
    users.update_password(email, &hash).await?;

    info!(email = %email, "Password reset");
    Ok(Json(MessageResponse::new("Password updated successfully")))
}

// =============================================================================
// Password Hashing
// =============================================================================

// argon2 holds a core for tens of milliseconds; both run on the blocking pool.

/// Hashes a password into an argon2 PHC string.
async fn hash_password(password: String) -> Result<String, ApiError> {
    task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ApiError::internal(format!("Failed to hash password: {}", e)))
    })
    .await
    .map_err(|e| ApiError::internal(format!("Password hashing task failed: {}", e)))?
}

/// Checks a password against a stored PHC string. Unparseable hashes never match.
async fn verify_password(password: String, hash: String) -> Result<bool, ApiError> {
    task::spawn_blocking(move || {
        let parsed_hash = match PasswordHash::new(&hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    })
    .await
    .map_err(|e| ApiError::internal(format!("Password check task failed: {}", e)))
}
