use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::models::NewUser;
use crate::error::AppError;
use crate::password::{hash_password, new_salt, verify_password};
use crate::AppState;

/// Request to create an account
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Present and not just whitespace
fn required(value: Option<String>, name: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("Missing field: {}", name)))
}

impl RegisterRequest {
    /// Check the fields and hash the password with a fresh salt
    pub fn into_new_user(self) -> Result<NewUser, AppError> {
        let username = required(self.username, "username")?;
        let email = required(self.email, "email")?;
        let password = self
            .password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::BadRequest("Missing field: password".to_string()))?;

        let salt = new_salt();
        Ok(NewUser {
            username,
            email,
            password_hash: hash_password(&password, &salt),
            salt,
        })
    }
}

/// Register a new account
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let user = req.into_new_user()?;
    let user_id = state.db.create_user(&user).await?;
    tracing::info!(%user_id, username = %user.username, "registered user");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered".to_string(),
            user_id,
        }),
    ))
}

/// Check a username and password
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let username = required(req.username, "username")?;
    let password = req.password.unwrap_or_default();

    let user = state
        .db
        .find_user(&username)
        .await?
        .ok_or(AppError::Unauthorized)?;
    if !verify_password(&password, &user.salt, &user.password_hash) {
        tracing::debug!(%username, "login rejected");
        return Err(AppError::Unauthorized);
    }

    Ok(Json(MessageResponse {
        message: "Login successful".to_string(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}
