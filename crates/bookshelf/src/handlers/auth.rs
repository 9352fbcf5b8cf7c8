//! Registration and login.

use anyhow::Context;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use bookshelf_core::auth::{validate_credentials, AuthError, Credentials, NewUser};
use bookshelf_core::storage::RepositoryError;

use crate::{
    auth::{hash_password, verify_password},
    handlers::AppError,
    models::{MessageResponse, TokenResponse},
    state::AppState,
};

/// Register a new user (POST /auth/register).
pub async fn register(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<impl IntoResponse, AppError> {
    let username = validate_credentials(&credentials)?.to_string();

    if state
        .users
        .find_user_by_username(&username)
        .await
        .context("failed to look up user")?
        .is_some()
    {
        return Err(AuthError::UsernameTaken.into());
    }

    // Argon2 is CPU-bound.
    let password = credentials.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .context("password hashing task failed")?
        .map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))?;

    let user = state
        .users
        .insert_user(&NewUser {
            username,
            password_hash,
        })
        .await
        .map_err(|e| match e {
            RepositoryError::AlreadyExists { .. } => AppError::from(AuthError::UsernameTaken),
            other => AppError::from(anyhow::Error::new(other).context("failed to register user")),
        })?;

    tracing::info!(user_id = user.id, username = %user.username, "Registered new user");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

/// Exchange credentials for a bearer token (POST /auth/login).
pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<TokenResponse>, AppError> {
    let username = credentials.username.trim();
    if username.is_empty() || credentials.password.is_empty() {
        return Err(AuthError::MissingCredentials.into());
    }

    let user = state
        .users
        .find_user_by_username(username)
        .await
        .context("failed to look up user")?
        .ok_or(AuthError::InvalidCredentials)?;

    let password = credentials.password;
    let password_hash = user.password_hash.clone();
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
        .await
        .context("password verification task failed")?
        .map_err(|e| anyhow::anyhow!("stored password hash is invalid: {e}"))?;

    if !matches {
        tracing::debug!(username = %user.username, "Rejected login");
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = state
        .tokens
        .issue(&user)
        .context("failed to sign token")?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(TokenResponse { token }))
}
