use crate::{
    db::users as db_users,
    error::AppError,
    middleware::{auth::create_token, validate::ValidJson},
    models::user::*,
    response::ApiResponse,
    routes::AppState,
    services::password::{hash_password, verify_password},
};
use axum::extract::State;

/// Same answer for an unknown username and a wrong password.
const INVALID_CREDENTIALS: &str = "Invalid username or password";

pub async fn register(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> Result<ApiResponse<UserResponse>, AppError> {
    // One lookup for both unique fields; an email match is reported first
    if let Some(existing) = db_users::find_conflict(&state.pool, &req.email, &req.username).await? {
        return Err(if existing.email == req.email {
            AppError::conflict_on("email", "Email already registered")
        } else {
            AppError::conflict_on("username", "Username already taken")
        });
    }

    let password_hash = hash_password(&req.password)?;
    let user = db_users::create_user(
        &state.pool,
        &req.name,
        &req.username,
        &req.email,
        &password_hash,
    )
    .await?;

    tracing::info!(user_id = user.id, "User registered");
    Ok(ApiResponse::created(user.into(), "User registered successfully"))
}

pub async fn login(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> Result<ApiResponse<AuthResponse>, AppError> {
    // Find user by username
    let user = db_users::find_by_username(&state.pool, &req.username)
        .await?
        .ok_or(AppError::unauthorized(INVALID_CREDENTIALS))?;

    // Verify password
    if !verify_password(&req.password, &user.password_hash)? {
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    }

    let token = create_token(user.id, &user.username, &state.config.jwt_secret)?;

    tracing::info!(user_id = user.id, "User logged in");
    Ok(ApiResponse::ok(
        AuthResponse {
            user: user.into(),
            token,
        },
        "Login successful",
    ))
}
