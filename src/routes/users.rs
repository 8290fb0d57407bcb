use crate::{
    db::users as db_users,
    error::AppError,
    middleware::{auth::AuthUser, validate::ValidJson},
    models::user::*,
    response::ApiResponse,
    routes::AppState,
    services::password::{hash_password, verify_password},
};
use axum::extract::State;

/// A valid token can outlive its user.
const USER_NOT_FOUND: &str = "User not found";

pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<ApiResponse<ProfileResponse>, AppError> {
    let profile = db_users::find_profile(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::not_found(USER_NOT_FOUND))?;

    Ok(ApiResponse::ok(profile, "Profile retrieved successfully"))
}

pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<UpdateProfileRequest>,
) -> Result<ApiResponse<UserResponse>, AppError> {
    let user = db_users::update_name(&state.pool, auth.user_id, &req.name)
        .await?
        .ok_or(AppError::not_found(USER_NOT_FOUND))?;

    tracing::info!(user_id = auth.user_id, "Profile updated");
    Ok(ApiResponse::ok(user.into(), "Profile updated successfully"))
}

pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<ChangePasswordRequest>,
) -> Result<ApiResponse<()>, AppError> {
    let user = db_users::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::not_found(USER_NOT_FOUND))?;

    if !verify_password(&req.current_password, &user.password_hash)? {
        return Err(AppError::bad_request("Current password is incorrect"));
    }

    let password_hash = hash_password(&req.new_password)?;
    db_users::update_password(&state.pool, user.id, &password_hash).await?;

    tracing::info!(user_id = auth.user_id, "Password changed");
    Ok(ApiResponse::ok((), "Password changed successfully"))
}
