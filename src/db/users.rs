use crate::db::NOW;
use crate::error::AppError;
use crate::models::user::{ProfileResponse, User};
use sqlx::SqlitePool;

pub async fn create_user(
    pool: &SqlitePool,
    name: &str,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<User, AppError> {
    let result = sqlx::query(
        r#"
        INSERT INTO users (name, username, email, password_hash)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(name)
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .execute(pool)
    .await?;

    find_by_id(pool, result.last_insert_rowid())
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created user".to_string()))
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, username, email, password_hash, created_at, updated_at
        FROM users
        WHERE username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, username, email, password_hash, created_at, updated_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Existing user holding either the email or the username.
/// An email match sorts first so it is the one reported.
pub async fn find_conflict(
    pool: &SqlitePool,
    email: &str,
    username: &str,
) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, username, email, password_hash, created_at, updated_at
        FROM users
        WHERE email = ? OR username = ?
        ORDER BY (email = ?) DESC
        LIMIT 1
        "#,
    )
    .bind(email)
    .bind(username)
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn find_profile(pool: &SqlitePool, id: i64) -> Result<Option<ProfileResponse>, AppError> {
    let profile = sqlx::query_as::<_, ProfileResponse>(
        r#"
        SELECT u.id, u.name, u.username, u.email, u.created_at, u.updated_at,
               (SELECT COUNT(*) FROM diaries d WHERE d.user_id = u.id) AS diaries_count,
               (SELECT COUNT(*) FROM tags t WHERE t.user_id = u.id) AS tags_count
        FROM users u
        WHERE u.id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(profile)
}

pub async fn update_name(pool: &SqlitePool, id: i64, name: &str) -> Result<Option<User>, AppError> {
    let result = sqlx::query(&format!(
        "UPDATE users SET name = ?, updated_at = {NOW} WHERE id = ?"
    ))
    .bind(name)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    find_by_id(pool, id).await
}

pub async fn update_password(
    pool: &SqlitePool,
    id: i64,
    password_hash: &str,
) -> Result<bool, AppError> {
    let result = sqlx::query(&format!(
        "UPDATE users SET password_hash = ?, updated_at = {NOW} WHERE id = ?"
    ))
    .bind(password_hash)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
