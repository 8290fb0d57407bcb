//! # 태그 데이터베이스 쿼리 모듈
//!
//! 태그 CRUD와 일기-태그 관계 확인을 위한 SQL 쿼리 함수들입니다.
//! 모든 조회는 소유자(`user_id`) 조건을 포함합니다.
//!
//! ## 테이블 구조
//! - `tags`: 태그 엔티티 (id, user_id, name, color, created_at)
//! - `diary_tags`: 일기와 태그의 다대다(N:M) 관계 테이블

use crate::error::AppError;
use crate::models::*;
use sqlx::{Executor, QueryBuilder, Sqlite, SqlitePool};

/// 태그 응답 한 행을 만드는 SELECT 절
///
/// `usage_count`는 이 태그가 붙은 일기 수입니다 (관계 행 개수).
const TAG_RESPONSE_SELECT: &str = r#"
    SELECT t.id, t.name, t.color, t.created_at,
           (SELECT COUNT(*) FROM diary_tags dt WHERE dt.tag_id = t.id) AS usage_count
    FROM tags t
"#;

/// 사용자의 태그 목록을 이름순으로 조회합니다.
///
/// `search`가 있으면 이름에 그 문자열이 포함된 태그만 (대소문자 무시).
/// `instr`로 비교하므로 `%`, `_` 같은 문자도 글자 그대로 찾습니다.
pub async fn list_tags(
    pool: &SqlitePool,
    owner: i64,
    search: Option<&str>,
) -> Result<Vec<TagResponse>, AppError> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(TAG_RESPONSE_SELECT);
    builder.push(" WHERE t.user_id = ").push_bind(owner);
    if let Some(search) = search {
        builder
            .push(" AND instr(lower(t.name), lower(")
            .push_bind(search)
            .push(")) > 0");
    }
    builder.push(" ORDER BY t.name COLLATE NOCASE, t.id");

    let tags = builder
        .build_query_as::<TagResponse>()
        .fetch_all(pool)
        .await?;

    Ok(tags)
}

/// 사용자의 태그 하나를 조회합니다.
///
/// 다른 사용자의 태그면 `None`: 존재하지 않는 태그와 구별하지 않습니다.
pub async fn find_tag(pool: &SqlitePool, owner: i64, id: i64) -> Result<Option<TagResponse>, AppError> {
    let tag = sqlx::query_as::<_, TagResponse>(&format!(
        "{TAG_RESPONSE_SELECT} WHERE t.id = ? AND t.user_id = ?"
    ))
    .bind(id)
    .bind(owner)
    .fetch_optional(pool)
    .await?;

    Ok(tag)
}

/// 태그가 가장 최근에 붙은 일기 5개
///
/// 일기 작성 시각이 아니라 관계 행(`diary_tags.created_at`)의 시각 기준입니다.
pub async fn recent_diaries(pool: &SqlitePool, tag_id: i64) -> Result<Vec<DiaryBrief>, AppError> {
    let diaries = sqlx::query_as::<_, DiaryBrief>(
        r#"
        SELECT d.id, d.title, d.created_at
        FROM diary_tags dt
        JOIN diaries d ON d.id = dt.diary_id
        WHERE dt.tag_id = ?
        ORDER BY dt.created_at DESC, d.id DESC
        LIMIT 5
        "#,
    )
    .bind(tag_id)
    .fetch_all(pool)
    .await?;

    Ok(diaries)
}

/// 같은 사용자에게 이 이름(대소문자 무시)의 태그가 이미 있는지 확인합니다.
///
/// `except`: 수정 중인 태그 자신은 충돌로 치지 않습니다.
pub async fn name_taken(
    pool: &SqlitePool,
    owner: i64,
    name: &str,
    except: Option<i64>,
) -> Result<bool, AppError> {
    let existing: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT id FROM tags
        WHERE user_id = ? AND name = ? COLLATE NOCASE AND (? IS NULL OR id <> ?)
        LIMIT 1
        "#,
    )
    .bind(owner)
    .bind(name)
    .bind(except)
    .bind(except)
    .fetch_optional(pool)
    .await?;

    Ok(existing.is_some())
}

/// 새 태그를 만들고 응답 형태로 돌려줍니다. 색상이 없으면 기본 회색.
pub async fn create_tag(
    pool: &SqlitePool,
    owner: i64,
    name: &str,
    color: Option<&str>,
) -> Result<TagResponse, AppError> {
    let result = sqlx::query("INSERT INTO tags (user_id, name, color) VALUES (?, ?, ?)")
        .bind(owner)
        .bind(name)
        .bind(color.unwrap_or(DEFAULT_TAG_COLOR))
        .execute(pool)
        .await?;

    find_tag(pool, owner, result.last_insert_rowid())
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created tag".to_string()))
}

/// 태그를 부분 수정합니다. 주어진 필드만 바꾸고 나머지는 그대로 둡니다.
///
/// ## 반환값
/// - `Ok(Some(TagResponse))`: 수정된 태그
/// - `Ok(None)`: 없거나 다른 사용자의 태그
pub async fn update_tag(
    pool: &SqlitePool,
    owner: i64,
    id: i64,
    name: Option<&str>,
    color: Option<&str>,
) -> Result<Option<TagResponse>, AppError> {
    // COALESCE(?, name): 바인딩 값이 NULL이면 기존 값을 유지합니다.
    let result = sqlx::query(
        r#"
        UPDATE tags
        SET name = COALESCE(?, name), color = COALESCE(?, color)
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(name)
    .bind(color)
    .bind(id)
    .bind(owner)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    find_tag(pool, owner, id).await
}

/// 태그를 삭제합니다.
///
/// `diary_tags`에 `ON DELETE CASCADE`가 걸려 있어 관계 행만 함께 지워지고,
/// 일기 자체는 남습니다.
pub async fn delete_tag(pool: &SqlitePool, owner: i64, id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM tags WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(owner)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// `ids` 중 이 사용자가 소유한 태그 수
///
/// 풀(`&SqlitePool`)이나 트랜잭션 연결(`&mut *tx`) 어느 쪽에서도 호출할 수 있습니다.
/// `ids`에 중복이 없어야 호출자가 개수를 목록 길이와 비교할 수 있습니다.
pub async fn count_owned<'c, E>(executor: E, owner: i64, ids: &[i64]) -> Result<i64, AppError>
where
    E: Executor<'c, Database = Sqlite>,
{
    if ids.is_empty() {
        return Ok(0);
    }

    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT COUNT(*) FROM tags WHERE user_id = ");
    builder.push_bind(owner).push(" AND id IN (");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    let count: i64 = builder.build_query_scalar().fetch_one(executor).await?;
    Ok(count)
}
