//! # 일기 통계 쿼리
//!
//! 네 개의 독립적인 집계 쿼리를 `tokio::try_join!`으로 동시에 실행합니다.
//! 하나라도 실패하면 전체가 그 에러로 끝납니다.

use crate::db::db_timestamp;
use crate::error::AppError;
use crate::middleware::validate::Choice;
use crate::models::*;
use chrono::{Duration, Utc};
use sqlx::SqlitePool;

/// "최근" 통계의 기간
const RECENT_DAYS: i64 = 7;
/// 많이 쓴 태그 목록 길이
const TOP_TAGS: i64 = 5;

pub async fn diary_stats(pool: &SqlitePool, owner: i64) -> Result<DiaryStats, AppError> {
    let since = db_timestamp(Utc::now() - Duration::days(RECENT_DAYS));

    let (total_diaries, recent_diaries, mood_distribution, top_tags) = tokio::try_join!(
        count_diaries(pool, owner, None),
        count_diaries(pool, owner, Some(&since)),
        mood_distribution(pool, owner),
        top_tags(pool, owner),
    )?;

    Ok(DiaryStats {
        total_diaries,
        recent_diaries,
        mood_distribution,
        top_tags,
    })
}

async fn count_diaries(
    pool: &SqlitePool,
    owner: i64,
    since: Option<&str>,
) -> Result<i64, AppError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM diaries WHERE user_id = ? AND (? IS NULL OR created_at >= ?)",
    )
    .bind(owner)
    .bind(since)
    .bind(since)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// 감정별 일기 수. 감정이 없는 일기는 세지 않습니다.
async fn mood_distribution(pool: &SqlitePool, owner: i64) -> Result<Vec<MoodCount>, AppError> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT mood, COUNT(*)
        FROM diaries
        WHERE user_id = ? AND mood IS NOT NULL
        GROUP BY mood
        ORDER BY mood
        "#,
    )
    .bind(owner)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(mood, count)| Mood::parse(&mood).map(|mood| MoodCount { mood, count }))
        .collect())
}

/// 관계 행 수 기준 상위 태그
///
/// 같은 횟수면 이름(대소문자 무시), 그다음 id 순입니다.
async fn top_tags(pool: &SqlitePool, owner: i64) -> Result<Vec<TagUsage>, AppError> {
    let tags = sqlx::query_as::<_, TagUsage>(
        r#"
        SELECT t.id, t.name, t.color, COUNT(*) AS count
        FROM diary_tags dt
        JOIN tags t ON t.id = dt.tag_id
        WHERE t.user_id = ?
        GROUP BY t.id, t.name, t.color
        ORDER BY count DESC, t.name COLLATE NOCASE, t.id
        LIMIT ?
        "#,
    )
    .bind(owner)
    .bind(TOP_TAGS)
    .fetch_all(pool)
    .await?;

    Ok(tags)
}
