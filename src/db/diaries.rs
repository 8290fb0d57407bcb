//! # 일기 데이터베이스 쿼리 모듈
//!
//! 일기 CRUD와 목록 필터 엔진입니다.
//!
//! ## 목록 필터
//! `DiaryQuery`(검증된 쿼리스트링)를 `QueryBuilder`로 SQL에 옮깁니다.
//! 모든 조건은 `AND`로 묶이고, 값은 전부 바인딩(`push_bind`)됩니다.
//! 정렬 컬럼과 방향은 열거형에서만 나오므로 사용자 문자열이 SQL에 들어갈 일이 없습니다.
//!
//! 같은 필터 함수(`push_filter`)가 `COUNT(*)` 쿼리와 페이지 쿼리에 함께 쓰여,
//! `total`은 항상 페이지와 무관한 전체 건수가 됩니다.
//!
//! ## 트랜잭션
//! 생성과 수정은 일기 행과 `diary_tags` 관계 행을 한 트랜잭션에서 씁니다.
//! 트랜잭션 안의 모든 쿼리는 `&mut *tx`로 실행하고, `?`로 빠져나가면
//! `Transaction`이 drop되면서 롤백됩니다.

use crate::db::{db_timestamp, NOW};
use crate::error::AppError;
use crate::middleware::validate::Choice;
use crate::models::*;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::collections::HashMap;

/// `d`는 diaries 테이블 별칭
const DIARY_COLUMNS: &str =
    "d.id, d.user_id, d.title, d.content, d.mood, d.is_public, d.created_at, d.updated_at";

/// LIKE 패턴의 특수문자(`%`, `_`)와 이스케이프 문자(`\`)를 글자 그대로 찾도록 바꿉니다.
///
/// 쿼리에서는 `ESCAPE '\'`와 함께 씁니다.
pub fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// `WHERE` 절: 소유자 조건 + 선택 필터들
fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, owner: i64, filter: &DiaryFilter) {
    builder.push(" WHERE d.user_id = ").push_bind(owner);

    if let Some(mood) = filter.mood {
        builder.push(" AND d.mood = ").push_bind(mood.as_str());
    }

    if let Some(is_public) = filter.is_public {
        builder.push(" AND d.is_public = ").push_bind(is_public);
    }

    // 주어진 태그 중 하나라도 붙어 있으면 포함 (전부일 필요는 없음)
    if !filter.tag_ids.is_empty() {
        builder.push(
            " AND EXISTS (SELECT 1 FROM diary_tags dt WHERE dt.diary_id = d.id AND dt.tag_id IN (",
        );
        let mut separated = builder.separated(", ");
        for tag_id in &filter.tag_ids {
            separated.push_bind(*tag_id);
        }
        separated.push_unseparated("))");
    }

    if let Some(start) = filter.start_date {
        builder.push(" AND d.created_at >= ").push_bind(db_timestamp(start));
    }

    if let Some(end) = filter.end_date {
        builder.push(" AND d.created_at <= ").push_bind(db_timestamp(end));
    }

    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", escape_like(search));
        builder
            .push(" AND (d.title LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR d.content LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
}

/// 필터에 맞는 일기 한 페이지와 전체 건수
///
/// 정렬은 선택한 컬럼 다음에 같은 방향의 `id`를 두어,
/// 같은 값이 여러 개여도 페이지 경계가 흔들리지 않게 합니다.
pub async fn list_diaries(
    pool: &SqlitePool,
    owner: i64,
    query: &DiaryQuery,
) -> Result<(Vec<DiaryListItem>, i64), AppError> {
    let mut count_builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT COUNT(*) FROM diaries d");
    push_filter(&mut count_builder, owner, &query.filter);
    let total: i64 = count_builder.build_query_scalar().fetch_one(pool).await?;

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "SELECT {DIARY_COLUMNS}, \
         (SELECT COUNT(*) FROM attachments a WHERE a.diary_id = d.id) AS attachments_count \
         FROM diaries d"
    ));
    push_filter(&mut builder, owner, &query.filter);

    let direction = query.sort_order.keyword();
    builder.push(format!(
        " ORDER BY {} {direction}, d.id {direction}",
        query.sort_by.column()
    ));
    builder
        .push(" LIMIT ")
        .push_bind(query.limit)
        .push(" OFFSET ")
        .push_bind(query.offset());

    let rows = builder
        .build_query_as::<DiaryListRow>()
        .fetch_all(pool)
        .await?;

    let ids: Vec<i64> = rows.iter().map(|row| row.diary.id).collect();
    let mut tags = tags_by_diary(pool, &ids).await?;

    let items = rows
        .into_iter()
        .map(|row| DiaryListItem {
            tags: tags.remove(&row.diary.id).unwrap_or_default(),
            attachments_count: row.attachments_count,
            diary: row.diary.into(),
        })
        .collect();

    Ok((items, total))
}

/// 여러 일기의 태그를 한 번에 조회하여 일기 id별로 묶습니다.
async fn tags_by_diary(
    pool: &SqlitePool,
    diary_ids: &[i64],
) -> Result<HashMap<i64, Vec<TagSummary>>, AppError> {
    let mut grouped: HashMap<i64, Vec<TagSummary>> = HashMap::new();
    if diary_ids.is_empty() {
        return Ok(grouped);
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT dt.diary_id, t.id, t.name, t.color \
         FROM diary_tags dt JOIN tags t ON t.id = dt.tag_id \
         WHERE dt.diary_id IN (",
    );
    let mut separated = builder.separated(", ");
    for id in diary_ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(") ORDER BY t.name COLLATE NOCASE, t.id");

    let rows = builder
        .build_query_as::<DiaryTagRow>()
        .fetch_all(pool)
        .await?;

    for row in rows {
        grouped.entry(row.diary_id).or_default().push(row.tag);
    }
    Ok(grouped)
}

/// 사용자의 일기 하나를 상세 응답 형태로 조회합니다.
///
/// 다른 사용자의 일기면 `None`.
pub async fn find_diary(
    pool: &SqlitePool,
    owner: i64,
    id: i64,
) -> Result<Option<DiaryDetail>, AppError> {
    let mut conn = pool.acquire().await?;
    load_detail(&mut conn, owner, id).await
}

/// 상세 응답 조립: 일기 행 + 태그 + 작성자 요약 + 첨부파일
async fn load_detail(
    conn: &mut SqliteConnection,
    owner: i64,
    id: i64,
) -> Result<Option<DiaryDetail>, AppError> {
    let row = sqlx::query_as::<_, DiaryRow>(&format!(
        "SELECT {DIARY_COLUMNS} FROM diaries d WHERE d.id = ? AND d.user_id = ?"
    ))
    .bind(id)
    .bind(owner)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let tags = sqlx::query_as::<_, TagSummary>(
        r#"
        SELECT t.id, t.name, t.color
        FROM diary_tags dt
        JOIN tags t ON t.id = dt.tag_id
        WHERE dt.diary_id = ?
        ORDER BY t.name COLLATE NOCASE, t.id
        "#,
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    let user = sqlx::query_as::<_, UserSummary>("SELECT id, name, username FROM users WHERE id = ?")
        .bind(row.user_id)
        .fetch_one(&mut *conn)
        .await?;

    let attachments = sqlx::query_as::<_, Attachment>(
        r#"
        SELECT id, filename, url, file_type, file_size, created_at
        FROM attachments
        WHERE diary_id = ?
        ORDER BY created_at, id
        "#,
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(Some(DiaryDetail {
        diary: row.into(),
        tags,
        user,
        attachments,
    }))
}

/// 일기 한 편에 태그들을 연결합니다 (`INSERT ... VALUES (..), (..)`).
async fn attach_tags(
    conn: &mut SqliteConnection,
    diary_id: i64,
    tag_ids: &[i64],
) -> Result<(), AppError> {
    if tag_ids.is_empty() {
        return Ok(());
    }

    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("INSERT INTO diary_tags (diary_id, tag_id) ");
    builder.push_values(tag_ids, |mut row, tag_id| {
        row.push_bind(diary_id).push_bind(*tag_id);
    });
    builder.build().execute(&mut *conn).await?;

    Ok(())
}

/// 일기를 만들고 태그를 연결한 뒤 상세 응답을 돌려줍니다.
///
/// 태그 소유권은 호출자가 먼저 확인합니다 (`tags::count_owned`).
pub async fn create_diary(
    pool: &SqlitePool,
    owner: i64,
    input: &CreateDiary,
) -> Result<DiaryDetail, AppError> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        INSERT INTO diaries (user_id, title, content, mood, is_public)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(owner)
    .bind(&input.title)
    .bind(&input.content)
    .bind(input.mood.map(|mood| mood.as_str()))
    .bind(input.is_public)
    .execute(&mut *tx)
    .await?;

    let id = result.last_insert_rowid();
    attach_tags(&mut tx, id, &input.tag_ids).await?;

    let detail = load_detail(&mut tx, owner, id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created diary".to_string()))?;

    tx.commit().await?;
    Ok(detail)
}

/// 일기를 부분 수정합니다.
///
/// - 주어진 필드만 `SET` 절에 들어가고, `updated_at`은 항상 갱신됩니다.
/// - `tag_ids`가 있으면 기존 관계를 모두 지우고 새 목록으로 교체합니다.
///
/// 없거나 다른 사용자의 일기면 `Ok(None)`이고, 아무것도 바뀌지 않습니다.
pub async fn update_diary(
    pool: &SqlitePool,
    owner: i64,
    id: i64,
    input: &UpdateDiary,
) -> Result<Option<DiaryDetail>, AppError> {
    let mut tx = pool.begin().await?;

    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("UPDATE diaries SET updated_at = {NOW}"));
    if let Some(title) = &input.title {
        builder.push(", title = ").push_bind(title.clone());
    }
    if let Some(content) = &input.content {
        builder.push(", content = ").push_bind(content.clone());
    }
    if let Some(mood) = input.mood {
        builder.push(", mood = ").push_bind(mood.map(|mood| mood.as_str()));
    }
    if let Some(is_public) = input.is_public {
        builder.push(", is_public = ").push_bind(is_public);
    }
    builder
        .push(" WHERE id = ")
        .push_bind(id)
        .push(" AND user_id = ")
        .push_bind(owner);

    let result = builder.build().execute(&mut *tx).await?;
    if result.rows_affected() == 0 {
        return Ok(None);
    }

    if let Some(tag_ids) = &input.tag_ids {
        sqlx::query("DELETE FROM diary_tags WHERE diary_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        attach_tags(&mut tx, id, tag_ids).await?;
    }

    let detail = load_detail(&mut tx, owner, id).await?;
    tx.commit().await?;
    Ok(detail)
}

/// 일기를 삭제합니다. 관계 행과 첨부파일 메타데이터는 CASCADE로 함께 지워집니다.
pub async fn delete_diary(pool: &SqlitePool, owner: i64, id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM diaries WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(owner)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// 일기가 이 사용자 것인지 확인합니다 (수정 전 404 판단용).
pub async fn diary_exists(pool: &SqlitePool, owner: i64, id: i64) -> Result<bool, AppError> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT id FROM diaries WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(owner)
            .fetch_optional(pool)
            .await?;

    Ok(found.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("snake_case"), "snake\\_case");
        assert_eq!(escape_like("C:\\dir"), "C:\\\\dir");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn filter_binds_every_predicate() {
        let filter = DiaryFilter {
            mood: Some(Mood::Happy),
            tag_ids: vec![3, 5],
            search: Some("rain".to_string()),
            is_public: Some(true),
            ..DiaryFilter::default()
        };
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM diaries d");
        push_filter(&mut builder, 1, &filter);
        let sql = builder.sql();

        assert!(sql.contains("d.user_id = ?"));
        assert!(sql.contains("d.mood = ?"));
        assert!(sql.contains("d.is_public = ?"));
        assert!(sql.contains("dt.tag_id IN (?, ?))"));
        assert!(sql.contains("d.title LIKE ? ESCAPE '\\' OR d.content LIKE ? ESCAPE '\\'"));
        assert!(!sql.contains("rain"));
        assert!(!sql.contains("created_at"));
    }
}
