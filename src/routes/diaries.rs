//! # 일기 API 라우트 핸들러
//!
//! ## 엔드포인트 목록
//! | 메서드 | 경로 | 핸들러 | 설명 |
//! |--------|------|--------|------|
//! | GET | /api/diaries | `list_diaries` | 필터/정렬/페이지네이션 목록 |
//! | POST | /api/diaries | `create_diary` | 새 일기 작성 (201) |
//! | GET | /api/diaries/stats | `diary_stats` | 통계 |
//! | GET | /api/diaries/{id} | `get_diary` | 단건 조회 |
//! | PUT | /api/diaries/{id} | `update_diary` | 부분 수정 |
//! | DELETE | /api/diaries/{id} | `delete_diary` | 삭제 |
//!
//! 모든 엔드포인트는 로그인한 사용자(`AuthUser`)의 일기만 다룹니다.
//! 다른 사용자의 일기는 없는 일기와 똑같이 404로 응답합니다.

use crate::{
    db::{diaries as db_diaries, stats as db_stats, tags as db_tags},
    error::AppError,
    middleware::{
        auth::AuthUser,
        validate::{ValidJson, ValidQuery},
    },
    models::*,
    response::{ApiResponse, PageMeta},
    routes::{parse_id, AppState},
};
use axum::extract::{Path, State};

const INVALID_ID: &str = "Invalid diary ID";
const NOT_FOUND: &str = "Diary not found";
const INVALID_TAGS: &str = "One or more tags are invalid or don't belong to you";

/// 요청한 태그가 모두 이 사용자의 것인지 확인합니다.
///
/// 소유한 태그 수가 요청한 id 개수와 다르면 거부합니다.
/// 같은 id를 두 번 보내도 개수가 어긋나므로 거부됩니다.
async fn ensure_own_tags(state: &AppState, owner: i64, tag_ids: &[i64]) -> Result<(), AppError> {
    if tag_ids.is_empty() {
        return Ok(());
    }
    let owned = db_tags::count_owned(&state.pool, owner, tag_ids).await?;
    if owned != tag_ids.len() as i64 {
        return Err(AppError::bad_request(INVALID_TAGS));
    }
    Ok(())
}

/// `GET /api/diaries?page=&limit=&mood=&tagIds=&startDate=&endDate=&search=&isPublic=&sortBy=&sortOrder=`
///
/// `meta.total`은 페이지와 무관한 전체 건수입니다.
pub async fn list_diaries(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidQuery(query): ValidQuery<DiaryQuery>,
) -> Result<ApiResponse<Vec<DiaryListItem>>, AppError> {
    let (diaries, total) = db_diaries::list_diaries(&state.pool, auth.user_id, &query).await?;

    Ok(
        ApiResponse::ok(diaries, "Diaries retrieved successfully")
            .with_meta(PageMeta::new(query.page, query.limit, total)),
    )
}

/// `POST /api/diaries` → 201 + 상세 응답
pub async fn create_diary(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(input): ValidJson<CreateDiary>,
) -> Result<ApiResponse<DiaryDetail>, AppError> {
    ensure_own_tags(&state, auth.user_id, &input.tag_ids).await?;

    let diary = db_diaries::create_diary(&state.pool, auth.user_id, &input).await?;

    tracing::info!(user_id = auth.user_id, diary_id = diary.diary.id, "Diary created");
    Ok(ApiResponse::created(diary, "Diary created successfully"))
}

/// `GET /api/diaries/{id}`
pub async fn get_diary(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<DiaryDetail>, AppError> {
    let id = parse_id(&id, INVALID_ID)?;

    let diary = db_diaries::find_diary(&state.pool, auth.user_id, id)
        .await?
        .ok_or(AppError::not_found(NOT_FOUND))?;

    Ok(ApiResponse::ok(diary, "Diary retrieved successfully"))
}

/// `PUT /api/diaries/{id}`
///
/// 검사 순서: 경로 id(400) → 소유한 일기인지(404) → 태그 소유권(400) → 수정
pub async fn update_diary(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidJson(input): ValidJson<UpdateDiary>,
) -> Result<ApiResponse<DiaryDetail>, AppError> {
    let id = parse_id(&id, INVALID_ID)?;

    if !db_diaries::diary_exists(&state.pool, auth.user_id, id).await? {
        return Err(AppError::not_found(NOT_FOUND));
    }
    if let Some(tag_ids) = &input.tag_ids {
        ensure_own_tags(&state, auth.user_id, tag_ids).await?;
    }

    let diary = db_diaries::update_diary(&state.pool, auth.user_id, id, &input)
        .await?
        .ok_or(AppError::not_found(NOT_FOUND))?;

    tracing::info!(user_id = auth.user_id, diary_id = id, "Diary updated");
    Ok(ApiResponse::ok(diary, "Diary updated successfully"))
}

/// `DELETE /api/diaries/{id}` → `data: null`
pub async fn delete_diary(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    let id = parse_id(&id, INVALID_ID)?;

    if !db_diaries::delete_diary(&state.pool, auth.user_id, id).await? {
        return Err(AppError::not_found(NOT_FOUND));
    }

    tracing::info!(user_id = auth.user_id, diary_id = id, "Diary deleted");
    Ok(ApiResponse::ok((), "Diary deleted successfully"))
}

/// `GET /api/diaries/stats`
pub async fn diary_stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<ApiResponse<DiaryStats>, AppError> {
    let stats = db_stats::diary_stats(&state.pool, auth.user_id).await?;
    Ok(ApiResponse::ok(stats, "Stats retrieved successfully"))
}
