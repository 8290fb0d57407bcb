//! # 태그 API 라우트 핸들러
//!
//! 사용자별 태그 CRUD를 위한 HTTP 핸들러 함수들입니다.
//!
//! ## 엔드포인트 목록
//! | 메서드 | 경로 | 핸들러 | 설명 |
//! |--------|------|--------|------|
//! | GET | /api/tags | `list_tags` | 내 태그 목록 (`?search=`로 이름 검색) |
//! | POST | /api/tags | `create_tag` | 새 태그 생성 |
//! | GET | /api/tags/{id} | `get_tag` | 태그 + 최근 일기 5개 |
//! | PUT | /api/tags/{id} | `update_tag` | 태그 수정 |
//! | DELETE | /api/tags/{id} | `delete_tag` | 태그 삭제 (일기는 남음) |
//!
//! ## Axum 핸들러 패턴
//! 각 함수는 Axum의 **추출자(Extractor)** 패턴을 따릅니다:
//! - `State(state)`: 애플리케이션 공유 상태 (DB 풀, 설정)
//! - `auth: AuthUser`: 토큰에서 꺼낸 호출자 id
//! - `Path(id)`: URL 경로의 `{id}` 부분 (문자열로 받아 직접 정수로 변환)
//! - `ValidJson(input)`: 검증을 통과한 요청 본문

use crate::{
    db::tags as db_tags,
    error::AppError,
    middleware::{
        auth::AuthUser,
        validate::{ValidJson, ValidQuery},
    },
    models::*,
    response::ApiResponse,
    routes::{parse_id, AppState},
};
use axum::extract::{Path, State};

const INVALID_ID: &str = "Invalid tag ID";
const NOT_FOUND: &str = "Tag not found";
const NAME_TAKEN: &str = "Tag with this name already exists";

/// 내 태그 목록을 이름순으로 조회합니다.
///
/// `GET /api/tags?search=wor` → `Work`, `homework` 등 (대소문자 무시)
pub async fn list_tags(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidQuery(query): ValidQuery<TagListQuery>,
) -> Result<ApiResponse<Vec<TagResponse>>, AppError> {
    let tags = db_tags::list_tags(&state.pool, auth.user_id, query.search.as_deref()).await?;
    Ok(ApiResponse::ok(tags, "Tags retrieved successfully"))
}

/// 새 태그를 생성합니다.
///
/// `POST /api/tags` + `{ "name": "...", "color": "#RRGGBB" }` → 201
///
/// 같은 이름(대소문자 무시)의 태그가 이미 있으면 409.
/// 검사와 INSERT 사이에 같은 이름이 끼어들면 UNIQUE 인덱스가 막고,
/// `AppError::Database`가 409로 바꿔줍니다.
pub async fn create_tag(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(input): ValidJson<CreateTag>,
) -> Result<ApiResponse<TagResponse>, AppError> {
    if db_tags::name_taken(&state.pool, auth.user_id, &input.name, None).await? {
        return Err(AppError::conflict(NAME_TAKEN));
    }

    let tag = db_tags::create_tag(
        &state.pool,
        auth.user_id,
        &input.name,
        input.color.as_deref(),
    )
    .await?;

    tracing::info!(user_id = auth.user_id, tag_id = tag.id, "Tag created");
    Ok(ApiResponse::created(tag, "Tag created successfully"))
}

/// 태그 하나와, 그 태그가 최근에 붙은 일기 5개를 조회합니다.
///
/// `GET /api/tags/{id}`
pub async fn get_tag(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<TagDetail>, AppError> {
    let id = parse_id(&id, INVALID_ID)?;

    let tag = db_tags::find_tag(&state.pool, auth.user_id, id)
        .await?
        .ok_or(AppError::not_found(NOT_FOUND))?;
    let recent_diaries = db_tags::recent_diaries(&state.pool, id).await?;

    Ok(ApiResponse::ok(
        TagDetail { tag, recent_diaries },
        "Tag retrieved successfully",
    ))
}

/// 태그 이름이나 색상을 수정합니다.
///
/// `PUT /api/tags/{id}` + `{ "name"?: "...", "color"?: "..." }`
///
/// 이름을 바꿀 때는 자기 자신을 제외하고 중복을 검사합니다.
/// (`Work` → `work`처럼 대소문자만 바꾸는 것은 허용)
pub async fn update_tag(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidJson(input): ValidJson<UpdateTag>,
) -> Result<ApiResponse<TagResponse>, AppError> {
    let id = parse_id(&id, INVALID_ID)?;

    // 소유한 태그가 아니면 404
    db_tags::find_tag(&state.pool, auth.user_id, id)
        .await?
        .ok_or(AppError::not_found(NOT_FOUND))?;

    if let Some(name) = &input.name {
        if db_tags::name_taken(&state.pool, auth.user_id, name, Some(id)).await? {
            return Err(AppError::conflict(NAME_TAKEN));
        }
    }

    let tag = db_tags::update_tag(
        &state.pool,
        auth.user_id,
        id,
        input.name.as_deref(),
        input.color.as_deref(),
    )
    .await?
    .ok_or(AppError::not_found(NOT_FOUND))?;

    tracing::info!(user_id = auth.user_id, tag_id = id, "Tag updated");
    Ok(ApiResponse::ok(tag, "Tag updated successfully"))
}

/// 태그를 삭제합니다. 관계만 끊기고 일기는 그대로 남습니다.
///
/// `DELETE /api/tags/{id}` → `data: null`
pub async fn delete_tag(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    let id = parse_id(&id, INVALID_ID)?;

    if !db_tags::delete_tag(&state.pool, auth.user_id, id).await? {
        return Err(AppError::not_found(NOT_FOUND));
    }

    tracing::info!(user_id = auth.user_id, tag_id = id, "Tag deleted");
    Ok(ApiResponse::ok((), "Tag deleted successfully"))
}
