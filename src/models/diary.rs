//! # 일기(Diary) 모델 정의
//!
//! 일기 CRUD, 목록 필터, 통계에서 사용하는 데이터 구조체들입니다.
//!
//! ## 구조체 역할
//! - `Mood`: 일기의 감정 상태 (고정된 10개 값)
//! - `DiaryRow` / `DiaryListRow`: DB 조회 결과 행
//! - `DiaryView`: 응답 공통 필드 (행에서 필드 단위로 복사)
//! - `DiaryDetail`: 생성/조회/수정 응답 (작성자, 태그, 첨부파일 포함)
//! - `DiaryListItem`: 목록 응답 항목 (태그, 첨부파일 개수 포함)
//! - `CreateDiary` / `UpdateDiary` / `DiaryQuery`: 검증된 요청 입력
//! - `DiaryStats`: 통계 응답
//!
//! DB 행 구조체를 그대로 응답으로 내보내지 않고, 응답 전용 구조체를 따로 둡니다.
//! 내부 컬럼이 실수로 노출되는 일을 타입 수준에서 막기 위해서입니다.

use crate::{
    middleware::validate::{Choice, Fields, Schema},
    models::{tag::TagSummary, user::UserSummary},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// 제목 최대 길이 (문자 수)
pub const TITLE_MAX: usize = 255;
/// 본문 최대 길이 (문자 수)
pub const CONTENT_MAX: usize = 50_000;
/// 목록 한 페이지의 최대 항목 수
pub const MAX_PAGE_SIZE: i64 = 100;
/// 목록 기본 페이지 크기
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// 일기의 감정 상태
///
/// JSON과 DB 모두 `"HAPPY"`처럼 대문자 문자열로 표현합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mood {
    Happy,
    Sad,
    Excited,
    Anxious,
    Calm,
    Angry,
    Grateful,
    Tired,
    Motivated,
    Confused,
}

impl Choice for Mood {
    const ALL: &'static [Self] = &[
        Mood::Happy,
        Mood::Sad,
        Mood::Excited,
        Mood::Anxious,
        Mood::Calm,
        Mood::Angry,
        Mood::Grateful,
        Mood::Tired,
        Mood::Motivated,
        Mood::Confused,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "HAPPY",
            Mood::Sad => "SAD",
            Mood::Excited => "EXCITED",
            Mood::Anxious => "ANXIOUS",
            Mood::Calm => "CALM",
            Mood::Angry => "ANGRY",
            Mood::Grateful => "GRATEFUL",
            Mood::Tired => "TIRED",
            Mood::Motivated => "MOTIVATED",
            Mood::Confused => "CONFUSED",
        }
    }
}

/// 목록 정렬 기준. 이 세 값 외에는 SQL에 도달할 수 없습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
}

impl Choice for SortField {
    const ALL: &'static [Self] = &[SortField::CreatedAt, SortField::UpdatedAt, SortField::Title];

    fn as_str(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "createdAt",
            SortField::UpdatedAt => "updatedAt",
            SortField::Title => "title",
        }
    }
}

impl SortField {
    /// 정렬에 사용할 컬럼 (`d`는 diaries 테이블 별칭)
    pub fn column(self) -> &'static str {
        match self {
            SortField::CreatedAt => "d.created_at",
            SortField::UpdatedAt => "d.updated_at",
            SortField::Title => "d.title",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl Choice for SortOrder {
    const ALL: &'static [Self] = &[SortOrder::Asc, SortOrder::Desc];

    fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl SortOrder {
    pub fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// `diaries` 테이블 한 행
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DiaryRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    /// CHECK 제약으로 `Mood` 값만 저장되지만, 읽을 때는 문자열로 받습니다.
    pub mood: Option<String>,
    pub is_public: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// 목록 조회 행: 일기 + 첨부파일 개수
///
/// `#[sqlx(flatten)]`: 같은 행의 컬럼들로 `DiaryRow`를 채웁니다.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DiaryListRow {
    #[sqlx(flatten)]
    pub diary: DiaryRow,
    pub attachments_count: i64,
}

/// 일기 id와 함께 조회한 태그 (여러 일기의 태그를 한 번에 가져올 때)
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DiaryTagRow {
    pub diary_id: i64,
    #[sqlx(flatten)]
    pub tag: TagSummary,
}

/// 일기 응답의 공통 필드
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryView {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub mood: Option<Mood>,
    pub is_public: bool,
    pub user_id: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<DiaryRow> for DiaryView {
    fn from(row: DiaryRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            mood: row.mood.as_deref().and_then(Mood::parse),
            is_public: row.is_public,
            user_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// 첨부파일 메타데이터 (파일 자체의 저장은 이 서비스 범위 밖입니다)
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: i64,
    pub filename: String,
    pub url: String,
    pub file_type: String,
    pub file_size: i64,
    pub created_at: String,
}

/// 생성/단건 조회/수정 응답
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryDetail {
    #[serde(flatten)]
    pub diary: DiaryView,
    pub tags: Vec<TagSummary>,
    pub user: UserSummary,
    pub attachments: Vec<Attachment>,
}

/// 목록 응답 항목
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryListItem {
    #[serde(flatten)]
    pub diary: DiaryView,
    pub tags: Vec<TagSummary>,
    pub attachments_count: i64,
}

/// 일기 생성 요청, `POST /api/diaries`의 본문
#[derive(Debug)]
pub struct CreateDiary {
    pub title: String,
    pub content: String,
    pub mood: Option<Mood>,
    /// 기본값 false (비공개)
    pub is_public: bool,
    /// 비어 있으면 태그 없이 생성
    pub tag_ids: Vec<i64>,
}

impl Schema for CreateDiary {
    fn read(fields: &mut Fields<'_>) -> Option<Self> {
        let title = fields
            .text("title")
            .required("Title is required")
            .max(TITLE_MAX, "Title must be at most 255 characters")
            .read();
        let content = fields
            .text("content")
            .required("Content is required")
            .max(CONTENT_MAX, "Content must be at most 50000 characters")
            .read();
        let mood = fields.choice::<Mood>("mood");
        let is_public = fields.boolean("isPublic");
        let tag_ids = fields.id_list("tagIds");

        Some(Self {
            title: title?,
            content: content?,
            mood,
            is_public: is_public.unwrap_or(false),
            tag_ids: tag_ids.unwrap_or_default(),
        })
    }
}

/// 일기 수정 요청, `PUT /api/diaries/{id}`의 본문
///
/// 생성 필드 중 아무 부분집합이나 보낼 수 있습니다.
/// - `mood`: `None` = 변경 안 함, `Some(None)` = 감정 지우기, `Some(Some(m))` = 변경
/// - `tag_ids`: `None` = 태그 유지, `Some(ids)` = 태그 집합을 통째로 교체 (`[]`이면 모두 해제)
#[derive(Debug, Default)]
pub struct UpdateDiary {
    pub title: Option<String>,
    pub content: Option<String>,
    pub mood: Option<Option<Mood>>,
    pub is_public: Option<bool>,
    pub tag_ids: Option<Vec<i64>>,
}

impl Schema for UpdateDiary {
    fn read(fields: &mut Fields<'_>) -> Option<Self> {
        let title = fields
            .text("title")
            .non_empty("Title cannot be empty")
            .max(TITLE_MAX, "Title must be at most 255 characters")
            .read();
        let content = fields
            .text("content")
            .non_empty("Content cannot be empty")
            .max(CONTENT_MAX, "Content must be at most 50000 characters")
            .read();
        let mood = fields.nullable_choice::<Mood>("mood");
        let is_public = fields.boolean("isPublic");
        let tag_ids = fields.id_list("tagIds");

        Some(Self {
            title,
            content,
            mood,
            is_public,
            tag_ids,
        })
    }
}

/// 목록 필터. 모든 조건은 선택이며 AND로 결합됩니다.
#[derive(Debug, Clone, Default)]
pub struct DiaryFilter {
    pub mood: Option<Mood>,
    /// 이 중 하나 이상의 태그가 붙은 일기 (전부가 아님)
    pub tag_ids: Vec<i64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    /// 제목 또는 본문 부분 일치
    pub search: Option<String>,
    pub is_public: Option<bool>,
}

/// 일기 목록 쿼리, `GET /api/diaries?...`
#[derive(Debug, Clone)]
pub struct DiaryQuery {
    pub page: i64,
    pub limit: i64,
    pub filter: DiaryFilter,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl Default for DiaryQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            filter: DiaryFilter::default(),
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl DiaryQuery {
    /// 건너뛸 행 수: `(page - 1) * limit`
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Schema for DiaryQuery {
    fn read(fields: &mut Fields<'_>) -> Option<Self> {
        let page = fields.integer("page", 1, i64::MAX / MAX_PAGE_SIZE);
        let limit = fields.integer("limit", 1, MAX_PAGE_SIZE);
        let mood = fields.choice::<Mood>("mood");
        let tag_ids = fields.id_list("tagIds");
        let start_date = fields.date("startDate");
        let end_date = fields.date("endDate");
        let search = fields.text("search").read().filter(|s| !s.is_empty());
        let is_public = fields.boolean("isPublic");
        let sort_by = fields.choice::<SortField>("sortBy");
        let sort_order = fields.choice::<SortOrder>("sortOrder");

        Some(Self {
            page: page.unwrap_or(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE),
            filter: DiaryFilter {
                mood,
                tag_ids: tag_ids.unwrap_or_default(),
                start_date,
                end_date,
                search,
                is_public,
            },
            sort_by: sort_by.unwrap_or_default(),
            sort_order: sort_order.unwrap_or_default(),
        })
    }
}

/// 감정별 일기 수
#[derive(Debug, Clone, Serialize)]
pub struct MoodCount {
    pub mood: Mood,
    pub count: i64,
}

/// 많이 쓰인 태그와 사용 횟수
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TagUsage {
    #[sqlx(flatten)]
    pub tag: TagSummary,
    pub count: i64,
}

/// `GET /api/diaries/stats` 응답
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryStats {
    pub total_diaries: i64,
    /// 최근 7일 동안 작성한 일기 수
    pub recent_diaries: i64,
    pub mood_distribution: Vec<MoodCount>,
    pub top_tags: Vec<TagUsage>,
}
