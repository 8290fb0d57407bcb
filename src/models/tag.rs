//! # 태그 모델 정의
//!
//! 태그(Tag) 시스템에서 사용하는 데이터 구조체들을 정의합니다.
//! 태그는 사용자별로 일기를 분류하는 라벨이며, 이름은 같은 사용자 안에서
//! 대소문자 구분 없이 유일해야 합니다.
//!
//! ## 구조체 역할
//! - `TagSummary`: 일기에 붙는 태그 `{ id, name, color }`
//! - `TagResponse`: 태그 API 응답 (사용 횟수 포함)
//! - `TagDetail`: 태그 단건 조회 응답 (최근 일기 5개 포함)
//! - `CreateTag` / `UpdateTag` / `TagListQuery`: 검증된 요청 입력

use crate::middleware::validate::{Fields, Schema};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// 색상을 지정하지 않은 태그의 기본 색 (회색)
pub const DEFAULT_TAG_COLOR: &str = "#6B7280";

/// 태그 이름: 영문자, 숫자, 공백, 하이픈, 밑줄
static TAG_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9\s_-]+$").expect("valid tag name regex"));

/// `#RRGGBB` 형식의 16진수 색상 코드
static COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid color regex"));

const NAME_PATTERN_MESSAGE: &str =
    "Tag name can only contain letters, numbers, spaces, hyphens, and underscores";
const COLOR_PATTERN_MESSAGE: &str = "Color must be a valid hex color code (e.g., #FF5733)";

/// 일기 응답에 평탄화(flatten)되어 들어가는 태그 정보
///
/// 일기-태그 관계 테이블(`diary_tags`)의 행은 응답에 노출하지 않고,
/// 연결된 태그만 이 모양으로 나열합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct TagSummary {
    pub id: i64,
    pub name: String,
    pub color: String,
}

/// 태그 API 응답
///
/// `usage_count`는 이 태그를 참조하는 일기 수입니다.
/// `#[serde(rename_all = "camelCase")]`: JSON에서는 `usageCount`, `createdAt`으로 나갑니다.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TagResponse {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub created_at: String,
    pub usage_count: i64,
}

/// 태그에 최근 연결된 일기 요약
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DiaryBrief {
    pub id: i64,
    pub title: String,
    pub created_at: String,
}

/// 태그 단건 조회 응답
///
/// `#[serde(flatten)]`: `tag`의 필드들이 같은 JSON 객체 안에 펼쳐집니다.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagDetail {
    #[serde(flatten)]
    pub tag: TagResponse,
    pub recent_diaries: Vec<DiaryBrief>,
}

/// 태그 생성 요청, `POST /api/tags`의 본문
#[derive(Debug)]
pub struct CreateTag {
    /// 생성할 태그 이름 (필수, 1~50자)
    pub name: String,
    /// 태그 색상 코드 (선택, 없으면 `DEFAULT_TAG_COLOR`)
    pub color: Option<String>,
}

impl Schema for CreateTag {
    fn read(fields: &mut Fields<'_>) -> Option<Self> {
        let name = fields
            .text("name")
            .required("Tag name is required")
            .max(50, "Tag name must be at most 50 characters")
            .pattern(&TAG_NAME_RE, NAME_PATTERN_MESSAGE)
            .read();
        let color = fields.text("color").pattern(&COLOR_RE, COLOR_PATTERN_MESSAGE).read();

        Some(Self { name: name?, color })
    }
}

/// 태그 수정 요청, `PUT /api/tags/{id}`의 본문
///
/// 모든 필드가 Option: 보낸 필드만 변경하고 빠진 필드는 그대로 둡니다.
#[derive(Debug)]
pub struct UpdateTag {
    pub name: Option<String>,
    pub color: Option<String>,
}

impl Schema for UpdateTag {
    fn read(fields: &mut Fields<'_>) -> Option<Self> {
        let name = fields
            .text("name")
            .non_empty("Tag name cannot be empty")
            .max(50, "Tag name must be at most 50 characters")
            .pattern(&TAG_NAME_RE, NAME_PATTERN_MESSAGE)
            .read();
        let color = fields.text("color").pattern(&COLOR_RE, COLOR_PATTERN_MESSAGE).read();

        Some(Self { name, color })
    }
}

/// 태그 목록 쿼리, `GET /api/tags?search=...`
#[derive(Debug, Default)]
pub struct TagListQuery {
    /// 이름 부분 일치 (대소문자 무시). 빈 문자열은 없는 것으로 취급합니다.
    pub search: Option<String>,
}

impl Schema for TagListQuery {
    fn read(fields: &mut Fields<'_>) -> Option<Self> {
        let search = fields.text("search").read().filter(|s| !s.is_empty());
        Some(Self { search })
    }
}
