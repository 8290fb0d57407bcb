//! # 응답 봉투(Envelope) 모듈
//!
//! 모든 엔드포인트는 같은 모양의 JSON을 반환합니다:
//!
//! ```json
//! { "success": true, "message": "...", "data": ..., "meta": { ... } }
//! { "success": false, "message": "...", "errors": { "필드": "메시지" } }
//! ```
//!
//! - 성공 응답은 핸들러가 `ApiResponse<T>`로 만들어 반환합니다.
//! - 실패 응답은 `AppError`의 `IntoResponse` 구현이 `Envelope::failure`로 만듭니다.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// 필드 경로(`title`, `tagIds.2` 등) → 에러 메시지
///
/// BTreeMap을 쓰면 키가 정렬되어 응답이 항상 같은 순서로 직렬화됩니다.
pub type FieldErrors = BTreeMap<String, String>;

/// 목록 응답의 페이지네이션 정보
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl PageMeta {
    /// `total_pages = ceil(total / limit)`. limit은 검증 단계에서 1 이상으로 보장됩니다.
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let limit = limit.max(1);
        Self {
            page,
            limit,
            total,
            total_pages: (total + limit - 1) / limit,
        }
    }
}

/// JSON 봉투 본문
///
/// `Option` 필드는 `None`이면 아예 출력하지 않습니다.
/// `data: Some(())`는 `"data": null`로 직렬화되므로, 삭제 응답처럼
/// "데이터 없음"을 명시해야 하는 경우에 사용합니다.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl Envelope<()> {
    pub fn failure(message: impl Into<String>, errors: Option<FieldErrors>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            meta: None,
            errors,
        }
    }
}

/// 성공 응답: 상태 코드 + 봉투
#[derive(Debug)]
pub struct ApiResponse<T> {
    status: StatusCode,
    envelope: Envelope<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK + data
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::OK, Some(data), message)
    }

    /// 201 Created + data
    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::CREATED, Some(data), message)
    }

    /// 목록 응답에 페이지네이션 정보를 붙입니다.
    pub fn with_meta(mut self, meta: PageMeta) -> Self {
        self.envelope.meta = Some(meta);
        self
    }

    fn with_status(status: StatusCode, data: Option<T>, message: impl Into<String>) -> Self {
        Self {
            status,
            envelope: Envelope {
                success: true,
                message: message.into(),
                data,
                meta: None,
                errors: None,
            },
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.envelope)).into_response()
    }
}
