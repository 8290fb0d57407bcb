//! # 에러 처리 모듈
//!
//! 애플리케이션에서 발생할 수 있는 모든 에러 타입을 정의합니다.
//! 핸들러는 예외를 던지는 대신 `Result<T, AppError>`를 반환하고,
//! 에러는 이 파일의 `IntoResponse` 구현 한 곳에서 HTTP 응답으로 바뀝니다.
//!
//! 이 모듈의 핵심:
//! - `AppError` 열거형(enum): 검증/인증/권한/없음/충돌/내부 에러를 하나의 타입으로 통합
//! - `IntoResponse` 구현: 에러를 `{ success: false, message, errors? }` 봉투로 변환
//! - DB 제약 조건 위반(UNIQUE, FOREIGN KEY)은 409/400으로 매핑

use crate::response::{Envelope, FieldErrors};
use axum::{
    http::StatusCode,                   // HTTP 상태 코드 (200, 404, 500 등)
    response::{IntoResponse, Response}, // Axum의 응답 변환 트레이트
    Json,                               // JSON 응답 래퍼
};
use thiserror::Error;

/// 5xx 응답에서 클라이언트에게 보여주는 유일한 메시지
const GENERIC_MESSAGE: &str = "An unexpected error occurred";

/// 애플리케이션에서 발생할 수 있는 모든 에러 종류
///
/// 각 에러 variant는 적절한 HTTP 상태 코드와 메시지로 변환됩니다.
/// 핸들러에서 `Result<T, AppError>`를 반환하면,
/// Axum이 자동으로 `IntoResponse`를 호출하여 HTTP 응답으로 변환합니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 입력 검증 실패 (HTTP 422), 필드별 메시지를 함께 반환
    #[error("Validation failed")]
    Validation(FieldErrors),

    /// 잘못된 요청 (HTTP 400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 인증 실패 (HTTP 401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 권한 없음 (HTTP 403)
    ///
    /// 소유하지 않은 리소스 접근은 존재 여부를 숨기기 위해 NotFound로 응답하므로,
    /// 이 variant는 소유권과 무관한 거부에만 씁니다.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 요청한 리소스를 찾을 수 없음 (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// 리소스 충돌 (HTTP 409), 충돌한 필드를 함께 알려줄 수 있음
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        errors: Option<FieldErrors>,
    },

    /// 서버 내부 오류 (HTTP 500). 메시지는 로그에만 남습니다.
    #[error("Internal error: {0}")]
    Internal(String),

    /// 데이터베이스 오류
    /// #[from]: sqlx 함수 결과에 `?`를 쓰면 자동으로 이 variant로 변환됩니다.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// JWT 발급 실패 (HTTP 500)
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    /// 충돌 메시지만 있는 409
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
            errors: None,
        }
    }

    /// 특정 필드가 이미 사용 중인 409 (예: `{ "email": "Already in use" }`)
    pub fn conflict_on(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), "Already in use".to_string());
        Self::Conflict {
            message: message.into(),
            errors: Some(errors),
        }
    }

    /// 이 에러가 만들어낼 상태 코드
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Database(e) => database_status(e),
            AppError::Internal(_) | AppError::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// 컨트롤러의 사전 검사를 빠져나온 DB 제약 조건 위반을 분류합니다.
///
/// - UNIQUE 위반 → 409 (동시에 같은 태그 이름을 만드는 경우 등)
/// - FOREIGN KEY 위반 → 400
/// - 그 외 → 500
fn database_status(error: &sqlx::Error) -> StatusCode {
    match error.as_database_error() {
        Some(db) if db.is_unique_violation() => StatusCode::CONFLICT,
        Some(db) if db.is_foreign_key_violation() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    /// AppError를 HTTP 응답으로 변환합니다.
    ///
    /// 내부 에러(Database, Token, Internal)는 실제 에러 내용을 로그에만 기록하고,
    /// 클라이언트에는 일반적인 메시지만 반환합니다.
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, errors) = match self {
            AppError::Validation(errors) => ("Validation failed".to_string(), Some(errors)),
            AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg) => (msg, None),
            AppError::Conflict { message, errors } => (message, errors),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (GENERIC_MESSAGE.to_string(), None)
            }
            AppError::Token(e) => {
                tracing::error!("Token error: {}", e);
                (GENERIC_MESSAGE.to_string(), None)
            }
            AppError::Database(e) => match status {
                StatusCode::CONFLICT => {
                    tracing::warn!("Unique constraint violation: {}", e);
                    ("Resource already exists".to_string(), None)
                }
                StatusCode::BAD_REQUEST => {
                    tracing::warn!("Foreign key constraint violation: {}", e);
                    ("Invalid reference to related resource".to_string(), None)
                }
                _ => {
                    tracing::error!("Database error: {}", e);
                    (GENERIC_MESSAGE.to_string(), None)
                }
            },
        };

        (status, Json(Envelope::failure(message, errors))).into_response()
    }
}
