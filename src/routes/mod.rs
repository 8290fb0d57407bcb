//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들과, 이들을 URL에 연결하는 라우터입니다.
//! Axum에서 핸들러는 HTTP 요청을 받아 응답을 반환하는 async 함수입니다.
//!
//! 각 하위 모듈:
//! - `auth`: 회원가입, 로그인
//! - `diaries`: 일기 CRUD, 목록 필터, 통계
//! - `health`: 서버 상태 확인 (헬스체크)
//! - `tags`: 태그 CRUD
//! - `users`: 내 프로필 조회/수정, 비밀번호 변경
//!
//! ## 추출자(Extractor) 순서
//! 인증이 필요한 핸들러는 `State` → `AuthUser` → `Path`/`ValidQuery` → `ValidJson` 순서로
//! 인자를 받습니다. 토큰이 없거나 잘못된 요청은 본문 검증이나 DB 접근 전에 401로 끝납니다.

pub mod auth;
pub mod diaries;
pub mod health;
pub mod tags;
pub mod users;

use crate::{config::Config, error::AppError, response::ApiResponse};
use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, post},
    Router,
};
use serde::Serialize;
use sqlx::SqlitePool;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

/// 모든 핸들러가 공유하는 애플리케이션 상태
///
/// 서버 시작 후에는 읽기 전용입니다.
/// `SqlitePool`은 내부적으로 Arc라서 clone해도 같은 풀을 가리킵니다.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
}

/// 전체 라우터를 만듭니다.
///
/// API는 `/api` 아래에 중첩되고, `/`는 환영 메시지, 그 외 경로는 404 봉투로 응답합니다.
/// `main.rs`와 통합 테스트(tests/)가 같은 라우터를 사용합니다.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    let api_routes = Router::new()
        .route("/health", get(health::health_check))
        // 인증 (공개)
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        // 일기. `/diaries/stats`는 정적 경로라 `{id}`보다 먼저 매칭됩니다.
        .route(
            "/diaries",
            get(diaries::list_diaries).post(diaries::create_diary),
        )
        .route("/diaries/stats", get(diaries::diary_stats))
        .route(
            "/diaries/{id}",
            get(diaries::get_diary)
                .put(diaries::update_diary)
                .delete(diaries::delete_diary),
        )
        // 태그
        .route("/tags", get(tags::list_tags).post(tags::create_tag))
        .route(
            "/tags/{id}",
            get(tags::get_tag).put(tags::update_tag).delete(tags::delete_tag),
        )
        // 내 계정
        .route(
            "/user/profile",
            get(users::get_profile).put(users::update_profile),
        )
        .route("/user/change-password", post(users::change_password));

    Router::new()
        .route("/", get(welcome))
        .nest("/api", api_routes)
        .fallback(endpoint_not_found)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// 설정된 출처만 허용하는 CORS. 쿠키/인증 헤더를 위해 credentials를 허용합니다.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
}

#[derive(Serialize)]
struct Welcome {
    version: &'static str,
    documentation: &'static str,
}

/// `GET /`
async fn welcome() -> ApiResponse<Welcome> {
    ApiResponse::ok(
        Welcome {
            version: env!("CARGO_PKG_VERSION"),
            documentation: "/api/health",
        },
        "Welcome to Day Your Read API",
    )
}

/// 어떤 라우트에도 매칭되지 않은 요청
async fn endpoint_not_found() -> AppError {
    AppError::not_found("Endpoint not found")
}

/// 경로의 `{id}`를 양의 정수로 바꿉니다. 실패하면 DB에 가기 전에 400.
pub(crate) fn parse_id(raw: &str, message: &'static str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::bad_request(message))
}
