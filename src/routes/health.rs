//! # 헬스체크(Health Check) 핸들러
//!
//! 서버가 정상적으로 동작하는지 확인하는 엔드포인트입니다.
//!
//! ## 엔드포인트
//! - `GET /api/health` → `{ "success": true, "data": { "status": "ok", "timestamp": "..." } }`
//!
//! 로드밸런서나 컨테이너 헬스체크, 가동 시간 모니터링에 사용합니다.
//! 인증이 필요 없고 DB에도 접근하지 않습니다.

use crate::response::ApiResponse;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    /// 응답 시각 (RFC 3339, 밀리초, `Z`)
    pub timestamp: String,
}

/// `GET /api/health`: 서버 상태를 확인합니다.
///
/// `Result`를 사용하지 않으므로 이 핸들러는 실패하지 않습니다.
pub async fn health_check() -> ApiResponse<HealthStatus> {
    ApiResponse::ok(
        HealthStatus {
            status: "ok",
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        },
        "API is running",
    )
}
