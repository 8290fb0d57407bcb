//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 데이터베이스와 직접 상호작용하는 함수들을 모아둔 모듈입니다.
//! 라우트 핸들러(routes/)에서 이 모듈의 함수를 호출하여 DB 작업을 수행합니다.
//!
//! 각 하위 모듈:
//! - `diaries`: 일기 CRUD와 목록 필터 쿼리
//! - `stats`: 일기 통계 집계 쿼리
//! - `tags`: 태그 CRUD 및 소유권 확인 쿼리
//! - `users`: 사용자 인증/프로필 쿼리
//!
//! 일기와 태그 조회는 항상 `user_id` 조건을 함께 겁니다.
//! 다른 사용자의 데이터는 "존재하지 않는 것"과 같은 결과(None)가 됩니다.

pub mod diaries;
pub mod stats;
pub mod tags;
pub mod users;

use chrono::{DateTime, Utc};

/// 현재 시각을 DB 타임스탬프 형식으로 만드는 SQL 식
///
/// 마이그레이션의 컬럼 기본값과 같은 형식이라 문자열 비교로 시간순 정렬이 됩니다.
pub const NOW: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

/// `DateTime<Utc>`를 DB에 저장된 타임스탬프와 같은 형식의 문자열로 바꿉니다.
///
/// 예: `2024-03-01T09:30:00.000Z`
pub fn db_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
