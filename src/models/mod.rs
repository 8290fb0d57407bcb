//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! 각 하위 모듈은 특정 도메인의 데이터 타입을 담당합니다:
//! - `diary`: 일기, 감정(Mood), 목록 필터, 통계 관련 구조체
//! - `tag`: 태그 관련 구조체
//! - `user`: 사용자(User)와 인증 관련 구조체
//!
//! 요청 구조체는 `Schema`를 구현하여 `ValidJson`/`ValidQuery` 추출자에서
//! 검증된 값으로 만들어집니다.

pub mod diary;
pub mod tag;
pub mod user;

// 하위 모듈의 모든 공개 항목을 재공개(re-export)합니다.
// 사용하는 쪽에서 `models::DiaryDetail`처럼 짧게 쓸 수 있습니다.
pub use diary::*;
pub use tag::*;
pub use user::*;
