//! # 요청 전처리 모듈
//!
//! 핸들러 앞단에서 동작하는 추출자(Extractor)들입니다.
//! - `auth`: Bearer 토큰을 검증하고 호출자 id를 꺼내는 `AuthUser`
//! - `validate`: 본문/쿼리를 스키마로 검증하는 `ValidJson`, `ValidQuery`

pub mod auth;
pub mod validate;
