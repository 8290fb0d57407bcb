//! 라우트 핸들러와 DB 계층 어디에도 속하지 않는 순수 로직
//! - `password`: Argon2id 해싱/검증

pub mod password;
