//! # diary-api 라이브러리 루트
//!
//! 개인 일기장 웹 API의 모든 모듈을 공개합니다.
//! 실행 파일(`main.rs`)과 통합 테스트(`tests/`)가 이 크레이트의
//! `routes::router`를 같은 방식으로 사용합니다.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod services;
