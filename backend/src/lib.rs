//! # satprep 라이브러리 루트
//!
//! SAT 강좌 관리 백엔드의 모든 모듈을 선언합니다.
//! 실행 파일(`main.rs`)과 통합 테스트(`tests/`)가 같은 코드를 공유할 수 있도록
//! 라이브러리 형태로 노출합니다.
//!
//! - `config`: 환경변수 기반 설정
//! - `db`: SQLite 데이터 접근 계층 (트랜잭션 포함)
//! - `error`: HTTP 응답으로 변환되는 에러 타입
//! - `middleware`: JWT 기반 요청자 식별
//! - `models`: DB 행 구조체와 요청/응답 구조체
//! - `routes`: Axum 핸들러와 라우터 구성
//! - `services`: DB와 무관한 순수 도메인 로직 (접근 구간, 가격, 채점)

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
