//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 라우트 핸들러(routes/)에서 이 모듈의 함수를 호출하여 DB 작업을 수행합니다.
//! 여러 쿼리가 한꺼번에 보여야 하는 작업(세션 재정렬, 접근 구간 생성, 제출 저장 등)은
//! 이 계층의 함수 하나가 트랜잭션 전체를 책임집니다.
//!
//! 각 하위 모듈:
//! - `courses`: 강좌와 세션 CRUD, 세션 재정렬
//! - `enrollments`: 수강 신청과 승인
//! - `access_windows`: 접근 구간 생성/수정/삭제/조회
//! - `assessments`: 평가 트리 저장과 조회
//! - `submissions`: 제출 저장과 리뷰

pub mod access_windows;
pub mod assessments;
pub mod courses;
pub mod enrollments;
pub mod submissions;

pub use access_windows::*;
pub use assessments::*;
pub use courses::*;
pub use enrollments::*;
pub use submissions::*;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// 연결 풀을 만듭니다.
///
/// - 파일이 없으면 새로 만들고
/// - WAL 모드로 읽기와 쓰기가 서로 막지 않게 하며
/// - 외래키 제약을 켭니다 (SQLite는 기본값이 꺼짐)
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

/// 쓰기 충돌 중 UNIQUE 제약 위반인지 확인합니다.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
