//! # 헬스체크(Health Check) 핸들러
//!
//! ## 엔드포인트
//! - `GET /api/v1/health` → `{ "status": "ok", "database": "ok" }`
//!
//! 로드밸런서나 컨테이너 오케스트레이터가 서버 상태를 확인할 때 사용합니다.

use crate::{error::AppError, routes::AppState};
use axum::{extract::State, Json};
use serde_json::{json, Value};

/// `GET /health`: 서버와 데이터베이스 상태를 확인합니다.
///
/// `SELECT 1`이 실패하면 500(database_error)이 반환됩니다.
pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    sqlx::query("SELECT 1").execute(&state.pool).await?;

    Ok(Json(json!({
        "status": "ok",
        "database": "ok"
    })))
}
