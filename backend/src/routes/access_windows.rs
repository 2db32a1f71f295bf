//! # 접근 구간(Access Window) 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET    /api/v1/enrollments/{id}/access-windows` → 구간 목록 (계산 필드 포함)
//! - `POST   /api/v1/enrollments/{id}/access-windows` → 구간 생성 (201)
//! - `PUT    /api/v1/access-windows/{id}`             → 구간 수정 (충돌/가격 재계산)
//! - `DELETE /api/v1/access-windows/{id}`             → 구간 삭제 (204)
//!
//! 쓰기는 관리자만 할 수 있고, 목록은 관리자와 수강 신청 본인이 볼 수 있습니다.
//!
//! | 상황 | 상태 코드 |
//! |------|-----------|
//! | 시작 세션이 끝 세션보다 뒤 / 필수 세션 누락 | 400 |
//! | 다른 강좌의 세션이거나 없는 세션 | 404 |
//! | 같은 수강 신청의 기존 구간과 겹침 | 409 |

use crate::{
    db,
    error::AppError,
    middleware::auth::{AdminUser, AuthUser},
    models::*,
    routes::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

/// `GET /enrollments/{id}/access-windows`
pub async fn list_access_windows(
    State(state): State<AppState>,
    user: AuthUser,
    Path(enrollment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let enrollment = db::get_enrollment(&state.pool, &enrollment_id)
        .await?
        .ok_or_else(|| AppError::not_found("Enrollment"))?;

    // 남의 수강 신청은 존재 여부도 드러내지 않습니다.
    if !user.is_admin() && enrollment.student_id != user.user_id {
        return Err(AppError::not_found("Enrollment"));
    }

    let windows = db::list_window_views(&state.pool, &enrollment).await?;
    Ok(Json(json!({ "accessWindows": windows })))
}

/// `POST /enrollments/{id}/access-windows`
///
/// 본문 예: `{ "startSessionId": "...", "endSessionId": "..." }`
/// `accessType`을 생략하면 부분 구간, `pricingTemplate`을 생략하면 유형별 기본 템플릿입니다.
pub async fn create_access_window(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(enrollment_id): Path<String>,
    Json(req): Json<CreateAccessWindowRequest>,
) -> Result<(StatusCode, Json<AccessWindowView>), AppError> {
    let window = db::create_window(&state.pool, &enrollment_id, &req).await?;
    Ok((StatusCode::CREATED, Json(window)))
}

/// `PUT /access-windows/{id}`
pub async fn update_access_window(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateAccessWindowRequest>,
) -> Result<Json<AccessWindowView>, AppError> {
    let window = db::update_window(&state.pool, &id, &req)
        .await?
        .ok_or_else(|| AppError::not_found("Access window"))?;
    Ok(Json(window))
}

/// `DELETE /access-windows/{id}`
pub async fn delete_access_window(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if db::delete_window(&state.pool, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Access window"))
    }
}
