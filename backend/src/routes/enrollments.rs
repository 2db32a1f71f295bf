//! # 수강 신청(Enrollment) 라우트 핸들러
//!
//! ## 엔드포인트
//! - `POST /api/v1/student/courses/{id}/enrollments` → 수강 신청 (pending)
//! - `GET  /api/v1/admin/enrollments?status=pending`  → 신청 목록
//! - `POST /api/v1/admin/enrollments/{id}/approve`    → 승인 (+ 접근 권한)
//! - `POST /api/v1/admin/enrollments/{id}/reject`     → 거절
//! - `GET  /api/v1/student/enrollments/{id}/sessions` → 학생이 볼 수 있는 세션

use crate::{
    db,
    error::AppError,
    middleware::auth::{AdminUser, AuthUser},
    models::*,
    routes::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

/// `POST /student/courses/{id}/enrollments`
pub async fn create_enrollment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(course_id): Path<String>,
) -> Result<(StatusCode, Json<Enrollment>), AppError> {
    let enrollment = db::create_enrollment(&state.pool, &user.user_id, &course_id).await?;
    tracing::info!("Student {} requested enrollment in {}", user.user_id, course_id);
    Ok((StatusCode::CREATED, Json(enrollment)))
}

/// `GET /admin/enrollments`: `status` 쿼리로 거를 수 있습니다.
pub async fn list_enrollments(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<ListEnrollmentsQuery>,
) -> Result<Json<Value>, AppError> {
    let enrollments = db::list_enrollments(&state.pool, query.status).await?;
    Ok(Json(json!({ "enrollments": enrollments })))
}

/// `POST /admin/enrollments/{id}/approve`
///
/// 본문은 생략할 수 있습니다. 생략하면 라이브 강좌는 전체 수강으로 승인됩니다.
/// 예: `{ "accessType": "late_join", "startSessionId": "..." }`
pub async fn approve_enrollment(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    body: Option<Json<ApproveEnrollmentRequest>>,
) -> Result<Json<EnrollmentView>, AppError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let view = db::approve_enrollment(&state.pool, &id, &req).await?;
    Ok(Json(view))
}

/// `POST /admin/enrollments/{id}/reject`
pub async fn reject_enrollment(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<Enrollment>, AppError> {
    let enrollment = db::reject_enrollment(&state.pool, &id).await?;
    Ok(Json(enrollment))
}

/// `GET /student/enrollments/{id}/sessions`: 본인 수강 신청만 조회할 수 있습니다.
pub async fn list_accessible_sessions(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let enrollment = db::get_enrollment(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::not_found("Enrollment"))?;
    if enrollment.student_id != user.user_id && !user.is_admin() {
        return Err(AppError::not_found("Enrollment"));
    }

    let sessions = db::accessible_sessions(&state.pool, &enrollment).await?;
    Ok(Json(json!({ "sessions": sessions })))
}
