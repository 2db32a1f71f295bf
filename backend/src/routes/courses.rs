//! # 강좌(Course)와 세션 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET    /api/v1/admin/courses`                     → 강좌 목록
//! - `POST   /api/v1/admin/courses`                     → 강좌 생성
//! - `GET    /api/v1/admin/courses/{id}`                → 강좌와 세션 목록
//! - `PATCH  /api/v1/admin/courses/{id}`                → 제목/가격/상태 수정
//! - `POST   /api/v1/admin/courses/{id}/sessions`       → 세션 추가 (날짜순 재정렬)
//! - `POST   /api/v1/admin/courses/{id}/pricing/quote`  → 접근 구간 가격 미리보기
//! - `DELETE /api/v1/admin/sessions/{id}`               → 세션 삭제 (번호 재정렬)
//! - `GET    /api/v1/courses/{id}/sessions`             → 세션 목록 (로그인한 사용자)
//!
//! 세션 제목이 비어 있으면 응답에서 "Session N"(1부터)으로 채워집니다.

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

/// 가격은 음수일 수 없고, 완료 강좌는 가격이 반드시 있어야 합니다.
fn check_price(course_type: CourseType, price: Option<f64>) -> Result<(), AppError> {
    match price {
        Some(p) if !p.is_finite() || p < 0.0 => Err(AppError::Validation(
            "price must be a non-negative number".to_string(),
        )),
        None if course_type == CourseType::Finished => Err(AppError::Validation(
            "price is required for finished courses".to_string(),
        )),
        _ => Ok(()),
    }
}

/// `GET /admin/courses`
pub async fn list_courses(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Value>, AppError> {
    let courses = db::list_courses(&state.pool).await?;
    Ok(Json(json!({ "courses": courses })))
}

/// `POST /admin/courses`: 새 강좌를 만듭니다. 상태를 생략하면 `draft`
pub async fn create_course(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<CreateCourseRequest>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("title is required".to_string()));
    }
    check_price(req.course_type, req.price)?;

    let course = db::create_course(&state.pool, &req).await?;
    tracing::info!("Course {} created ({:?})", course.id, course.course_type);
    Ok((StatusCode::CREATED, Json(course)))
}

/// `GET /admin/courses/{id}`: 강좌와 정렬된 세션 목록
pub async fn get_course(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let course = db::get_course(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::not_found("Course"))?;
    let ordering = db::session_ordering(&state.pool, &id).await?;

    Ok(Json(json!({
        "course": course,
        "sessions": session_views(&ordering, None),
    })))
}

/// `PATCH /admin/courses/{id}`: 보낸 필드만 수정합니다.
pub async fn update_course(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateCourseRequest>,
) -> Result<Json<Course>, AppError> {
    if matches!(&req.title, Some(title) if title.trim().is_empty()) {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }
    if req.price.is_some() {
        // 유형은 바꿀 수 없으므로 가격 범위만 확인
        check_price(CourseType::Live, req.price)?;
    }

    let course = db::update_course(&state.pool, &id, &req)
        .await?
        .ok_or_else(|| AppError::not_found("Course"))?;
    Ok(Json(course))
}

/// `POST /admin/courses/{id}/sessions`: 라이브 강좌에 세션을 추가합니다.
///
/// 날짜 순서가 바뀔 수 있으므로 추가 후 전체 세션 번호를 다시 매깁니다.
pub async fn add_session(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(course_id): Path<String>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let course = db::get_course(&state.pool, &course_id)
        .await?
        .ok_or_else(|| AppError::not_found("Course"))?;
    if course.course_type != CourseType::Live {
        return Err(AppError::Validation(
            "Sessions can only be added to live courses".to_string(),
        ));
    }

    let session = db::add_session(&state.pool, &course_id, &req).await?;
    let ordering = db::session_ordering(&state.pool, &course_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "session": session,
            "sessions": session_views(&ordering, None),
        })),
    ))
}

/// `DELETE /admin/sessions/{id}`
///
/// 접근 구간의 경계로 쓰이는 세션이면 409. 삭제 후 남은 세션은 `0..n-1`로 다시 번호가 매겨집니다.
pub async fn delete_session(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if db::delete_session(&state.pool, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Session"))
    }
}

/// `GET /courses/{id}/sessions`: 세션 목록 (인덱스와 표시용 제목 포함)
pub async fn list_sessions(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(course_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    if db::get_course(&state.pool, &course_id).await?.is_none() {
        return Err(AppError::not_found("Course"));
    }
    let ordering = db::session_ordering(&state.pool, &course_id).await?;
    Ok(Json(json!({ "sessions": session_views(&ordering, None) })))
}

/// `POST /admin/courses/{id}/pricing/quote`: 저장하지 않고 가격만 계산합니다.
pub async fn quote_price(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(course_id): Path<String>,
    Json(req): Json<QuoteRequest>,
) -> Result<Json<AccessQuoteView>, AppError> {
    let quote = db::quote(&state.pool, &course_id, &req)
        .await?
        .ok_or_else(|| AppError::not_found("Course"))?;
    Ok(Json(quote))
}
