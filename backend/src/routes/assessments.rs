//! # 평가(Assessment) 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET    /api/v1/admin/assessments`              → 평가 목록 (문항 수 포함)
//! - `POST   /api/v1/admin/assessments`              → 평가 생성 (검증 실패 시 422)
//! - `GET    /api/v1/admin/assessments/{id}`         → 정답을 포함한 전체 트리
//! - `DELETE /api/v1/admin/assessments/{id}`         → 평가 삭제
//! - `POST   /api/v1/student/assessments/{id}/attempt` → 응시용 트리 (정답 제거)
//!
//! ## 생성 검증
//! 저장 전에 아래 규칙을 **모두** 검사하고, 어긴 규칙을 한 번에 돌려줍니다.
//! - 제목 3~255자, 안내문 2000자 이하, 시간 1~300분 (숙제는 시간 없음)
//! - 지문 1개 이상, 지문마다 문항 1개 이상
//! - 문항마다 선택지 정확히 4개, 그중 정답 정확히 1개
//!
//! ```json
//! { "error": { "code": "invalid_assessment", "violations": ["passages[0].questions[1].choices: ..."] } }
//! ```

use crate::{
    db,
    error::AppError,
    middleware::auth::{AdminUser, AuthUser},
    models::*,
    routes::AppState,
    services::assessment_validation::validate_new_assessment,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

/// `GET /admin/assessments`
pub async fn list_assessments(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Value>, AppError> {
    let assessments = db::list_assessments(&state.pool).await?;
    Ok(Json(json!({ "assessments": assessments })))
}

/// `POST /admin/assessments`: 검증을 통과해야만 저장됩니다.
pub async fn create_assessment(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<CreateAssessmentRequest>,
) -> Result<(StatusCode, Json<AssessmentDetail>), AppError> {
    validate_new_assessment(&req).map_err(AppError::InvalidAssessment)?;

    let assessment = db::create_assessment(&state.pool, &req).await?;
    Ok((StatusCode::CREATED, Json(assessment)))
}

/// `GET /admin/assessments/{id}`
pub async fn get_assessment(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<AssessmentDetail>, AppError> {
    let assessment = db::get_assessment_detail(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::not_found("Assessment"))?;
    Ok(Json(assessment))
}

/// `DELETE /admin/assessments/{id}`: 제출 기록도 함께 삭제됩니다.
pub async fn delete_assessment(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if db::delete_assessment(&state.pool, &id).await? {
        tracing::info!("Assessment {} deleted", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Assessment"))
    }
}

/// `POST /student/assessments/{id}/attempt`
///
/// 선택지에서 `isCorrect`를 필드째 뺀 사본을 돌려줍니다.
pub async fn start_attempt(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<StudentAssessment>, AppError> {
    let assessment = db::get_assessment_detail(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::not_found("Assessment"))?;

    tracing::debug!("Student {} started assessment {}", user.user_id, id);
    Ok(Json(assessment.without_answers()))
}
