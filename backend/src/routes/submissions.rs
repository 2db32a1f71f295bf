//! # 제출(Submission) 라우트 핸들러
//!
//! ## 엔드포인트
//! - `POST /api/v1/student/assessments/{id}/submit`     → 답안 제출 및 채점 (201)
//! - `GET  /api/v1/student/assessments/{id}/submission` → 본인 제출 리뷰 (정답 공개)
//! - `GET  /api/v1/admin/assessments/{id}/submissions`  → 평가별 제출 목록
//!
//! 제출은 학생과 평가 조합마다 한 번뿐입니다. 두 번째 제출은 400(`duplicate_submission`)이고
//! 처음 제출한 점수는 바뀌지 않습니다.

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

/// `POST /student/assessments/{id}/submit`
///
/// 본문: `{ "answers": [{ "questionId": "...", "choiceId": "..." | null }] }`
pub async fn submit_answers(
    State(state): State<AppState>,
    user: AuthUser,
    Path(assessment_id): Path<String>,
    Json(req): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<SubmissionResult>), AppError> {
    let submission =
        db::create_submission(&state.pool, &user.user_id, &assessment_id, &req.answers).await?;
    Ok((StatusCode::CREATED, Json(submission.into())))
}

/// `GET /student/assessments/{id}/submission`: 제출 전이면 404
pub async fn get_submission_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(assessment_id): Path<String>,
) -> Result<Json<SubmissionReview>, AppError> {
    let review = db::get_review(&state.pool, &user.user_id, &assessment_id)
        .await?
        .ok_or_else(|| AppError::not_found("Submission"))?;
    Ok(Json(review))
}

/// `GET /admin/assessments/{id}/submissions`
pub async fn list_submissions(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(assessment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    if db::get_assessment_detail(&state.pool, &assessment_id).await?.is_none() {
        return Err(AppError::not_found("Assessment"));
    }
    let submissions = db::list_submissions(&state.pool, &assessment_id).await?;
    Ok(Json(json!({ "submissions": submissions })))
}
