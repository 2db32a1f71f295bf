//! # 에러 처리 모듈
//!
//! 애플리케이션에서 발생할 수 있는 모든 에러를 `AppError` 하나로 모으고,
//! `IntoResponse` 구현으로 HTTP 응답에 자동 변환합니다.
//!
//! 도메인 서비스(`services`)는 각자 자신의 에러 타입을 가지며,
//! 아래의 `From` 구현으로 `?` 연산자 한 번에 `AppError`가 됩니다.
//!
//! | 종류 | 상태 코드 |
//! |------|-----------|
//! | Validation | 400 |
//! | NotFound | 404 |
//! | Conflict (구간 겹침) | 409 |
//! | Submission (중복/빈 답안/잘못된 형태) | 400 |
//! | InvalidAssessment (위반 목록) | 422 |
//! | Unauthorized / Forbidden | 401 / 403 |
//! | Database / Internal | 500 |

use crate::services::{
    access_window::AccessError, grading::GradingError, pricing::PricingError,
    session_ordering::OrderingError, submission_guard::SubmissionRejection,
};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// 요청한 리소스를 찾을 수 없음 (HTTP 404)
    #[error("{0} not found")]
    NotFound(String),

    /// 입력이 잘못되었거나 필수 값이 없음 (HTTP 400)
    #[error("Validation error: {0}")]
    Validation(String),

    /// 평가 생성 시 위반한 규칙 전체 (HTTP 422)
    #[error("Assessment is invalid")]
    InvalidAssessment(Vec<String>),

    /// 제출 거절 (HTTP 400, 사유별 코드)
    #[error(transparent)]
    Submission(#[from] SubmissionRejection),

    /// 리소스 충돌 (HTTP 409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 인증 실패 (HTTP 401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 권한 없음 (HTTP 403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 서버 내부 오류 (HTTP 500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// 데이터베이스 오류 (HTTP 500)
    /// #[from]으로 sqlx 함수의 에러에 `?`를 쓰면 자동 변환됩니다.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    pub fn not_found(what: &str) -> Self {
        AppError::NotFound(what.to_string())
    }
}

impl From<OrderingError> for AppError {
    fn from(err: OrderingError) -> Self {
        match err {
            OrderingError::UnknownSession(_) => AppError::NotFound(err.to_string()),
            OrderingError::InvertedRange { .. } => AppError::Validation(err.to_string()),
        }
    }
}

impl From<PricingError> for AppError {
    // 가격 계산 실패를 0원으로 넘기지 않고 요청 자체를 거절합니다.
    fn from(err: PricingError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<AccessError> for AppError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Ordering(inner) => inner.into(),
            AccessError::Pricing(inner) => inner.into(),
            AccessError::Conflict { .. } => AppError::Conflict(err.to_string()),
            AccessError::MissingSession(_) | AccessError::NoSessions => {
                AppError::Validation(err.to_string())
            }
        }
    }
}

impl From<GradingError> for AppError {
    fn from(err: GradingError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl IntoResponse for AppError {
    /// 내부 에러(Database, Internal)는 실제 내용을 로그에만 남기고
    /// 클라이언트에는 일반적인 메시지만 반환합니다.
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::Validation(ref msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", msg.clone())
            }
            AppError::InvalidAssessment(ref violations) => {
                let body = Json(json!({
                    "error": {
                        "code": "invalid_assessment",
                        "message": self.to_string(),
                        "violations": violations,
                    }
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            AppError::Submission(ref rejection) => {
                let code = match rejection {
                    SubmissionRejection::DuplicateSubmission => "duplicate_submission",
                    SubmissionRejection::EmptyAnswers => "empty_answers",
                    SubmissionRejection::InvalidAnswerShape(_) => "invalid_answer_shape",
                };
                (StatusCode::BAD_REQUEST, code, rejection.to_string())
            }
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            AppError::Unauthorized(ref msg) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone())
            }
            AppError::Forbidden(ref msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "A database error occurred".to_string(),
                )
            }
        };

        // { "error": { "code": "not_found", "message": "Enrollment not found" } }
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
