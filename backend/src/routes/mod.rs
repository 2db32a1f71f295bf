//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들과 라우터 조립을 담당합니다.
//!
//! 각 하위 모듈:
//! - `access_windows`: 접근 구간 생성/수정/삭제/조회
//! - `assessments`: 평가 생성(검증 포함), 조회, 응시
//! - `courses`: 강좌와 세션 관리, 가격 견적
//! - `enrollments`: 수강 신청, 승인/거절, 학생용 세션 목록
//! - `health`: 서버 상태 확인 (헬스체크)
//! - `submissions`: 답안 제출과 리뷰
//!
//! 권한은 핸들러의 Extractor로 표현합니다.
//! `AdminUser`를 받는 핸들러는 관리자 전용, `AuthUser`만 받는 핸들러는 로그인한 누구나 호출할 수 있습니다.

pub mod access_windows;
pub mod assessments;
pub mod courses;
pub mod enrollments;
pub mod health;
pub mod submissions;

pub use access_windows::*;
pub use assessments::*;
pub use courses::*;
pub use enrollments::*;
pub use health::*;
pub use submissions::*;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::SqlitePool;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// SqlitePool은 내부적으로 Arc이므로 clone해도 같은 풀을 가리킵니다.
#[derive(Clone)]
pub struct AppState {
    /// SQLite 연결 풀
    pub pool: SqlitePool,
    /// JWT 토큰 검증용 비밀키
    pub jwt_secret: String,
}

/// `/api/v1` 아래에 붙는 라우트 전체.
///
/// axum 0.8부터 경로 파라미터는 `{id}` 형태로 씁니다.
pub fn api_router() -> Router<AppState> {
    Router::new()
        // ── 강좌와 세션 ──
        .route("/admin/courses", get(list_courses).post(create_course))
        .route("/admin/courses/{id}", get(get_course).patch(update_course))
        .route("/admin/courses/{id}/sessions", post(add_session))
        .route("/admin/courses/{id}/pricing/quote", post(quote_price))
        .route("/admin/sessions/{id}", delete(delete_session))
        .route("/courses/{id}/sessions", get(list_sessions))
        // ── 수강 신청 ──
        .route("/student/courses/{id}/enrollments", post(create_enrollment))
        .route("/admin/enrollments", get(list_enrollments))
        .route("/admin/enrollments/{id}/approve", post(approve_enrollment))
        .route("/admin/enrollments/{id}/reject", post(reject_enrollment))
        .route("/student/enrollments/{id}/sessions", get(list_accessible_sessions))
        // ── 접근 구간 ──
        .route(
            "/enrollments/{id}/access-windows",
            get(list_access_windows).post(create_access_window),
        )
        .route(
            "/access-windows/{id}",
            put(update_access_window).delete(delete_access_window),
        )
        // ── 평가와 제출 ──
        .route("/admin/assessments", get(list_assessments).post(create_assessment))
        .route(
            "/admin/assessments/{id}",
            get(get_assessment).delete(delete_assessment),
        )
        .route("/admin/assessments/{id}/submissions", get(list_submissions))
        .route("/student/assessments/{id}/attempt", post(start_attempt))
        .route("/student/assessments/{id}/submit", post(submit_answers))
        .route("/student/assessments/{id}/submission", get(get_submission_review))
        // ── 헬스체크 ──
        .route("/health", get(health_check))
}

/// 미들웨어까지 붙인 완성된 앱. `main`과 통합 테스트가 같은 라우터를 씁니다.
pub fn app(state: AppState) -> Router {
    // 개발 환경 기준으로 모든 출처를 허용합니다. 운영에서는 도메인을 제한해야 합니다.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/v1", api_router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
